//! Capacitive soil-moisture sensor (analog, ADC1).
//!
//! Raw ADC counts are reported as-is; the coordinator owns the dry/wet
//! calibration per planter box.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the soil ADC channel via the oneshot API.
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_SOIL_RAW: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_raw(raw: u16) {
    SIM_SOIL_RAW.store(raw, Ordering::Relaxed);
}

pub struct SoilMoistureSensor {
    _adc_gpio: i32,
}

impl SoilMoistureSensor {
    pub fn new() -> Self {
        Self {
            _adc_gpio: crate::pins::SOIL_ADC_GPIO,
        }
    }

    /// Raw ADC reading (0 – 4095).
    pub fn read(&mut self) -> u16 {
        #[cfg(target_os = "espidf")]
        {
            hw_init::adc1_read(hw_init::ADC1_CH_SOIL)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            SIM_SOIL_RAW.load(Ordering::Relaxed)
        }
    }
}
