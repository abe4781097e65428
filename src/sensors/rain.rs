//! Rain drop sensor (analog intensity + digital comparator output).
//!
//! The comparator output is active-low: 0 = wet, 1 = dry. The digital line
//! feeds the safety interlock; the analog value rides along in telemetry
//! for the coordinator's dashboards.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: ADC1 channel + GPIO input.
//! On host/test: static atomics for injection.

use core::sync::atomic::{AtomicBool, AtomicU16};
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_RAIN_ANALOG: AtomicU16 = AtomicU16::new(0);
static SIM_RAIN_WET: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_reading(analog: u16, wet: bool) {
    SIM_RAIN_ANALOG.store(analog, Ordering::Relaxed);
    SIM_RAIN_WET.store(wet, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
pub struct RainReading {
    /// Raw ADC value (0 – 4095).
    pub analog: u16,
    /// Comparator output: 0 = wet, 1 = dry.
    pub digital: u8,
}

pub struct RainSensor {
    _analog_gpio: i32,
    _digital_gpio: i32,
}

impl RainSensor {
    pub fn new() -> Self {
        Self {
            _analog_gpio: crate::pins::RAIN_ANALOG_GPIO,
            _digital_gpio: crate::pins::RAIN_DIGITAL_GPIO,
        }
    }

    pub fn read(&mut self) -> RainReading {
        #[cfg(target_os = "espidf")]
        {
            RainReading {
                analog: hw_init::adc1_read(hw_init::ADC1_CH_RAIN),
                digital: u8::from(hw_init::gpio_read(self._digital_gpio)),
            }
        }
        #[cfg(not(target_os = "espidf"))]
        {
            RainReading {
                analog: SIM_RAIN_ANALOG.load(Ordering::Relaxed),
                digital: u8::from(!SIM_RAIN_WET.load(Ordering::Relaxed)),
            }
        }
    }
}
