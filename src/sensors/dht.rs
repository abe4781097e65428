//! DHT11 temperature/humidity sensor (single-wire, 1 Hz max poll rate).
//!
//! The DHT11 answers a host start pulse with 40 bits of data: humidity
//! (integer + decimal byte), temperature (integer + decimal byte), and a
//! checksum. Bit values are encoded in the length of the high phase
//! (~28 µs = 0, ~70 µs = 1).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the protocol on the data GPIO with interrupts
//! implicitly tolerated (a corrupted frame fails the checksum and is
//! reported as a read failure, which the hub substitutes).
//! On host/test: reads from static atomics for injection.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::SensorError;

static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(25.0f32.to_bits());
static SIM_HUMIDITY_BITS: AtomicU32 = AtomicU32::new(60.0f32.to_bits());
static SIM_FAIL: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_reading(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_HUMIDITY_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_failing(fail: bool) {
    SIM_FAIL.store(fail, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
pub struct DhtReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct DhtSensor {
    _gpio: i32,
}

impl DhtSensor {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {
            _gpio: crate::pins::DHT_GPIO,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self { _gpio: -1 }
    }

    /// One full sensor transaction. Checksum failures and timeouts are
    /// surfaced as [`SensorError::DhtReadFailed`].
    pub fn read(&mut self) -> Result<DhtReading, SensorError> {
        self.read_impl()
    }

    #[cfg(target_os = "espidf")]
    fn read_impl(&mut self) -> Result<DhtReading, SensorError> {
        let frame = self.read_frame()?;

        let checksum = frame[0]
            .wrapping_add(frame[1])
            .wrapping_add(frame[2])
            .wrapping_add(frame[3]);
        if checksum != frame[4] {
            return Err(SensorError::DhtReadFailed);
        }

        // DHT11 decimal bytes are tenths (often zero on older batches).
        Ok(DhtReading {
            humidity_pct: frame[0] as f32 + frame[1] as f32 / 10.0,
            temperature_c: frame[2] as f32 + frame[3] as f32 / 10.0,
        })
    }

    /// Bit-bang one 40-bit frame off the data line.
    #[cfg(target_os = "espidf")]
    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        use crate::drivers::hw_init;
        use esp_idf_svc::sys::ets_delay_us;

        let gpio = self._gpio;

        // Host start signal: pull low ≥18 ms, release, then the sensor
        // drives the line.
        hw_init::gpio_set_output(gpio);
        hw_init::gpio_write(gpio, false);
        unsafe { ets_delay_us(18_000) };
        hw_init::gpio_write(gpio, true);
        unsafe { ets_delay_us(30) };
        hw_init::gpio_set_input(gpio);

        // Sensor response: 80 µs low, 80 µs high.
        self.wait_level(gpio, false, 100)?;
        self.wait_level(gpio, true, 100)?;
        self.wait_level(gpio, false, 100)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            // 50 µs low preamble, then the timed high phase.
            self.wait_level(gpio, true, 70)?;
            let high_us = self.level_duration(gpio, true, 100)?;
            if high_us > 40 {
                frame[bit / 8] |= 1 << (7 - bit % 8);
            }
        }
        Ok(frame)
    }

    /// Busy-wait until the line reaches `level`, bounded by `timeout_us`.
    #[cfg(target_os = "espidf")]
    fn wait_level(&self, gpio: i32, level: bool, timeout_us: u32) -> Result<(), SensorError> {
        use crate::drivers::hw_init;
        use esp_idf_svc::sys::ets_delay_us;

        for _ in 0..timeout_us {
            if hw_init::gpio_read(gpio) == level {
                return Ok(());
            }
            unsafe { ets_delay_us(1) };
        }
        Err(SensorError::DhtReadFailed)
    }

    /// Measure how long the line stays at `level`, in microseconds.
    #[cfg(target_os = "espidf")]
    fn level_duration(&self, gpio: i32, level: bool, timeout_us: u32) -> Result<u32, SensorError> {
        use crate::drivers::hw_init;
        use esp_idf_svc::sys::ets_delay_us;

        for elapsed in 0..timeout_us {
            if hw_init::gpio_read(gpio) != level {
                return Ok(elapsed);
            }
            unsafe { ets_delay_us(1) };
        }
        Err(SensorError::DhtReadFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_impl(&mut self) -> Result<DhtReading, SensorError> {
        if SIM_FAIL.load(Ordering::Relaxed) {
            return Err(SensorError::DhtReadFailed);
        }
        Ok(DhtReading {
            temperature_c: f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
            humidity_pct: f32::from_bits(SIM_HUMIDITY_BITS.load(Ordering::Relaxed)),
        })
    }
}
