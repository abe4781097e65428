//! One-shot hardware peripheral initialization and raw I/O helpers.
//!
//! Configures ADC channels, GPIO directions, and the LEDC timer/channels
//! for the shade servos using raw ESP-IDF sys calls. Called once from
//! `main()` before the control loop starts. Also wraps the task watchdog:
//! the main loop must call [`watchdog_feed`] every iteration or the device
//! resets after 10 s.
//!
//! On non-espidf targets every function is a state-free no-op; drivers and
//! sensors keep their observable state in-memory instead.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── ADC channel map (ESP32-S3: ADC1 channel = GPIO number) ────

/// Soil-moisture sensor ADC1 channel.
pub const ADC1_CH_SOIL: u32 = pins::SOIL_ADC_GPIO as u32;
/// Rain sensor ADC1 channel.
pub const ADC1_CH_RAIN: u32 = pins::RAIN_ANALOG_GPIO as u32;

/// LEDC channel for shade servo 1.
pub const LEDC_CH_SERVO1: u32 = 0;
/// LEDC channel for shade servo 2.
pub const LEDC_CH_SERVO2: u32 = 1;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed => write!(f, "LEDC timer/channel config failed"),
        }
    }
}

// ── One-shot init ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    unsafe {
        let rc = adc1_config_width(adc_bits_width_t_ADC_WIDTH_BIT_12);
        if rc != ESP_OK {
            return Err(HwInitError::AdcInitFailed(rc));
        }
        for ch in [ADC1_CH_SOIL, ADC1_CH_RAIN] {
            let rc = adc1_config_channel_atten(ch, adc_atten_t_ADC_ATTEN_DB_11);
            if rc != ESP_OK {
                return Err(HwInitError::AdcInitFailed(rc));
            }
        }
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_gpio() -> Result<(), HwInitError> {
    unsafe {
        // Rain comparator input.
        let rc = gpio_set_direction(pins::RAIN_DIGITAL_GPIO, gpio_mode_t_GPIO_MODE_INPUT);
        if rc != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(rc));
        }

        // Pump relay output, de-energised at boot.
        let rc = gpio_set_direction(pins::PUMP_GPIO, gpio_mode_t_GPIO_MODE_OUTPUT);
        if rc != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(rc));
        }
        let rc = gpio_set_level(pins::PUMP_GPIO, 0);
        if rc != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(rc));
        }
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    unsafe {
        // 50 Hz, 14-bit resolution — standard hobby-servo timing.
        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
            timer_num: ledc_timer_t_LEDC_TIMER_0,
            freq_hz: 50,
            clk_cfg: ledc_clk_cfg_t_LEDC_AUTO_CLK,
            deconfigure: false,
        };
        if ledc_timer_config(&timer) != ESP_OK {
            return Err(HwInitError::LedcInitFailed);
        }

        for (ch, gpio) in [
            (LEDC_CH_SERVO1, pins::SERVO1_GPIO),
            (LEDC_CH_SERVO2, pins::SERVO2_GPIO),
        ] {
            let channel = ledc_channel_config_t {
                gpio_num: gpio,
                speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel: ch,
                intr_type: ledc_intr_type_t_LEDC_INTR_DISABLE,
                timer_sel: ledc_timer_t_LEDC_TIMER_0,
                duty: 0,
                hpoint: 0,
                ..Default::default()
            };
            if ledc_channel_config(&channel) != ESP_OK {
                return Err(HwInitError::LedcInitFailed);
            }
        }
    }
    Ok(())
}

// ── Raw I/O helpers ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    // SAFETY: channel configured in init_adc(); raw read has no aliasing.
    let raw = unsafe { adc1_get_raw(channel) };
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(gpio: i32) -> bool {
    unsafe { gpio_get_level(gpio) != 0 }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_gpio: i32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(gpio: i32, high: bool) {
    unsafe {
        gpio_set_level(gpio, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_gpio: i32, _high: bool) {}

#[cfg(target_os = "espidf")]
pub fn gpio_set_output(gpio: i32) {
    unsafe {
        gpio_set_direction(gpio, gpio_mode_t_GPIO_MODE_OUTPUT);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_set_output(_gpio: i32) {}

#[cfg(target_os = "espidf")]
pub fn gpio_set_input(gpio: i32) {
    unsafe {
        gpio_set_direction(gpio, gpio_mode_t_GPIO_MODE_INPUT);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_set_input(_gpio: i32) {}

/// Drive a servo channel to `angle` degrees (0 – 180).
///
/// Maps to a 0.5 – 2.5 ms pulse inside the 20 ms period at 14-bit duty.
#[cfg(target_os = "espidf")]
pub fn servo_set_angle(channel: u32, angle: u8) {
    let angle = angle.min(180) as f32;
    let pulse_ms = 0.5 + (angle / 180.0) * 2.0;
    let duty = (pulse_ms / 20.0 * 16_383.0) as u32;
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn servo_set_angle(_channel: u32, _angle: u8) {}

// ── Task watchdog ─────────────────────────────────────────────

/// Subscribe the main task to the TWDT (10 s timeout, panic on trigger).
#[cfg(target_os = "espidf")]
pub fn watchdog_subscribe() {
    unsafe {
        let cfg = esp_task_wdt_config_t {
            timeout_ms: 10_000,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        let rc = esp_task_wdt_reconfigure(&cfg);
        if rc != ESP_OK {
            log::warn!("TWDT reconfigure returned {} (may already be configured)", rc);
        }
        if esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK {
            info!("watchdog: subscribed (10s timeout)");
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn watchdog_subscribe() {}

#[cfg(target_os = "espidf")]
pub fn watchdog_feed() {
    unsafe {
        esp_task_wdt_reset();
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn watchdog_feed() {}
