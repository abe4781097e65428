//! GPIO pin assignments for the ESP32-S3 carrier board.
//!
//! Single source of truth — drivers take pins from here, never hardcode.

/// DHT11 temperature/humidity sensor (one-wire data line).
pub const DHT_GPIO: i32 = 4;

/// Soil-moisture sensor analog output (ADC1).
pub const SOIL_ADC_GPIO: i32 = 1;

/// Rain drop sensor analog output (ADC1).
pub const RAIN_ANALOG_GPIO: i32 = 2;

/// Rain drop sensor comparator output (digital, active-low = wet).
pub const RAIN_DIGITAL_GPIO: i32 = 3;

/// Shade servo, channel 1 (LEDC PWM).
pub const SERVO1_GPIO: i32 = 5;

/// Shade servo, channel 2 (LEDC PWM).
pub const SERVO2_GPIO: i32 = 6;

/// Water pump relay coil.
pub const PUMP_GPIO: i32 = 7;
