//! System configuration parameters
//!
//! All tunable parameters for the SmartGrow controller. The original
//! hardware revision baked these into a header; here they live in one
//! serde struct so a future provisioning channel can override them at
//! runtime.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// Device identity string sent with every telemetry report.
    pub device_id: String,

    // --- Shade (hysteresis thresholds) ---
    /// Temperature (°C) at or above which the shade deploys.
    pub shade_on_temp_c: f32,
    /// Temperature (°C) at or below which the shade retracts.
    pub shade_off_temp_c: f32,
    /// Servo angle pair (channel 1, channel 2) for the open position.
    pub servo_open_angles: (u8, u8),
    /// Servo angle pair for the deployed (shading) position.
    pub servo_shade_angles: (u8, u8),

    // --- Irrigation ---
    /// Pump flow-rate calibration (litres per second).
    pub flow_rate_l_per_sec: f32,
    /// Hard cap on a single irrigation run (seconds).
    pub max_irrigation_secs: f32,

    // --- Timing ---
    /// Control loop interval (milliseconds).
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (seconds).
    pub report_interval_secs: u32,

    // --- Coordinator endpoint ---
    /// Coordinator host (domain or IP).
    pub server_host: String,
    /// Coordinator port.
    pub server_port: u16,
    /// Use TLS for the reporting channel (certificate validation is
    /// disabled either way — the coordinator runs a self-signed cert).
    pub use_tls: bool,
    /// Path for the telemetry report endpoint.
    pub data_path: String,
    /// Path for the command status endpoint.
    pub status_path: String,

    // --- WiFi ---
    /// Station SSID.
    pub wifi_ssid: String,
    /// Station password (WPA2).
    pub wifi_password: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            device_id: "esp32s3-1".into(),

            // Shade
            shade_on_temp_c: 30.0,
            shade_off_temp_c: 28.0,
            servo_open_angles: (0, 0),
            servo_shade_angles: (135, 110),

            // Irrigation
            flow_rate_l_per_sec: 0.5,
            max_irrigation_secs: 600.0,

            // Timing
            control_loop_interval_ms: 1000, // 1 Hz
            report_interval_secs: 10,

            // Coordinator
            server_host: "iot.example.com".into(),
            server_port: 443,
            use_tls: true,
            data_path: "/api/device/data".into(),
            status_path: "/api/device/command/status".into(),

            // WiFi — provisioned per installation
            wifi_ssid: String::new(),
            wifi_password: String::new(),
        }
    }
}

impl SystemConfig {
    /// Range-check the configuration. Invalid values are rejected, not
    /// clamped — a bad threshold pair would defeat the hysteresis and a
    /// zero flow rate would divide irrigation durations to infinity.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.shade_on_temp_c <= self.shade_off_temp_c {
            return Err("shade_on_temp_c must be strictly above shade_off_temp_c");
        }
        if !(self.flow_rate_l_per_sec > 0.0) {
            return Err("flow_rate_l_per_sec must be positive");
        }
        if !(self.max_irrigation_secs > 0.0) {
            return Err("max_irrigation_secs must be positive");
        }
        if self.control_loop_interval_ms == 0 {
            return Err("control_loop_interval_ms must be positive");
        }
        if self.report_interval_secs == 0 {
            return Err("report_interval_secs must be positive");
        }
        if self.device_id.is_empty() {
            return Err("device_id must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.shade_on_temp_c > c.shade_off_temp_c);
        assert!(c.flow_rate_l_per_sec > 0.0);
        assert!(c.control_loop_interval_ms > 0);
        assert!(c.report_interval_secs > 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert!((c.shade_on_temp_c - c2.shade_on_temp_c).abs() < 0.001);
        assert!((c.flow_rate_l_per_sec - c2.flow_rate_l_per_sec).abs() < 0.001);
        assert_eq!(c.device_id, c2.device_id);
        assert_eq!(c.servo_shade_angles, c2.servo_shade_angles);
    }

    #[test]
    fn shade_on_above_shade_off_invariant() {
        let c = SystemConfig::default();
        assert!(
            c.shade_on_temp_c > c.shade_off_temp_c,
            "on threshold must be above off threshold to prevent servo chatter"
        );

        let inverted = SystemConfig {
            shade_on_temp_c: 28.0,
            shade_off_temp_c: 30.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.control_loop_interval_ms <= c.report_interval_secs * 1000,
            "control loop must tick at least as often as reports go out"
        );
    }

    #[test]
    fn zero_flow_rate_rejected() {
        let c = SystemConfig {
            flow_rate_l_per_sec: 0.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
