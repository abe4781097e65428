//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`] — the hexagonal boundary for network
//! connectivity. Credentials come from [`SystemConfig`] at construction;
//! this installation has no provisioning channel.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via
//!   `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side runs.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) of control-loop polls before retrying.

use core::fmt;
use log::{error, info, warn};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

pub trait ConnectivityPort {
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    /// Poll once per control-loop iteration; drives backoff reconnects.
    fn poll(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WifiState {
    Disconnected,
    Connected,
    /// Waiting out the backoff before the next attempt.
    Reconnecting { cooldown_polls: u32 },
}

const MAX_BACKOFF_SECS: u32 = 60;

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !ssid.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(()); // open network
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff_secs: u32,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
}

impl WifiAdapter {
    /// Build the adapter from validated credentials.
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        ssid: &str,
        password: &str,
    ) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let wifi = esp_idf_svc::wifi::EspWifi::new(modem, sysloop, None)
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: ssid.try_into().map_err(|()| ConnectivityError::InvalidSsid)?,
            password: password
                .try_into()
                .map_err(|()| ConnectivityError::InvalidPassword)?,
            backoff_secs: 2,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: ssid.try_into().map_err(|()| ConnectivityError::InvalidSsid)?,
            password: password
                .try_into()
                .map_err(|()| ConnectivityError::InvalidPassword)?,
            backoff_secs: 2,
        })
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method: if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        });
        self.wifi
            .set_configuration(&config)
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        self.wifi
            .start()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        self.wifi
            .connect()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        info!("WiFi(sim): connected to '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                self.backoff_secs = 2;
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed — {}", e);
                self.state = WifiState::Reconnecting {
                    cooldown_polls: self.backoff_secs,
                };
                self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn poll(&mut self) {
        match self.state {
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: link lost, scheduling reconnect in {}s", self.backoff_secs);
                    self.state = WifiState::Reconnecting {
                        cooldown_polls: self.backoff_secs,
                    };
                }
            }
            WifiState::Reconnecting { cooldown_polls } => {
                if cooldown_polls > 0 {
                    self.state = WifiState::Reconnecting {
                        cooldown_polls: cooldown_polls - 1,
                    };
                } else {
                    let _ = self.connect();
                }
            }
            WifiState::Disconnected => {}
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_credentials() {
        assert_eq!(
            WifiAdapter::new("", "password123").unwrap_err(),
            ConnectivityError::InvalidSsid
        );
        assert_eq!(
            WifiAdapter::new("greenhouse", "short").unwrap_err(),
            ConnectivityError::InvalidPassword
        );
    }

    #[test]
    fn open_network_password_allowed() {
        assert!(WifiAdapter::new("greenhouse", "").is_ok());
    }

    #[test]
    fn connect_then_is_connected() {
        let mut wifi = WifiAdapter::new("greenhouse", "password123").unwrap();
        assert!(!wifi.is_connected());
        wifi.connect().unwrap();
        assert!(wifi.is_connected());
    }
}
