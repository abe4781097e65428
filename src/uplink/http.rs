//! HTTP(S) reporting client — the [`ReportPort`] adapter.
//!
//! Two deployment variants behind one type, selected by configuration:
//! plaintext HTTP to a fixed host:port, or HTTPS to a domain name with
//! certificate validation disabled (the coordinator runs a self-signed
//! cert). Payloads are identical either way.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real requests via the ESP-IDF HTTP client.
//! - **all other targets**: logs the payload and returns an empty batch,
//!   so host-side simulation runs don't need a coordinator.

use log::debug;

use crate::app::commands::CommandOutcome;
use crate::app::ports::ReportPort;
use crate::config::SystemConfig;
use crate::error::TransportError;
use crate::uplink::wire::{self, CommandBatch, TelemetryReport};

/// Reporting client for both transport variants.
pub struct HttpUplink {
    data_url: String,
    status_url: String,
}

impl HttpUplink {
    pub fn new(config: &SystemConfig) -> Self {
        let scheme = if config.use_tls { "https" } else { "http" };
        let default_port = if config.use_tls { 443 } else { 80 };
        let authority = if config.server_port == default_port {
            config.server_host.clone()
        } else {
            format!("{}:{}", config.server_host, config.server_port)
        };
        Self {
            data_url: format!("{scheme}://{authority}{}", config.data_path),
            status_url: format!("{scheme}://{authority}{}", config.status_path),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl HttpUplink {
    /// POST `body` as JSON and return the response body.
    fn post(&self, url: &str, body: &str) -> Result<String, TransportError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::io::{Read, Write};

        let mut conn = EspHttpConnection::new(&Configuration {
            // Certificate validation disabled: no CA store, no bundle.
            use_global_ca_store: false,
            crt_bundle_attach: None,
            ..Default::default()
        })
        .map_err(|_| TransportError::ConnectFailed)?;

        conn.initiate_request(
            Method::Post,
            url,
            &[("Content-Type", "application/json")],
        )
        .map_err(|_| TransportError::ConnectFailed)?;
        conn.write_all(body.as_bytes())
            .map_err(|_| TransportError::ConnectFailed)?;
        conn.initiate_response()
            .map_err(|_| TransportError::ConnectFailed)?;

        let status = conn.status();
        if status != 200 {
            return Err(TransportError::HttpStatus(status));
        }

        let mut response = Vec::new();
        let mut chunk = [0u8; 512];
        loop {
            let n = conn
                .read(&mut chunk)
                .map_err(|_| TransportError::InvalidResponse)?;
            if n == 0 {
                break;
            }
            response.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8(response).map_err(|_| TransportError::InvalidResponse)
    }
}

#[cfg(target_os = "espidf")]
impl ReportPort for HttpUplink {
    fn report(&mut self, report: &TelemetryReport) -> Result<CommandBatch, TransportError> {
        let body = wire::encode_report(report)?;
        debug!("POST {} {}", self.data_url, body);
        let response = self.post(&self.data_url, &body)?;
        wire::decode_response(&response)
    }

    fn report_status(
        &mut self,
        command_id: i64,
        outcome: &CommandOutcome,
    ) -> Result<(), TransportError> {
        let body = wire::encode_status(command_id, outcome)?;
        debug!("POST {} {}", self.status_url, body);
        // Fire-and-forget: the response body is irrelevant, only delivery.
        self.post(&self.status_url, &body).map(|_| ())
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl ReportPort for HttpUplink {
    fn report(&mut self, report: &TelemetryReport) -> Result<CommandBatch, TransportError> {
        let body = wire::encode_report(report)?;
        debug!("uplink(sim): POST {} {}", self.data_url, body);
        Ok(Vec::new())
    }

    fn report_status(
        &mut self,
        command_id: i64,
        outcome: &CommandOutcome,
    ) -> Result<(), TransportError> {
        let body = wire::encode_status(command_id, outcome)?;
        debug!("uplink(sim): POST {} {}", self.status_url, body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_include_non_default_port() {
        let uplink = HttpUplink::new(&SystemConfig {
            server_host: "192.168.1.10".into(),
            server_port: 8080,
            use_tls: false,
            ..Default::default()
        });
        assert_eq!(uplink.data_url, "http://192.168.1.10:8080/api/device/data");
    }

    #[test]
    fn default_tls_port_is_elided() {
        let uplink = HttpUplink::new(&SystemConfig::default());
        assert_eq!(uplink.data_url, "https://iot.example.com/api/device/data");
        assert_eq!(
            uplink.status_url,
            "https://iot.example.com/api/device/command/status"
        );
    }
}
