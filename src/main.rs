//! SmartGrow Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single blocking control loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  HardwareAdapter     LogEventSink      HttpUplink        │
//! │  (Sensor+Actuator)   (EventSink)       (ReportPort)      │
//! │  WifiAdapter                                             │
//! │  (Connectivity)                                          │
//! │                                                          │
//! │  ────────────── Port Trait Boundary ──────────────       │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │            AppService (pure logic)             │      │
//! │  │  Shade · Pump · Scheduler · Safety · Commands  │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop is deliberately single-threaded and cooperative: one blocking
//! sleep per iteration, everything else non-blocking. The device processes
//! at most one irrigation at a time and re-evaluates the rain interlock
//! every pass.

#![deny(unused_must_use)]

use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use smartgrow::adapters::hardware::HardwareAdapter;
use smartgrow::adapters::log_sink::LogEventSink;
use smartgrow::adapters::wifi::{ConnectivityPort, WifiAdapter};
use smartgrow::app::service::AppService;
use smartgrow::config::SystemConfig;
use smartgrow::drivers::hw_init;
use smartgrow::drivers::pump::PumpRelay;
use smartgrow::drivers::servo::ShadeServos;
use smartgrow::sensors::{SensorHub, dht::DhtSensor, rain::RainSensor, soil::SoilMoistureSensor};
use smartgrow::uplink::http::HttpUplink;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartGrow v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    if let Err(e) = config.validate() {
        // A build with a broken default config must not drive actuators.
        log::error!("config invalid: {e} — halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Hardware bring-up ──────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt; the
        // watchdog is not armed yet, so this parks the device safely
        // with the pump relay de-energised.
        log::error!("HAL init failed: {e} — halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }
    hw_init::watchdog_subscribe();

    let sensor_hub = SensorHub::new(DhtSensor::new(), SoilMoistureSensor::new(), RainSensor::new());
    let mut hw = HardwareAdapter::new(sensor_hub, PumpRelay::new(), ShadeServos::new());

    // ── 4. Connectivity ───────────────────────────────────────
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let peripherals = esp_idf_svc::hal::peripherals::Peripherals::take()?;
    let mut wifi = match WifiAdapter::new(
        peripherals.modem,
        sysloop,
        &config.wifi_ssid,
        &config.wifi_password,
    ) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("WiFi unavailable ({e}); running offline, reports will fail");
            None
        }
    };
    if let Some(w) = wifi.as_mut() {
        if let Err(e) = w.connect() {
            warn!("WiFi: initial connect failed ({e}); retrying in background");
        }
    }

    // ── 5. Application core ───────────────────────────────────
    let mut uplink = HttpUplink::new(&config);
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config.clone());
    app.start(&mut sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let interval = Duration::from_millis(u64::from(config.control_loop_interval_ms));
    loop {
        // The one deliberate blocking wait per iteration.
        thread::sleep(interval);

        if let Some(w) = wifi.as_mut() {
            w.poll();
        }

        app.tick(&mut hw, &mut uplink, &mut sink);

        hw_init::watchdog_feed();
    }
}
