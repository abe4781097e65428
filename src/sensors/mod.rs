//! Sensor subsystem — individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces a
//! [`SensorSnapshot`](crate::state::SensorSnapshot) each tick. A failed
//! DHT read is substituted with the documented fallback values and logged —
//! a single flaky sensor must not degrade the control loop beyond that one
//! reading.

pub mod dht;
pub mod rain;
pub mod soil;

use log::warn;

use crate::state::SensorSnapshot;
use dht::DhtSensor;
use rain::RainSensor;
use soil::SoilMoistureSensor;

/// Aggregates all sensor drivers and produces a unified snapshot.
pub struct SensorHub {
    pub dht: DhtSensor,
    pub soil: SoilMoistureSensor,
    pub rain: RainSensor,
}

impl SensorHub {
    /// Construct a new hub. Pass in pre-built drivers (built in main where
    /// peripheral ownership is established).
    pub fn new(dht: DhtSensor, soil: SoilMoistureSensor, rain: RainSensor) -> Self {
        Self { dht, soil, rain }
    }

    /// Read every sensor and return a unified snapshot.
    pub fn read_all(&mut self) -> SensorSnapshot {
        let fallback = SensorSnapshot::default();

        let (temperature_c, humidity_pct) = match self.dht.read() {
            Ok(reading) => (reading.temperature_c, reading.humidity_pct),
            Err(e) => {
                warn!(
                    "DHT read failed ({e}), substituting {:.1}°C / {:.1}%",
                    fallback.temperature_c, fallback.humidity_pct
                );
                (fallback.temperature_c, fallback.humidity_pct)
            }
        };

        let rain = self.rain.read();

        SensorSnapshot {
            temperature_c,
            humidity_pct,
            soil_raw: self.soil.read(),
            rain_analog: rain.analog,
            rain_digital: rain.digital,
        }
    }
}
