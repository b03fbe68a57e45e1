use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::field::Network;

/// A raw observation as decoded by an extractor.
///
/// Station metadata is carried as loose JSON scalars because the
/// harmonizer is responsible for coercing it. Measurement keys use the
/// source network's own vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawObservation {
    pub station_id: Option<String>,
    pub station_name: Option<String>,
    pub station_type: Option<String>,
    #[serde(default)]
    pub latitude: Value,
    #[serde(default)]
    pub longitude: Value,
    #[serde(default)]
    pub elevation: Value,
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub hardware: Option<String>,
    pub software: Option<String>,
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub measurements: Map<String, Value>,
}

impl RawObservation {
    pub fn measurement(&self, key: &str) -> &Value {
        self.measurements.get(key).unwrap_or(&Value::Null)
    }
}

/// A raw observation tagged with the network it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "network", content = "record")]
pub enum RawRecord {
    InfoClimat(RawObservation),
    WeatherUnderground(RawObservation),
}

impl RawRecord {
    pub fn network(&self) -> Network {
        match self {
            RawRecord::InfoClimat(_) => Network::InfoClimat,
            RawRecord::WeatherUnderground(_) => Network::WeatherUnderground,
        }
    }

    pub fn observation(&self) -> &RawObservation {
        match self {
            RawRecord::InfoClimat(obs) | RawRecord::WeatherUnderground(obs) => obs,
        }
    }
}
