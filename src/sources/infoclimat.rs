use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use super::catalog::StationMeta;
use super::decode::read_payloads;
use crate::domain::{RawObservation, RawRecord};
use crate::error::Result;
use crate::pipeline::processing::harmonize::INFOCLIMAT_FIELDS;
use crate::timestamps::parse_iso_utc;

/// Request parameters echoed by the API alongside the station lists
const PARAMS_KEY: &str = "_params";

/// Reads InfoClimat hourly extracts (`hourly.{station_id: [...]}`)
#[derive(Debug, Clone)]
pub struct InfoClimatExtractor {
    stations: BTreeMap<String, StationMeta>,
}

impl InfoClimatExtractor {
    pub fn new(stations: BTreeMap<String, StationMeta>) -> Self {
        Self { stations }
    }

    pub async fn extract_from_local(&self, path: &Path) -> Result<Vec<RawRecord>> {
        let payloads = read_payloads(path).await?;
        let records = self.parse_payloads(&payloads);
        info!(
            "Extracted {} InfoClimat records from {}",
            records.len(),
            path.display()
        );
        Ok(records)
    }

    pub fn parse_payloads(&self, payloads: &[Value]) -> Vec<RawRecord> {
        let mut records = Vec::new();

        for (idx, payload) in payloads.iter().enumerate() {
            let Some(hourly) = payload.get("hourly").and_then(Value::as_object) else {
                debug!("Payload {} has no hourly section", idx + 1);
                continue;
            };

            for (station_id, entries) in hourly {
                let meta = self
                    .stations
                    .get(station_id)
                    .cloned()
                    .unwrap_or_else(StationMeta::unknown);

                let Some(entries) = entries.as_array() else {
                    if station_id != PARAMS_KEY {
                        warn!("Payload {}, station {}: expected a list of measurements", idx + 1, station_id);
                    }
                    continue;
                };

                for entry in entries {
                    let Some(entry) = entry.as_object() else {
                        if station_id != PARAMS_KEY {
                            warn!("Payload {}, station {}: skipping non-object measurement {}", idx + 1, station_id, entry);
                        }
                        continue;
                    };
                    records.push(RawRecord::InfoClimat(build_observation(station_id, &meta, entry)));
                }
                debug!("Payload {}: {} entries for station {}", idx + 1, entries.len(), station_id);
            }
        }

        records
    }
}

fn build_observation(station_id: &str, meta: &StationMeta, entry: &Map<String, Value>) -> RawObservation {
    let timestamp = match entry.get("dh_utc") {
        Some(Value::String(raw)) if parse_iso_utc(raw).is_some() => Value::String(raw.clone()),
        None | Some(Value::Null) => Value::Null,
        Some(other) => {
            warn!("Station {}: invalid timestamp '{}'", station_id, other);
            Value::Null
        }
    };

    let measurements = INFOCLIMAT_FIELDS
        .iter()
        .map(|(key, _, _)| {
            let value = entry.get(*key).cloned().unwrap_or(Value::Null);
            (key.to_string(), value)
        })
        .collect();

    RawObservation {
        station_id: Some(station_id.to_string()),
        station_name: meta.name.clone(),
        station_type: meta.station_type.clone(),
        latitude: meta.latitude.into(),
        longitude: meta.longitude.into(),
        elevation: meta.elevation.into(),
        city: meta.city.clone(),
        country: meta.country.clone(),
        region: meta.region.clone(),
        hardware: None,
        software: None,
        timestamp,
        measurements,
    }
}
