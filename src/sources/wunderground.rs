use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use super::catalog::StationMeta;
use super::decode::read_payloads;
use crate::domain::{Field, RawObservation, RawRecord};
use crate::error::{PipelineError, Result};
use crate::pipeline::processing::harmonize::WUNDERGROUND_FIELDS;

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.\-]").expect("valid numeric cleanup regex"));

/// Reads Weather Underground observation tables exported per station
#[derive(Debug, Clone)]
pub struct WundergroundExtractor {
    stations: BTreeMap<String, StationMeta>,
}

impl WundergroundExtractor {
    pub fn new(stations: BTreeMap<String, StationMeta>) -> Self {
        Self { stations }
    }

    pub async fn extract_from_local(&self, path: &Path, station_id: &str) -> Result<Vec<RawRecord>> {
        let meta = self
            .stations
            .get(station_id)
            .ok_or_else(|| PipelineError::Extract {
                source_name: format!("wunderground/{}", station_id),
                message: "unknown station".to_string(),
            })?;

        let payloads = read_payloads(path).await?;
        let records = parse_payloads(&payloads, station_id, meta);
        info!(
            "Extracted {} Weather Underground records for {} from {}",
            records.len(),
            station_id,
            path.display()
        );
        Ok(records)
    }
}

pub fn parse_payloads(payloads: &[Value], station_id: &str, meta: &StationMeta) -> Vec<RawRecord> {
    payloads
        .iter()
        .enumerate()
        .filter_map(|(idx, payload)| {
            if !payload.is_object() {
                debug!("Line {} for station {} skipped: not an object", idx + 1, station_id);
                return None;
            }
            Some(RawRecord::WeatherUnderground(build_observation(payload, station_id, meta)))
        })
        .collect()
}

fn build_observation(payload: &Value, station_id: &str, meta: &StationMeta) -> RawObservation {
    let measurements = WUNDERGROUND_FIELDS
        .iter()
        .map(|(key, field, _)| {
            let raw = payload.get(*key).unwrap_or(&Value::Null);
            let value = match field {
                // compass direction, left for the harmonizer
                Field::WindDirection => raw.clone(),
                _ => clean_numeric(raw),
            };
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
        hardware: meta.hardware.clone(),
        software: meta.software.clone(),
        timestamp: payload.get("Timestamp").cloned().unwrap_or(Value::Null),
        measurements,
    }
}

/// Strip units and invisible characters from a table cell, keeping the number
pub fn clean_numeric(raw: &Value) -> Value {
    let text = match raw {
        Value::Null => return Value::Null,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    NON_NUMERIC
        .replace_all(&text, "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Value::from)
        .unwrap_or(Value::Null)
}
