use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::field::{Field, Network};

/// One physical quantity reading. A `None` value means "not reported".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: Option<f64>,
    pub unit: String,
}

impl Measurement {
    pub fn new(value: Option<f64>, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }
}

/// GeoJSON point, coordinates ordered `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn from_lat_lon(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Self {
                kind: "Point".to_string(),
                coordinates: [lon, lat],
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<i64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: Option<String>,
    pub name: Option<String>,
    pub network: Network,
    #[serde(rename = "type")]
    pub station_type: String,
    pub location: Location,
    pub location_geo: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
}

/// Quality annotations written by the validator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub completeness_score: Option<f64>,
    pub missing_fields: Vec<Field>,
    pub validation_passed: Option<bool>,
    pub anomalies_detected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source_file: String,
    pub ingestion_timestamp: String,
    pub pipeline_version: String,
}

/// Canonical document shape consumed by validation, reporting and storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedDocument {
    pub station: Station,
    pub timestamp: Option<String>,
    pub measurements: BTreeMap<Field, Measurement>,
    pub data_quality: DataQuality,
    pub metadata: DocumentMetadata,
}

impl UnifiedDocument {
    pub fn measurement_value(&self, field: Field) -> Option<f64> {
        self.measurements.get(&field).and_then(|m| m.value)
    }

    /// Storage uniqueness key derived from `station.id` and `timestamp`
    pub fn natural_key(&self) -> String {
        let mut s = String::new();
        if let Some(id) = &self.station.id {
            s.push_str(id);
        }
        s.push('|');
        if let Some(ts) = &self.timestamp {
            s.push_str(ts);
        }

        let mut hasher = Sha256::new();
        hasher.update(s.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_requires_both_coordinates() {
        assert!(GeoPoint::from_lat_lon(Some(50.5), None).is_none());
        assert!(GeoPoint::from_lat_lon(None, Some(3.0)).is_none());

        let point = GeoPoint::from_lat_lon(Some(50.575), Some(3.092)).unwrap();
        assert_eq!(point.kind, "Point");
        assert_eq!(point.coordinates, [3.092, 50.575]);
    }

    #[test]
    fn test_geo_point_json_shape() {
        let point = GeoPoint::from_lat_lon(Some(1.0), Some(2.0)).unwrap();
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value, serde_json::json!({"type": "Point", "coordinates": [2.0, 1.0]}));
    }
}
