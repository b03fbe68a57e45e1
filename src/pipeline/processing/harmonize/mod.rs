pub mod coerce;

use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::constants::PIPELINE_VERSION;
use crate::domain::{
    DataQuality, DocumentMetadata, Field, GeoPoint, Location, Measurement, Network,
    RawObservation, RawRecord, Station, UnifiedDocument,
};
use crate::timestamps::normalize_timestamp;
use coerce::{parse_lenient_float, parse_lenient_int, parse_wind_direction, scalar_to_string};

/// One entry of a network's field vocabulary: raw key, canonical field, unit
pub type FieldMapping = (&'static str, Field, &'static str);

/// InfoClimat synoptic vocabulary
pub const INFOCLIMAT_FIELDS: &[FieldMapping] = &[
    ("temperature", Field::Temperature, "°C"),
    ("humidite", Field::Humidity, "%"),
    ("pression", Field::Pressure, "hPa"),
    ("point_de_rosee", Field::Dewpoint, "°C"),
    ("vent_moyen", Field::WindSpeed, "km/h"),
    ("vent_rafales", Field::WindGust, "km/h"),
    ("vent_direction", Field::WindDirection, "degrees"),
    ("pluie_1h", Field::Precipitation1h, "mm"),
    ("pluie_3h", Field::Precipitation3h, "mm"),
    ("visibilite", Field::Visibility, "m"),
    ("nebulosite", Field::CloudCover, "octas"),
    ("neige_au_sol", Field::SnowDepth, "cm"),
    ("temps_omm", Field::WeatherCode, "omm_code"),
];

/// Weather Underground personal station vocabulary
pub const WUNDERGROUND_FIELDS: &[FieldMapping] = &[
    ("Temperature", Field::Temperature, "°C"),
    ("Humidity", Field::Humidity, "%"),
    ("Pressure", Field::Pressure, "hPa"),
    ("Dew Point", Field::Dewpoint, "°C"),
    ("Speed", Field::WindSpeed, "km/h"),
    ("Gust", Field::WindGust, "km/h"),
    ("Wind", Field::WindDirection, "degrees"),
    ("Precip. Rate.", Field::PrecipitationRate, "mm/h"),
    ("Precip. Accum.", Field::PrecipitationAccumulated, "mm"),
    ("UV", Field::UvIndex, "index"),
    ("Solar", Field::SolarRadiation, "W/m²"),
];

/// Converts raw source records into [`UnifiedDocument`]s.
///
/// Harmonization never fails. Malformed scalars degrade to `None` and the
/// document is still produced.
#[derive(Debug, Clone)]
pub struct DataHarmonizer {
    pipeline_version: String,
}

impl DataHarmonizer {
    pub fn new() -> Self {
        Self::with_version(PIPELINE_VERSION)
    }

    pub fn with_version(pipeline_version: impl Into<String>) -> Self {
        Self {
            pipeline_version: pipeline_version.into(),
        }
    }

    /// Harmonize a tagged record. `reference_date` completes bare
    /// times of day in the personal station feed.
    pub fn harmonize(&self, record: &RawRecord, reference_date: Option<NaiveDate>) -> UnifiedDocument {
        match record {
            RawRecord::InfoClimat(obs) => self.harmonize_infoclimat(obs),
            RawRecord::WeatherUnderground(obs) => self.harmonize_wunderground(obs, reference_date),
        }
    }

    /// Synoptic timestamps pass through verbatim.
    pub fn harmonize_infoclimat(&self, record: &RawObservation) -> UnifiedDocument {
        let station_type = record
            .station_type
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        let station = self.build_station(record, Network::InfoClimat, station_type, false);

        UnifiedDocument {
            station,
            timestamp: scalar_to_string(&record.timestamp),
            measurements: build_measurements(record, INFOCLIMAT_FIELDS),
            data_quality: DataQuality::default(),
            metadata: self.build_metadata(record, Network::InfoClimat),
        }
    }

    pub fn harmonize_wunderground(
        &self,
        record: &RawObservation,
        reference_date: Option<NaiveDate>,
    ) -> UnifiedDocument {
        let station = self.build_station(
            record,
            Network::WeatherUnderground,
            "amateur".to_string(),
            true,
        );
        let timestamp = scalar_to_string(&record.timestamp)
            .and_then(|raw| normalize_timestamp(&raw, reference_date));

        UnifiedDocument {
            station,
            timestamp,
            measurements: build_measurements(record, WUNDERGROUND_FIELDS),
            data_quality: DataQuality::default(),
            metadata: self.build_metadata(record, Network::WeatherUnderground),
        }
    }

    fn build_station(
        &self,
        record: &RawObservation,
        network: Network,
        station_type: String,
        with_equipment: bool,
    ) -> Station {
        let latitude = parse_lenient_float(&record.latitude);
        let longitude = parse_lenient_float(&record.longitude);

        Station {
            id: record.station_id.clone(),
            name: record.station_name.clone(),
            network,
            station_type,
            location: Location {
                latitude,
                longitude,
                elevation: parse_lenient_int(&record.elevation),
                city: record.city.clone(),
                country: record.country.clone(),
                region: record.region.clone(),
            },
            location_geo: GeoPoint::from_lat_lon(latitude, longitude),
            hardware: record.hardware.clone().filter(|_| with_equipment),
            software: record.software.clone().filter(|_| with_equipment),
        }
    }

    fn build_metadata(&self, record: &RawObservation, network: Network) -> DocumentMetadata {
        let station_id = record.station_id.as_deref().unwrap_or("unknown");
        DocumentMetadata {
            source_file: format!("{}/{}", network.source_prefix(), station_id),
            ingestion_timestamp: Utc::now()
                .naive_utc()
                .format("%Y-%m-%dT%H:%M:%S%.f")
                .to_string(),
            pipeline_version: self.pipeline_version.clone(),
        }
    }
}

impl Default for DataHarmonizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Only the fields of the record's own network are emitted
fn build_measurements(
    record: &RawObservation,
    mappings: &[FieldMapping],
) -> BTreeMap<Field, Measurement> {
    mappings
        .iter()
        .map(|(raw_key, field, unit)| {
            let raw = record.measurement(raw_key);
            let value = match field {
                Field::WindDirection => parse_wind_direction(raw),
                _ => parse_lenient_float(raw),
            };
            (*field, Measurement::new(value, *unit))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn infoclimat_record() -> RawObservation {
        serde_json::from_value(json!({
            "station_id": "07015",
            "station_name": "Lille-Lesquin",
            "station_type": "synop",
            "latitude": 50.575,
            "longitude": 3.092,
            "elevation": 47,
            "city": "Lille",
            "country": "France",
            "region": "Hauts-de-France",
            "timestamp": "2026-02-07 12:00:00",
            "measurements": {
                "temperature": "7.6",
                "humidite": 81,
                "pression": 1016.2,
                "point_de_rosee": 4.5,
                "vent_moyen": 18,
                "vent_rafales": 32,
                "vent_direction": 240,
                "pluie_1h": 0,
                "pluie_3h": "N/A",
                "visibilite": 20000,
                "nebulosite": "",
                "neige_au_sol": null,
                "temps_omm": "abc"
            }
        }))
        .unwrap()
    }

    fn wunderground_record() -> RawObservation {
        serde_json::from_value(json!({
            "station_id": "ILAMAD25",
            "station_name": "La Madeleine",
            "latitude": "50.659",
            "longitude": "3.07",
            "elevation": "23.8",
            "city": "La Madeleine",
            "country": "France",
            "region": "Hauts-de-France",
            "hardware": "other",
            "software": "EasyWeatherPro_V5.1.6",
            "timestamp": "02/07/26 1:05 PM",
            "measurements": {
                "Temperature": 8.1,
                "Dew Point": 5.0,
                "Humidity": 80,
                "Speed": 10.5,
                "Gust": 14.2,
                "Wind": "WSW",
                "Pressure": 1015.9,
                "Precip. Rate.": 0,
                "Precip. Accum.": 1.2,
                "UV": 1,
                "Solar": 85.3
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_harmonize_infoclimat_basic() {
        let harmonizer = DataHarmonizer::new();
        let doc = harmonizer.harmonize_infoclimat(&infoclimat_record());

        assert_eq!(doc.station.id.as_deref(), Some("07015"));
        assert_eq!(doc.station.network, Network::InfoClimat);
        assert_eq!(doc.station.station_type, "synop");
        assert_eq!(doc.station.location.elevation, Some(47));
        assert_eq!(doc.timestamp.as_deref(), Some("2026-02-07 12:00:00"));
        assert_eq!(doc.metadata.source_file, "infoclimat/07015");
        assert_eq!(doc.metadata.pipeline_version, PIPELINE_VERSION);
        assert!(doc.station.hardware.is_none());
    }

    #[test]
    fn test_harmonize_infoclimat_measurements() {
        let doc = DataHarmonizer::new().harmonize_infoclimat(&infoclimat_record());

        assert_eq!(doc.measurements.len(), INFOCLIMAT_FIELDS.len());
        assert_eq!(doc.measurement_value(Field::Temperature), Some(7.6));
        assert_eq!(doc.measurement_value(Field::Humidity), Some(81.0));
        assert_eq!(doc.measurements[&Field::Pressure].unit, "hPa");
        assert_eq!(doc.measurement_value(Field::Precipitation1h), Some(0.0));
        assert_eq!(doc.measurement_value(Field::Precipitation3h), None);
        assert_eq!(doc.measurement_value(Field::CloudCover), None);
        assert_eq!(doc.measurement_value(Field::SnowDepth), None);
        assert_eq!(doc.measurements[&Field::WeatherCode].unit, "omm_code");
        assert_eq!(doc.measurement_value(Field::WeatherCode), None);
        assert!(!doc.measurements.contains_key(&Field::UvIndex));
    }

    #[test]
    fn test_quality_section_starts_empty() {
        let doc = DataHarmonizer::new().harmonize_infoclimat(&infoclimat_record());
        assert_eq!(doc.data_quality.completeness_score, None);
        assert_eq!(doc.data_quality.validation_passed, None);
        assert!(doc.data_quality.missing_fields.is_empty());
        assert!(!doc.data_quality.anomalies_detected);
    }

    #[test]
    fn test_harmonize_wunderground() {
        let doc = DataHarmonizer::new().harmonize_wunderground(&wunderground_record(), None);

        assert_eq!(doc.station.network, Network::WeatherUnderground);
        assert_eq!(doc.station.station_type, "amateur");
        assert_eq!(doc.station.hardware.as_deref(), Some("other"));
        assert_eq!(doc.station.location.latitude, Some(50.659));
        assert_eq!(doc.station.location.elevation, Some(23));
        assert_eq!(doc.timestamp.as_deref(), Some("2026-02-07T13:05:00"));
        assert_eq!(doc.measurements.len(), WUNDERGROUND_FIELDS.len());
        assert_eq!(doc.measurement_value(Field::Dewpoint), Some(5.0));
        assert_eq!(doc.measurement_value(Field::WindDirection), Some(247.5));
        assert_eq!(doc.measurements[&Field::WindDirection].unit, "degrees");
        assert_eq!(doc.measurements[&Field::SolarRadiation].unit, "W/m²");
        assert!(!doc.measurements.contains_key(&Field::CloudCover));
    }

    #[test]
    fn test_unknown_wind_token_is_null() {
        let mut record = wunderground_record();
        record.measurements.insert("Wind".to_string(), json!("Variable"));
        let doc = DataHarmonizer::new().harmonize_wunderground(&record, None);
        assert_eq!(doc.measurement_value(Field::WindDirection), None);
    }

    #[test]
    fn test_wunderground_unparseable_timestamp_is_none() {
        let mut record = wunderground_record();
        record.timestamp = json!("sometime");
        let doc = DataHarmonizer::new().harmonize_wunderground(&record, None);
        assert_eq!(doc.timestamp, None);
    }

    #[test]
    fn test_location_geo_follows_coordinates() {
        let harmonizer = DataHarmonizer::new();

        let doc = harmonizer.harmonize_infoclimat(&infoclimat_record());
        let geo = doc.station.location_geo.clone().unwrap();
        assert_eq!(geo.coordinates, [3.092, 50.575]);

        let mut record = infoclimat_record();
        record.longitude = json!("not-a-number");
        let doc = harmonizer.harmonize_infoclimat(&record);
        assert!(doc.station.location_geo.is_none());
        assert_eq!(doc.station.location.latitude, Some(50.575));
        assert_eq!(doc.station.location.longitude, None);
    }

    #[test]
    fn test_harmonization_is_repeatable() {
        let harmonizer = DataHarmonizer::new();
        let record = RawRecord::WeatherUnderground(wunderground_record());

        let first = harmonizer.harmonize(&record, None);
        let second = harmonizer.harmonize(&record, None);

        assert_eq!(first.station, second.station);
        assert_eq!(first.timestamp, second.timestamp);
        assert_eq!(first.measurements, second.measurements);
    }

    #[test]
    fn test_missing_measurement_block_yields_all_null() {
        let record = RawObservation {
            station_id: Some("00052".to_string()),
            ..Default::default()
        };
        let doc = DataHarmonizer::new().harmonize_infoclimat(&record);
        assert_eq!(doc.measurements.len(), INFOCLIMAT_FIELDS.len());
        assert!(doc.measurements.values().all(|m| m.value.is_none()));
        assert!(doc.station.location_geo.is_none());
        assert_eq!(doc.station.station_type, "unknown");
    }
}
