use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{DataQuality, Field, Location, Measurement, UnifiedDocument};
use crate::timestamps::parse_iso_utc;
use crate::utils::round_to;

/// Warnings fire for timestamps older than this many days
const MAX_TIMESTAMP_AGE_DAYS: i64 = 365;

const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);
const ELEVATION_RANGE_M: (i64, i64) = (-500, 9000);

/// Verdict for a single document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Checks harmonized documents and fills in their `data_quality` section.
///
/// Errors are structural problems that exclude the document. Warnings are
/// quality concerns; in strict mode they are promoted to errors.
#[derive(Debug, Clone, Default)]
pub struct DataValidator {
    strict_mode: bool,
}

impl DataValidator {
    pub fn new(strict_mode: bool) -> Self {
        Self { strict_mode }
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub fn validate(&self, document: &mut UnifiedDocument) -> ValidationResult {
        self.validate_at(document, Utc::now())
    }

    /// Validate against an explicit clock
    pub fn validate_at(&self, document: &mut UnifiedDocument, now: DateTime<Utc>) -> ValidationResult {
        let mut errors = validate_required_fields(document);

        let (timestamp_errors, mut warnings) =
            validate_timestamp(document.timestamp.as_deref(), now);
        errors.extend(timestamp_errors);

        errors.extend(validate_location(&document.station.location));

        warnings.extend(validate_measurements(document));

        // Annotation records the un-promoted warnings
        document.data_quality = DataQuality {
            completeness_score: Some(completeness_score(document.measurements.values())),
            missing_fields: missing_fields(&document.measurements),
            validation_passed: Some(errors.is_empty()),
            anomalies_detected: !warnings.is_empty(),
        };

        if self.strict_mode && !warnings.is_empty() {
            errors.append(&mut warnings);
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

fn validate_required_fields(document: &UnifiedDocument) -> Vec<String> {
    let station = &document.station;
    let checks = [
        ("station.id", is_blank(station.id.as_deref())),
        ("station.name", is_blank(station.name.as_deref())),
        ("station.location.latitude", station.location.latitude.is_none()),
        ("station.location.longitude", station.location.longitude.is_none()),
        ("timestamp", is_blank(document.timestamp.as_deref())),
    ];

    checks
        .iter()
        .filter(|(_, missing)| *missing)
        .map(|(name, _)| format!("Missing required field: {}", name))
        .collect()
}

/// Returns `(errors, warnings)`. A missing timestamp is reported by the
/// required-field check and ignored here.
fn validate_timestamp(timestamp: Option<&str>, now: DateTime<Utc>) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let raw = match timestamp {
        Some(raw) if !raw.is_empty() => raw,
        _ => return (errors, warnings),
    };

    match parse_iso_utc(raw) {
        Some(parsed) => {
            if parsed > now {
                errors.push(format!("Timestamp in the future: {}", raw));
            }
            if parsed < now - Duration::days(MAX_TIMESTAMP_AGE_DAYS) {
                warnings.push(format!("Timestamp older than one year: {}", raw));
            }
        }
        None => errors.push(format!("Invalid timestamp: {} (not ISO 8601)", raw)),
    }

    (errors, warnings)
}

fn validate_location(location: &Location) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(lat) = location.latitude {
        if !(LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&lat) {
            errors.push(format!(
                "Latitude out of bounds: {} (must be between {} and {})",
                lat, LATITUDE_RANGE.0, LATITUDE_RANGE.1
            ));
        }
    }

    if let Some(lon) = location.longitude {
        if !(LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&lon) {
            errors.push(format!(
                "Longitude out of bounds: {} (must be between {} and {})",
                lon, LONGITUDE_RANGE.0, LONGITUDE_RANGE.1
            ));
        }
    }

    if let Some(elevation) = location.elevation {
        if !(ELEVATION_RANGE_M.0..=ELEVATION_RANGE_M.1).contains(&elevation) {
            errors.push(format!("Implausible elevation: {}m", elevation));
        }
    }

    errors
}

/// Range and cross-field consistency checks, warnings only
fn validate_measurements(document: &UnifiedDocument) -> Vec<String> {
    let mut warnings = Vec::new();

    for (field, measurement) in &document.measurements {
        let (Some(value), Some((min, max))) = (measurement.value, field.valid_range()) else {
            continue;
        };
        if !(min..=max).contains(&value) {
            warnings.push(format!(
                "{} outside normal range: {} (expected between {} and {})",
                field, value, min, max
            ));
        }
    }

    // Dew point cannot exceed air temperature
    if let (Some(temperature), Some(dewpoint)) = (
        document.measurement_value(Field::Temperature),
        document.measurement_value(Field::Dewpoint),
    ) {
        if dewpoint > temperature {
            warnings.push(format!(
                "Dew point ({}°C) above temperature ({}°C)",
                dewpoint, temperature
            ));
        }
    }

    if let (Some(speed), Some(gust)) = (
        document.measurement_value(Field::WindSpeed),
        document.measurement_value(Field::WindGust),
    ) {
        if gust < speed {
            warnings.push(format!(
                "Wind gust ({} km/h) below mean wind speed ({} km/h)",
                gust, speed
            ));
        }
    }

    warnings
}

/// Share of measurement slots carrying a value, 3 decimals. Zero slots
/// score `0.0`.
pub fn completeness_score<'a>(measurements: impl Iterator<Item = &'a Measurement>) -> f64 {
    let (total, filled) = measurements.fold((0usize, 0usize), |(total, filled), m| {
        (total + 1, filled + usize::from(m.is_filled()))
    });

    if total == 0 {
        return 0.0;
    }
    round_to(filled as f64 / total as f64, 3)
}

pub fn missing_fields(measurements: &BTreeMap<Field, Measurement>) -> Vec<Field> {
    measurements
        .iter()
        .filter(|(_, m)| !m.is_filled())
        .map(|(field, _)| *field)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentMetadata, GeoPoint, Network, RawObservation, Station};
    use crate::pipeline::processing::harmonize::DataHarmonizer;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 8, 6, 0, 0).unwrap()
    }

    fn valid_document() -> UnifiedDocument {
        let mut measurements = BTreeMap::new();
        measurements.insert(Field::Temperature, Measurement::new(Some(15.0), "°C"));
        measurements.insert(Field::Humidity, Measurement::new(Some(70.0), "%"));
        measurements.insert(Field::Pressure, Measurement::new(Some(1013.0), "hPa"));
        measurements.insert(Field::Dewpoint, Measurement::new(Some(9.0), "°C"));
        measurements.insert(Field::WindSpeed, Measurement::new(Some(12.0), "km/h"));
        measurements.insert(Field::WindGust, Measurement::new(Some(25.0), "km/h"));

        UnifiedDocument {
            station: Station {
                id: Some("07015".to_string()),
                name: Some("Lille-Lesquin".to_string()),
                network: Network::InfoClimat,
                station_type: "synop".to_string(),
                location: Location {
                    latitude: Some(50.575),
                    longitude: Some(3.092),
                    elevation: Some(47),
                    city: Some("Lille".to_string()),
                    country: Some("France".to_string()),
                    region: None,
                },
                location_geo: GeoPoint::from_lat_lon(Some(50.575), Some(3.092)),
                hardware: None,
                software: None,
            },
            timestamp: Some("2026-02-07T12:00:00".to_string()),
            measurements,
            data_quality: DataQuality::default(),
            metadata: DocumentMetadata {
                source_file: "infoclimat/07015".to_string(),
                ingestion_timestamp: "2026-02-08T05:00:00".to_string(),
                pipeline_version: "1.0.0".to_string(),
            },
        }
    }

    fn set_value(doc: &mut UnifiedDocument, field: Field, value: Option<f64>) {
        doc.measurements.insert(field, Measurement::new(value, ""));
    }

    #[test]
    fn test_valid_document_passes() {
        let mut doc = valid_document();
        let result = DataValidator::new(false).validate_at(&mut doc, now());

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(doc.data_quality.completeness_score, Some(1.0));
        assert_eq!(doc.data_quality.validation_passed, Some(true));
        assert!(!doc.data_quality.anomalies_detected);
    }

    #[test]
    fn test_missing_required_fields_are_errors() {
        let mut doc = valid_document();
        doc.station.id = None;
        doc.station.name = Some(String::new());
        doc.timestamp = None;

        let result = DataValidator::new(false).validate_at(&mut doc, now());
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("station.id")));
        assert!(result.errors.iter().any(|e| e.contains("station.name")));
        assert!(result.errors.iter().any(|e| e.contains("timestamp")));
        assert_eq!(result.errors.len(), 3);
        assert_eq!(doc.data_quality.validation_passed, Some(false));
    }

    #[test]
    fn test_missing_coordinates_are_errors() {
        let mut doc = valid_document();
        doc.station.location.latitude = None;
        doc.station.location.longitude = None;

        let result = DataValidator::new(false).validate_at(&mut doc, now());
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![
                "Missing required field: station.location.latitude".to_string(),
                "Missing required field: station.location.longitude".to_string(),
            ]
        );
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let validator = DataValidator::new(true);

        for (lat, lon, elevation) in [(90.0, -180.0, -500), (-90.0, 180.0, 9000)] {
            let mut doc = valid_document();
            doc.station.location.latitude = Some(lat);
            doc.station.location.longitude = Some(lon);
            doc.station.location.elevation = Some(elevation);
            set_value(&mut doc, Field::Temperature, Some(60.0));

            let result = validator.validate_at(&mut doc, now());
            assert!(result.is_valid, "{lat}/{lon}/{elevation}m: {:?}", result.errors);
            assert!(result.warnings.is_empty());
            assert!(!doc.data_quality.anomalies_detected);
        }

        let mut doc = valid_document();
        set_value(&mut doc, Field::Temperature, Some(-50.0));
        set_value(&mut doc, Field::Dewpoint, Some(-60.0));
        set_value(&mut doc, Field::Humidity, Some(100.0));
        set_value(&mut doc, Field::WindDirection, Some(360.0));
        assert!(validator.validate_at(&mut doc, now()).is_valid);
    }

    #[test]
    fn test_missing_elevation_skips_elevation_check() {
        let mut doc = valid_document();
        doc.station.location.elevation = None;

        let result = DataValidator::new(false).validate_at(&mut doc, now());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_invalid_coordinates_are_errors() {
        let mut doc = valid_document();
        doc.station.location.latitude = Some(95.0);
        doc.station.location.longitude = Some(-181.0);
        doc.station.location.elevation = Some(9500);

        let result = DataValidator::new(false).validate_at(&mut doc, now());
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.starts_with("Latitude out of bounds: 95")));
        assert!(result.errors.iter().any(|e| e.starts_with("Longitude out of bounds: -181")));
        assert!(result.errors.iter().any(|e| e.contains("9500m")));
    }

    #[test]
    fn test_timestamp_checks() {
        let validator = DataValidator::new(false);

        let mut doc = valid_document();
        doc.timestamp = Some("2026-03-01T00:00:00".to_string());
        let result = validator.validate_at(&mut doc, now());
        assert!(result.errors.iter().any(|e| e.starts_with("Timestamp in the future")));

        let mut doc = valid_document();
        doc.timestamp = Some("2024-01-01T00:00:00Z".to_string());
        let result = validator.validate_at(&mut doc, now());
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.starts_with("Timestamp older than one year")));

        let mut doc = valid_document();
        doc.timestamp = Some("07/02/2026 noon".to_string());
        let result = validator.validate_at(&mut doc, now());
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.starts_with("Invalid timestamp")));
    }

    #[test]
    fn test_out_of_range_temperature_is_warning_unless_strict() {
        let mut doc = valid_document();
        set_value(&mut doc, Field::Temperature, Some(75.0));
        set_value(&mut doc, Field::Dewpoint, None);

        let result = DataValidator::new(false).validate_at(&mut doc, now());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("temperature outside normal range: 75"));
        assert!(doc.data_quality.anomalies_detected);

        let mut doc = valid_document();
        set_value(&mut doc, Field::Temperature, Some(75.0));
        set_value(&mut doc, Field::Dewpoint, None);
        let result = DataValidator::new(true).validate_at(&mut doc, now());
        assert!(!result.is_valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_strict_mode_promotes_exactly_the_warnings() {
        let mut lenient_doc = valid_document();
        set_value(&mut lenient_doc, Field::Humidity, Some(120.0));
        set_value(&mut lenient_doc, Field::WindGust, Some(5.0));
        let lenient = DataValidator::new(false).validate_at(&mut lenient_doc, now());
        assert!(lenient.errors.is_empty());

        let mut strict_doc = lenient_doc.clone();
        let strict = DataValidator::new(true).validate_at(&mut strict_doc, now());
        assert!(!strict.is_valid);
        assert_eq!(strict.errors, lenient.warnings);
        assert!(strict.warnings.is_empty());

        // Annotation reflects the pre-promotion verdict
        assert_eq!(strict_doc.data_quality.validation_passed, Some(true));
        assert!(strict_doc.data_quality.anomalies_detected);
    }

    #[test]
    fn test_dewpoint_above_temperature() {
        let mut doc = valid_document();
        set_value(&mut doc, Field::Temperature, Some(15.0));
        set_value(&mut doc, Field::Dewpoint, Some(20.0));

        let result = DataValidator::new(false).validate_at(&mut doc, now());
        let warning = result
            .warnings
            .iter()
            .find(|w| w.starts_with("Dew point"))
            .expect("dew point warning");
        assert!(warning.contains("20"));
        assert!(warning.contains("15"));
    }

    #[test]
    fn test_gust_below_mean_speed() {
        let mut doc = valid_document();
        set_value(&mut doc, Field::WindSpeed, Some(30.0));
        set_value(&mut doc, Field::WindGust, Some(20.0));

        let result = DataValidator::new(false).validate_at(&mut doc, now());
        assert!(result.warnings.iter().any(|w| w.starts_with("Wind gust (20 km/h) below")));
    }

    #[test]
    fn test_cross_field_skipped_when_value_missing() {
        let mut doc = valid_document();
        set_value(&mut doc, Field::Temperature, None);
        set_value(&mut doc, Field::Dewpoint, Some(20.0));

        let result = DataValidator::new(false).validate_at(&mut doc, now());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_completeness_and_missing_fields() {
        let mut doc = valid_document();
        set_value(&mut doc, Field::Pressure, None);
        set_value(&mut doc, Field::Visibility, None);

        DataValidator::new(false).validate_at(&mut doc, now());
        // 5 of 7 slots filled
        assert_eq!(doc.data_quality.completeness_score, Some(0.714));
        assert_eq!(
            doc.data_quality.missing_fields,
            vec![Field::Pressure, Field::Visibility]
        );
    }

    #[test]
    fn test_all_null_and_empty_measurements() {
        let mut doc = valid_document();
        for m in doc.measurements.values_mut() {
            m.value = None;
        }
        let result = DataValidator::new(false).validate_at(&mut doc, now());
        assert!(result.is_valid);
        assert_eq!(doc.data_quality.completeness_score, Some(0.0));
        assert_eq!(doc.data_quality.missing_fields.len(), 6);

        let mut doc = valid_document();
        doc.measurements.clear();
        let result = DataValidator::new(false).validate_at(&mut doc, now());
        assert_eq!(result.is_valid, result.errors.is_empty());
        assert_eq!(doc.data_quality.completeness_score, Some(0.0));
    }

    #[test]
    fn test_full_wunderground_record_scores_one() {
        let raw: RawObservation = serde_json::from_value(json!({
            "station_id": "ILAMAD25",
            "station_name": "La Madeleine",
            "latitude": 50.659,
            "longitude": 3.07,
            "elevation": 23,
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
        .unwrap();
        let mut doc = DataHarmonizer::new().harmonize_wunderground(&raw, None);

        let result = DataValidator::new(true).validate_at(&mut doc, now());
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(doc.data_quality.completeness_score, Some(1.0));
        assert!(doc.data_quality.missing_fields.is_empty());
        assert_eq!(doc.measurement_value(Field::WindDirection), Some(247.5));
    }
}
