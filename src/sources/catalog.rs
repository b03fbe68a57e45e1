use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::Network;

/// Static metadata for one station, as listed in the catalog
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StationMeta {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub station_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<i64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub hardware: Option<String>,
    pub software: Option<String>,
}

impl StationMeta {
    /// Placeholder for stations missing from the catalog
    pub fn unknown() -> Self {
        Self {
            name: Some("Unknown".to_string()),
            station_type: Some("unknown".to_string()),
            ..Default::default()
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn builtin(
        name: &str,
        station_type: &str,
        latitude: f64,
        longitude: f64,
        elevation: i64,
        city: &str,
        country: &str,
        region: &str,
    ) -> Self {
        Self {
            name: Some(name.to_string()),
            station_type: Some(station_type.to_string()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            elevation: Some(elevation),
            city: Some(city.to_string()),
            country: Some(country.to_string()),
            region: Some(region.to_string()),
            hardware: None,
            software: None,
        }
    }

    fn with_equipment(mut self, hardware: &str, software: &str) -> Self {
        self.hardware = Some(hardware.to_string());
        self.software = Some(software.to_string());
        self
    }
}

/// Per-network station metadata keyed by station id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCatalog {
    #[serde(default)]
    pub infoclimat: BTreeMap<String, StationMeta>,
    #[serde(default)]
    pub wunderground: BTreeMap<String, StationMeta>,
}

impl StationCatalog {
    pub fn empty() -> Self {
        Self {
            infoclimat: BTreeMap::new(),
            wunderground: BTreeMap::new(),
        }
    }

    pub fn stations(&self, network: Network) -> &BTreeMap<String, StationMeta> {
        match network {
            Network::InfoClimat => &self.infoclimat,
            Network::WeatherUnderground => &self.wunderground,
        }
    }

    pub fn get(&self, network: Network, station_id: &str) -> Option<&StationMeta> {
        self.stations(network).get(station_id)
    }

    /// Entries from `overrides` replace or extend this catalog
    pub fn merged(mut self, overrides: StationCatalog) -> Self {
        self.infoclimat.extend(overrides.infoclimat);
        self.wunderground.extend(overrides.wunderground);
        self
    }
}

impl Default for StationCatalog {
    fn default() -> Self {
        let hdf = "Hauts-de-France";
        let mut infoclimat = BTreeMap::new();
        infoclimat.insert(
            "07015".to_string(),
            StationMeta::builtin("Lille-Lesquin", "synop", 50.575, 3.092, 47, "Lille", "France", hdf),
        );
        infoclimat.insert(
            "00052".to_string(),
            StationMeta::builtin("Armentières", "static", 50.689, 2.877, 16, "Armentières", "France", hdf),
        );
        infoclimat.insert(
            "000R5".to_string(),
            StationMeta::builtin("Bergues", "static", 50.968, 2.441, 17, "Bergues", "France", hdf),
        );
        infoclimat.insert(
            "STATIC0010".to_string(),
            StationMeta::builtin("Hazebrouck", "static", 50.734, 2.545, 31, "Hazebrouck", "France", hdf),
        );

        let mut wunderground = BTreeMap::new();
        wunderground.insert(
            "IICHTE19".to_string(),
            StationMeta::builtin("WeerstationBS", "amateur", 51.092, 2.999, 15, "Ichtegem", "Belgium", "West-Vlaanderen")
                .with_equipment("other", "EasyWeatherV1.6.6"),
        );
        wunderground.insert(
            "ILAMAD25".to_string(),
            StationMeta::builtin("La Madeleine", "amateur", 50.659, 3.07, 23, "La Madeleine", "France", hdf)
                .with_equipment("other", "EasyWeatherPro_V5.1.6"),
        );

        Self {
            infoclimat,
            wunderground,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = StationCatalog::default();
        assert_eq!(catalog.infoclimat.len(), 4);
        assert_eq!(catalog.wunderground.len(), 2);

        let lille = catalog.get(Network::InfoClimat, "07015").unwrap();
        assert_eq!(lille.name.as_deref(), Some("Lille-Lesquin"));
        assert_eq!(lille.elevation, Some(47));

        let madeleine = catalog.get(Network::WeatherUnderground, "ILAMAD25").unwrap();
        assert_eq!(madeleine.software.as_deref(), Some("EasyWeatherPro_V5.1.6"));
        assert!(catalog.get(Network::InfoClimat, "ILAMAD25").is_none());
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let overrides: StationCatalog = toml::from_str(
            r#"
            [infoclimat.07015]
            name = "Lille Airport"
            type = "synop"
            latitude = 50.57
            longitude = 3.09

            [wunderground.IROUBA3]
            name = "Roubaix"
            "#,
        )
        .unwrap();

        let catalog = StationCatalog::default().merged(overrides);
        assert_eq!(
            catalog.get(Network::InfoClimat, "07015").unwrap().name.as_deref(),
            Some("Lille Airport")
        );
        assert_eq!(catalog.infoclimat.len(), 4);
        assert_eq!(catalog.wunderground.len(), 3);
    }
}
