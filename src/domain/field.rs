use serde::{Deserialize, Serialize};
use std::fmt;

/// Source network a station belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Network {
    /// Fixed-infrastructure synoptic stations
    InfoClimat,
    /// Crowd-sourced personal weather stations
    WeatherUnderground,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::InfoClimat => "InfoClimat",
            Network::WeatherUnderground => "WeatherUnderground",
        }
    }

    /// Prefix used for `metadata.source_file`
    pub fn source_prefix(&self) -> &'static str {
        match self {
            Network::InfoClimat => "infoclimat",
            Network::WeatherUnderground => "wunderground",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical measurement names shared by every unified document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Temperature,
    Humidity,
    Pressure,
    Dewpoint,
    WindSpeed,
    WindGust,
    WindDirection,
    #[serde(rename = "precipitation_1h")]
    Precipitation1h,
    #[serde(rename = "precipitation_3h")]
    Precipitation3h,
    PrecipitationRate,
    PrecipitationAccumulated,
    Visibility,
    CloudCover,
    SnowDepth,
    WeatherCode,
    UvIndex,
    SolarRadiation,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Temperature => "temperature",
            Field::Humidity => "humidity",
            Field::Pressure => "pressure",
            Field::Dewpoint => "dewpoint",
            Field::WindSpeed => "wind_speed",
            Field::WindGust => "wind_gust",
            Field::WindDirection => "wind_direction",
            Field::Precipitation1h => "precipitation_1h",
            Field::Precipitation3h => "precipitation_3h",
            Field::PrecipitationRate => "precipitation_rate",
            Field::PrecipitationAccumulated => "precipitation_accumulated",
            Field::Visibility => "visibility",
            Field::CloudCover => "cloud_cover",
            Field::SnowDepth => "snow_depth",
            Field::WeatherCode => "weather_code",
            Field::UvIndex => "uv_index",
            Field::SolarRadiation => "solar_radiation",
        }
    }

    /// Inclusive physically plausible bounds, if the field has any.
    ///
    /// `weather_code` is a categorical code table entry and
    /// `precipitation_accumulated` has no agreed ceiling, so neither is
    /// range checked.
    pub fn valid_range(&self) -> Option<(f64, f64)> {
        match self {
            Field::Temperature => Some((-50.0, 60.0)),
            Field::Humidity => Some((0.0, 100.0)),
            Field::Pressure => Some((900.0, 1100.0)),
            Field::Dewpoint => Some((-60.0, 50.0)),
            Field::WindSpeed => Some((0.0, 250.0)),
            Field::WindGust => Some((0.0, 400.0)),
            Field::WindDirection => Some((0.0, 360.0)),
            Field::Precipitation1h => Some((0.0, 300.0)),
            Field::Precipitation3h => Some((0.0, 500.0)),
            Field::PrecipitationRate => Some((0.0, 500.0)),
            Field::Visibility => Some((0.0, 100_000.0)),
            Field::CloudCover => Some((0.0, 8.0)),
            Field::SnowDepth => Some((0.0, 1000.0)),
            Field::UvIndex => Some((0.0, 15.0)),
            Field::SolarRadiation => Some((0.0, 1500.0)),
            Field::PrecipitationAccumulated | Field::WeatherCode => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
