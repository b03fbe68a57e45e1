use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Field, Location, Network};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionInfo {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    /// When the report itself was generated
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_records_processed: usize,
    pub records_transformed: usize,
    pub records_validated: usize,
    pub records_loaded: usize,
    pub records_rejected: usize,
    pub rejection_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub network: Network,
    pub station_name: Option<String>,
    pub records: usize,
    pub avg_completeness: f64,
    pub anomalies: usize,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub records: usize,
    pub stations_count: usize,
    pub avg_completeness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCompleteness {
    pub completeness: f64,
    pub filled_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalAnalysis {
    pub min_timestamp: Option<DateTime<Utc>>,
    pub max_timestamp: Option<DateTime<Utc>>,
    pub time_span_hours: f64,
    pub records_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub avg_completeness: f64,
    pub min_completeness: f64,
    pub max_completeness: f64,
    pub validation_passed: usize,
    pub validation_passed_rate: f64,
    pub anomalies_detected: usize,
    pub anomalies_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEntry {
    /// Position of the document in the analysed batch
    pub record_index: usize,
    pub station_id: Option<String>,
    pub station_name: Option<String>,
    pub timestamp: Option<String>,
    pub missing_fields: Vec<Field>,
    pub completeness_score: Option<f64>,
}

/// Batch quality report. The aggregation sections are absent when the
/// batch was empty, in which case `message` explains why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub execution_info: ExecutionInfo,
    pub summary: ReportSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_station: Option<BTreeMap<String, StationSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_network: Option<BTreeMap<String, NetworkSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_completeness: Option<BTreeMap<Field, FieldCompleteness>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_analysis: Option<TemporalAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality_scores: Option<QualityScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<Vec<AnomalyEntry>>,
    pub errors: Vec<String>,
}
