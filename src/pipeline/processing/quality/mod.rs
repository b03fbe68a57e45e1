pub mod report;

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::domain::{Field, UnifiedDocument};
use crate::pipeline::run_stats::RunStats;
use crate::timestamps::parse_iso_utc;
use crate::utils::{ratio, round_to};
pub use report::{
    AnomalyEntry, ExecutionInfo, FieldCompleteness, NetworkSummary, QualityReport, QualityScores,
    ReportSummary, StationSummary, TemporalAnalysis,
};

/// Upper bound on anomaly entries listed in one report
pub const MAX_REPORTED_ANOMALIES: usize = 100;

pub const EMPTY_BATCH_MESSAGE: &str = "No data to analyse";

/// Aggregates validated documents into a [`QualityReport`]. Inputs are
/// never mutated.
#[derive(Debug, Clone, Default)]
pub struct QualityChecker;

impl QualityChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_report(&self, documents: &[UnifiedDocument], stats: &RunStats) -> QualityReport {
        info!("Generating quality report for {} documents", documents.len());

        let execution_info = ExecutionInfo {
            start_time: stats.start_time,
            end_time: stats.end_time,
            duration_seconds: stats.duration_seconds,
            timestamp: Utc::now(),
        };

        if documents.is_empty() {
            return QualityReport {
                execution_info,
                summary: ReportSummary::default(),
                message: Some(EMPTY_BATCH_MESSAGE.to_string()),
                by_station: None,
                by_network: None,
                field_completeness: None,
                temporal_analysis: None,
                data_quality_scores: None,
                anomalies: None,
                errors: stats.errors.clone(),
            };
        }

        QualityReport {
            execution_info,
            summary: summarize(stats),
            message: None,
            by_station: Some(analyze_by_station(documents)),
            by_network: Some(analyze_by_network(documents)),
            field_completeness: Some(analyze_field_completeness(documents)),
            temporal_analysis: Some(analyze_temporal_coverage(documents)),
            data_quality_scores: Some(analyze_quality_scores(documents)),
            anomalies: Some(list_anomalies(documents)),
            errors: stats.errors.clone(),
        }
    }
}

fn summarize(stats: &RunStats) -> ReportSummary {
    ReportSummary {
        total_records_processed: stats.records_extracted,
        records_transformed: stats.records_transformed,
        records_validated: stats.records_validated,
        records_loaded: stats.records_loaded,
        records_rejected: stats.records_rejected,
        rejection_rate: ratio(stats.records_rejected, stats.records_extracted, 4),
    }
}

fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

fn analyze_by_station(documents: &[UnifiedDocument]) -> BTreeMap<String, StationSummary> {
    let mut groups: BTreeMap<&str, (Vec<f64>, StationSummary)> = BTreeMap::new();

    for doc in documents {
        let Some(station_id) = doc.station.id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };

        let (scores, summary) = groups.entry(station_id).or_insert_with(|| {
            (
                Vec::new(),
                StationSummary {
                    network: doc.station.network,
                    station_name: None,
                    records: 0,
                    avg_completeness: 0.0,
                    anomalies: 0,
                    location: doc.station.location.clone(),
                },
            )
        });

        // Latest document wins for descriptive fields
        summary.network = doc.station.network;
        summary.station_name = doc.station.name.clone();
        summary.location = doc.station.location.clone();
        summary.records += 1;
        if let Some(score) = doc.data_quality.completeness_score {
            scores.push(score);
        }
        if doc.data_quality.anomalies_detected {
            summary.anomalies += 1;
        }
    }

    groups
        .into_iter()
        .map(|(station_id, (scores, mut summary))| {
            summary.avg_completeness = round_to(mean(&scores), 3);
            (station_id.to_string(), summary)
        })
        .collect()
}

fn analyze_by_network(documents: &[UnifiedDocument]) -> BTreeMap<String, NetworkSummary> {
    let mut groups: BTreeMap<&str, (usize, BTreeSet<&str>, Vec<f64>)> = BTreeMap::new();

    for doc in documents {
        let (records, stations, scores) = groups.entry(doc.station.network.as_str()).or_default();
        *records += 1;
        if let Some(station_id) = doc.station.id.as_deref().filter(|id| !id.is_empty()) {
            stations.insert(station_id);
        }
        if let Some(score) = doc.data_quality.completeness_score {
            scores.push(score);
        }
    }

    groups
        .into_iter()
        .map(|(network, (records, stations, scores))| {
            (
                network.to_string(),
                NetworkSummary {
                    records,
                    stations_count: stations.len(),
                    avg_completeness: round_to(mean(&scores), 3),
                },
            )
        })
        .collect()
}

/// Fields exclusive to one network only count documents from that network
fn analyze_field_completeness(documents: &[UnifiedDocument]) -> BTreeMap<Field, FieldCompleteness> {
    let mut counts: BTreeMap<Field, (usize, usize)> = BTreeMap::new();

    for doc in documents {
        for (field, measurement) in &doc.measurements {
            let (filled, total) = counts.entry(*field).or_default();
            *total += 1;
            if measurement.is_filled() {
                *filled += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(field, (filled, total))| {
            (
                field,
                FieldCompleteness {
                    completeness: ratio(filled, total, 3),
                    filled_count: filled,
                    total_count: total,
                },
            )
        })
        .collect()
}

fn analyze_temporal_coverage(documents: &[UnifiedDocument]) -> TemporalAnalysis {
    let timestamps: Vec<_> = documents
        .iter()
        .filter_map(|doc| doc.timestamp.as_deref())
        .filter_map(parse_iso_utc)
        .collect();

    let (Some(min), Some(max)) = (timestamps.iter().min(), timestamps.iter().max()) else {
        return TemporalAnalysis::default();
    };

    let span_hours = (*max - *min).num_seconds() as f64 / 3600.0;
    TemporalAnalysis {
        min_timestamp: Some(*min),
        max_timestamp: Some(*max),
        time_span_hours: round_to(span_hours, 2),
        records_count: timestamps.len(),
    }
}

fn analyze_quality_scores(documents: &[UnifiedDocument]) -> QualityScores {
    let scores: Vec<f64> = documents
        .iter()
        .filter_map(|doc| doc.data_quality.completeness_score)
        .collect();
    let validation_passed = documents
        .iter()
        .filter(|doc| doc.data_quality.validation_passed == Some(true))
        .count();
    let anomalies_detected = documents
        .iter()
        .filter(|doc| doc.data_quality.anomalies_detected)
        .count();

    let (min, max) = scores
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &s| match acc {
            None => Some((s, s)),
            Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
        })
        .unwrap_or((0.0, 0.0));

    QualityScores {
        avg_completeness: round_to(mean(&scores), 3),
        min_completeness: round_to(min, 3),
        max_completeness: round_to(max, 3),
        validation_passed,
        validation_passed_rate: ratio(validation_passed, documents.len(), 3),
        anomalies_detected,
        anomalies_rate: ratio(anomalies_detected, documents.len(), 3),
    }
}

fn list_anomalies(documents: &[UnifiedDocument]) -> Vec<AnomalyEntry> {
    documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| doc.data_quality.anomalies_detected)
        .take(MAX_REPORTED_ANOMALIES)
        .map(|(index, doc)| AnomalyEntry {
            record_index: index,
            station_id: doc.station.id.clone(),
            station_name: doc.station.name.clone(),
            timestamp: doc.timestamp.clone(),
            missing_fields: doc.data_quality.missing_fields.clone(),
            completeness_score: doc.data_quality.completeness_score,
        })
        .collect()
}
