use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::app::ports::{BlobStorePort, DocumentStorePort, RawSourcePort};
use crate::domain::{Network, RawRecord, UnifiedDocument};
use crate::metrics::{HarmonizeMetrics, LoadMetrics, RunMetrics, ValidateMetrics};
use crate::pipeline::processing::harmonize::DataHarmonizer;
use crate::pipeline::processing::quality::{QualityChecker, QualityReport};
use crate::pipeline::processing::validate::DataValidator;
use crate::pipeline::run_stats::{RunStats, RunStatus};
use crate::storage::{processed_key, report_key};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Day being processed; also completes bare times of day
    pub target_date: NaiveDate,
    pub dry_run: bool,
    pub strict_mode: bool,
    pub pipeline_version: String,
    pub status_path: PathBuf,
}

/// Contents of the status file written at the end of every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusFile {
    pub status: RunStatus,
    pub dry_run: bool,
    pub records_extracted: usize,
    pub records_validated: usize,
    pub processed_path: Option<String>,
    pub records_loaded: usize,
    pub records_loaded_simulated: usize,
    pub duration_seconds: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub stats: RunStats,
    pub report: QualityReport,
    pub report_path: Option<String>,
}

impl PipelineOutcome {
    /// The process should exit non-zero when any error was recorded
    pub fn has_errors(&self) -> bool {
        !self.stats.errors.is_empty()
    }
}

/// Extract, harmonize, validate, persist and report one batch
pub struct WeatherPipeline {
    sources: Vec<Box<dyn RawSourcePort>>,
    document_store: Arc<dyn DocumentStorePort>,
    blob_store: Arc<dyn BlobStorePort>,
    harmonizer: DataHarmonizer,
    validator: DataValidator,
    quality_checker: QualityChecker,
    options: PipelineOptions,
}

impl WeatherPipeline {
    pub fn new(
        sources: Vec<Box<dyn RawSourcePort>>,
        document_store: Arc<dyn DocumentStorePort>,
        blob_store: Arc<dyn BlobStorePort>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            sources,
            document_store,
            blob_store,
            harmonizer: DataHarmonizer::with_version(options.pipeline_version.clone()),
            validator: DataValidator::new(options.strict_mode),
            quality_checker: QualityChecker::new(),
            options,
        }
    }

    pub async fn run(&self) -> PipelineOutcome {
        let started = Instant::now();
        let mut stats = RunStats::start();
        let mut status = RunStatus::Success;

        info!(
            target_date = %self.options.target_date,
            dry_run = self.options.dry_run,
            strict_mode = self.options.strict_mode,
            "Starting weather pipeline"
        );
        if self.options.dry_run {
            warn!("Dry-run mode: no documents will be written to the store");
        }

        let raw = self
            .extract(&mut stats)
            .instrument(info_span!("extract"))
            .await;

        let documents = info_span!("harmonize").in_scope(|| self.harmonize(&raw, &mut stats));

        let valid = info_span!("validate").in_scope(|| self.validate(documents, &mut stats));

        if let Err(e) = self
            .save_snapshot(&valid, &mut stats)
            .instrument(info_span!("snapshot"))
            .await
        {
            error!("Saving processed snapshot failed: {}", e);
            stats.errors.push(format!("snapshot: {}", e));
            status = RunStatus::Failed;
        }

        if let Err(e) = self
            .load(&valid, &mut stats)
            .instrument(info_span!("load"))
            .await
        {
            error!("Loading documents failed: {}", e);
            LoadMetrics::record_error();
            stats.errors.push(format!("load: {}", e));
            status = RunStatus::Failed;
        }

        stats.finish(status);
        let report = self.quality_checker.generate_report(&valid, &stats);
        let report_path = match self.save_report(&report).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Saving quality report failed: {}", e);
                stats.errors.push(format!("report: {}", e));
                stats.finish(RunStatus::Failed);
                None
            }
        };

        if let Err(e) = self.write_status_file(&stats).await {
            warn!("Could not write status file: {}", e);
        }

        let duration = started.elapsed().as_secs_f64();
        RunMetrics::record_run(stats.status == RunStatus::Success, duration);
        RunMetrics::record_rejection_rate(report.summary.rejection_rate);
        log_run_summary(&stats);

        PipelineOutcome {
            stats,
            report,
            report_path,
        }
    }

    async fn extract(&self, stats: &mut RunStats) -> Vec<RawRecord> {
        let mut records = Vec::new();

        for source in &self.sources {
            let name = source.source_name();
            match source.extract().await {
                Ok(batch) => {
                    info!("Extracted {} records from {}", batch.len(), name);
                    if let Some(first) = batch.first() {
                        HarmonizeMetrics::record_extracted(first.network().as_str(), batch.len());
                    }
                    records.extend(batch);
                }
                Err(e) => {
                    error!("Extraction from {} failed: {}", name, e);
                    stats.errors.push(format!("{}: {}", name, e));
                }
            }
        }

        stats.records_extracted = records.len();
        records
    }

    fn harmonize(&self, raw: &[RawRecord], stats: &mut RunStats) -> Vec<UnifiedDocument> {
        let started = Instant::now();
        let reference_date = Some(self.options.target_date);

        let documents: Vec<UnifiedDocument> = raw
            .iter()
            .map(|record| self.harmonizer.harmonize(record, reference_date))
            .collect();

        let elapsed = started.elapsed().as_secs_f64();
        for network in [Network::InfoClimat, Network::WeatherUnderground] {
            let count = documents
                .iter()
                .filter(|doc| doc.station.network == network)
                .count();
            if count > 0 {
                HarmonizeMetrics::record_batch(network.as_str(), count, elapsed);
            }
        }

        stats.records_transformed = documents.len();
        info!("Harmonized {} records", documents.len());
        documents
    }

    fn validate(&self, documents: Vec<UnifiedDocument>, stats: &mut RunStats) -> Vec<UnifiedDocument> {
        let mut valid = Vec::with_capacity(documents.len());

        for mut document in documents {
            let result = self.validator.validate(&mut document);
            let quality = &document.data_quality;

            if let Some(score) = quality.completeness_score {
                ValidateMetrics::record_completeness(score);
            }
            ValidateMetrics::record_outcome(result.is_valid, result.warnings.len());
            if self.validator.strict_mode()
                && quality.anomalies_detected
                && quality.validation_passed == Some(true)
            {
                ValidateMetrics::record_strict_promotion();
            }

            if result.is_valid {
                valid.push(document);
            } else {
                stats.records_rejected += 1;
                debug!(
                    station = document.station.id.as_deref().unwrap_or("unknown"),
                    timestamp = document.timestamp.as_deref().unwrap_or(""),
                    "Rejected: {}",
                    result.errors.join("; ")
                );
            }
        }

        stats.records_validated = valid.len();
        info!(
            "Validated {} records, rejected {}",
            valid.len(),
            stats.records_rejected
        );
        valid
    }

    async fn save_snapshot(
        &self,
        documents: &[UnifiedDocument],
        stats: &mut RunStats,
    ) -> crate::error::Result<()> {
        if documents.is_empty() {
            warn!("No validated documents to snapshot");
            return Ok(());
        }

        let key = processed_key(self.options.target_date, Utc::now());
        let value = serde_json::to_value(documents)?;
        let location = self.blob_store.put_json(&key, &value).await?;
        stats.processed_path = Some(location);
        Ok(())
    }

    async fn load(&self, documents: &[UnifiedDocument], stats: &mut RunStats) -> crate::error::Result<()> {
        if documents.is_empty() {
            warn!("No documents to load");
            return Ok(());
        }

        if self.options.dry_run {
            stats.records_loaded = 0;
            stats.records_loaded_simulated = documents.len();
            warn!("[DRY-RUN] {} documents would have been loaded", documents.len());
            return Ok(());
        }

        let started = Instant::now();
        let summary = self.document_store.bulk_insert(documents).await?;
        LoadMetrics::record_load(summary.inserted, started.elapsed().as_secs_f64());
        if summary.duplicates > 0 {
            LoadMetrics::record_duplicates(summary.duplicates);
            warn!(
                "Partial insert: {} inserted, {} duplicates skipped",
                summary.inserted, summary.duplicates
            );
        }

        stats.records_loaded = summary.inserted;
        info!("Loaded {} documents", summary.inserted);
        Ok(())
    }

    async fn save_report(&self, report: &QualityReport) -> crate::error::Result<String> {
        let value = serde_json::to_value(report)?;
        self.blob_store.put_json(&report_key(Utc::now()), &value).await
    }

    async fn write_status_file(&self, stats: &RunStats) -> crate::error::Result<()> {
        let status = StatusFile {
            status: stats.status,
            dry_run: self.options.dry_run,
            records_extracted: stats.records_extracted,
            records_validated: stats.records_validated,
            processed_path: stats.processed_path.clone(),
            records_loaded: stats.records_loaded,
            records_loaded_simulated: stats.records_loaded_simulated,
            duration_seconds: stats.duration_seconds.unwrap_or_default(),
            timestamp: Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        };

        if let Some(parent) = self.options.status_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(&status)?;
        tokio::fs::write(&self.options.status_path, body).await?;
        info!("Pipeline status written to {}", self.options.status_path.display());
        Ok(())
    }
}

/// One JSON line summarising the run for log-based monitoring
fn log_run_summary(stats: &RunStats) {
    match serde_json::to_string(stats) {
        Ok(line) => info!(target: "forecast_etl::run_summary", "{}", line),
        Err(e) => warn!("Could not serialize run summary: {}", e),
    }
}
