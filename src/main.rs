use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

use forecast_etl::app::ports::RawSourcePort;
use forecast_etl::app::report_use_case::report_from_snapshot;
use forecast_etl::app::{PipelineOptions, WeatherPipeline};
use forecast_etl::config::Config;
use forecast_etl::constants::{LOG_DIR, METRICS_FILE, STATUS_FILE};
use forecast_etl::error::PipelineError;
use forecast_etl::sources::{InfoClimatFile, WundergroundFile};
use forecast_etl::storage::{FsBlobStore, JsonFileDocumentStore};
use forecast_etl::{logging, metrics};

#[derive(Parser)]
#[command(name = "forecast_etl")]
#[command(about = "Batch ETL for synoptic and personal weather station observations")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run extract, harmonize, validate, load and report over local extracts
    Run {
        /// InfoClimat hourly extract (JSON or JSON lines)
        #[arg(long)]
        infoclimat: Option<PathBuf>,
        /// Weather Underground extract for one station, as STATION=PATH (repeatable)
        #[arg(long = "wunderground", value_name = "STATION=PATH")]
        wunderground: Vec<String>,
        /// Target date YYYY-MM-DD (default: yesterday UTC)
        #[arg(long)]
        date: Option<String>,
        /// Skip document store writes
        #[arg(long)]
        dry_run: bool,
        /// Promote validation warnings to errors
        #[arg(long)]
        strict: bool,
        /// Configuration file (default: forecast.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory for snapshots, reports and the document store
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long, default_value = "info")]
        log_level: String,
    },
    /// Re-validate a processed snapshot and print its quality report
    Report {
        /// Processed snapshot written by a previous run
        snapshot: PathBuf,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "error")]
        log_level: String,
    },
}

fn parse_target_date(raw: Option<&str>) -> Result<NaiveDate, PipelineError> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| PipelineError::InvalidDate(raw.to_string())),
        None => Ok((Utc::now() - Duration::days(1)).date_naive()),
    }
}

fn parse_station_path(raw: &str) -> Result<(String, PathBuf)> {
    match raw.split_once('=') {
        Some((station, path)) if !station.trim().is_empty() && !path.trim().is_empty() => {
            Ok((station.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => bail!("expected STATION=PATH, got '{}'", raw),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_pipeline(
    infoclimat: Option<PathBuf>,
    wunderground: Vec<String>,
    date: Option<String>,
    dry_run: bool,
    strict: bool,
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<bool> {
    let mut config = Config::load(config_path.as_deref())?;
    if strict {
        config.validation.strict_mode = true;
    }
    if let Some(dir) = output_dir {
        config.storage.output_dir = dir;
    }

    let target_date = parse_target_date(date.as_deref())?;
    let catalog = config.station_catalog();

    let mut sources: Vec<Box<dyn RawSourcePort>> = Vec::new();
    if let Some(path) = infoclimat {
        sources.push(Box::new(InfoClimatFile::new(&catalog, path)));
    }
    for raw in &wunderground {
        let (station, path) = parse_station_path(raw)?;
        sources.push(Box::new(WundergroundFile::new(&catalog, station, path)));
    }
    if sources.is_empty() {
        warn!("No extracts given; the run will produce an empty report");
    }

    let output = &config.storage.output_dir;
    let document_store = Arc::new(JsonFileDocumentStore::new(
        output,
        &config.storage.database,
        &config.storage.collection,
    ));
    let blob_store = Arc::new(FsBlobStore::new(output));

    let options = PipelineOptions {
        target_date,
        dry_run,
        strict_mode: config.validation.strict_mode,
        pipeline_version: config.pipeline.version.clone(),
        status_path: Path::new(LOG_DIR).join(STATUS_FILE),
    };

    let run_id = std::env::var("RUN_ID")
        .ok()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let span = tracing::info_span!(
        "pipeline_run",
        run_id = %run_id,
        target_date = %target_date,
        dry_run = dry_run
    );

    let pipeline = WeatherPipeline::new(sources, document_store, blob_store, options);
    let outcome = pipeline.run().instrument(span).await;

    println!("\n📊 Pipeline results for {}:", target_date);
    println!("   Status: {:?}", outcome.stats.status);
    println!("   Extracted: {}", outcome.stats.records_extracted);
    println!("   Validated: {}", outcome.stats.records_validated);
    println!("   Rejected: {}", outcome.stats.records_rejected);
    if dry_run {
        println!("   Loaded (simulated): {}", outcome.stats.records_loaded_simulated);
    } else {
        println!("   Loaded: {}", outcome.stats.records_loaded);
    }
    if let Some(path) = &outcome.report_path {
        println!("   Quality report: {}", path);
    }
    if outcome.has_errors() {
        println!("\n⚠️  Errors encountered:");
        for error in &outcome.stats.errors {
            println!("   - {}", error);
        }
    }

    let metrics_path = Path::new(LOG_DIR).join(METRICS_FILE);
    match metrics::write_snapshot(&metrics_path) {
        Ok(true) => info!("Metrics snapshot written to {}", metrics_path.display()),
        Ok(false) => {}
        Err(e) => warn!("Could not write metrics snapshot: {}", e),
    }

    Ok(!outcome.has_errors())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            infoclimat,
            wunderground,
            date,
            dry_run,
            strict,
            config,
            output_dir,
            log_level,
        } => {
            logging::init_logging(&log_level);
            metrics::init_metrics();

            match run_pipeline(infoclimat, wunderground, date, dry_run, strict, config, output_dir).await {
                Ok(true) => {}
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    error!("Pipeline aborted: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Report {
            snapshot,
            strict,
            config,
            log_level,
        } => {
            logging::init_logging(&log_level);
            let config = Config::load(config.as_deref())?;
            let report = report_from_snapshot(&snapshot, strict || config.validation.strict_mode)
                .await
                .context("building quality report")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_date() {
        assert_eq!(
            parse_target_date(Some("2026-02-07")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 7).unwrap()
        );
        assert!(matches!(
            parse_target_date(Some("07/02/2026")),
            Err(PipelineError::InvalidDate(_))
        ));
        assert_eq!(
            parse_target_date(None).unwrap(),
            (Utc::now() - Duration::days(1)).date_naive()
        );
    }

    #[test]
    fn test_parse_station_path() {
        let (station, path) = parse_station_path("ILAMAD25=data/wu.jsonl").unwrap();
        assert_eq!(station, "ILAMAD25");
        assert_eq!(path, PathBuf::from("data/wu.jsonl"));
        assert!(parse_station_path("ILAMAD25").is_err());
        assert!(parse_station_path("=data/wu.jsonl").is_err());
    }
}
