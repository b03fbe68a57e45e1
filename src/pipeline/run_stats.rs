use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

/// Counters accumulated by the orchestrator over one run.
///
/// Only the orchestrator mutates this; the quality checker receives a
/// finished snapshot by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub records_extracted: usize,
    pub records_transformed: usize,
    pub records_validated: usize,
    pub records_loaded: usize,
    pub records_loaded_simulated: usize,
    pub records_rejected: usize,
    pub processed_path: Option<String>,
    pub status: RunStatus,
    pub errors: Vec<String>,
}

impl RunStats {
    pub fn started_at(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: None,
            duration_seconds: None,
            records_extracted: 0,
            records_transformed: 0,
            records_validated: 0,
            records_loaded: 0,
            records_loaded_simulated: 0,
            records_rejected: 0,
            processed_path: None,
            status: RunStatus::Running,
            errors: Vec::new(),
        }
    }

    pub fn start() -> Self {
        Self::started_at(Utc::now())
    }

    /// Close the run, stamping end time and duration
    pub fn finish(&mut self, status: RunStatus) {
        let end = Utc::now();
        self.end_time = Some(end);
        self.duration_seconds = Some((end - self.start_time).num_milliseconds() as f64 / 1000.0);
        self.status = status;
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::start()
    }
}
