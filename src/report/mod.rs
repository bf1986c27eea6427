//! Rendering and writing of the run report.

pub mod csv_export;
pub mod html;

use std::path::{Path, PathBuf};

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::aggregate::{SummaryStats, partition, summarize};
use crate::config::ReportConfig;
use crate::error::ReconcileError;
use crate::model::{PendingTransfer, SuccessfulTransfer};
use crate::reconciler::RunOutcome;

/// Aggregated, report-ordered view of a run.
#[derive(Debug, Clone)]
pub struct Report {
    pub run_id: String,
    pub generated_at: DateTime<Tz>,
    pub threshold_hours: f64,
    pub summary: SummaryStats,
    /// Oldest first.
    pub pending: Vec<PendingTransfer>,
    pub successful: Vec<SuccessfulTransfer>,
    pub skipped_items: usize,
    pub failed_containers: Vec<String>,
}

impl Report {
    pub fn from_outcome(outcome: RunOutcome, threshold_hours: f64) -> Self {
        let summary = summarize(&outcome.classifications);
        let (pending, successful) = partition(outcome.classifications);
        Self {
            run_id: outcome.run_id,
            generated_at: outcome.started_at,
            threshold_hours,
            summary,
            pending,
            successful,
            skipped_items: outcome.skipped_items,
            failed_containers: outcome.failed_containers,
        }
    }
}

/// Paths of the files produced by [`write_report`].
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub csv: PathBuf,
    pub html: PathBuf,
}

/// Write the CSV and HTML report into the configured directory.
///
/// Earlier CSV exports in that directory are removed first.
pub fn write_report(report: &Report, config: &ReportConfig) -> Result<WrittenReport, ReconcileError> {
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir)?;
    remove_old_exports(dir);

    let stem = format!(
        "{}_{}_{}",
        config.report_name,
        config.environment,
        report.generated_at.format("%Y%m%d_%H%M%S")
    );
    let csv = dir.join(format!("{stem}.csv"));
    let html = dir.join(format!("{stem}.html"));

    let file = std::fs::File::create(&csv)?;
    csv_export::write_csv(file, report)?;
    std::fs::write(&html, html::render(report))?;

    info!(csv = %csv.display(), html = %html.display(), "report written");
    Ok(WrittenReport { csv, html })
}

fn remove_old_exports(dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list report directory");
            return;
        }
    };
    for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
        if path.extension().is_some_and(|ext| ext == "csv") {
            match std::fs::remove_file(&path) {
                Ok(()) => info!(file = %path.display(), "deleted previous export"),
                Err(e) => warn!(file = %path.display(), error = %e, "cannot delete previous export"),
            }
        }
    }
}
