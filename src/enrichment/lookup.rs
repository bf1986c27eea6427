use tracing::{debug, error, warn};

use super::client::OutputFetcher;
use super::error::CaseError;
use super::types::WorkspaceRecord;

/// Shown when enrichment is switched off.
pub const DISABLED_SENTINEL: &str = "Debug Mode";
/// Shown when the case system has no usable identifier for an item.
pub const MISSING_SENTINEL: &str = "No workspace";

/// Result of one enrichment lookup.
///
/// Every failure renders as the same sentinel in reports; the variant keeps
/// the cause for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Disabled,
    Found(WorkspaceRecord),
    NotFound,
    Malformed(String),
    Failed(String),
}

impl Lookup {
    pub fn record(&self) -> Option<&WorkspaceRecord> {
        match self {
            Lookup::Found(record) => Some(record),
            _ => None,
        }
    }

    pub fn workspace_label(&self) -> String {
        match self {
            Lookup::Disabled => DISABLED_SENTINEL.to_string(),
            Lookup::Found(record) => record.workspace_id.to_string(),
            Lookup::NotFound | Lookup::Malformed(_) | Lookup::Failed(_) => {
                MISSING_SENTINEL.to_string()
            }
        }
    }

    pub fn planning_packages(&self) -> u32 {
        self.record().map_or(0, |r| r.final_planning_pkg_count)
    }

    pub fn work_order_packages(&self) -> u32 {
        self.record().map_or(0, |r| r.final_wo_pkg_count)
    }
}

/// Enrichment switch: either off, or backed by a fetcher.
pub enum Enricher<F> {
    Disabled,
    Enabled(F),
}

impl<F: OutputFetcher> Enricher<F> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Enricher::Enabled(_))
    }

    /// Look up workspace identifiers for an item. Never fails.
    pub async fn lookup(&self, item_name: &str) -> Lookup {
        let fetcher = match self {
            Enricher::Disabled => return Lookup::Disabled,
            Enricher::Enabled(f) => f,
        };

        let envelope = match fetcher.fetch_output(item_name).await {
            Ok(envelope) => envelope,
            Err(CaseError::Parse(reason)) => {
                warn!(item = item_name, %reason, "unreadable enrichment response");
                return Lookup::Malformed(reason);
            }
            Err(CaseError::RateLimited) => {
                warn!(item = item_name, "case system rate limited the lookup");
                return Lookup::Failed(CaseError::RateLimited.to_string());
            }
            Err(e) if e.is_unauthorized() => {
                error!(item = item_name, error = %e, "case system rejected the session ticket");
                return Lookup::Failed(e.to_string());
            }
            Err(e) => {
                warn!(item = item_name, error = %e, "enrichment lookup failed");
                return Lookup::Failed(e.to_string());
            }
        };

        match envelope.workspace() {
            Ok(Some(record)) => {
                debug!(item = item_name, workspace = record.workspace_id, "workspace found");
                Lookup::Found(record)
            }
            Ok(None) => {
                debug!(item = item_name, "no workspace on case system");
                Lookup::NotFound
            }
            Err(reason) => {
                warn!(item = item_name, %reason, "malformed enrichment payload");
                Lookup::Malformed(reason)
            }
        }
    }
}
