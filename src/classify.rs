//! Bucket routing for content items by workflow status and age.

use serde::{Deserialize, Serialize};

pub const STATUS_ASSEMBLED: &str = "ASSEMBLED";
pub const STATUS_SENT_TO_FAO: &str = "Sent to FAO";
pub const STATUS_FCMP_SET: &str = "FCMP WO Status Set";
pub const STATUS_CLSD_SET: &str = "CLSD WO Status Set";
pub const STATUS_EXTRACTION_SUCCESS: &str = "Extraction Success";

/// Why an item landed in the pending bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PendingCategory {
    Assembled,
    SentToFao,
    FcmpSet,
    ClsdSet,
    /// An extraction success older than the threshold.
    OverdueExtraction,
}

impl PendingCategory {
    /// The four workflow states counted in the summary and the average.
    pub const TRACKED: [PendingCategory; 4] = [
        PendingCategory::Assembled,
        PendingCategory::SentToFao,
        PendingCategory::FcmpSet,
        PendingCategory::ClsdSet,
    ];

    /// Exact, case-sensitive match on the wire literal.
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            STATUS_ASSEMBLED => Some(PendingCategory::Assembled),
            STATUS_SENT_TO_FAO => Some(PendingCategory::SentToFao),
            STATUS_FCMP_SET => Some(PendingCategory::FcmpSet),
            STATUS_CLSD_SET => Some(PendingCategory::ClsdSet),
            _ => None,
        }
    }

    pub fn is_tracked(&self) -> bool {
        !matches!(self, PendingCategory::OverdueExtraction)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PendingCategory::Assembled => "Assembled",
            PendingCategory::SentToFao => "Sent to FAO",
            PendingCategory::FcmpSet => "FCMP WO Status Set",
            PendingCategory::ClsdSet => "CLSD WO Status Set",
            PendingCategory::OverdueExtraction => "Overdue Extraction",
        }
    }
}

/// Outcome of routing one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Successful,
    Pending(PendingCategory),
    /// Not reported in either bucket.
    Excluded,
}

fn is_extraction_success(status: &str) -> bool {
    status.eq_ignore_ascii_case(STATUS_EXTRACTION_SUCCESS)
}

/// Route an item by status and age.
///
/// - The four tracked workflow statuses are pending regardless of age.
/// - An extraction success (any casing) is successful up to and including
///   `threshold_hours`, pending after it.
/// - Everything else is excluded.
pub fn classify(status: &str, age_hours: f64, threshold_hours: f64) -> Verdict {
    if let Some(category) = PendingCategory::from_status(status) {
        return Verdict::Pending(category);
    }
    if is_extraction_success(status) {
        return if age_hours <= threshold_hours {
            Verdict::Successful
        } else {
            Verdict::Pending(PendingCategory::OverdueExtraction)
        };
    }
    Verdict::Excluded
}
