use chrono::DateTime;
use chrono_tz::Tz;

use crate::classify::PendingCategory;

/// A folder that reached the case system within the success window.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessfulTransfer {
    pub library_name: String,
    pub folder_name: String,
    pub workspace_id: String,
    pub final_planning_pkg_count: u32,
    pub final_wo_pkg_count: u32,
    pub file_count: u64,
    pub extraction_date: DateTime<Tz>,
}

/// A folder still waiting on the workflow, or an overdue extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransfer {
    pub library_name: String,
    pub folder_name: String,
    pub last_modified: DateTime<Tz>,
    pub pending_hours: f64,
    /// Raw status tag as found on the content store.
    pub source_category: String,
    pub category: PendingCategory,
    pub enriched_category: String,
    pub file_count: u64,
    pub workspace_info: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Successful(SuccessfulTransfer),
    Pending(PendingTransfer),
}
