use crate::classify::PendingCategory;
use crate::model::{Classification, PendingTransfer, SuccessfulTransfer};

/// Run-level counts and the average pending age.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    pub assembled: usize,
    pub sent_to_fao: usize,
    pub fcmp_set: usize,
    pub clsd_set: usize,
    /// Sum of the four tracked categories. Overdue extractions are not included.
    pub total_pending: usize,
    pub total_successful: usize,
    /// Mean age of tracked pending items; 0 when there are none.
    pub average_pending_hours: f64,
}

impl SummaryStats {
    pub fn count_for(&self, category: PendingCategory) -> usize {
        match category {
            PendingCategory::Assembled => self.assembled,
            PendingCategory::SentToFao => self.sent_to_fao,
            PendingCategory::FcmpSet => self.fcmp_set,
            PendingCategory::ClsdSet => self.clsd_set,
            PendingCategory::OverdueExtraction => 0,
        }
    }
}

pub fn summarize(classifications: &[Classification]) -> SummaryStats {
    let mut stats = SummaryStats::default();
    let mut tracked_hours = 0.0;

    for classification in classifications {
        match classification {
            Classification::Successful(_) => stats.total_successful += 1,
            Classification::Pending(p) => {
                match p.category {
                    PendingCategory::Assembled => stats.assembled += 1,
                    PendingCategory::SentToFao => stats.sent_to_fao += 1,
                    PendingCategory::FcmpSet => stats.fcmp_set += 1,
                    PendingCategory::ClsdSet => stats.clsd_set += 1,
                    PendingCategory::OverdueExtraction => continue,
                }
                tracked_hours += p.pending_hours;
            }
        }
    }

    stats.total_pending = stats.assembled + stats.sent_to_fao + stats.fcmp_set + stats.clsd_set;
    stats.average_pending_hours = if stats.total_pending > 0 {
        tracked_hours / stats.total_pending as f64
    } else {
        0.0
    };
    stats
}

/// Split classifications into report order: pending by age (oldest first,
/// ties in encounter order), successful in encounter order.
pub fn partition(
    classifications: Vec<Classification>,
) -> (Vec<PendingTransfer>, Vec<SuccessfulTransfer>) {
    let mut pending = Vec::new();
    let mut successful = Vec::new();
    for classification in classifications {
        match classification {
            Classification::Pending(p) => pending.push(p),
            Classification::Successful(s) => successful.push(s),
        }
    }
    sort_pending(&mut pending);
    (pending, successful)
}

/// Stable sort, descending by pending hours.
pub fn sort_pending(pending: &mut [PendingTransfer]) {
    pending.sort_by(|a, b| b.pending_hours.total_cmp(&a.pending_hours));
}
