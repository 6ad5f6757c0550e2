use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use utoipa::ToSchema;

use crate::model::attendance::StudentSummary;

pub const RECENT_SCANS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecentScan {
    pub student: StudentSummary,
    #[schema(example = "2026-01-01T08:15:30Z", format = "date-time", value_type = String)]
    pub timestamp: DateTime<Utc>,
}

/// Last few successful scans, newest first.
#[derive(Default)]
pub struct RecentScans {
    entries: Mutex<VecDeque<RecentScan>>,
}

impl RecentScans {
    pub fn push(&self, scan: RecentScan) {
        let mut entries = self.entries.lock().expect("recent scans poisoned");
        entries.push_front(scan);
        entries.truncate(RECENT_SCANS_LIMIT);
    }

    /// Scans recorded on `date`, newest first.
    pub fn for_date(&self, date: NaiveDate) -> Vec<RecentScan> {
        self.entries
            .lock()
            .expect("recent scans poisoned")
            .iter()
            .filter(|s| s.timestamp.date_naive() == date)
            .cloned()
            .collect()
    }
}
