use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::store::Store;
use crate::utils::recent_scans::RecentScans;
use crate::utils::roll_number_filter::RollNumberFilter;
use crate::utils::student_cache::StudentCache;

/// Shared handler state, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub students: StudentCache,
    pub roll_numbers: RollNumberFilter,
    pub recent_scans: RecentScans,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            store,
            students: StudentCache::new(
                config.student_cache_capacity,
                Duration::from_secs(config.student_cache_ttl_secs),
            ),
            roll_numbers: RollNumberFilter::default(),
            recent_scans: RecentScans::default(),
        }
    }
}
