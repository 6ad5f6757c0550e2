use anyhow::Result;
use autoscale_cuckoo_filter::CuckooFilter;
use std::sync::RwLock;

use crate::store::Store;

/// Expected capacity and false-positive rate.
/// Tune these based on real enrolment counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

/// Fast negative check for roll numbers already taken.
pub struct RollNumberFilter {
    inner: RwLock<CuckooFilter<String>>,
}

impl Default for RollNumberFilter {
    fn default() -> Self {
        Self {
            inner: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
        }
    }
}

#[inline]
fn normalize(roll_no: &str) -> String {
    roll_no.trim().to_lowercase()
}

impl RollNumberFilter {
    /// Check if a roll number might be taken (false positives possible)
    pub fn might_exist(&self, roll_no: &str) -> bool {
        self.inner
            .read()
            .expect("roll number filter poisoned")
            .contains(&normalize(roll_no))
    }

    pub fn insert(&self, roll_no: &str) {
        self.inner
            .write()
            .expect("roll number filter poisoned")
            .add(&normalize(roll_no));
    }

    fn insert_batch(&self, roll_numbers: &[String]) {
        let mut filter = self.inner.write().expect("roll number filter poisoned");
        for roll_no in roll_numbers {
            filter.add(roll_no);
        }
    }

    /// Load every registered roll number, in batches.
    pub async fn warmup(&self, store: &dyn Store, batch_size: usize) -> Result<()> {
        let roll_numbers = store.roll_numbers().await?;
        let total = roll_numbers.len();

        for chunk in roll_numbers.chunks(batch_size.max(1)) {
            let batch: Vec<String> = chunk.iter().map(|r| normalize(r)).collect();
            self.insert_batch(&batch);
        }

        tracing::info!("Roll number filter warmup complete: {} students", total);
        Ok(())
    }
}
