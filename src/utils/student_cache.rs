use anyhow::Result;
use moka::future::Cache;
use std::time::Duration;

use crate::model::student::Student;
use crate::store::Store;

/// Students by id. Rows are never updated or deleted, so entries only
/// expire by TTL or capacity.
#[derive(Clone)]
pub struct StudentCache {
    inner: Cache<String, Student>,
}

impl StudentCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, id: &str) -> Option<Student> {
        self.inner.get(id).await
    }

    pub async fn insert(&self, student: Student) {
        self.inner.insert(student.id.clone(), student).await;
    }

    /// Cache-first lookup, falling back to the store on a miss.
    pub async fn get_or_load(
        &self,
        store: &dyn Store,
        id: &str,
    ) -> crate::store::Result<Option<Student>> {
        if let Some(student) = self.get(id).await {
            return Ok(Some(student));
        }

        let student = store.find_student(id).await?;
        if let Some(s) = &student {
            self.insert(s.clone()).await;
        }
        Ok(student)
    }

    async fn batch_insert(&self, students: &[Student]) {
        let futures: Vec<_> = students
            .iter()
            .map(|s| self.inner.insert(s.id.clone(), s.clone()))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(futures).await;
    }

    /// Load only RECENTLY registered students into the cache (batched)
    pub async fn warmup(&self, store: &dyn Store, days: u32, batch_size: usize) -> Result<()> {
        let students = store.recent_students(days).await?;

        for batch in students.chunks(batch_size.max(1)) {
            self.batch_insert(batch).await;
        }

        tracing::info!(
            "Student cache warmup complete: {} recent students (last {} days)",
            students.len(),
            days
        );
        Ok(())
    }
}
