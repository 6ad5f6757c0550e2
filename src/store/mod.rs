//! Database service client.
//!
//! Handlers talk to persistent state only through the [`Store`] trait. The
//! MySQL implementation is used in production; the in-memory one backs local
//! runs (`DATABASE_URL=memory`) and the handler tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::Config;
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, NewAttendance};
use crate::model::student::Student;

pub mod memory;
pub mod mysql;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            // MySQL shares SQLSTATE 23000 across duplicate-key, foreign-key and
            // NOT NULL failures; only the error number tells them apart.
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation {
                    constraint: db_err.message().to_string(),
                };
            }
        }
        StoreError::Database(e)
    }
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert one student. A taken roll number is a `UniqueViolation`.
    async fn insert_student(&self, student: &Student) -> Result<()>;

    async fn find_student(&self, id: &str) -> Result<Option<Student>>;

    async fn roll_number_exists(&self, roll_no: &str) -> Result<bool>;

    /// Id of the attendance row for `(student_id, date)`, if one exists.
    async fn find_attendance(&self, student_id: &str, date: NaiveDate) -> Result<Option<u64>>;

    /// Insert one attendance row. A second row for the same student and
    /// date is a `UniqueViolation`.
    async fn insert_attendance(&self, new: NewAttendance) -> Result<AttendanceRecord>;

    /// Rows for `date` joined with their students, newest first.
    async fn list_attendance(&self, date: NaiveDate) -> Result<Vec<AttendanceEntry>>;

    async fn roll_numbers(&self) -> Result<Vec<String>>;

    /// Students registered within the last `days` days.
    async fn recent_students(&self, days: u32) -> Result<Vec<Student>>;
}

/// Build the store selected by `DATABASE_URL`.
pub async fn init_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store; data is lost on restart");
        return Ok(Arc::new(memory::MemoryStore::default()));
    }

    let pool = crate::db::init_db(&config.database_url).await?;
    crate::db::ensure_schema(&pool).await?;
    Ok(Arc::new(mysql::MySqlStore::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::fmt;

    #[derive(Debug)]
    struct FakeDbError {
        message: &'static str,
        kind: ErrorKind,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23000"))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.kind {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
                ErrorKind::CheckViolation => ErrorKind::CheckViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn db_error(message: &'static str, kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { message, kind }))
    }

    #[test]
    fn duplicate_key_is_a_unique_violation() {
        let err = StoreError::from(db_error(
            "Duplicate entry 'x' for key 'attendance_student_date_unique'",
            ErrorKind::UniqueViolation,
        ));
        assert!(err.is_unique_violation());
    }

    #[test]
    fn foreign_key_and_not_null_failures_stay_database_errors() {
        for kind in [ErrorKind::ForeignKeyViolation, ErrorKind::NotNullViolation] {
            let err = StoreError::from(db_error("Cannot add or update a child row", kind));
            assert!(!err.is_unique_violation());
            assert!(matches!(err, StoreError::Database(_)));
        }
    }
}
