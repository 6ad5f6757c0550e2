use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::TryStreamExt;
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use super::{Result, Store, StoreError};
use crate::model::attendance::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, NewAttendance, StudentSummary,
};
use crate::model::student::Student;

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    timestamp: DateTime<Utc>,
    status: String,
    name: Option<String>,
    roll_no: Option<String>,
    class: Option<String>,
}

fn parse_status(raw: &str) -> Result<AttendanceStatus> {
    raw.parse()
        .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
}

#[async_trait]
impl Store for MySqlStore {
    async fn insert_student(&self, student: &Student) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO students (id, name, roll_no, `class`, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&student.id)
        .bind(&student.name)
        .bind(&student.roll_no)
        .bind(&student.class)
        .bind(student.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_student(&self, id: &str) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, roll_no, `class`, created_at
            FROM students
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn roll_number_exists(&self, roll_no: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE roll_no = ? LIMIT 1)",
        )
        .bind(roll_no)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists > 0)
    }

    async fn find_attendance(&self, student_id: &str, date: NaiveDate) -> Result<Option<u64>> {
        let id = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM attendance WHERE student_id = ? AND `date` = ? LIMIT 1",
        )
        .bind(student_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn insert_attendance(&self, new: NewAttendance) -> Result<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (student_id, `date`, `timestamp`, status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&new.student_id)
        .bind(new.date)
        .bind(new.timestamp)
        .bind(new.status.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(new.into_record(result.last_insert_id()))
    }

    async fn list_attendance(&self, date: NaiveDate) -> Result<Vec<AttendanceEntry>> {
        let sql = r#"
            SELECT a.id, a.`timestamp`, a.status, s.name, s.roll_no, s.`class`
            FROM attendance a
            LEFT JOIN students s ON s.id = a.student_id
            WHERE a.`date` = ?
            ORDER BY a.`timestamp` DESC
        "#;
        debug!(%date, "Fetching attendance");

        let rows = sqlx::query_as::<_, AttendanceRow>(sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(AttendanceEntry {
                    id: row.id,
                    timestamp: row.timestamp,
                    status: parse_status(&row.status)?,
                    student: StudentSummary::from_parts(row.name, row.roll_no, row.class),
                })
            })
            .collect()
    }

    async fn roll_numbers(&self) -> Result<Vec<String>> {
        let roll_numbers: Vec<String> = sqlx::query_scalar::<_, String>("SELECT roll_no FROM students")
            .fetch(&self.pool)
            .try_collect()
            .await?;
        Ok(roll_numbers)
    }

    async fn recent_students(&self, days: u32) -> Result<Vec<Student>> {
        let since = Utc::now() - Duration::days(i64::from(days));
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, roll_no, `class`, created_at
            FROM students
            WHERE created_at >= ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_is_a_decode_error() {
        assert_eq!(parse_status("late").unwrap(), AttendanceStatus::Late);
        assert!(matches!(
            parse_status("excused"),
            Err(StoreError::Database(sqlx::Error::Decode(_)))
        ));
    }
}
