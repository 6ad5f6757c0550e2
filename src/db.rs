use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::info;

const CREATE_STUDENTS: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id CHAR(36) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    roll_no VARCHAR(64) NOT NULL,
    `class` VARCHAR(64) NOT NULL,
    created_at DATETIME(3) NOT NULL,
    UNIQUE KEY students_roll_no_unique (roll_no),
    KEY students_created_at_idx (created_at)
)
"#;

const CREATE_ATTENDANCE: &str = r#"
CREATE TABLE IF NOT EXISTS attendance (
    id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
    student_id CHAR(36) NOT NULL,
    `date` DATE NOT NULL,
    `timestamp` DATETIME(3) NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'present',
    UNIQUE KEY attendance_student_date_unique (student_id, `date`),
    KEY attendance_date_idx (`date`),
    CONSTRAINT attendance_student_fk FOREIGN KEY (student_id) REFERENCES students (id)
)
"#;

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Create the tables if they are missing.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<()> {
    for ddl in [CREATE_STUDENTS, CREATE_ATTENDANCE] {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .context("Failed to create schema")?;
    }
    info!("Database schema ready");
    Ok(())
}
