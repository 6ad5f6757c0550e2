use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "5f1c2a9e-3b7d-4c1e-9a2f-0d6e8b4c7a11")]
    pub student_id: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-01-01T08:15:30Z", format = "date-time", value_type = String)]
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub student_id: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
}

impl NewAttendance {
    pub fn present(student_id: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            student_id: student_id.to_string(),
            date: timestamp.date_naive(),
            timestamp,
            status: AttendanceStatus::Present,
        }
    }

    pub fn into_record(self, id: u64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            student_id: self.student_id,
            date: self.date,
            timestamp: self.timestamp,
            status: self.status,
        }
    }
}

/// Student columns as shown next to an attendance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentSummary {
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "CS-042")]
    pub roll_no: String,
    #[schema(example = "10-A")]
    pub class: String,
}

impl StudentSummary {
    /// Placeholder for rows whose student no longer resolves.
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            roll_no: "N/A".to_string(),
            class: "N/A".to_string(),
        }
    }

    pub fn from_parts(name: Option<String>, roll_no: Option<String>, class: Option<String>) -> Self {
        let fallback = Self::unknown();
        Self {
            name: name.unwrap_or(fallback.name),
            roll_no: roll_no.unwrap_or(fallback.roll_no),
            class: class.unwrap_or(fallback.class),
        }
    }

    /// Case-insensitive substring match on name, roll number or class.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.roll_no.to_lowercase().contains(&query)
            || self.class.to_lowercase().contains(&query)
    }
}

impl From<&crate::model::student::Student> for StudentSummary {
    fn from(s: &crate::model::student::Student) -> Self {
        Self {
            name: s.name.clone(),
            roll_no: s.roll_no.clone(),
            class: s.class.clone(),
        }
    }
}

/// Attendance row joined with its student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "2026-01-01T08:15:30Z", format = "date-time", value_type = String)]
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub student: StudentSummary,
}
