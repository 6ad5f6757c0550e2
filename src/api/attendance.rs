use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::model::attendance::{AttendanceEntry, AttendanceStatus};
use crate::state::AppState;
use crate::utils::csv_export;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Calendar date, `YYYY-MM-DD`; defaults to today (UTC)
    #[param(example = "2026-01-01")]
    pub date: Option<String>,
    /// Case-insensitive match on name, roll number or class
    #[param(example = "10-a")]
    pub search: Option<String>,
}

impl AttendanceQuery {
    fn date(&self) -> Result<NaiveDate, AppError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(Utc::now().date_naive()),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::Validation(format!("Invalid date {raw:?}, expected YYYY-MM-DD"))),
        }
    }

    fn search(&self) -> &str {
        self.search.as_deref().map(str::trim).unwrap_or("")
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceStats {
    #[schema(example = 12)]
    pub total: usize,
    #[schema(example = 10)]
    pub present: usize,
    #[schema(example = 1)]
    pub absent: usize,
    #[schema(example = 1)]
    pub late: usize,
}

impl AttendanceStats {
    pub fn from_entries(entries: &[AttendanceEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut stats, e| {
            stats.total += 1;
            match e.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Absent => stats.absent += 1,
                AttendanceStatus::Late => stats.late += 1,
            }
            stats
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub records: Vec<AttendanceEntry>,
    pub stats: AttendanceStats,
}

/// Rows for the queried date, narrowed by the search text.
async fn filtered_entries(
    state: &AppState,
    query: &AttendanceQuery,
) -> Result<(NaiveDate, Vec<AttendanceEntry>), AppError> {
    let date = query.date()?;
    let search = query.search();

    let entries = state
        .store
        .list_attendance(date)
        .await
        .map_err(AppError::store("Failed to fetch attendance records"))?;
    let fetched = entries.len();

    let filtered: Vec<_> = entries
        .into_iter()
        .filter(|e| e.student.matches(search))
        .collect();
    debug!(%date, search, fetched, matched = filtered.len(), "Filtered attendance");

    Ok((date, filtered))
}

/// Attendance for a date
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records, newest first", body = AttendanceListResponse),
        (status = 400, description = "Malformed date", body = crate::models::Notification),
        (status = 500, description = "Internal server error", body = crate::models::Notification)
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    let (date, records) = filtered_entries(&state, &query).await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        date,
        stats: AttendanceStats::from_entries(&records),
        records,
    }))
}

/// Export attendance for a date as CSV
#[utoipa::path(
    get,
    path = "/api/attendance/export",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "CSV attachment `attendance_<date>.csv`", content_type = "text/csv", body = String),
        (status = 400, description = "Malformed date", body = crate::models::Notification),
        (status = 404, description = "No attendance records to export", body = crate::models::Notification, example = json!({
            "title": "No Data",
            "description": "No attendance records to export",
            "variant": "warning"
        })),
        (status = 500, description = "Internal server error", body = crate::models::Notification)
    ),
    tag = "Attendance"
)]
pub async fn export_attendance(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    let (date, records) = filtered_entries(&state, &query).await?;

    if records.is_empty() {
        return Err(AppError::NoRecordsToExport);
    }

    let csv = csv_export::attendance_csv(&records)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(csv_export::export_filename(date))],
        })
        .body(csv))
}
