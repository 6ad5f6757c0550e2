use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, NewAttendance, StudentSummary};
use crate::model::student::Student;
use crate::models::Notification;
use crate::scanner::{self, ScanEvent, ScanOutcome};
use crate::state::AppState;
use crate::utils::recent_scans::RecentScan;

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkedAttendance {
    pub record: AttendanceRecord,
    pub student: Student,
    pub notification: Notification,
}

#[derive(Serialize, ToSchema)]
pub struct RecentScansResponse {
    pub data: Vec<RecentScan>,
}

/// Mark `student_id` present for the date of `now`.
///
/// Runs the lookup chain: student exists, no row yet for the date, insert.
/// The existence check alone cannot stop two concurrent scans; the store's
/// (student, date) key rejects the second insert, which is reported the
/// same way as a prior mark.
pub async fn mark_attendance(
    state: &AppState,
    student_id: &str,
    now: DateTime<Utc>,
) -> Result<MarkedAttendance, AppError> {
    const FAILED: &str = "Failed to mark attendance. Please try again.";

    let student = state
        .students
        .get_or_load(state.store.as_ref(), student_id)
        .await
        .map_err(AppError::store(FAILED))?
        .ok_or(AppError::StudentNotFound)?;

    let new = NewAttendance::present(&student.id, now);

    let existing = state
        .store
        .find_attendance(&student.id, new.date)
        .await
        .map_err(AppError::store(FAILED))?;
    if existing.is_some() {
        info!(student_id = %student.id, date = %new.date, "Attendance already marked");
        return Err(AppError::AlreadyMarked { name: student.name });
    }

    let record = match state.store.insert_attendance(new).await {
        Ok(record) => record,
        Err(e) if e.is_unique_violation() => {
            info!(student_id = %student.id, "Concurrent scan already marked attendance");
            return Err(AppError::AlreadyMarked { name: student.name });
        }
        Err(e) => {
            error!(error = %e, student_id = %student.id, "Marking attendance failed");
            return Err(AppError::store(FAILED)(e));
        }
    };

    state.recent_scans.push(RecentScan {
        student: StudentSummary::from(&student),
        timestamp: record.timestamp,
    });
    info!(student_id = %student.id, attendance_id = record.id, "Attendance marked");

    let notification = Notification::success(
        "Attendance Marked",
        format!("Present: {} ({})", student.name, student.roll_no),
    );
    Ok(MarkedAttendance {
        record,
        student,
        notification,
    })
}

/// Submit a camera reader event
#[utoipa::path(
    post,
    path = "/api/scan",
    request_body = ScanEvent,
    responses(
        (status = 200, description = "Attendance marked", body = MarkedAttendance),
        (status = 204, description = "Frame contained no QR code; nothing to report"),
        (status = 404, description = "Student not found in database", body = Notification),
        (status = 409, description = "Attendance already marked today", body = Notification, example = json!({
            "title": "Already Marked",
            "description": "Attendance already marked for Asha Rao today",
            "variant": "warning"
        })),
        (status = 422, description = "Invalid QR code or reader error", body = Notification),
        (status = 500, description = "Internal server error", body = Notification)
    ),
    tag = "Scan"
)]
pub async fn scan(
    state: web::Data<AppState>,
    event: web::Json<ScanEvent>,
) -> Result<HttpResponse, AppError> {
    let student_id = match scanner::classify(event.into_inner()) {
        ScanOutcome::Student(id) => id,
        ScanOutcome::Ignored => return Ok(HttpResponse::NoContent().finish()),
        ScanOutcome::Rejected(e) => return Err(e),
    };

    let marked = mark_attendance(&state, &student_id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(marked))
}

/// Students scanned most recently today
#[utoipa::path(
    get,
    path = "/api/scan/recent",
    responses(
        (status = 200, description = "Up to five scans, newest first", body = RecentScansResponse)
    ),
    tag = "Scan"
)]
pub async fn recent_scans(state: web::Data<AppState>) -> HttpResponse {
    let today = Utc::now().date_naive();
    HttpResponse::Ok().json(RecentScansResponse {
        data: state.recent_scans.for_date(today),
    })
}
