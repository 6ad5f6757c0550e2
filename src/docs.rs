use crate::api::attendance::{AttendanceListResponse, AttendanceStats};
use crate::api::home::{HomeResponse, Section};
use crate::api::scan::{MarkedAttendance, RecentScansResponse};
use crate::api::students::{CreateStudent, QrLinks, RegisteredStudent};
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus, StudentSummary};
use crate::model::student::Student;
use crate::models::{Notification, Variant};
use crate::qr::QrSize;
use crate::scanner::ScanEvent;
use crate::utils::recent_scans::RecentScan;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "QR Attendance API",
        version = "0.1.0",
        description = r#"
## QR Attendance

Mark student attendance by scanning a QR code that encodes the student's id.

### Screens
- **Generate**: register a student (name, roll number, class) and fetch their QR code
- **Scan**: submit what the camera reader decoded; the student is marked present for today
- **Attendance**: browse a day's records, search them, and export them as CSV

### Response Format
- JSON bodies; errors and outcomes carry a `Notification` (`title`, `description`, `variant`)
- QR codes are PNG, exports are CSV

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::home::index,

        crate::api::students::register_student,
        crate::api::students::get_student,
        crate::api::students::student_qr,

        crate::api::scan::scan,
        crate::api::scan::recent_scans,

        crate::api::attendance::list_attendance,
        crate::api::attendance::export_attendance
    ),
    components(
        schemas(
            HomeResponse,
            Section,
            CreateStudent,
            RegisteredStudent,
            QrLinks,
            QrSize,
            Student,
            ScanEvent,
            MarkedAttendance,
            RecentScan,
            RecentScansResponse,
            AttendanceRecord,
            AttendanceStatus,
            AttendanceEntry,
            StudentSummary,
            AttendanceStats,
            AttendanceListResponse,
            Notification,
            Variant
        )
    ),
    tags(
        (name = "Home", description = "Service overview"),
        (name = "Students", description = "Student registration and QR codes"),
        (name = "Scan", description = "QR scanning and attendance marking"),
        (name = "Attendance", description = "Attendance records and CSV export"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/api/students",
            "/api/students/{id}",
            "/api/students/{id}/qr",
            "/api/scan",
            "/api/scan/recent",
            "/api/attendance",
            "/api/attendance/export",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing from OpenAPI");
        }
    }
}
