use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::models::Notification;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request input
    #[error("{0}")]
    Validation(String),

    #[error("Roll number already exists!")]
    DuplicateRollNumber,

    #[error("Student not found in database")]
    StudentNotFound,

    #[error("Attendance already marked for {name} today")]
    AlreadyMarked { name: String },

    #[error("Invalid QR code format")]
    InvalidQrFormat,

    /// Non-recoverable error reported by the camera reader
    #[error("{0}")]
    ScanFailed(String),

    #[error("No attendance records to export")]
    NoRecordsToExport,

    #[error("Failed to generate QR code: {0}")]
    QrRender(String),

    /// Store failure with a user-facing description of the attempted action
    #[error("{action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn store(action: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Store { action, source }
    }

    /// Notification body sent to the client; internal details never leak.
    pub fn notification(&self) -> Notification {
        match self {
            AppError::AlreadyMarked { .. } => Notification::warning("Already Marked", self.to_string()),
            AppError::NoRecordsToExport => Notification::warning("No Data", self.to_string()),
            AppError::ScanFailed(_) | AppError::InvalidQrFormat => {
                Notification::new("Scan Error", self.to_string(), crate::models::Variant::Destructive)
            }
            AppError::QrRender(_) => Notification::error("Failed to generate QR code"),
            AppError::Store { action, .. } => Notification::error(*action),
            AppError::Internal(_) => Notification::error("Something went wrong, Contact with system admin"),
            _ => Notification::error(self.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateRollNumber | AppError::AlreadyMarked { .. } => StatusCode::CONFLICT,
            AppError::StudentNotFound | AppError::NoRecordsToExport => StatusCode::NOT_FOUND,
            AppError::InvalidQrFormat | AppError::ScanFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::QrRender(_) | AppError::Store { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::QrRender(_) | AppError::Store { .. } | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
            }
            _ => tracing::debug!(error = %self, "Request rejected"),
        }

        HttpResponse::build(self.status_code()).json(self.notification())
    }
}
