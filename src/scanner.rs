//! Camera reader events.
//!
//! The reader decodes frames on the client and reports each result here:
//! either decoded text, or an error string. "Nothing found in this frame"
//! errors are routine and must not reach the operator.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::AppError;

/// Marker the reader uses when a frame simply contains no QR code.
pub const NOT_FOUND_MARKER: &str = "NotFoundException";

/// UUID text form, versions 1, 3, 4 and 5, RFC 4122 variant.
static STUDENT_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1345][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("student id pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ScanEvent {
    /// A frame was decoded
    Decoded {
        #[schema(example = "5f1c2a9e-3b7d-4c1e-9a2f-0d6e8b4c7a11")]
        decoded_text: String,
    },
    /// The reader reported an error
    Failed {
        #[schema(example = "NotFoundException: No MultiFormat Readers were able to detect the code.")]
        error: String,
    },
}

#[derive(Debug)]
pub enum ScanOutcome {
    Student(String),
    Ignored,
    Rejected(AppError),
}

pub fn is_student_id(text: &str) -> bool {
    STUDENT_ID_PATTERN.is_match(text)
}

pub fn classify(event: ScanEvent) -> ScanOutcome {
    match event {
        ScanEvent::Decoded { decoded_text } => {
            let text = decoded_text.trim();
            if is_student_id(text) {
                ScanOutcome::Student(text.to_lowercase())
            } else {
                ScanOutcome::Rejected(AppError::InvalidQrFormat)
            }
        }
        ScanEvent::Failed { error } if error.contains(NOT_FOUND_MARKER) => ScanOutcome::Ignored,
        ScanEvent::Failed { error } => ScanOutcome::Rejected(AppError::ScanFailed(error)),
    }
}
