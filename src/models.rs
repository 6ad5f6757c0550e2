use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

/// One-shot message shown to the operator after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    #[schema(example = "Attendance Marked")]
    pub title: String,
    #[schema(example = "Present: Asha Rao (CS-042)")]
    pub description: String,
    pub variant: Variant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Variant {
    Success,
    Warning,
    Destructive,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>, variant: Variant) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant,
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Variant::Success)
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Variant::Warning)
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::new("Error", description, Variant::Destructive)
    }
}
