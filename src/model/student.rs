use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "5f1c2a9e-3b7d-4c1e-9a2f-0d6e8b4c7a11",
        "name": "Asha Rao",
        "roll_no": "CS-042",
        "class": "10-A",
        "created_at": "2026-01-01T08:00:00Z"
    })
)]
pub struct Student {
    /// Unique identifier encoded in the student's QR code
    #[schema(example = "5f1c2a9e-3b7d-4c1e-9a2f-0d6e8b4c7a11")]
    pub id: String,

    #[schema(example = "Asha Rao")]
    pub name: String,

    #[schema(example = "CS-042")]
    pub roll_no: String,

    #[schema(example = "10-A")]
    pub class: String,

    #[schema(example = "2026-01-01T08:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn new(name: String, roll_no: String, class: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            roll_no,
            class,
            created_at,
        }
    }
}
