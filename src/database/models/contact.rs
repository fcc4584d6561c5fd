use chrono::{DateTime, Utc};

/// Contact as far as genders are concerned: only the reference matters here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: i64,
    pub account_id: i64,
    pub first_name: String,
    pub gender_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
