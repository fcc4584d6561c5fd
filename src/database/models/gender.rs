use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Sex-type codes a gender can be labelled with.
///
/// Persisted and serialized as the one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenderType {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
    #[serde(rename = "U")]
    Unknown,
    #[serde(rename = "N")]
    None,
}

impl GenderType {
    pub const ALL: [GenderType; 5] = [
        GenderType::Male,
        GenderType::Female,
        GenderType::Other,
        GenderType::Unknown,
        GenderType::None,
    ];

    pub fn code(self) -> &'static str {
        match self {
            GenderType::Male => "M",
            GenderType::Female => "F",
            GenderType::Other => "O",
            GenderType::Unknown => "U",
            GenderType::None => "N",
        }
    }

    /// Suffix of the `settings.personalization_genders_*` translation key
    pub fn label_key(self) -> &'static str {
        match self {
            GenderType::Male => "male",
            GenderType::Female => "female",
            GenderType::Other => "other",
            GenderType::Unknown => "unknown",
            GenderType::None => "none",
        }
    }
}

impl fmt::Display for GenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown gender type code: {0}")]
pub struct UnknownGenderType(pub String);

impl FromStr for GenderType {
    type Err = UnknownGenderType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenderType::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| UnknownGenderType(s.to_string()))
    }
}

/// Row of the `genders` table as sqlx reads it
#[derive(Debug, Clone, FromRow)]
pub struct GenderRow {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub gender_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named, account-scoped gender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gender {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub gender_type: Option<GenderType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<GenderRow> for Gender {
    type Error = UnknownGenderType;

    fn try_from(row: GenderRow) -> Result<Self, Self::Error> {
        let gender_type = row.gender_type.as_deref().map(str::parse).transpose()?;
        Ok(Self {
            id: row.id,
            account_id: row.account_id,
            name: row.name,
            gender_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Shape returned by the list and create endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub gender_type: Option<GenderType>,
    #[serde(rename = "numberOfContacts")]
    pub number_of_contacts: i64,
}

impl GenderSummary {
    pub fn from_gender(gender: &Gender, number_of_contacts: i64) -> Self {
        Self {
            id: gender.id,
            name: gender.name.clone(),
            gender_type: gender.gender_type,
            number_of_contacts,
        }
    }
}

/// One entry of the selectable type list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderTypeOption {
    pub id: GenderType,
    pub name: String,
}

/// Values for a new gender row; `name` is already validated
#[derive(Debug, Clone)]
pub struct NewGender {
    pub name: String,
    pub gender_type: Option<GenderType>,
}

/// Fields an update may touch. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct GenderChanges {
    pub name: Option<String>,
    pub gender_type: Option<Option<GenderType>>,
}

/// Deletion acknowledgement body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: bool,
    pub id: i64,
}

impl Deleted {
    pub fn new(id: i64) -> Self {
        Self { deleted: true, id }
    }
}
