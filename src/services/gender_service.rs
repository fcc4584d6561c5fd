use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::collation::sort_by_collator;
use crate::database::manager::DatabaseError;
use crate::database::models::{
    Deleted, Gender, GenderChanges, GenderSummary, GenderType, GenderTypeOption, NewGender,
};
use crate::database::repository::{GenderStore, ReplaceOutcome};
use crate::i18n::{gender_type_key, Translator, GENDERS_MODAL_ERROR};

pub const NAME_MAX_LENGTH: usize = 255;

#[derive(Debug, thiserror::Error)]
pub enum GenderError {
    #[error("validation failed")]
    Validation(HashMap<String, Vec<String>>),
    #[error("gender {0} not found")]
    NotFound(i64),
    #[error("{message}")]
    InvalidReplacement { message: String },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Who is calling: every operation is scoped to this account and rendered in this locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountContext {
    pub account_id: i64,
    pub locale: &'static str,
}

/// Body of a create request. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateGenderRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub gender_type: Option<GenderType>,
}

/// Body of an update request. Only `name` and `type` are read; an absent
/// key leaves the column alone, `"type": null` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGenderRequest {
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_present")]
    pub gender_type: Option<Option<GenderType>>,
}

fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl CreateGenderRequest {
    /// Name is required (blank counts as missing) and at most 255 characters
    pub fn validate(self) -> Result<NewGender, GenderError> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push("The name field is required.".to_string());
        } else if name.chars().count() > NAME_MAX_LENGTH {
            errors.push(format!(
                "The name may not be greater than {} characters.",
                NAME_MAX_LENGTH
            ));
        }

        if !errors.is_empty() {
            return Err(GenderError::Validation(HashMap::from([(
                "name".to_string(),
                errors,
            )])));
        }

        Ok(NewGender {
            name: name.to_string(),
            gender_type: self.gender_type,
        })
    }
}

impl From<UpdateGenderRequest> for GenderChanges {
    fn from(request: UpdateGenderRequest) -> Self {
        Self {
            name: request.name,
            gender_type: request.gender_type,
        }
    }
}

/// Gender settings operations on top of a [`GenderStore`]
#[derive(Clone)]
pub struct GenderService {
    store: Arc<dyn GenderStore>,
    translator: Translator,
}

impl GenderService {
    pub fn new(store: Arc<dyn GenderStore>, translator: Translator) -> Self {
        Self { store, translator }
    }

    pub fn store(&self) -> &Arc<dyn GenderStore> {
        &self.store
    }

    /// Build the explicit caller context from the account and requested locale
    pub fn context(&self, account_id: i64, locale: Option<&str>) -> AccountContext {
        AccountContext {
            account_id,
            locale: self.translator.resolve(locale),
        }
    }

    /// Genders of the account with contact counts, sorted by collated name
    pub async fn list(&self, ctx: &AccountContext) -> Result<Vec<GenderSummary>, GenderError> {
        let mut genders: Vec<GenderSummary> = self
            .store
            .list_with_counts(ctx.account_id)
            .await?
            .iter()
            .map(|(gender, count)| GenderSummary::from_gender(gender, *count))
            .collect();

        sort_by_collator(&mut genders, ctx.locale, |g| g.name.as_str());
        Ok(genders)
    }

    /// The five sex types with localized labels, sorted by collated label
    pub fn types(&self, ctx: &AccountContext) -> Vec<GenderTypeOption> {
        let mut types: Vec<GenderTypeOption> = GenderType::ALL
            .into_iter()
            .map(|t| GenderTypeOption {
                id: t,
                name: self.translator.trans(ctx.locale, &gender_type_key(t.label_key())),
            })
            .collect();

        sort_by_collator(&mut types, ctx.locale, |t| t.name.as_str());
        types
    }

    /// Resolve a gender owned by the account, 404 otherwise
    pub async fn find(&self, ctx: &AccountContext, id: i64) -> Result<Gender, GenderError> {
        self.store
            .find(ctx.account_id, id)
            .await?
            .ok_or(GenderError::NotFound(id))
    }

    pub async fn create(
        &self,
        ctx: &AccountContext,
        request: CreateGenderRequest,
    ) -> Result<GenderSummary, GenderError> {
        let new_gender = request.validate()?;
        let gender = self.store.insert(ctx.account_id, new_gender).await?;
        let contacts = self.store.count_contacts(ctx.account_id, gender.id).await?;

        info!("Created gender {} for account {}", gender.id, ctx.account_id);
        Ok(GenderSummary::from_gender(&gender, contacts))
    }

    pub async fn update(
        &self,
        ctx: &AccountContext,
        gender: &Gender,
        request: UpdateGenderRequest,
    ) -> Result<Gender, GenderError> {
        self.store
            .update(ctx.account_id, gender.id, request.into())
            .await?
            .ok_or(GenderError::NotFound(gender.id))
    }

    /// Move the account's contacts from `gender` to `replacement_id`, then delete `gender`
    pub async fn destroy_and_replace(
        &self,
        ctx: &AccountContext,
        gender: &Gender,
        replacement_id: i64,
    ) -> Result<Deleted, GenderError> {
        // A gender cannot absorb its own contacts: it is about to disappear
        let outcome = if replacement_id == gender.id {
            ReplaceOutcome::ReplacementMissing
        } else {
            self.store
                .replace_and_delete(ctx.account_id, gender.id, replacement_id)
                .await?
        };

        match outcome {
            ReplaceOutcome::Replaced { reassigned_contacts } => {
                info!(
                    "Deleted gender {} of account {}, {} contacts moved to gender {}",
                    gender.id, ctx.account_id, reassigned_contacts, replacement_id
                );
                Ok(Deleted::new(gender.id))
            }
            ReplaceOutcome::ReplacementMissing => Err(GenderError::InvalidReplacement {
                message: self.translator.trans(ctx.locale, GENDERS_MODAL_ERROR),
            }),
            ReplaceOutcome::TargetMissing => Err(GenderError::NotFound(gender.id)),
        }
    }

    /// Delete without touching contacts; references to it are left as they are
    pub async fn destroy(&self, ctx: &AccountContext, gender: &Gender) -> Result<Deleted, GenderError> {
        if self.store.delete(ctx.account_id, gender.id).await? {
            info!("Deleted gender {} of account {}", gender.id, ctx.account_id);
        }
        Ok(Deleted::new(gender.id))
    }
}
