use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Contact, Gender, GenderChanges, NewGender};
use crate::database::repository::{GenderStore, ReplaceOutcome};

/// Width of `genders.name`, `VARCHAR(255)` in the migration
const NAME_COLUMN_LENGTH: usize = 255;

#[derive(Debug, Default)]
struct Tables {
    genders: BTreeMap<i64, Gender>,
    contacts: BTreeMap<i64, Contact>,
    next_gender_id: i64,
    next_contact_id: i64,
}

impl Tables {
    fn count_contacts(&self, account_id: i64, gender_id: i64) -> i64 {
        self.contacts
            .values()
            .filter(|c| c.account_id == account_id && c.gender_id == Some(gender_id))
            .count() as i64
    }
}

/// Reject what Postgres would refuse to store in `genders.name`
fn check_name_width(name: &str) -> Result<(), DatabaseError> {
    if name.chars().count() > NAME_COLUMN_LENGTH {
        return Err(DatabaseError::QueryError(format!(
            "value too long for type character varying({})",
            NAME_COLUMN_LENGTH
        )));
    }
    Ok(())
}

/// In-process [`GenderStore`]. A single lock over both tables makes every
/// write atomic, matching the transactional Postgres store.
#[derive(Debug, Default)]
pub struct MemoryGenderStore {
    tables: RwLock<Tables>,
}

impl MemoryGenderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a contact; `gender_id` is stored as given, even if it points nowhere.
    pub async fn insert_contact(&self, account_id: i64, first_name: &str, gender_id: Option<i64>) -> i64 {
        let mut tables = self.tables.write().await;
        tables.next_contact_id += 1;
        let id = tables.next_contact_id;
        let now = Utc::now();
        tables.contacts.insert(
            id,
            Contact {
                id,
                account_id,
                first_name: first_name.to_string(),
                gender_id,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub async fn contact(&self, id: i64) -> Option<Contact> {
        self.tables.read().await.contacts.get(&id).cloned()
    }
}

#[async_trait]
impl GenderStore for MemoryGenderStore {
    async fn list_with_counts(&self, account_id: i64) -> Result<Vec<(Gender, i64)>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .genders
            .values()
            .filter(|g| g.account_id == account_id)
            .map(|g| (g.clone(), tables.count_contacts(account_id, g.id)))
            .collect())
    }

    async fn find(&self, account_id: i64, id: i64) -> Result<Option<Gender>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .genders
            .get(&id)
            .filter(|g| g.account_id == account_id)
            .cloned())
    }

    async fn count_contacts(&self, account_id: i64, gender_id: i64) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.count_contacts(account_id, gender_id))
    }

    async fn insert(&self, account_id: i64, gender: NewGender) -> Result<Gender, DatabaseError> {
        check_name_width(&gender.name)?;
        let mut tables = self.tables.write().await;
        tables.next_gender_id += 1;
        let now = Utc::now();
        let row = Gender {
            id: tables.next_gender_id,
            account_id,
            name: gender.name,
            gender_type: gender.gender_type,
            created_at: now,
            updated_at: now,
        };
        tables.genders.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        account_id: i64,
        id: i64,
        changes: GenderChanges,
    ) -> Result<Option<Gender>, DatabaseError> {
        if let Some(name) = &changes.name {
            check_name_width(name)?;
        }
        let mut tables = self.tables.write().await;
        let Some(gender) = tables
            .genders
            .get_mut(&id)
            .filter(|g| g.account_id == account_id)
        else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            gender.name = name;
        }
        if let Some(gender_type) = changes.gender_type {
            gender.gender_type = gender_type;
        }
        gender.updated_at = Utc::now();
        Ok(Some(gender.clone()))
    }

    async fn replace_and_delete(
        &self,
        account_id: i64,
        id: i64,
        replacement_id: i64,
    ) -> Result<ReplaceOutcome, DatabaseError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let owned = |tables: &Tables, gid: i64| {
            tables
                .genders
                .get(&gid)
                .is_some_and(|g| g.account_id == account_id)
        };

        if !owned(tables, replacement_id) {
            return Ok(ReplaceOutcome::ReplacementMissing);
        }
        if !owned(tables, id) {
            return Ok(ReplaceOutcome::TargetMissing);
        }

        let now = Utc::now();
        let mut reassigned = 0;
        for contact in tables
            .contacts
            .values_mut()
            .filter(|c| c.account_id == account_id && c.gender_id == Some(id))
        {
            contact.gender_id = Some(replacement_id);
            contact.updated_at = now;
            reassigned += 1;
        }
        tables.genders.remove(&id);

        Ok(ReplaceOutcome::Replaced {
            reassigned_contacts: reassigned,
        })
    }

    async fn delete(&self, account_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.genders.get(&id).is_some_and(|g| g.account_id == account_id) {
            tables.genders.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
