use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Gender, GenderChanges, GenderRow, NewGender};

/// Result of the transactional reassign-then-delete step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Contacts moved to the replacement, target deleted
    Replaced { reassigned_contacts: u64 },
    /// Replacement gender does not exist in the account; nothing changed
    ReplacementMissing,
    /// Target disappeared before the lock was taken; nothing changed
    TargetMissing,
}

/// Account-scoped access to the `genders` table and the gender
/// reference held by `contacts`. Every method filters by `account_id`.
#[async_trait]
pub trait GenderStore: Send + Sync {
    /// All genders of the account with their contact counts, unordered
    async fn list_with_counts(&self, account_id: i64) -> Result<Vec<(Gender, i64)>, DatabaseError>;

    async fn find(&self, account_id: i64, id: i64) -> Result<Option<Gender>, DatabaseError>;

    /// Contacts of the account that reference `gender_id`
    async fn count_contacts(&self, account_id: i64, gender_id: i64) -> Result<i64, DatabaseError>;

    async fn insert(&self, account_id: i64, gender: NewGender) -> Result<Gender, DatabaseError>;

    async fn update(
        &self,
        account_id: i64,
        id: i64,
        changes: GenderChanges,
    ) -> Result<Option<Gender>, DatabaseError>;

    /// Reassign the account's contacts from `id` to `replacement_id`, then
    /// delete `id`, atomically.
    async fn replace_and_delete(
        &self,
        account_id: i64,
        id: i64,
        replacement_id: i64,
    ) -> Result<ReplaceOutcome, DatabaseError>;

    /// Delete without touching contacts. Returns whether a row was removed.
    async fn delete(&self, account_id: i64, id: i64) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

const GENDER_COLUMNS: &str =
    r#"id, account_id, name, "type" AS gender_type, created_at, updated_at"#;

#[derive(Debug, FromRow)]
struct GenderCountRow {
    #[sqlx(flatten)]
    gender: GenderRow,
    number_of_contacts: i64,
}

fn into_gender(row: GenderRow) -> Result<Gender, DatabaseError> {
    Gender::try_from(row).map_err(|e| DatabaseError::QueryError(e.to_string()))
}

/// Postgres implementation of [`GenderStore`]
#[derive(Clone)]
pub struct PgGenderStore {
    pool: PgPool,
}

impl PgGenderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenderStore for PgGenderStore {
    async fn list_with_counts(&self, account_id: i64) -> Result<Vec<(Gender, i64)>, DatabaseError> {
        let rows = sqlx::query_as::<_, GenderCountRow>(
            r#"
            SELECT g.id, g.account_id, g.name, g."type" AS gender_type,
                   g.created_at, g.updated_at,
                   COUNT(c.id) AS number_of_contacts
            FROM genders g
            LEFT JOIN contacts c ON c.gender_id = g.id AND c.account_id = g.account_id
            WHERE g.account_id = $1
            GROUP BY g.id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Ok((into_gender(row.gender)?, row.number_of_contacts)))
            .collect()
    }

    async fn find(&self, account_id: i64, id: i64) -> Result<Option<Gender>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM genders WHERE id = $1 AND account_id = $2",
            GENDER_COLUMNS
        );
        sqlx::query_as::<_, GenderRow>(&sql)
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .map(into_gender)
            .transpose()
    }

    async fn count_contacts(&self, account_id: i64, gender_id: i64) -> Result<i64, DatabaseError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contacts WHERE account_id = $1 AND gender_id = $2")
                .bind(account_id)
                .bind(gender_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn insert(&self, account_id: i64, gender: NewGender) -> Result<Gender, DatabaseError> {
        let sql = format!(
            r#"INSERT INTO genders (account_id, name, "type") VALUES ($1, $2, $3) RETURNING {}"#,
            GENDER_COLUMNS
        );
        let row = sqlx::query_as::<_, GenderRow>(&sql)
            .bind(account_id)
            .bind(&gender.name)
            .bind(gender.gender_type.map(|t| t.code()))
            .fetch_one(&self.pool)
            .await?;
        into_gender(row)
    }

    async fn update(
        &self,
        account_id: i64,
        id: i64,
        changes: GenderChanges,
    ) -> Result<Option<Gender>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE genders
            SET name = COALESCE($3, name),
                "type" = CASE WHEN $4 THEN $5 ELSE "type" END,
                updated_at = now()
            WHERE id = $1 AND account_id = $2
            RETURNING {}
            "#,
            GENDER_COLUMNS
        );
        let type_given = changes.gender_type.is_some();
        let new_type = changes.gender_type.flatten().map(|t| t.code());

        sqlx::query_as::<_, GenderRow>(&sql)
            .bind(id)
            .bind(account_id)
            .bind(changes.name)
            .bind(type_given)
            .bind(new_type)
            .fetch_optional(&self.pool)
            .await?
            .map(into_gender)
            .transpose()
    }

    async fn replace_and_delete(
        &self,
        account_id: i64,
        id: i64,
        replacement_id: i64,
    ) -> Result<ReplaceOutcome, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Lock both rows in id order so concurrent replaces cannot deadlock
        let locked: Vec<(i64,)> = sqlx::query_as(
            "SELECT id FROM genders WHERE account_id = $1 AND id = ANY($2) ORDER BY id FOR UPDATE",
        )
        .bind(account_id)
        .bind(vec![id, replacement_id])
        .fetch_all(&mut *tx)
        .await?;

        let has = |wanted: i64| locked.iter().any(|(found,)| *found == wanted);
        if !has(replacement_id) {
            tx.rollback().await?;
            return Ok(ReplaceOutcome::ReplacementMissing);
        }
        if !has(id) {
            tx.rollback().await?;
            return Ok(ReplaceOutcome::TargetMissing);
        }

        let reassigned = sqlx::query(
            "UPDATE contacts SET gender_id = $1, updated_at = now() WHERE account_id = $2 AND gender_id = $3",
        )
        .bind(replacement_id)
        .bind(account_id)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM genders WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ReplaceOutcome::Replaced {
            reassigned_contacts: reassigned,
        })
    }

    async fn delete(&self, account_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM genders WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
