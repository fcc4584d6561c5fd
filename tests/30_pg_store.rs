// Runs against the database in DATABASE_URL; each test is skipped when it is unset.
// Every test works in a fresh account id so runs can share one database.

use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::{Context, Result};
use sqlx::PgPool;

use genders_api::config::DatabaseConfig;
use genders_api::database::models::{GenderChanges, GenderType, NewGender};
use genders_api::database::{DatabaseManager, GenderStore, PgGenderStore, ReplaceOutcome};

static NEXT_ACCOUNT: AtomicI64 = AtomicI64::new(0);

struct Fixture {
    pool: PgPool,
    store: PgGenderStore,
    account_id: i64,
}

impl Fixture {
    async fn connect() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres store test");
            return Ok(None);
        };

        let config = DatabaseConfig {
            url: Some(url),
            max_connections: 5,
            connection_timeout: 10,
            run_migrations: true,
        };
        let pool = DatabaseManager::connect(&config).await?;
        DatabaseManager::migrate(&pool).await?;

        // Odd neighbours stay free for the "other account" in each test
        let account_id = chrono::Utc::now().timestamp_micros() * 1000
            + 2 * NEXT_ACCOUNT.fetch_add(1, Ordering::SeqCst);

        Ok(Some(Self {
            store: PgGenderStore::new(pool.clone()),
            pool,
            account_id,
        }))
    }

    async fn gender(&self, name: &str, gender_type: Option<GenderType>) -> Result<i64> {
        let gender = self
            .store
            .insert(
                self.account_id,
                NewGender {
                    name: name.to_string(),
                    gender_type,
                },
            )
            .await?;
        Ok(gender.id)
    }

    async fn contact(&self, account_id: i64, gender_id: Option<i64>) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO contacts (account_id, first_name, gender_id) VALUES ($1, 'Test', $2) RETURNING id",
        )
        .bind(account_id)
        .bind(gender_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn contact_gender(&self, contact_id: i64) -> Result<Option<i64>> {
        let gender_id = sqlx::query_scalar::<_, Option<i64>>("SELECT gender_id FROM contacts WHERE id = $1")
            .bind(contact_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(gender_id)
    }
}

#[tokio::test]
async fn update_changes_only_given_columns() -> Result<()> {
    let Some(fx) = Fixture::connect().await? else {
        return Ok(());
    };
    let id = fx.gender("Man", Some(GenderType::Male)).await?;

    let renamed = fx
        .store
        .update(
            fx.account_id,
            id,
            GenderChanges {
                name: Some("Guy".to_string()),
                ..Default::default()
            },
        )
        .await?
        .context("gender should exist")?;
    assert_eq!(renamed.name, "Guy");
    assert_eq!(renamed.gender_type, Some(GenderType::Male));

    let retyped = fx
        .store
        .update(
            fx.account_id,
            id,
            GenderChanges {
                name: None,
                gender_type: Some(Some(GenderType::Other)),
            },
        )
        .await?
        .context("gender should exist")?;
    assert_eq!(retyped.name, "Guy");
    assert_eq!(retyped.gender_type, Some(GenderType::Other));

    let cleared = fx
        .store
        .update(
            fx.account_id,
            id,
            GenderChanges {
                name: None,
                gender_type: Some(None),
            },
        )
        .await?
        .context("gender should exist")?;
    assert_eq!(cleared.name, "Guy");
    assert_eq!(cleared.gender_type, None);

    let untouched = fx
        .store
        .update(fx.account_id, id, GenderChanges::default())
        .await?
        .context("gender should exist")?;
    assert_eq!(untouched.name, "Guy");
    assert_eq!(untouched.gender_type, None);
    Ok(())
}

#[tokio::test]
async fn update_is_scoped_and_bounded_by_the_column() -> Result<()> {
    let Some(fx) = Fixture::connect().await? else {
        return Ok(());
    };
    let id = fx.gender("Man", None).await?;

    let foreign = fx
        .store
        .update(
            fx.account_id + 1,
            id,
            GenderChanges {
                name: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert!(foreign.is_none());

    let too_wide = GenderChanges {
        name: Some("x".repeat(300)),
        ..Default::default()
    };
    assert!(fx.store.update(fx.account_id, id, too_wide).await.is_err());

    let gender = fx.store.find(fx.account_id, id).await?.context("gender should exist")?;
    assert_eq!(gender.name, "Man");
    Ok(())
}

#[tokio::test]
async fn counts_only_the_accounts_contacts() -> Result<()> {
    let Some(fx) = Fixture::connect().await? else {
        return Ok(());
    };
    let used = fx.gender("Woman", None).await?;
    let unused = fx.gender("Man", None).await?;
    fx.contact(fx.account_id, Some(used)).await?;
    fx.contact(fx.account_id, Some(used)).await?;
    fx.contact(fx.account_id, None).await?;
    fx.contact(fx.account_id + 1, Some(used)).await?;

    let mut listed: Vec<(i64, i64)> = fx
        .store
        .list_with_counts(fx.account_id)
        .await?
        .into_iter()
        .map(|(gender, count)| (gender.id, count))
        .collect();
    listed.sort();
    assert_eq!(listed, vec![(used, 2), (unused, 0)]);

    assert_eq!(fx.store.count_contacts(fx.account_id, used).await?, 2);
    assert_eq!(fx.store.count_contacts(fx.account_id, unused).await?, 0);
    Ok(())
}

#[tokio::test]
async fn replace_moves_contacts_then_deletes() -> Result<()> {
    let Some(fx) = Fixture::connect().await? else {
        return Ok(());
    };
    let old = fx.gender("Old", None).await?;
    let new = fx.gender("New", None).await?;
    let mine = [
        fx.contact(fx.account_id, Some(old)).await?,
        fx.contact(fx.account_id, Some(old)).await?,
    ];
    let theirs = fx.contact(fx.account_id + 1, Some(old)).await?;

    let outcome = fx.store.replace_and_delete(fx.account_id, old, new).await?;
    assert_eq!(outcome, ReplaceOutcome::Replaced { reassigned_contacts: 2 });

    for contact in mine {
        assert_eq!(fx.contact_gender(contact).await?, Some(new));
    }
    assert_eq!(fx.contact_gender(theirs).await?, Some(old));
    assert!(fx.store.find(fx.account_id, old).await?.is_none());
    assert!(fx.store.find(fx.account_id, new).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn replace_with_missing_rows_changes_nothing() -> Result<()> {
    let Some(fx) = Fixture::connect().await? else {
        return Ok(());
    };
    let id = fx.gender("Only", None).await?;
    let contact = fx.contact(fx.account_id, Some(id)).await?;

    let other_account = Fixture {
        pool: fx.pool.clone(),
        store: PgGenderStore::new(fx.pool.clone()),
        account_id: fx.account_id + 1,
    };
    let foreign = other_account.gender("Foreign", None).await?;

    for replacement in [i64::MAX, foreign] {
        assert_eq!(
            fx.store.replace_and_delete(fx.account_id, id, replacement).await?,
            ReplaceOutcome::ReplacementMissing
        );
    }
    assert_eq!(
        fx.store.replace_and_delete(fx.account_id, i64::MAX, id).await?,
        ReplaceOutcome::TargetMissing
    );

    assert!(fx.store.find(fx.account_id, id).await?.is_some());
    assert_eq!(fx.contact_gender(contact).await?, Some(id));
    Ok(())
}

#[tokio::test]
async fn crossed_replacements_do_not_deadlock() -> Result<()> {
    let Some(fx) = Fixture::connect().await? else {
        return Ok(());
    };
    let a = fx.gender("A", None).await?;
    let b = fx.gender("B", None).await?;
    let contact = fx.contact(fx.account_id, Some(a)).await?;

    let (first, second) = tokio::join!(
        fx.store.replace_and_delete(fx.account_id, a, b),
        fx.store.replace_and_delete(fx.account_id, b, a),
    );
    let outcomes = [first?, second?];

    let replaced = outcomes
        .iter()
        .filter(|o| matches!(o, ReplaceOutcome::Replaced { .. }))
        .count();
    assert_eq!(replaced, 1, "outcomes: {:?}", outcomes);

    let remaining = fx.store.list_with_counts(fx.account_id).await?;
    assert_eq!(remaining.len(), 1);
    let survivor = remaining[0].0.id;
    assert_eq!(fx.contact_gender(contact).await?, Some(survivor));
    Ok(())
}

#[tokio::test]
async fn delete_leaves_contacts_alone() -> Result<()> {
    let Some(fx) = Fixture::connect().await? else {
        return Ok(());
    };
    let id = fx.gender("Gone", None).await?;
    let contact = fx.contact(fx.account_id, Some(id)).await?;

    assert!(!fx.store.delete(fx.account_id + 1, id).await?);
    assert!(fx.store.delete(fx.account_id, id).await?);
    assert!(!fx.store.delete(fx.account_id, id).await?);

    assert_eq!(fx.contact_gender(contact).await?, Some(id));
    assert!(fx.store.list_with_counts(fx.account_id).await?.is_empty());
    Ok(())
}
