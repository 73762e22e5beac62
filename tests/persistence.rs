//! Database-backed tests for the persistence core. They need a running
//! PostgreSQL (DB_HOST/DB_PORT/DB_USER/DB_PASSWORD env vars, defaults
//! localhost:5432 postgres/postgres) and are ignored by default:
//!
//!     cargo test -- --ignored
//!
//! Each test initialises its own database, so runs are isolated and
//! repeatable.

use chrono::NaiveDate;
use loanbook::config::DbConfig;
use loanbook::db::Database;
use loanbook::defs::{CurrencyDef, ACCEPTED_CURRENCIES};
use loanbook::error::AppError;
use loanbook::model::{Currency, Loan, LoanApplicant};
use loanbook::service::{self, sync, EntityStore};
use std::sync::Arc;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

async fn test_db(name: &str) -> Arc<Database> {
    let config = DbConfig {
        host: env_or("DB_HOST", "localhost"),
        port: env_or("DB_PORT", "5432").parse().expect("DB_PORT"),
        user: env_or("DB_USER", "postgres"),
        password: env_or("DB_PASSWORD", "postgres"),
        name: name.to_string(),
    };
    let db = Database::initialize(&config).await.expect("database init");
    Arc::new(db)
}

async fn wipe(db: &Database) {
    db.execute(true, |conn| {
        Box::pin(async move {
            for table in [
                "loans",
                "income_sources",
                "recurring_expenses",
                "loan_applicants",
                "currencies",
                "loan_types",
            ] {
                sqlx::query(&format!("DELETE FROM {}", table))
                    .execute(&mut *conn)
                    .await?;
            }
            Ok(())
        })
    })
    .await
    .expect("wipe tables");
}

fn applicant(id: Option<i64>) -> LoanApplicant {
    LoanApplicant {
        id,
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 14).unwrap(),
        mobile_number: "+44 7700 900123".into(),
        email_address: "ada@example.com".into(),
    }
}

async fn currency_codes(store: &EntityStore) -> Vec<String> {
    let mut codes: Vec<String> = store
        .find_all::<Currency>()
        .await
        .expect("find_all currencies")
        .into_iter()
        .map(|c| c.code)
        .collect();
    codes.sort();
    codes
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn save_rejects_a_preassigned_identifier() {
    let db = test_db("loanbook_test_illegal_id").await;
    let store = EntityStore::new(db);
    let result = store.save(applicant(Some(7))).await;
    assert!(matches!(result, Err(AppError::IllegalId(_))));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn saved_applicant_round_trips() {
    let db = test_db("loanbook_test_round_trip").await;
    wipe(&db).await;
    let store = EntityStore::new(db);

    let saved = store.save(applicant(None)).await.expect("save");
    let id = saved.id.expect("generated id");

    let found = store
        .find_by_id::<LoanApplicant>(id)
        .await
        .expect("find")
        .expect("present");
    assert_eq!(found, applicant(Some(id)));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn find_by_id_miss_is_absent_not_an_error() {
    let db = test_db("loanbook_test_absent").await;
    wipe(&db).await;
    let store = EntityStore::new(db);
    let found = store.find_by_id::<Loan>(42).await.expect("lookup");
    assert!(found.is_none());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn update_of_missing_row_is_not_found() {
    let db = test_db("loanbook_test_update_missing").await;
    wipe(&db).await;
    let store = EntityStore::new(db);
    let result = store.update(applicant(Some(4242))).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn delete_of_missing_row_is_not_found() {
    let db = test_db("loanbook_test_delete_missing").await;
    wipe(&db).await;
    let store = EntityStore::new(db);
    let result = store.delete::<LoanApplicant>(4242).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn update_overwrites_the_matching_row() {
    let db = test_db("loanbook_test_update").await;
    wipe(&db).await;
    let store = EntityStore::new(db);

    let saved = store.save(applicant(None)).await.expect("save");
    let mut changed = saved.clone();
    changed.email_address = "countess@example.com".into();
    let updated = store.update(changed.clone()).await.expect("update");
    assert_eq!(updated, changed);

    let found = store
        .find_by_id::<LoanApplicant>(saved.id.unwrap())
        .await
        .expect("find")
        .expect("present");
    assert_eq!(found.email_address, "countess@example.com");
}

const EUR_USD: &[CurrencyDef] = &[
    CurrencyDef { code: "EUR", symbol: "€" },
    CurrencyDef { code: "USD", symbol: "$" },
];

const EUR_GBP: &[CurrencyDef] = &[
    CurrencyDef { code: "EUR", symbol: "€" },
    CurrencyDef { code: "GBP", symbol: "£" },
];

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn reconciliation_converges_from_any_prior_state() {
    let db = test_db("loanbook_test_reconcile").await;
    wipe(&db).await;
    let store = EntityStore::new(db.clone());

    // Empty table: both definitions inserted.
    let report = sync::synchronise::<Currency, _>(&db, EUR_USD)
        .await
        .expect("sync");
    assert_eq!((report.inserted, report.updated, report.deleted), (2, 0, 0));
    assert_eq!(currency_codes(&store).await, ["EUR", "USD"]);

    // Partial overlap: GBP inserted, USD removed, EUR kept.
    let report = sync::synchronise::<Currency, _>(&db, EUR_GBP)
        .await
        .expect("sync");
    assert_eq!((report.inserted, report.updated, report.deleted), (1, 1, 1));
    assert_eq!(currency_codes(&store).await, ["EUR", "GBP"]);

    let pound = store
        .find_by_id::<Currency>("GBP".to_string())
        .await
        .expect("find")
        .expect("present");
    assert_eq!(pound.symbol, "£");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn reconciliation_is_idempotent() {
    let db = test_db("loanbook_test_idempotent").await;
    wipe(&db).await;
    let store = EntityStore::new(db.clone());

    sync::synchronise::<Currency, _>(&db, ACCEPTED_CURRENCIES)
        .await
        .expect("first sync");
    let before = store.find_all::<Currency>().await.expect("find_all");

    let report = sync::synchronise::<Currency, _>(&db, ACCEPTED_CURRENCIES)
        .await
        .expect("second sync");
    assert_eq!(report.inserted, 0);
    assert_eq!(report.deleted, 0);

    let after = store.find_all::<Currency>().await.expect("find_all");
    assert_eq!(before, after);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn failed_unit_of_work_leaves_no_writes_behind() {
    let db = test_db("loanbook_test_atomic").await;
    wipe(&db).await;
    let store = EntityStore::new(db.clone());

    let first = applicant(None);
    let second = applicant(None);
    let result: Result<(), AppError> = db
        .execute(true, move |conn| {
            Box::pin(async move {
                service::insert_row(conn, &first, false).await?;
                service::insert_row(conn, &second, false).await?;
                Err(AppError::Validation("forced failure".into()))
            })
        })
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let rows = store.find_all::<LoanApplicant>().await.expect("find_all");
    assert!(rows.is_empty(), "partial writes must not be visible");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL; configure DB_* env vars"]
async fn sessions_cannot_be_opened_after_shutdown() {
    let db = test_db("loanbook_test_shutdown").await;
    db.close().await;
    let result = db.open_session().await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}
