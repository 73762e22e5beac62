//! Table DDL and database bootstrap. One table per entity type; reference
//! tables are keyed by natural key, everything else by a generated bigint id.

use crate::config::DbConfig;
use crate::error::AppError;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Table definitions in foreign-key dependency order.
const TABLE_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS currencies (
        code TEXT PRIMARY KEY,
        symbol TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS loan_types (
        loan_name TEXT PRIMARY KEY,
        loan_purchase TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS loan_applicants (
        id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        date_of_birth DATE NOT NULL,
        mobile_number TEXT NOT NULL,
        email_address TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS loans (
        id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        applicant_id BIGINT NOT NULL REFERENCES loan_applicants(id),
        loan_type TEXT NOT NULL REFERENCES loan_types(loan_name),
        value_of_purchase DOUBLE PRECISION NOT NULL,
        currency TEXT NOT NULL REFERENCES currencies(code)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS income_sources (
        id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        applicant_id BIGINT NOT NULL REFERENCES loan_applicants(id),
        income_type TEXT NOT NULL,
        monthly_income DOUBLE PRECISION NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recurring_expenses (
        id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        applicant_id BIGINT NOT NULL REFERENCES loan_applicants(id),
        expense_type TEXT NOT NULL,
        monthly_expense DOUBLE PRECISION NOT NULL,
        currency TEXT NOT NULL REFERENCES currencies(code)
    )
    "#,
];

/// Create every table if missing. Idempotent; runs once at startup before
/// any session is handed out.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in TABLE_DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the configured database exists; create it if not. Connects to the
/// maintenance `postgres` database to run CREATE DATABASE. Call before
/// creating the main pool.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<(), AppError> {
    if config.name.is_empty() || config.name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&config.admin_url())
        .map_err(|e| AppError::BadRequest(format!("invalid database config: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&config.name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&config.name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %config.name, "created database");
    }
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
