//! Generic CRUD execution against PostgreSQL.
//!
//! [`EntityStore`] runs each of its five operations as an independent
//! transaction through the executor. The row-level helpers are public so a
//! caller can compose several of them into one atomic unit of work (the
//! applicant create flow, the definition sync).

use crate::db::Database;
use crate::entity::{from_row, to_row, Entity, Key};
use crate::error::AppError;
use crate::sql::{self, PgBindValue, QueryBuf};
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::PgConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct EntityStore {
    db: Arc<Database>,
}

impl EntityStore {
    pub fn new(db: Arc<Database>) -> Self {
        EntityStore { db }
    }

    /// Persist a new row. The entity must not carry a key yet; the returned
    /// entity carries the store-generated one.
    pub async fn save<E: Entity>(&self, entity: E) -> Result<E, AppError> {
        if let Some(key) = entity.key() {
            return Err(AppError::IllegalId(format!(
                "identifier already set on new {} row: {}",
                E::META.table,
                key
            )));
        }
        self.db
            .execute(true, move |conn| {
                Box::pin(async move { insert_row(conn, &entity, false).await })
            })
            .await
    }

    /// Single-row lookup. A miss is an absent result, not an error.
    pub async fn find_by_id<E: Entity>(&self, key: E::Key) -> Result<Option<E>, AppError> {
        self.db
            .execute(true, move |conn| {
                Box::pin(async move { fetch_by_key::<E>(conn, &key).await })
            })
            .await
    }

    /// Every row for the type. Order is not part of the contract.
    pub async fn find_all<E: Entity>(&self) -> Result<Vec<E>, AppError> {
        self.db
            .execute(true, |conn| Box::pin(fetch_all::<E>(conn)))
            .await
    }

    /// Overwrite the row matching the entity's key. The caller is expected to
    /// have resolved existence; a missing row is an error.
    pub async fn update<E: Entity>(&self, entity: E) -> Result<E, AppError> {
        let Some(key) = entity.key() else {
            return Err(AppError::IllegalId(format!(
                "identifier not set on {} row to update",
                E::META.table
            )));
        };
        self.db
            .execute(true, move |conn| {
                Box::pin(async move {
                    update_row(conn, &entity).await?.ok_or_else(|| {
                        AppError::NotFound(format!("no {} row with key {}", E::META.table, key))
                    })
                })
            })
            .await
    }

    /// Remove the row with the given key. A missing row is an error.
    pub async fn delete<E: Entity>(&self, key: E::Key) -> Result<(), AppError> {
        self.db
            .execute(true, move |conn| {
                Box::pin(async move {
                    if delete_row::<E>(conn, &key).await? {
                        Ok(())
                    } else {
                        Err(AppError::NotFound(format!(
                            "no {} row with key {}",
                            E::META.table,
                            key
                        )))
                    }
                })
            })
            .await
    }
}

/// INSERT one entity on the given session; returns the stored row (with the
/// generated key when `include_key` is false).
pub async fn insert_row<E: Entity>(
    conn: &mut PgConnection,
    entity: &E,
    include_key: bool,
) -> Result<E, AppError> {
    let row = to_row(entity)?;
    let q = sql::insert(&E::META, &row, include_key);
    let pg_row = bind_query(&q).fetch_one(conn).await?;
    from_row(row_to_json(&pg_row))
}

/// SELECT one entity by key on the given session.
pub async fn fetch_by_key<E: Entity>(
    conn: &mut PgConnection,
    key: &E::Key,
) -> Result<Option<E>, AppError> {
    let q = sql::select_by_key(&E::META, &key.to_json());
    let pg_row = bind_query(&q).fetch_optional(conn).await?;
    pg_row.map(|r| from_row(row_to_json(&r))).transpose()
}

/// SELECT every entity of the type on the given session.
pub async fn fetch_all<E: Entity>(conn: &mut PgConnection) -> Result<Vec<E>, AppError> {
    let q = sql::select_all(&E::META);
    let rows = bind_query(&q).fetch_all(conn).await?;
    rows.iter().map(|r| from_row(row_to_json(r))).collect()
}

/// SELECT every entity where one column equals a value (e.g. income sources
/// by applicant id) on the given session.
pub async fn fetch_by_column<E: Entity>(
    conn: &mut PgConnection,
    column: &str,
    value: &Value,
) -> Result<Vec<E>, AppError> {
    let q = sql::select_by_column(&E::META, column, value);
    let rows = bind_query(&q).fetch_all(conn).await?;
    rows.iter().map(|r| from_row(row_to_json(r))).collect()
}

/// UPDATE one entity by its key on the given session. Returns the stored row,
/// or `None` when no row matched.
pub async fn update_row<E: Entity>(
    conn: &mut PgConnection,
    entity: &E,
) -> Result<Option<E>, AppError> {
    let Some(key) = entity.key() else {
        return Err(AppError::IllegalId(format!(
            "identifier not set on {} row to update",
            E::META.table
        )));
    };
    let row = to_row(entity)?;
    let q = sql::update(&E::META, &key.to_json(), &row);
    let pg_row = bind_query(&q).fetch_optional(conn).await?;
    pg_row.map(|r| from_row(row_to_json(&r))).transpose()
}

/// DELETE one row by key on the given session. Returns whether a row matched.
pub async fn delete_row<E: Entity>(conn: &mut PgConnection, key: &E::Key) -> Result<bool, AppError> {
    let q = sql::delete(&E::META, &key.to_json());
    let pg_row = bind_query(&q).fetch_optional(conn).await?;
    Ok(pg_row.is_some())
}

fn bind_query(q: &QueryBuf) -> sqlx::query::Query<'_, sqlx::Postgres, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from_json(p));
    }
    query
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        let v = cell_to_value(row, name);
        map.insert(name.to_string(), v);
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}
