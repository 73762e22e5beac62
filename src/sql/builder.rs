//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a static table
//! mapping. Every placeholder carries an explicit cast (e.g. `$1::date`) so
//! JSON-sourced parameters bind against the column's real type.

use crate::entity::TableMeta;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from static mappings).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn column_list(meta: &TableMeta) -> String {
    meta.columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn cast_placeholder(meta: &TableMeta, column: &str, n: usize) -> String {
    match meta.sql_type_of(column) {
        Some(t) => format!("${}::{}", n, t),
        None => format!("${}", n),
    }
}

/// SELECT every row, ordered by key for determinism.
pub fn select_all(meta: &TableMeta) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        column_list(meta),
        quoted(meta.table),
        quoted(meta.key)
    );
    q
}

/// SELECT one row by primary key.
pub fn select_by_key(meta: &TableMeta, key: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(key.clone());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        column_list(meta),
        quoted(meta.table),
        quoted(meta.key),
        cast_placeholder(meta, meta.key, n)
    );
    q
}

/// SELECT every row where one column equals a value. Used for loading rows
/// associated with a parent (e.g. income sources by applicant id).
pub fn select_by_column(meta: &TableMeta, column: &str, value: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(value.clone());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} ORDER BY {}",
        column_list(meta),
        quoted(meta.table),
        quoted(column),
        cast_placeholder(meta, column, n),
        quoted(meta.key)
    );
    q
}

/// INSERT: columns and placeholders in mapping order; values from the row
/// object. The key column is omitted unless `include_key` (reference rows
/// carry their natural key; surrogate ids come from the store).
pub fn insert(meta: &TableMeta, row: &Map<String, Value>, include_key: bool) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in meta.columns {
        if c.name == meta.key && !include_key {
            continue;
        }
        let val = row.get(c.name).cloned().unwrap_or(Value::Null);
        let n = q.push_param(val);
        cols.push(quoted(c.name));
        placeholders.push(format!("${}::{}", n, c.sql_type));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(meta.table),
        cols.join(", "),
        placeholders.join(", "),
        column_list(meta)
    );
    q
}

/// UPDATE by key: SET every non-key column present in the row object, in
/// mapping order.
pub fn update(meta: &TableMeta, key: &Value, row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in meta.columns {
        if c.name == meta.key {
            continue;
        }
        let Some(val) = row.get(c.name) else { continue };
        let n = q.push_param(val.clone());
        sets.push(format!("{} = ${}::{}", quoted(c.name), n, c.sql_type));
    }
    let key_param = q.push_param(key.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(meta.table),
        sets.join(", "),
        quoted(meta.key),
        cast_placeholder(meta, meta.key, key_param),
        column_list(meta)
    );
    q
}

/// DELETE by key, returning the key so the caller can tell a miss from a hit.
pub fn delete(meta: &TableMeta, key: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(key.clone());
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        quoted(meta.table),
        quoted(meta.key),
        cast_placeholder(meta, meta.key, n),
        quoted(meta.key)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ColumnDef;
    use serde_json::json;

    const META: TableMeta = TableMeta {
        table: "loans",
        key: "id",
        columns: &[
            ColumnDef { name: "id", sql_type: "bigint" },
            ColumnDef { name: "loan_type", sql_type: "text" },
            ColumnDef { name: "value_of_purchase", sql_type: "double precision" },
        ],
    };

    fn row() -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("loan_type".into(), json!("Home Loan"));
        m.insert("value_of_purchase".into(), json!(250000.0));
        m
    }

    #[test]
    fn insert_without_key_omits_the_key_column() {
        let q = insert(&META, &row(), false);
        assert_eq!(
            q.sql,
            "INSERT INTO \"loans\" (\"loan_type\", \"value_of_purchase\") \
             VALUES ($1::text, $2::double precision) \
             RETURNING \"id\", \"loan_type\", \"value_of_purchase\""
        );
        assert_eq!(q.params, vec![json!("Home Loan"), json!(250000.0)]);
    }

    #[test]
    fn insert_with_key_binds_it_first() {
        let mut r = row();
        r.insert("id".into(), json!(9));
        let q = insert(&META, &r, true);
        assert!(q.sql.starts_with(
            "INSERT INTO \"loans\" (\"id\", \"loan_type\", \"value_of_purchase\") VALUES ($1::bigint"
        ));
        assert_eq!(q.params[0], json!(9));
    }

    #[test]
    fn update_sets_non_key_columns_and_filters_by_key() {
        let q = update(&META, &json!(9), &row());
        assert_eq!(
            q.sql,
            "UPDATE \"loans\" SET \"loan_type\" = $1::text, \
             \"value_of_purchase\" = $2::double precision \
             WHERE \"id\" = $3::bigint \
             RETURNING \"id\", \"loan_type\", \"value_of_purchase\""
        );
        assert_eq!(q.params.len(), 3);
        assert_eq!(q.params[2], json!(9));
    }

    #[test]
    fn delete_returns_key_only() {
        let q = delete(&META, &json!(9));
        assert_eq!(
            q.sql,
            "DELETE FROM \"loans\" WHERE \"id\" = $1::bigint RETURNING \"id\""
        );
    }

    #[test]
    fn select_by_key_casts_the_parameter() {
        let q = select_by_key(&META, &json!(42));
        assert!(q.sql.ends_with("WHERE \"id\" = $1::bigint"));
        assert_eq!(q.params, vec![json!(42)]);
    }

    #[test]
    fn select_by_column_filters_on_that_column() {
        let q = select_by_column(&META, "loan_type", &json!("Home Loan"));
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"loan_type\", \"value_of_purchase\" FROM \"loans\" \
             WHERE \"loan_type\" = $1::text ORDER BY \"id\""
        );
        assert_eq!(q.params, vec![json!("Home Loan")]);
    }

    #[test]
    fn select_all_orders_by_key() {
        let q = select_all(&META);
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"loan_type\", \"value_of_purchase\" FROM \"loans\" ORDER BY \"id\""
        );
        assert!(q.params.is_empty());
    }
}
