//! Generic entity abstraction: table identity, key access, and row mapping.
//! Entity-to-table mappings are registered explicitly by implementing [`Entity`],
//! never discovered at runtime.

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A primary-key value. Reference entities use a natural key (`String`);
/// everything else uses a store-generated surrogate id (`i64`).
pub trait Key: Clone + PartialEq + fmt::Display + Send + Sync {
    fn to_json(&self) -> Value;
}

impl Key for i64 {
    fn to_json(&self) -> Value {
        Value::Number((*self).into())
    }
}

impl Key for String {
    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

/// One column of a mapped table. `sql_type` is used to cast bound parameters
/// (e.g. `$1::date`) so JSON-sourced values bind correctly.
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
}

/// Static table mapping for an entity type.
pub struct TableMeta {
    pub table: &'static str,
    /// Primary-key column. Always the first entry of `columns`.
    pub key: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableMeta {
    pub fn sql_type_of(&self, column: &str) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.sql_type)
    }
}

/// A domain record with a unique primary key, mapped to one table.
///
/// Row mapping goes through `serde_json`: an entity serializes to a JSON
/// object keyed by column name, and deserializes back from a row read the
/// same way. The key accessor returns `None` for records not yet persisted.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    type Key: Key;

    const META: TableMeta;

    fn key(&self) -> Option<Self::Key>;
}

/// Serialize an entity into a column-keyed row object.
pub fn to_row<E: Entity>(entity: &E) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Serde(serde::ser::Error::custom(format!(
            "entity for table '{}' serialized to non-object value: {}",
            E::META.table,
            other
        )))),
    }
}

/// Deserialize an entity from a column-keyed row object.
pub fn from_row<E: Entity>(row: Value) -> Result<E, AppError> {
    Ok(serde_json::from_value(row)?)
}
