//! Loanbook: loan-origination record keeping over PostgreSQL.
//!
//! The core is a generic transactional persistence layer: a session provider
//! ([`db::Database`]), a transactional executor ([`db::Database::execute`]),
//! a generic entity store ([`service::EntityStore`]), and a reference
//! definition reconciler ([`service::sync`]). The HTTP layer on top exposes
//! whole-entity CRUD for applicants and loans and read-only reference data.

pub mod config;
pub mod db;
pub mod defs;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use db::Database;
pub use error::{AppError, ConfigError};
pub use service::{sync, EntityStore};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables};
