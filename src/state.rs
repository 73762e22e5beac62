//! Shared application state for all routes.

use crate::db::Database;
use crate::service::EntityStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub store: EntityStore,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        let store = EntityStore::new(db.clone());
        AppState { db, store }
    }
}
