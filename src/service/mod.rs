//! EntityStore: generic CRUD, one transaction per operation; sync: reference
//! definition reconciliation; validation: field checks applied by callers.

mod crud;
pub mod sync;
pub mod validation;
pub use crud::{
    delete_row, fetch_all, fetch_by_column, fetch_by_key, insert_row, update_row, EntityStore,
};
