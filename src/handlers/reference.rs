//! Read-only reference data: currencies and loan types. Rows are owned by
//! the startup definition sync; there is no write surface here.

use crate::error::AppError;
use crate::model::{Currency, LoanType};
use crate::response;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;

pub async fn currencies(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let currencies = state.store.find_all::<Currency>().await?;
    Ok(response::ok_many(currencies))
}

pub async fn loan_types(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let loan_types = state.store.find_all::<LoanType>().await?;
    Ok(response::ok_many(loan_types))
}
