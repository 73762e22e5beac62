//! Loan handlers: list, fetch, create, update, delete.

use crate::error::AppError;
use crate::model::{Currency, Loan, LoanApplicant, LoanType};
use crate::response;
use crate::service::validation;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoanPayload {
    pub applicant_id: i64,
    pub loan_type: String,
    pub value_of_purchase: f64,
    pub currency: String,
}

/// Resolve the referenced applicant, loan type, and currency before writing,
/// so a dangling reference surfaces as NotFound rather than a raw FK error.
async fn resolve_references(state: &AppState, payload: &LoanPayload) -> Result<(), AppError> {
    state
        .store
        .find_by_id::<LoanApplicant>(payload.applicant_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("no loan applicant with id {}", payload.applicant_id))
        })?;
    state
        .store
        .find_by_id::<LoanType>(payload.loan_type.clone())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("unknown loan type '{}'", payload.loan_type)))?;
    state
        .store
        .find_by_id::<Currency>(payload.currency.clone())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("unknown currency '{}'", payload.currency)))?;
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let loans = state.store.find_all::<Loan>().await?;
    Ok(response::ok_many(loans))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let loan = state
        .store
        .find_by_id::<Loan>(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no loan with id {}", id)))?;
    Ok(response::ok_one(loan))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<LoanPayload>,
) -> Result<impl IntoResponse, AppError> {
    validation::monetary_value(payload.value_of_purchase)?;
    resolve_references(&state, &payload).await?;
    let saved = state
        .store
        .save(Loan {
            id: None,
            applicant_id: payload.applicant_id,
            loan_type: payload.loan_type,
            value_of_purchase: payload.value_of_purchase,
            currency: payload.currency,
        })
        .await?;
    tracing::info!(id = saved.id, "created loan");
    Ok(response::created(saved))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LoanPayload>,
) -> Result<impl IntoResponse, AppError> {
    validation::monetary_value(payload.value_of_purchase)?;
    resolve_references(&state, &payload).await?;
    let updated = state
        .store
        .update(Loan {
            id: Some(id),
            applicant_id: payload.applicant_id,
            loan_type: payload.loan_type,
            value_of_purchase: payload.value_of_purchase,
            currency: payload.currency,
        })
        .await?;
    Ok(response::ok_one(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.store.delete::<Loan>(id).await?;
    Ok(response::ok_message(format!("deleted loan {}", id)))
}
