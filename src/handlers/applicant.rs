//! Loan applicant handlers: list, fetch, composite create, update, delete.

use crate::error::AppError;
use crate::model::{IncomeSource, LoanApplicant, RecurringExpense};
use crate::response;
use crate::service::{self, validation};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Deserialize)]
pub struct NewIncomeSource {
    pub income_type: String,
    pub monthly_income: f64,
}

#[derive(Deserialize)]
pub struct NewRecurringExpense {
    pub expense_type: String,
    pub monthly_expense: f64,
    pub currency: String,
}

/// Create payload: the applicant together with its income sources and
/// recurring expenses, stored as one atomic unit.
#[derive(Deserialize)]
pub struct CreateLoanApplicant {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub mobile_number: String,
    pub email_address: String,
    #[serde(default)]
    pub income_sources: Vec<NewIncomeSource>,
    #[serde(default)]
    pub recurring_expenses: Vec<NewRecurringExpense>,
}

/// Detail view: the applicant together with its income sources and recurring
/// expenses.
#[derive(Serialize)]
pub struct ApplicantDetails {
    #[serde(flatten)]
    pub applicant: LoanApplicant,
    pub income_sources: Vec<IncomeSource>,
    pub recurring_expenses: Vec<RecurringExpense>,
}

/// Update payload: whole-entity overwrite, id taken from the path.
#[derive(Deserialize)]
pub struct UpdateLoanApplicant {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub mobile_number: String,
    pub email_address: String,
}

fn validate_person(
    email_address: &str,
    mobile_number: &str,
    date_of_birth: NaiveDate,
) -> Result<(), AppError> {
    validation::email(email_address)?;
    validation::mobile_number(mobile_number)?;
    validation::date_of_birth(date_of_birth, Utc::now().date_naive())?;
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let applicants = state.store.find_all::<LoanApplicant>().await?;
    Ok(response::ok_many(applicants))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let details = state
        .db
        .execute(true, move |conn| {
            Box::pin(async move {
                let applicant = service::fetch_by_key::<LoanApplicant>(conn, &id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("no loan applicant with id {}", id))
                    })?;
                let income_sources =
                    service::fetch_by_column::<IncomeSource>(conn, "applicant_id", &json!(id))
                        .await?;
                let recurring_expenses =
                    service::fetch_by_column::<RecurringExpense>(conn, "applicant_id", &json!(id))
                        .await?;
                Ok(ApplicantDetails {
                    applicant,
                    income_sources,
                    recurring_expenses,
                })
            })
        })
        .await?;
    Ok(response::ok_one(details))
}

/// Create the applicant and its income sources and recurring expenses in one
/// transaction: either all rows land or none do.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateLoanApplicant>,
) -> Result<impl IntoResponse, AppError> {
    validate_person(
        &payload.email_address,
        &payload.mobile_number,
        payload.date_of_birth,
    )?;
    for source in &payload.income_sources {
        validation::monetary_value(source.monthly_income)?;
    }
    for expense in &payload.recurring_expenses {
        validation::monetary_value(expense.monthly_expense)?;
    }

    let CreateLoanApplicant {
        first_name,
        last_name,
        date_of_birth,
        mobile_number,
        email_address,
        income_sources,
        recurring_expenses,
    } = payload;
    let applicant = LoanApplicant {
        id: None,
        first_name,
        last_name,
        date_of_birth,
        mobile_number,
        email_address,
    };

    let saved = state
        .db
        .execute(true, move |conn| {
            Box::pin(async move {
                let saved = service::insert_row(conn, &applicant, false).await?;
                let applicant_id = saved.id.ok_or_else(|| {
                    AppError::Db(sqlx::Error::Protocol(
                        "insert returned no generated applicant id".into(),
                    ))
                })?;
                for source in income_sources {
                    let row = IncomeSource {
                        id: None,
                        applicant_id,
                        income_type: source.income_type,
                        monthly_income: source.monthly_income,
                    };
                    service::insert_row(conn, &row, false).await?;
                }
                for expense in recurring_expenses {
                    let row = RecurringExpense {
                        id: None,
                        applicant_id,
                        expense_type: expense.expense_type,
                        monthly_expense: expense.monthly_expense,
                        currency: expense.currency,
                    };
                    service::insert_row(conn, &row, false).await?;
                }
                Ok(saved)
            })
        })
        .await?;
    tracing::info!(id = saved.id, "created loan applicant");
    Ok(response::created(saved))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLoanApplicant>,
) -> Result<impl IntoResponse, AppError> {
    validate_person(
        &payload.email_address,
        &payload.mobile_number,
        payload.date_of_birth,
    )?;
    let applicant = LoanApplicant {
        id: Some(id),
        first_name: payload.first_name,
        last_name: payload.last_name,
        date_of_birth: payload.date_of_birth,
        mobile_number: payload.mobile_number,
        email_address: payload.email_address,
    };
    let updated = state.store.update(applicant).await?;
    Ok(response::ok_one(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.store.delete::<LoanApplicant>(id).await?;
    Ok(response::ok_message(format!("deleted loan applicant {}", id)))
}
