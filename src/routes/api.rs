//! Entity routes.

use crate::handlers::{applicant, loan, reference};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/loanApplicants",
            get(applicant::list).post(applicant::create),
        )
        .route(
            "/loanApplicants/:id",
            get(applicant::get)
                .patch(applicant::update)
                .delete(applicant::delete),
        )
        .route("/loans", get(loan::list).post(loan::create))
        .route(
            "/loans/:id",
            get(loan::get).patch(loan::update).delete(loan::delete),
        )
        .route("/currencies", get(reference::currencies))
        .route("/loanTypes", get(reference::loan_types))
        .with_state(state)
}
