//! Service entry point: load config, initialise the database, synchronise
//! reference definitions, then serve the API.

use loanbook::config::AppConfig;
use loanbook::db::Database;
use loanbook::defs::{ACCEPTED_CURRENCIES, ACCEPTED_LOAN_TYPES};
use loanbook::model::{Currency, LoanType};
use loanbook::routes::{api_routes, common_routes};
use loanbook::service::sync;
use loanbook::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("loanbook=info".parse()?))
        .init();

    let config = AppConfig::from_env()?;
    let db = Arc::new(Database::initialize(&config.db).await?);

    // Reference tables must mirror the code-declared definitions before the
    // service accepts any request.
    sync::synchronise::<Currency, _>(&db, ACCEPTED_CURRENCIES).await?;
    sync::synchronise::<LoanType, _>(&db, ACCEPTED_LOAN_TYPES).await?;

    let state = AppState::new(db.clone());
    let app = axum::Router::new()
        .merge(common_routes(state.clone()))
        .merge(api_routes(state))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind((config.api.host.as_str(), config.api.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}
