use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// `GET /readyz`
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    phonemart_core::health::database_ready(&state.db).await
}
