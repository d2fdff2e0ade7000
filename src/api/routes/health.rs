use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub dimension: usize,
}

/// The encoder is loaded before the listener is bound, so a process that
/// answers at all is healthy.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let info = state.embedding_service.model_info();
    Json(HealthResponse {
        status: "healthy".into(),
        model: info.model,
        dimension: info.dimension,
    })
}
