use api_types::health::{DatabaseState, HealthResponse};
use axum::{Json, extract::State};
use chrono::Utc;
use engine::StoreStatus;

use crate::server::ServerState;

async fn report(state: &ServerState, message: &str) -> Json<HealthResponse> {
    let database = match state.engine.store_status().await {
        StoreStatus::Connected => DatabaseState::Connected,
        StoreStatus::Disconnected => DatabaseState::Disconnected,
    };

    Json(HealthResponse {
        status: "OK".to_string(),
        message: message.to_string(),
        database,
        timestamp: Utc::now(),
    })
}

pub async fn root(State(state): State<ServerState>) -> Json<HealthResponse> {
    report(&state, "Money Manager API is running").await
}

/// Liveness probe. Always 200, the database state is informational.
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    report(&state, "Server is running").await
}
