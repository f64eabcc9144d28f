//! Liveness and store summary.

use axum::{extract::State, routing::get, Json, Router};
use paddock_engine::EntityKind;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Total records across every kind.
    pub records: usize,
    /// Records held per entity kind. Empty kinds are left out.
    pub kinds: BTreeMap<EntityKind, usize>,
    /// Kinds configured to fail every mutation.
    pub failing_kinds: Vec<EntityKind>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let kinds = state.store.counts();
    let mut failing_kinds: Vec<_> = state.config.fail_kinds.iter().cloned().collect();
    failing_kinds.sort();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        records: kinds.values().sum(),
        kinds,
        failing_kinds,
    })
}

async fn root() -> &'static str {
    "Paddock Entity Server"
}
