//! Entity CRUD routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use paddock_engine::JsonRecord;
use serde_json::Value;

use crate::error::Result;
use crate::handlers::{handle_create, handle_delete, handle_get, handle_list, handle_update};
use crate::AppState;

/// Create entity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entities/{kind}", get(list_handler).post(create_handler))
        .route(
            "/entities/{kind}/{id}",
            get(get_handler).patch(update_handler).delete(delete_handler),
        )
}

/// GET /entities/{kind} - List records of a kind.
async fn list_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<JsonRecord>>> {
    let records = handle_list(&state, &kind)?;
    Ok(Json(records))
}

/// POST /entities/{kind} - Create a record.
async fn create_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<JsonRecord>)> {
    let record = handle_create(&state, &kind, body)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /entities/{kind}/{id} - Fetch a record.
async fn get_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<JsonRecord>> {
    let record = handle_get(&state, &kind, &id)?;
    Ok(Json(record))
}

/// PATCH /entities/{kind}/{id} - Merge fields into a record.
async fn update_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<JsonRecord>> {
    let record = handle_update(&state, &kind, &id, body)?;
    Ok(Json(record))
}

/// DELETE /entities/{kind}/{id} - Delete a record.
async fn delete_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    handle_delete(&state, &kind, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
