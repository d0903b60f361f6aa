//! Health check.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.store().ping().await?;
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
