//! Route handlers.

pub mod departments;
pub mod employees;
pub mod health;

use axum::{
    http::{Method, StatusCode, Uri},
    Json,
};
use orgdir_core::DirectoryError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;

/// `filter` and `sort` query parameters of listing routes.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    pub sort: Option<String>,
}

impl ListParams {
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }
}

/// Fallback for paths no route matches.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError(DirectoryError::not_found(format!(
        "No route for '{}'",
        uri.path()
    )))
}

/// Fallback for a known path called with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": format!("Method {} is not allowed on '{}'", method, uri.path())
        })),
    )
}
