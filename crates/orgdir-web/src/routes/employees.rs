//! Employee route handlers.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use orgdir_core::employee::{
    self,
    model::{CreateEmployeeRequest, EmployeeRecord, EmployeeSummary},
};
use orgdir_core::DirectoryError;
use serde_json::{json, Value};

use super::ListParams;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list_employees(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<EmployeeRecord>>> {
    let Query(params) = params?;
    let employees =
        employee::list_employees(state.store(), params.filter(), params.sort()).await?;
    Ok(Json(employees))
}

pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = payload?;
    let request: CreateEmployeeRequest = serde_json::from_value(body)
        .map_err(|e| ApiError(DirectoryError::validation(format!("Invalid request body: {}", e))))?;

    let created = employee::create_employee(state.store(), request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("Employee '{}' created", created.name) })),
    ))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload?;
    let Value::Object(attributes) = body else {
        return Err(DirectoryError::validation("Request body must be a JSON object").into());
    };

    let record = employee::update_employee(state.store(), &name, &attributes).await?;

    Ok(Json(json!({
        "message": format!("Employee '{}' updated", record.employee),
        "employee": record,
    })))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let outcome = employee::delete_employee(state.store(), &name).await?;

    let message = match &outcome.removed_department {
        Some(department) => format!(
            "Employee '{}' deleted along with department '{}'",
            outcome.employee, department
        ),
        None => format!("Employee '{}' deleted", outcome.employee),
    };
    Ok(Json(json!({ "message": message })))
}

pub async fn list_subordinates(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<EmployeeSummary>>> {
    let subordinates = employee::list_subordinates(state.store(), &name).await?;
    Ok(Json(subordinates))
}
