//! Department route handlers.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use orgdir_core::department::{
    self,
    model::{DepartmentInfo, DepartmentSummary},
};
use orgdir_core::employee::model::EmployeeSummary;

use super::ListParams;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_department(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<DepartmentInfo>> {
    let info = department::get_department_info(state.store(), &name).await?;
    Ok(Json(info))
}

pub async fn list_departments(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<DepartmentSummary>>> {
    let Query(params) = params?;
    let departments =
        department::list_departments(state.store(), params.filter(), params.sort()).await?;
    Ok(Json(departments))
}

pub async fn list_department_employees(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<EmployeeSummary>>> {
    let employees = department::list_department_employees(state.store(), &name).await?;
    Ok(Json(employees))
}
