//! Customer route handlers.
//!
//! Handlers validate the body for the request mode, then hand off to
//! [`CustomerService`](crate::services::CustomerService). No business rule
//! lives here.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::instrument;

use customer_master_core::{CustomerRequest, CustomerResponse, RequestMode};

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, CodePath, CodesQuery};
use crate::state::AppState;

/// Create a customer.
///
/// Responds `201 Created` with a `Location` header.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CustomerRequest>,
) -> Result<impl IntoResponse> {
    request
        .validate(RequestMode::Create)
        .map_err(AppError::Validation)?;

    let created = state.customers().create(&request).await?;
    let location = format!("/customers/{}", created.code);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// List every customer.
#[instrument(skip_all)]
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<CustomerResponse>>> {
    Ok(Json(state.customers().list_all().await?))
}

/// List customers by code.
#[instrument(skip_all)]
pub async fn list_by_codes(
    State(state): State<AppState>,
    CodesQuery(codes): CodesQuery,
) -> Result<Json<Vec<CustomerResponse>>> {
    Ok(Json(state.customers().list_by_codes(&codes).await?))
}

/// Get one customer.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    CodePath(code): CodePath,
) -> Result<Json<CustomerResponse>> {
    Ok(Json(state.customers().get_one(&code).await?))
}

/// Replace a customer (PUT).
#[instrument(skip_all)]
pub async fn replace(
    State(state): State<AppState>,
    CodePath(code): CodePath,
    ApiJson(request): ApiJson<CustomerRequest>,
) -> Result<Json<CustomerResponse>> {
    request
        .validate(RequestMode::Replace)
        .map_err(AppError::Validation)?;

    Ok(Json(state.customers().replace(&code, &request).await?))
}

/// Merge fields into a customer (PATCH).
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    CodePath(code): CodePath,
    ApiJson(request): ApiJson<CustomerRequest>,
) -> Result<Json<CustomerResponse>> {
    request
        .validate(RequestMode::Patch)
        .map_err(AppError::Validation)?;

    Ok(Json(state.customers().update(&code, &request).await?))
}
