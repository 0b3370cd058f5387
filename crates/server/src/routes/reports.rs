//! Report endpoints.
//!
//! Handlers are thin adapters: path parameter in, service call, JSON out.
//! Envelope services (`success: false`) and `Ok(None)` services both map
//! "nothing found" to 404 with the envelope (or a plain message) as body.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::reports;
use crate::state::AppState;

pub async fn closing(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, AppError> {
    let blocks =
        reports::closing::fetch_closing_report_data(state.erp(), state.cookies(), &reference)
            .await?;
    match blocks {
        Some(blocks) => Ok(Json(blocks).into_response()),
        None => Err(AppError::NotFound(format!(
            "no closing report for booking {reference}"
        ))),
    }
}

pub async fn sewing(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, AppError> {
    let report =
        reports::sewing::fetch_sewing_closing_report_data(state.erp(), state.cookies(), &reference)
            .await?;
    match report {
        Some(report) => Ok(Json(report).into_response()),
        None => Err(AppError::NotFound(format!(
            "no sewing report for booking {reference}"
        ))),
    }
}

pub async fn challan(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, AppError> {
    let report =
        reports::challan::fetch_challan_report(state.erp(), state.cookies(), &reference).await?;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((status, Json(report)).into_response())
}

pub async fn color_wise(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, AppError> {
    let report =
        reports::color_wise::fetch_color_wise_report(state.erp(), state.cookies(), &reference)
            .await?;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((status, Json(report)).into_response())
}

pub async fn factory(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Response, AppError> {
    let report =
        reports::factory::fetch_factory_report(state.erp(), state.cookies(), &date).await?;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((status, Json(report)).into_response())
}
