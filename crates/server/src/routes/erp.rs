//! ERP session cookie endpoints.
//!
//! The UI polls these to keep the shared session warm and to show the
//! connection indicator. `cookie: null` is a valid answer (ERP down), not
//! an error.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CookieStatus {
    pub cookie: Option<String>,
}

/// Return the current valid session cookie, refreshing it if stale.
pub async fn cookie(State(state): State<AppState>) -> Result<Json<CookieStatus>, AppError> {
    let cookie = state.cookies().get_valid_cookie().await?;
    Ok(Json(CookieStatus { cookie }))
}

/// Force a fresh login regardless of the cached cookie's state.
pub async fn refresh(State(state): State<AppState>) -> Result<Json<CookieStatus>, AppError> {
    let cookie = state.cookies().refresh().await?;
    Ok(Json(CookieStatus { cookie }))
}
