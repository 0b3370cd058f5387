//! Unified error handling for the report API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::StoreError;
use crate::erp::ErpError;

/// Application-level error type for the report API.
///
/// "Booking not found" is the one outcome deliberately not here as a
/// default path: services return `Ok(None)` / `success: false` and the
/// handlers decide the 404, so only genuinely unexpected conditions flow
/// through this type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The legacy ERP rejected the login or could not be reached.
    #[error("ERP error: {0}")]
    Erp(#[from] ErpError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Store(_) | Self::Erp(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Report request error"
            );
        }

        let status = match &self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Erp(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients; operators get the
        // distinction between "not found" and "ERP down" from the logs.
        let message = match &self {
            Self::Store(_) => "Internal server error".to_string(),
            Self::Erp(_) => "ERP temporarily unavailable".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}
