//! HTTP route handlers.

pub mod erp;
pub mod po;
pub mod reports;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// All API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports/closing/{reference}", get(reports::closing))
        .route("/api/reports/sewing/{reference}", get(reports::sewing))
        .route("/api/reports/challan/{reference}", get(reports::challan))
        .route(
            "/api/reports/color-wise/{reference}",
            get(reports::color_wise),
        )
        .route("/api/reports/factory/{date}", get(reports::factory))
        .route("/api/erp/cookie", get(erp::cookie))
        .route("/api/erp/refresh", post(erp::refresh))
        .route("/api/po/parse", post(po::parse))
}
