//! PO sheet parsing endpoint.
//!
//! Pure transform: the client pastes the text of a PO sheet, we answer
//! with per-color size/quantity tables. No ERP round-trip involved.

use axum::Json;

use seamline_core::po::{PoTables, build_color_tables, parse_po_text};

use crate::error::AppError;

pub async fn parse(text: String) -> Result<Json<PoTables>, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("empty PO sheet text".to_string()));
    }
    let rows = parse_po_text(&text);
    if rows.is_empty() {
        return Err(AppError::BadRequest(
            "no PO data rows recognised in input".to_string(),
        ));
    }
    Ok(Json(build_color_tables(&rows)))
}
