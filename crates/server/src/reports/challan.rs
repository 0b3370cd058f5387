//! Accessories challan register service.

use serde::Serialize;
use tracing::instrument;

use seamline_core::report::{ChallanRecord, ReportKind, ReportQuery};

use crate::erp::cookie::CookieManager;
use crate::erp::parse::challan;
use crate::erp::prober;
use crate::erp::ErpClient;
use crate::error::AppError;

use super::require_cookie;

/// Envelope for the challan register. `success: false` carries a human
/// message instead of data; the handler maps it to 404.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallanReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ChallanRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total: Option<i64>,
    pub message: String,
}

impl ChallanReport {
    fn found(records: Vec<ChallanRecord>) -> Self {
        let grand_total = records.iter().map(|r| r.quantity).sum();
        Self {
            success: true,
            message: format!("{} challan(s) found", records.len()),
            grand_total: Some(grand_total),
            data: Some(records),
        }
    }

    fn not_found(reference: &str) -> Self {
        Self {
            success: false,
            data: None,
            grand_total: None,
            message: format!("No challan data found for booking {reference}"),
        }
    }
}

/// Fetch the accessories challan register for a booking number.
///
/// # Errors
///
/// Fails when no session cookie can be obtained or the store errors.
#[instrument(skip(erp, cookies))]
pub async fn fetch_challan_report(
    erp: &ErpClient,
    cookies: &CookieManager,
    reference: &str,
) -> Result<ChallanReport, AppError> {
    let cookie = require_cookie(cookies).await?;
    let query = ReportQuery {
        reference: reference.to_string(),
        kind: ReportKind::Challan,
    };

    let Some(hit) = prober::fetch_report(erp, &query, &cookie).await else {
        return Ok(ChallanReport::not_found(reference));
    };

    let records = challan::parse_challan_rows(&hit.html);
    if records.is_empty() {
        return Ok(ChallanReport::not_found(reference));
    }
    Ok(ChallanReport::found(records))
}
