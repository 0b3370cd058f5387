//! Color-wise challan report service.
//!
//! Two phases: the register sweep finds every challan issued against the
//! booking, then a pool of parallel sessions drills into each challan for
//! its per-line color breakdown. Failed drill-downs surface as sentinel
//! records inside their group rather than failing the report.

use serde::Serialize;
use tracing::instrument;

use seamline_core::color_group::{ColorGroup, group_by_color};
use seamline_core::report::{ReportKind, ReportQuery};

use crate::erp::cookie::CookieManager;
use crate::erp::parse::challan;
use crate::erp::pool::{self, SessionPool};
use crate::erp::prober;
use crate::erp::ErpClient;
use crate::error::AppError;

use super::require_cookie;

/// Envelope for the color-wise report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorWiseReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ColorGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_challans: Option<usize>,
    pub message: String,
}

impl ColorWiseReport {
    fn found(groups: Vec<ColorGroup>, total_challans: usize) -> Self {
        let grand_total = groups.iter().map(|g| g.subtotal).sum();
        Self {
            success: true,
            message: format!("{total_challans} challan(s) across {} color(s)", groups.len()),
            grand_total: Some(grand_total),
            total_challans: Some(total_challans),
            data: Some(groups),
        }
    }

    fn not_found(reference: &str) -> Self {
        Self {
            success: false,
            data: None,
            grand_total: None,
            total_challans: None,
            message: format!("No challan data found for booking {reference}"),
        }
    }
}

/// Fetch the color-wise challan breakdown for a booking number.
///
/// # Errors
///
/// Fails when no session cookie can be obtained, the drill-down pool
/// cannot open a single session, or the store errors.
#[instrument(skip(erp, cookies))]
pub async fn fetch_color_wise_report(
    erp: &ErpClient,
    cookies: &CookieManager,
    reference: &str,
) -> Result<ColorWiseReport, AppError> {
    let cookie = require_cookie(cookies).await?;
    let query = ReportQuery {
        reference: reference.to_string(),
        kind: ReportKind::ColorWise,
    };

    let Some(hit) = prober::fetch_report(erp, &query, &cookie).await else {
        return Ok(ColorWiseReport::not_found(reference));
    };

    let challans = challan::parse_challan_rows(&hit.html);
    if challans.is_empty() {
        return Ok(ColorWiseReport::not_found(reference));
    }

    let sessions = SessionPool::open(erp, challans.len()).await?;
    let details = pool::drill_down(erp, &sessions, &challans, Some(hit.combo.company_id)).await;
    let groups = group_by_color(details);

    Ok(ColorWiseReport::found(groups, challans.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use seamline_core::report::ChallanDetailRecord;

    fn detail(color: &str, quantity: i64) -> ChallanDetailRecord {
        ChallanDetailRecord {
            challan_no: "CH-1".to_string(),
            date: "12-Aug-26".to_string(),
            buyer: "ACME".to_string(),
            style: "ST-1".to_string(),
            line: "Line-1".to_string(),
            color: color.to_string(),
            quantity,
            system_id: Some(1),
            company_id: Some(1),
        }
    }

    #[test]
    fn test_found_envelope_totals_subtotals() {
        let groups = group_by_color(vec![detail("RED", 30), detail("BLUE", 5)]);
        let report = ColorWiseReport::found(groups, 2);
        assert!(report.success);
        assert_eq!(report.grand_total, Some(35));
        assert_eq!(report.total_challans, Some(2));
    }

    #[test]
    fn test_not_found_envelope() {
        let report = ColorWiseReport::not_found("BK-7");
        assert!(!report.success);
        assert!(report.data.is_none());
        assert!(report.message.contains("BK-7"));
    }
}
