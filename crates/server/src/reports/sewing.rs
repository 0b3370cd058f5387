//! Sewing closing report service.

use serde::Serialize;
use tracing::instrument;

use seamline_core::report::{ReportKind, ReportQuery, SewingBlock};

use crate::erp::cookie::CookieManager;
use crate::erp::parse::sewing;
use crate::erp::prober;
use crate::erp::ErpClient;
use crate::error::AppError;

use super::require_cookie;

/// The sewing closing report: per-color blocks plus report-wide totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SewingReport {
    pub blocks: Vec<SewingBlock>,
    pub total_input: i64,
    pub total_output: i64,
    pub total_rejection: i64,
    pub total_wip: i64,
}

fn summarize(blocks: Vec<SewingBlock>) -> SewingReport {
    let total_input = blocks.iter().map(|b| b.input_total).sum();
    let total_output = blocks.iter().map(|b| b.output_total).sum();
    let total_rejection = blocks.iter().map(|b| b.rejection).sum();
    let total_wip = blocks.iter().map(|b| b.wip).sum();
    SewingReport {
        blocks,
        total_input,
        total_output,
        total_rejection,
        total_wip,
    }
}

/// Fetch and shape the sewing closing report for a booking number.
///
/// # Errors
///
/// Fails when no session cookie can be obtained or the store errors.
#[instrument(skip(erp, cookies))]
pub async fn fetch_sewing_closing_report_data(
    erp: &ErpClient,
    cookies: &CookieManager,
    reference: &str,
) -> Result<Option<SewingReport>, AppError> {
    let cookie = require_cookie(cookies).await?;
    let query = ReportQuery {
        reference: reference.to_string(),
        kind: ReportKind::Sewing,
    };

    let Some(hit) = prober::fetch_report(erp, &query, &cookie).await else {
        return Ok(None);
    };

    let blocks = sewing::parse_sewing_blocks(&hit.html);
    if blocks.is_empty() {
        return Ok(None);
    }
    Ok(Some(summarize(blocks)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(input_total: i64, output_total: i64, rejection: i64, wip: i64) -> SewingBlock {
        SewingBlock {
            buyer: "ACME".to_string(),
            style: "ST-1".to_string(),
            color: "BLACK".to_string(),
            sizes: vec!["S".to_string()],
            input: vec![input_total],
            input_total,
            output: vec![output_total],
            output_total,
            rejection,
            wip,
        }
    }

    #[test]
    fn test_summarize_sums_across_blocks() {
        let report = summarize(vec![block(100, 90, 3, 7), block(50, 45, 1, 4)]);
        assert_eq!(report.total_input, 150);
        assert_eq!(report.total_output, 135);
        assert_eq!(report.total_rejection, 4);
        assert_eq!(report.total_wip, 11);
        assert_eq!(report.blocks.len(), 2);
    }
}
