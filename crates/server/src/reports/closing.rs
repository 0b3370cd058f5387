//! Cutting closing report service.

use serde::Serialize;
use tracing::instrument;

use seamline_core::metrics::{BlockTotals, SizeMetrics, block_totals, size_metrics};
use seamline_core::report::{ReportBlock, ReportKind, ReportQuery};

use crate::erp::cookie::CookieManager;
use crate::erp::parse::closing;
use crate::erp::prober;
use crate::erp::ErpClient;
use crate::error::AppError;

use super::require_cookie;

/// One closing block with its derived size metrics and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingBlockView {
    #[serde(flatten)]
    pub block: ReportBlock,
    /// Per-size metrics, one entry per size column.
    pub metrics: Vec<SizeMetrics>,
    pub totals: BlockTotals,
}

fn view(block: ReportBlock) -> ClosingBlockView {
    let metrics = (0..block.sizes.len())
        .filter_map(|i| size_metrics(&block, i))
        .collect();
    let totals = block_totals(&block);
    ClosingBlockView {
        block,
        metrics,
        totals,
    }
}

/// Fetch and shape the cutting closing report for a booking number.
///
/// `Ok(None)` means the sweep was exhausted: the booking does not exist
/// under any probed dimension combination.
///
/// # Errors
///
/// Fails when no session cookie can be obtained or the store errors.
#[instrument(skip(erp, cookies))]
pub async fn fetch_closing_report_data(
    erp: &ErpClient,
    cookies: &CookieManager,
    reference: &str,
) -> Result<Option<Vec<ClosingBlockView>>, AppError> {
    let cookie = require_cookie(cookies).await?;
    let query = ReportQuery {
        reference: reference.to_string(),
        kind: ReportKind::Closing,
    };

    let Some(hit) = prober::fetch_report(erp, &query, &cookie).await else {
        return Ok(None);
    };

    let blocks = closing::parse_report_blocks(&hit.html);
    if blocks.is_empty() {
        // Usable-looking page that parsed to nothing: treat as not found.
        return Ok(None);
    }
    Ok(Some(blocks.into_iter().map(view).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> ReportBlock {
        ReportBlock {
            buyer: "ACME".to_string(),
            style: "ST-1".to_string(),
            color: "BLACK".to_string(),
            sizes: vec!["S".to_string(), "M".to_string()],
            order_qty: vec![1000, 500],
            actual_qty: vec![1000, 500],
            cutting_qc: vec![990, 495],
            input_qty: vec![1060, 530],
        }
    }

    #[test]
    fn test_view_computes_one_metric_per_size() {
        let v = view(block());
        assert_eq!(v.metrics.len(), 2);
        let first = v.metrics.first().expect("metrics");
        assert_eq!(first.order_qty_tolerance, 1030);
        assert_eq!(first.balance, 40);
        assert_eq!(v.totals.actual, 1500);
    }

    #[test]
    fn test_view_serializes_flat() {
        let value = serde_json::to_value(view(block())).expect("serialize");
        // Block fields sit at the top level next to the derived ones.
        assert_eq!(value["buyer"], "ACME");
        assert!(value["metrics"].is_array());
        assert!(value["totals"]["orderQtyTolerance"].is_number());
    }
}
