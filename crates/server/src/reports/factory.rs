//! Factory hourly sewing input service.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::instrument;

use seamline_core::report::{FloorLine, ReportKind, ReportQuery};

use crate::erp::cookie::CookieManager;
use crate::erp::parse::hourly;
use crate::erp::prober;
use crate::erp::ErpClient;
use crate::error::AppError;

use super::require_cookie;

/// Per-buyer rollup of the day's sewing input.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSummary {
    pub buyer: String,
    /// Number of sewing lines running this buyer's work.
    pub lines: usize,
    pub total_qty: i64,
}

/// Envelope for the factory report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryReport {
    pub success: bool,
    pub buyer_summary: Vec<BuyerSummary>,
    pub lines: Vec<FloorLine>,
    pub total_sewing_input: i64,
    pub message: String,
}

/// Roll floor lines up per buyer, sorted by buyer name.
fn summarize(lines: &[FloorLine]) -> Vec<BuyerSummary> {
    let mut per_buyer: BTreeMap<&str, (usize, i64)> = BTreeMap::new();
    for line in lines {
        let entry = per_buyer.entry(line.buyer.as_str()).or_default();
        entry.0 += 1;
        entry.1 += line.total;
    }
    per_buyer
        .into_iter()
        .map(|(buyer, (lines, total_qty))| BuyerSummary {
            buyer: buyer.to_string(),
            lines,
            total_qty,
        })
        .collect()
}

/// Fetch the factory-wide hourly sewing input for a report date.
///
/// # Errors
///
/// Fails when no session cookie can be obtained or the store errors.
#[instrument(skip(erp, cookies))]
pub async fn fetch_factory_report(
    erp: &ErpClient,
    cookies: &CookieManager,
    date: &str,
) -> Result<FactoryReport, AppError> {
    let cookie = require_cookie(cookies).await?;
    let query = ReportQuery {
        reference: date.to_string(),
        kind: ReportKind::Factory,
    };

    let hit = prober::fetch_report(erp, &query, &cookie).await;
    let lines = hit
        .as_ref()
        .map(|hit| hourly::parse_floor_lines(&hit.html))
        .unwrap_or_default();

    if lines.is_empty() {
        return Ok(FactoryReport {
            success: false,
            buyer_summary: Vec::new(),
            lines: Vec::new(),
            total_sewing_input: 0,
            message: format!("No sewing input found for {date}"),
        });
    }

    let buyer_summary = summarize(&lines);
    let total_sewing_input = lines.iter().map(|l| l.total).sum();
    Ok(FactoryReport {
        success: true,
        message: format!("{} line(s) reporting", lines.len()),
        buyer_summary,
        lines,
        total_sewing_input,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(buyer: &str, total: i64) -> FloorLine {
        FloorLine {
            floor: "2nd Floor".to_string(),
            line: "Line-1".to_string(),
            buyer: buyer.to_string(),
            style: "ST-1".to_string(),
            hourly: vec![total],
            total,
        }
    }

    #[test]
    fn test_summarize_groups_by_buyer() {
        let lines = vec![line("ACME", 100), line("BRAVO", 50), line("ACME", 75)];
        let summary = summarize(&lines);
        assert_eq!(
            summary,
            vec![
                BuyerSummary {
                    buyer: "ACME".to_string(),
                    lines: 2,
                    total_qty: 175,
                },
                BuyerSummary {
                    buyer: "BRAVO".to_string(),
                    lines: 1,
                    total_qty: 50,
                },
            ]
        );
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }
}
