//! Derived per-size metrics and block totals.
//!
//! These are pure functions of a [`ReportBlock`]: metrics are never stored,
//! always recomputed from the scraped quantities. The order-quantity
//! tolerance is the contractual +3% over-shipment allowance, rounded
//! half-up to a whole garment.

use serde::Serialize;

use crate::report::ReportBlock;

/// Derived metrics for one size column of a report block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeMetrics {
    pub actual: i64,
    /// `round_half_up(actual * 1.03)`.
    pub order_qty_tolerance: i64,
    pub cutting_qc: i64,
    pub input_qty: i64,
    /// `cutting_qc - input_qty`.
    pub balance: i64,
    /// `input_qty - order_qty_tolerance`.
    pub short_plus: i64,
    /// `short_plus / order_qty_tolerance` as a fraction; exactly 0 when
    /// the tolerance quantity is 0.
    pub percentage: f64,
}

/// Tolerance-adjusted order quantity: +3%, rounded half-up.
///
/// Computed in integer arithmetic so 0.5 always rounds up and no float
/// representation error leaks into totals.
#[must_use]
pub const fn order_qty_tolerance(actual: i64) -> i64 {
    (actual * 103 + 50).div_euclid(100)
}

/// Ratio with a zero-safe denominator: 0 instead of NaN/inf.
#[must_use]
fn safe_ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        {
            numerator as f64 / denominator as f64
        }
    }
}

/// Compute the derived metrics for one size index of a block.
///
/// Returns `None` when `index` is past the size-label list.
#[must_use]
pub fn size_metrics(block: &ReportBlock, index: usize) -> Option<SizeMetrics> {
    if index >= block.sizes.len() {
        return None;
    }
    let at = |arr: &[i64]| arr.get(index).copied().unwrap_or(0);

    let actual = at(&block.actual_qty);
    let order_qty_tolerance = order_qty_tolerance(actual);
    let cutting_qc = at(&block.cutting_qc);
    let input_qty = at(&block.input_qty);
    let balance = cutting_qc - input_qty;
    let short_plus = input_qty - order_qty_tolerance;

    Some(SizeMetrics {
        actual,
        order_qty_tolerance,
        cutting_qc,
        input_qty,
        balance,
        short_plus,
        percentage: safe_ratio(short_plus, order_qty_tolerance),
    })
}

/// Totals of the derived metrics across every size of a block.
///
/// `percentage` is recomputed from the summed columns, not averaged from
/// the per-size percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTotals {
    pub actual: i64,
    pub order_qty_tolerance: i64,
    pub cutting_qc: i64,
    pub input_qty: i64,
    pub balance: i64,
    pub short_plus: i64,
    pub percentage: f64,
}

/// Sum the derived metrics across all size indices of a block.
#[must_use]
pub fn block_totals(block: &ReportBlock) -> BlockTotals {
    let mut totals = BlockTotals {
        actual: 0,
        order_qty_tolerance: 0,
        cutting_qc: 0,
        input_qty: 0,
        balance: 0,
        short_plus: 0,
        percentage: 0.0,
    };
    for index in 0..block.sizes.len() {
        if let Some(m) = size_metrics(block, index) {
            totals.actual += m.actual;
            totals.order_qty_tolerance += m.order_qty_tolerance;
            totals.cutting_qc += m.cutting_qc;
            totals.input_qty += m.input_qty;
            totals.balance += m.balance;
            totals.short_plus += m.short_plus;
        }
    }
    totals.percentage = safe_ratio(totals.short_plus, totals.order_qty_tolerance);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(actual: i64, cutting_qc: i64, input_qty: i64) -> ReportBlock {
        ReportBlock {
            sizes: vec!["M".into()],
            actual_qty: vec![actual],
            cutting_qc: vec![cutting_qc],
            input_qty: vec![input_qty],
            order_qty: vec![actual],
            ..ReportBlock::default()
        }
    }

    #[test]
    fn test_order_qty_tolerance_rounds_half_up() {
        assert_eq!(order_qty_tolerance(1000), 1030);
        // 50 * 1.03 = 51.5 -> 52
        assert_eq!(order_qty_tolerance(50), 52);
        // 100 * 1.03 = 103 exactly
        assert_eq!(order_qty_tolerance(100), 103);
        assert_eq!(order_qty_tolerance(0), 0);
    }

    #[test]
    fn test_size_metrics_worked_example() {
        let b = block(1000, 1040, 1000);
        let m = size_metrics(&b, 0).expect("index in range");
        assert_eq!(m.order_qty_tolerance, 1030);
        assert_eq!(m.balance, 40);
        assert_eq!(m.short_plus, -30);
        assert!((m.percentage - (-30.0 / 1030.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_denominator_percentage_is_zero() {
        let b = block(0, 5, 10);
        let m = size_metrics(&b, 0).expect("index in range");
        assert_eq!(m.order_qty_tolerance, 0);
        assert_eq!(m.percentage, 0.0);
        assert!(m.percentage.is_finite());
    }

    #[test]
    fn test_size_metrics_out_of_range() {
        let b = block(10, 10, 10);
        assert!(size_metrics(&b, 1).is_none());
    }

    #[test]
    fn test_block_totals_recomputes_percentage() {
        let b = ReportBlock {
            sizes: vec!["S".into(), "M".into()],
            actual_qty: vec![1000, 0],
            cutting_qc: vec![1040, 5],
            input_qty: vec![1000, 5],
            order_qty: vec![1000, 0],
            ..ReportBlock::default()
        };
        let t = block_totals(&b);
        assert_eq!(t.actual, 1000);
        assert_eq!(t.order_qty_tolerance, 1030);
        assert_eq!(t.cutting_qc, 1045);
        assert_eq!(t.input_qty, 1005);
        assert_eq!(t.balance, 40);
        assert_eq!(t.short_plus, -25);
        assert!((t.percentage - (-25.0 / 1030.0)).abs() < 1e-9);
    }

    #[test]
    fn test_missing_cells_count_as_zero() {
        let b = ReportBlock {
            sizes: vec!["S".into(), "M".into()],
            actual_qty: vec![100],
            ..ReportBlock::default()
        };
        let m = size_metrics(&b, 1).expect("index in range");
        assert_eq!(m.actual, 0);
        assert_eq!(m.order_qty_tolerance, 0);
        assert_eq!(m.percentage, 0.0);
    }
}
