//! Scraped record types shared between the ERP parsers and the report API.
//!
//! Everything in this module is request-scoped: records are built fresh from
//! one scraped ERP response and dropped when the HTTP response is written.
//! Missing cells always parse to 0, never to null, so the parallel quantity
//! arrays stay dense.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The report families the ERP integration layer knows how to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Cutting/closing report: per-color size blocks.
    Closing,
    /// Sewing closing report: input/output split blocks.
    Sewing,
    /// Accessories challan register.
    Challan,
    /// Color-wise challan drill-down (pooled second phase).
    ColorWise,
    /// Factory/hourly sewing input report.
    Factory,
}

impl ReportKind {
    /// Whether the ERP report endpoint for this kind is scoped by
    /// location and warehouse-company dimensions in addition to
    /// year and company.
    #[must_use]
    pub const fn warehouse_scoped(self) -> bool {
        matches!(self, Self::Challan | Self::ColorWise)
    }
}

/// Error returned when a report kind string is not recognised.
#[derive(Debug, thiserror::Error)]
#[error("unknown report kind: {0}")]
pub struct UnknownReportKind(String);

impl FromStr for ReportKind {
    type Err = UnknownReportKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closing" => Ok(Self::Closing),
            "sewing" => Ok(Self::Sewing),
            "challan" => Ok(Self::Challan),
            "color-wise" | "colorwise" => Ok(Self::ColorWise),
            "factory" | "hourly" => Ok(Self::Factory),
            other => Err(UnknownReportKind(other.to_string())),
        }
    }
}

/// A report request: one business reference plus the report family.
///
/// Immutable once issued; the prober never mutates it while sweeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    /// Booking or internal-reference number as the user typed it.
    pub reference: String,
    /// Which report family to fetch.
    pub kind: ReportKind,
}

impl ReportQuery {
    /// Create a new query.
    #[must_use]
    pub const fn new(reference: String, kind: ReportKind) -> Self {
        Self { reference, kind }
    }
}

/// One per-color block scraped from a closing/sewing report.
///
/// The four quantity arrays are parallel to `sizes`; [`Self::normalize`]
/// enforces that after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBlock {
    pub buyer: String,
    pub style: String,
    pub color: String,
    /// Size labels in the order the ERP printed them.
    pub sizes: Vec<String>,
    /// Ordered quantity per size (the "gmts color/country qty" row).
    pub order_qty: Vec<i64>,
    /// Actual cutting quantity per size.
    pub actual_qty: Vec<i64>,
    /// Cutting-QC passed quantity per size.
    pub cutting_qc: Vec<i64>,
    /// Sewing input quantity per size.
    pub input_qty: Vec<i64>,
}

impl ReportBlock {
    /// Pad or truncate every quantity array to the size-label count.
    ///
    /// Cells the ERP omitted become 0 so every array stays parallel to
    /// `sizes`.
    pub fn normalize(&mut self) {
        let len = self.sizes.len();
        for arr in [
            &mut self.order_qty,
            &mut self.actual_qty,
            &mut self.cutting_qc,
            &mut self.input_qty,
        ] {
            arr.resize(len, 0);
        }
    }

    /// True when the block captured at least one quantity row.
    #[must_use]
    pub fn has_quantities(&self) -> bool {
        !self.order_qty.is_empty()
            || !self.actual_qty.is_empty()
            || !self.cutting_qc.is_empty()
            || !self.input_qty.is_empty()
    }
}

/// One per-color block from the sewing closing report, with the wide
/// "Color Total" row already split into input and output halves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SewingBlock {
    pub buyer: String,
    pub style: String,
    pub color: String,
    pub sizes: Vec<String>,
    /// Sewing-input side of the "Color Total" row, one cell per size.
    pub input: Vec<i64>,
    pub input_total: i64,
    /// Sewing-output side of the "Color Total" row, one cell per size.
    pub output: Vec<i64>,
    pub output_total: i64,
    /// Trailing rejection cell of the "Color Total" row.
    pub rejection: i64,
    /// Trailing work-in-process cell of the "Color Total" row.
    pub wip: i64,
}

/// One aggregated challan from the accessories challan register.
///
/// Raw report rows sharing a challan number are summed into one record;
/// the challan number is the unique key within a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallanRecord {
    pub challan_no: String,
    pub date: String,
    pub buyer: String,
    pub style: String,
    pub serving_company: String,
    pub quantity: i64,
}

/// One row of the per-challan drill-down used by the color-wise report.
///
/// A failed system-id resolution still produces a record (quantity 0,
/// color marked as an error) so partial failures never drop a challan
/// from the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallanDetailRecord {
    pub challan_no: String,
    pub date: String,
    pub buyer: String,
    pub style: String,
    pub line: String,
    pub color: String,
    pub quantity: i64,
    /// Internal ERP system id resolved via the create/search endpoint.
    pub system_id: Option<i64>,
    /// Company dimension the challan was found under.
    pub company_id: Option<u32>,
}

/// One sewing line of the factory/hourly report: time-slot quantities
/// plus the line total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorLine {
    pub floor: String,
    pub line: String,
    pub buyer: String,
    pub style: String,
    /// Quantities per time slot, in report column order.
    pub hourly: Vec<i64>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_from_str() {
        assert_eq!("closing".parse::<ReportKind>().ok(), Some(ReportKind::Closing));
        assert_eq!("Color-Wise".parse::<ReportKind>().ok(), Some(ReportKind::ColorWise));
        assert_eq!("hourly".parse::<ReportKind>().ok(), Some(ReportKind::Factory));
        assert!("knitting".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_warehouse_scoped_kinds() {
        assert!(ReportKind::Challan.warehouse_scoped());
        assert!(ReportKind::ColorWise.warehouse_scoped());
        assert!(!ReportKind::Closing.warehouse_scoped());
        assert!(!ReportKind::Factory.warehouse_scoped());
    }

    #[test]
    fn test_normalize_pads_and_truncates() {
        let mut block = ReportBlock {
            sizes: vec!["S".into(), "M".into(), "L".into()],
            order_qty: vec![10, 20],
            actual_qty: vec![1, 2, 3, 4],
            ..ReportBlock::default()
        };
        block.normalize();
        assert_eq!(block.order_qty, vec![10, 20, 0]);
        assert_eq!(block.actual_qty, vec![1, 2, 3]);
        assert_eq!(block.cutting_qc, vec![0, 0, 0]);
        assert_eq!(block.input_qty, vec![0, 0, 0]);
    }

    #[test]
    fn test_report_block_serializes_camel_case() {
        let block = ReportBlock {
            buyer: "H&M".into(),
            ..ReportBlock::default()
        };
        let json = serde_json::to_value(&block).expect("serialize");
        assert!(json.get("orderQty").is_some());
        assert!(json.get("cuttingQc").is_some());
        assert!(json.get("order_qty").is_none());
    }
}
