//! Accessories challan register parser.
//!
//! Rows live in a tbody with a fixed element id; cells are positional.
//! The ERP prints one raw row per delivery line, so several rows can share
//! a challan number - those are summed into one record, never overwritten.

use scraper::Html;

use seamline_core::qty::parse_qty;
use seamline_core::report::ChallanRecord;

use super::{cell_texts, sel};

/// Element id of the challan register's body.
pub(crate) const CHALLAN_TABLE_ID: &str = "tblChallanRegister";

/// Cells per row: serial, challan no, buyer, style, serving company,
/// quantity, date.
const MIN_CELLS: usize = 7;

/// Parse the challan register into aggregated records.
///
/// Records keep the order in which their challan number first appeared.
/// Rows with too few cells or a header-looking challan cell are skipped.
#[must_use]
pub fn parse_challan_rows(html: &str) -> Vec<ChallanRecord> {
    let document = Html::parse_document(html);
    let row_selector = sel(&format!("#{CHALLAN_TABLE_ID} tr"));

    let mut records: Vec<ChallanRecord> = Vec::new();

    for row in document.select(&row_selector) {
        let cells = cell_texts(row);
        if cells.len() < MIN_CELLS {
            continue;
        }
        let challan_no = cells.get(1).cloned().unwrap_or_default();
        if challan_no.is_empty() || challan_no.to_lowercase().contains("challan") {
            continue;
        }
        let quantity = cells.get(5).map_or(0, |c| parse_qty(c));

        match records.iter_mut().find(|r| r.challan_no == challan_no) {
            Some(existing) => existing.quantity += quantity,
            None => records.push(ChallanRecord {
                challan_no,
                buyer: cells.get(2).cloned().unwrap_or_default(),
                style: cells.get(3).cloned().unwrap_or_default(),
                serving_company: cells.get(4).cloned().unwrap_or_default(),
                quantity,
                date: cells.get(6).cloned().unwrap_or_default(),
            }),
        }
    }

    records
}
