//! Factory/hourly sewing input report parser.
//!
//! One row per sewing line: floor, line, buyer, style, one cell per time
//! slot, and a printed line total. Slot counts vary between factories, so
//! everything between the style cell and the final total cell is treated
//! as hourly data.

use scraper::Html;

use seamline_core::qty::parse_qty;
use seamline_core::report::FloorLine;

use super::{cell_texts, sel};

/// Element id of the hourly input table body.
pub(crate) const HOURLY_TABLE_ID: &str = "tblHourlyInput";

/// floor, line, buyer, style, at least one slot, total.
const MIN_CELLS: usize = 6;

/// Parse the hourly report into per-line slot totals.
#[must_use]
pub fn parse_floor_lines(html: &str) -> Vec<FloorLine> {
    let document = Html::parse_document(html);
    let row_selector = sel(&format!("#{HOURLY_TABLE_ID} tr"));

    let mut lines = Vec::new();

    for row in document.select(&row_selector) {
        let cells = cell_texts(row);
        if cells.len() < MIN_CELLS {
            continue;
        }
        let floor = cells.first().cloned().unwrap_or_default();
        if floor.is_empty() || floor.to_lowercase().contains("floor") {
            // Header row (repeated per page) or spacer.
            continue;
        }

        let hourly: Vec<i64> = cells
            .get(4..cells.len() - 1)
            .unwrap_or_default()
            .iter()
            .map(|c| parse_qty(c))
            .collect();
        let printed_total = cells.last().map_or(0, |c| parse_qty(c));
        // Some variants leave the total cell blank; reconcile from slots.
        let total = if printed_total == 0 {
            hourly.iter().sum()
        } else {
            printed_total
        };

        lines.push(FloorLine {
            floor,
            line: cells.get(1).cloned().unwrap_or_default(),
            buyer: cells.get(2).cloned().unwrap_or_default(),
            style: cells.get(3).cloned().unwrap_or_default(),
            hourly,
            total,
        });
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &str) -> String {
        format!(r#"<table><tbody id="{HOURLY_TABLE_ID}">{rows}</tbody></table>"#)
    }

    #[test]
    fn test_parses_line_rows() {
        let html = table(
            "<tr><td>3rd Floor</td><td>Line-12</td><td>ACME</td><td>ST-1</td>\
             <td>120</td><td>135</td><td>128</td><td>383</td></tr>",
        );
        let lines = parse_floor_lines(&html);
        assert_eq!(lines.len(), 1);
        let line = lines.first().expect("one line");
        assert_eq!(line.floor, "3rd Floor");
        assert_eq!(line.line, "Line-12");
        assert_eq!(line.buyer, "ACME");
        assert_eq!(line.hourly, vec![120, 135, 128]);
        assert_eq!(line.total, 383);
    }

    #[test]
    fn test_header_rows_are_skipped() {
        let html = table(
            "<tr><td>Floor</td><td>Line</td><td>Buyer</td><td>Style</td>\
             <td>8-9</td><td>9-10</td><td>Total</td></tr>\
             <tr><td>2nd Floor</td><td>Line-3</td><td>BRAVO</td><td>ST-2</td>\
             <td>90</td><td>85</td><td>175</td></tr>",
        );
        let lines = parse_floor_lines(&html);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().expect("one line").floor, "2nd Floor");
    }

    #[test]
    fn test_blank_total_is_reconciled_from_slots() {
        let html = table(
            "<tr><td>2nd Floor</td><td>Line-3</td><td>BRAVO</td><td>ST-2</td>\
             <td>90</td><td>85</td><td></td></tr>",
        );
        let lines = parse_floor_lines(&html);
        assert_eq!(lines.first().expect("one line").total, 175);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let html = table("<tr><td>2nd Floor</td><td>Line-3</td></tr>");
        assert!(parse_floor_lines(&html).is_empty());
    }
}
