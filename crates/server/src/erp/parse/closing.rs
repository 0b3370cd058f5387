//! Closing (cutting) report parser.
//!
//! The report is one long table: each color section starts with a
//! highlighted marker row (a fixed `bgcolor`), followed by label/value
//! rows (buyer, style, color) and quantity rows whose first cell names
//! the metric and whose remaining cells hold per-size quantities.

use scraper::{ElementRef, Html};

use seamline_core::qty::parse_qty;
use seamline_core::report::ReportBlock;

use super::{attr_eq, cell_texts, sel};

/// Background color of the row that opens a new color section.
pub(crate) const BLOCK_MARKER_BGCOLOR: &str = "#c5d9f1";

/// A row opens a new block when the row itself or any of its cells
/// carries the marker background color.
pub(crate) fn is_marker_row(row: ElementRef<'_>) -> bool {
    if attr_eq(row.value().attr("bgcolor"), BLOCK_MARKER_BGCOLOR) {
        return true;
    }
    row.select(&sel("td, th"))
        .any(|cell| attr_eq(cell.value().attr("bgcolor"), BLOCK_MARKER_BGCOLOR))
}

/// Quantities of a metric row: every cell after the label.
fn quantities(cells: &[String]) -> Vec<i64> {
    cells.iter().skip(1).map(|c| parse_qty(c)).collect()
}

/// Apply one table row to the block under construction.
pub(crate) fn apply_row(block: &mut ReportBlock, cells: &[String]) {
    let Some(first) = cells.first() else { return };
    let label = first.to_lowercase();

    // Quantity rows are keyed on the full first-cell label. Checked before
    // the pairwise scan because "gmts color/country qty" would otherwise
    // also match the color label fragment.
    if label.contains("size") {
        block.sizes = cells
            .iter()
            .skip(1)
            .filter(|c| !c.eq_ignore_ascii_case("total") && !c.is_empty())
            .cloned()
            .collect();
        return;
    }
    if label.contains("gmts color") || label.contains("country qty") {
        block.order_qty = quantities(cells);
        return;
    }
    if label.contains("cutting qc") {
        block.cutting_qc = quantities(cells);
        return;
    }
    if label.contains("sewing input") {
        block.input_qty = quantities(cells);
        return;
    }
    if label.contains("cutting") {
        block.actual_qty = quantities(cells);
        return;
    }

    // Label/value pairs share a row ("Buyer | ACME | Style | ST-01"), so
    // scan every adjacent pair.
    for pair in cells.windows(2) {
        let [l, value] = pair else { continue };
        let l = l.to_lowercase();
        if l.contains("buyer") {
            block.buyer = value.clone();
        } else if l.contains("gmts item") || l == "color" || l.contains("color & gmts") {
            block.color = value.clone();
        } else if l.contains("style") {
            block.style = value.clone();
        }
    }
}

/// Parse the closing report into per-color blocks.
///
/// A block is only emitted when it captured size labels and at least one
/// quantity row; everything else (headers repeated between sections,
/// decorative rows, malformed fragments) is dropped silently.
#[must_use]
pub fn parse_report_blocks(html: &str) -> Vec<ReportBlock> {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();
    let mut current: Option<ReportBlock> = None;

    for row in document.select(&sel("tr")) {
        if is_marker_row(row) {
            finish(&mut blocks, current.take());
            current = Some(ReportBlock::default());
            continue;
        }
        if let Some(block) = current.as_mut() {
            let cells = cell_texts(row);
            apply_row(block, &cells);
        }
    }
    finish(&mut blocks, current.take());

    blocks
}

pub(crate) fn finish(blocks: &mut Vec<ReportBlock>, candidate: Option<ReportBlock>) {
    if let Some(mut block) = candidate
        && !block.sizes.is_empty()
        && block.has_quantities()
    {
        block.normalize();
        blocks.push(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_row() -> &'static str {
        r##"<tr bgcolor="#C5D9F1"><td colspan="8">Item</td></tr>"##
    }

    fn sample_block() -> String {
        format!(
            r#"<table>
            {marker}
            <tr><td>Buyer</td><td>ACME Kidswear</td><td>Style</td><td>ST-4711</td></tr>
            <tr><td>Color &amp; Gmts Item</td><td>NAVY / Trouser</td></tr>
            <tr><td>Size</td><td>S</td><td>M</td><td>L</td><td>Total</td></tr>
            <tr><td>Gmts Color/Country Qty</td><td>100</td><td>200</td><td>300</td><td>600</td></tr>
            <tr><td>Cutting Qty</td><td>105</td><td>210</td><td>315</td><td>630</td></tr>
            <tr><td>Cutting QC Qty</td><td>104</td><td>208</td><td>312</td><td>624</td></tr>
            <tr><td>Sewing Input</td><td>1,000</td><td>205</td><td>310</td><td>1,515</td></tr>
            </table>"#,
            marker = marker_row()
        )
    }

    #[test]
    fn test_parses_one_block() {
        let blocks = parse_report_blocks(&sample_block());
        assert_eq!(blocks.len(), 1);
        let block = blocks.first().expect("one block");
        assert_eq!(block.buyer, "ACME Kidswear");
        assert_eq!(block.style, "ST-4711");
        assert_eq!(block.color, "NAVY / Trouser");
        assert_eq!(block.sizes, vec!["S", "M", "L"]);
        assert_eq!(block.order_qty, vec![100, 200, 300]);
        assert_eq!(block.actual_qty, vec![105, 210, 315]);
        assert_eq!(block.cutting_qc, vec![104, 208, 312]);
        // Thousands separator stripped; trailing total column truncated by
        // normalization.
        assert_eq!(block.input_qty, vec![1000, 205, 310]);
    }

    #[test]
    fn test_two_blocks_split_on_marker() {
        let html = format!("{}{}", sample_block(), sample_block());
        assert_eq!(parse_report_blocks(&html).len(), 2);
    }

    #[test]
    fn test_marker_on_cell_also_splits() {
        let html = sample_block().replace(
            r##"<tr bgcolor="#C5D9F1"><td colspan="8">Item</td></tr>"##,
            r##"<tr><td bgcolor="#c5d9f1" colspan="8">Item</td></tr>"##,
        );
        assert_eq!(parse_report_blocks(&html).len(), 1);
    }

    #[test]
    fn test_block_without_quantities_is_dropped() {
        let html = format!(
            r#"<table>{}<tr><td>Buyer</td><td>ACME</td></tr>
            <tr><td>Size</td><td>S</td><td>M</td></tr></table>"#,
            marker_row()
        );
        assert!(parse_report_blocks(&html).is_empty());
    }

    #[test]
    fn test_rows_before_first_marker_are_ignored() {
        let html = format!(
            "<table><tr><td>Sewing Input</td><td>999</td></tr></table>{}",
            sample_block()
        );
        let blocks = parse_report_blocks(&html);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        assert!(parse_report_blocks("<tr><td>broken").is_empty());
        assert!(parse_report_blocks("").is_empty());
    }

    #[test]
    fn test_missing_quantity_rows_pad_to_zero() {
        let html = format!(
            r#"<table>{}
            <tr><td>Size</td><td>S</td><td>M</td></tr>
            <tr><td>Sewing Input</td><td>5</td></tr>
            </table>"#,
            marker_row()
        );
        let blocks = parse_report_blocks(&html);
        let block = blocks.first().expect("one block");
        assert_eq!(block.input_qty, vec![5, 0]);
        assert_eq!(block.order_qty, vec![0, 0]);
    }
}
