//! PO sheet ingestion: flat {po, color, size, qty} rows pivoted into
//! per-color size tables.
//!
//! The PDF-to-text step is an external collaborator; this module works on
//! the extracted plain text. PO sheet layouts vary by buyer, so line
//! parsing is deliberately lenient: a line that does not look like a data
//! row is skipped, never an error.

use serde::Serialize;

use crate::metrics::order_qty_tolerance;
use crate::qty::parse_qty;
use crate::size_order;

/// One flat data row extracted from a PO sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoRow {
    pub po_no: String,
    pub color: String,
    pub size: String,
    pub quantity: i64,
}

/// One PO line of a color table; quantities are ordered by the table's
/// canonical size columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoTableRow {
    pub po_no: String,
    pub quantities: Vec<i64>,
    pub total: i64,
}

/// The pivoted size table for one color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorTable {
    pub color: String,
    /// Canonically ordered size columns present for this color.
    pub sizes: Vec<String>,
    pub po_rows: Vec<PoTableRow>,
    /// Column sums of the PO rows.
    pub actual_qty: Vec<i64>,
    /// Per-column `actual * 1.03`, rounded half-up.
    pub order_qty: Vec<i64>,
    pub total: i64,
}

/// All color tables of one PO sheet plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoTables {
    pub colors: Vec<ColorTable>,
    /// Sum of all PO row totals across all colors.
    pub grand_total: i64,
}

/// Largest numeric label still treated as a garment size rather than a
/// quantity (EU kids sizes run up to 170).
const MAX_NUMERIC_SIZE: i64 = 200;

fn looks_like_size(token: &str) -> bool {
    let upper = token.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return false;
    }
    if upper.bytes().all(|b| b.is_ascii_digit()) {
        return upper.parse::<i64>().is_ok_and(|n| n <= MAX_NUMERIC_SIZE);
    }
    if upper.bytes().next().is_some_and(|b| b.is_ascii_digit()) {
        // Infant labels: digits followed by a short qualifier ("2A", "6M").
        return upper.len() <= 7;
    }
    matches!(
        upper.as_str(),
        "S" | "M" | "L" | "XL" | "XXL" | "XXXL" | "XXXXL" | "XXXXXL"
    )
}

fn looks_like_po_no(token: &str) -> bool {
    token.bytes().filter(u8::is_ascii_digit).count() >= 5
}

/// Extract flat data rows from PO sheet text.
///
/// A data line must carry, in order: a PO number (>= 5 digits), one or
/// more color tokens, a size label, and a trailing quantity. Header,
/// footer and address lines fail one of those checks and are skipped.
#[must_use]
pub fn parse_po_text(text: &str) -> Vec<PoRow> {
    let mut rows = Vec::new();

    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            continue;
        }
        let Some(last) = tokens.last() else { continue };
        let quantity = parse_qty(last);
        if quantity <= 0 {
            continue;
        }
        let Some(po_idx) = tokens.iter().position(|t| looks_like_po_no(t)) else {
            continue;
        };
        // The size label sits directly before the quantity column.
        let size_idx = tokens.len() - 2;
        if size_idx <= po_idx || !tokens.get(size_idx).is_some_and(|t| looks_like_size(t)) {
            continue;
        }
        let color = tokens
            .get(po_idx + 1..size_idx)
            .unwrap_or_default()
            .join(" ");
        if color.is_empty() {
            continue;
        }
        rows.push(PoRow {
            po_no: tokens.get(po_idx).copied().unwrap_or_default().to_string(),
            color,
            size: tokens
                .get(size_idx)
                .copied()
                .unwrap_or_default()
                .to_ascii_uppercase(),
            quantity,
        });
    }

    rows
}

/// Pivot flat rows into per-color tables with canonical size columns.
#[must_use]
pub fn build_color_tables(rows: &[PoRow]) -> PoTables {
    // Colors in first-seen order, matching how the sheet reads.
    let mut colors: Vec<String> = Vec::new();
    for row in rows {
        if !colors.contains(&row.color) {
            colors.push(row.color.clone());
        }
    }

    let mut tables = Vec::with_capacity(colors.len());
    let mut grand_total = 0;

    for color in colors {
        let members: Vec<&PoRow> = rows.iter().filter(|r| r.color == color).collect();

        let mut sizes: Vec<String> = Vec::new();
        for row in &members {
            if !sizes.contains(&row.size) {
                sizes.push(row.size.clone());
            }
        }
        size_order::canonical_sort(&mut sizes);

        let mut po_nos: Vec<String> = Vec::new();
        for row in &members {
            if !po_nos.contains(&row.po_no) {
                po_nos.push(row.po_no.clone());
            }
        }

        let mut po_rows = Vec::with_capacity(po_nos.len());
        let mut actual_qty = vec![0_i64; sizes.len()];
        let mut color_total = 0;

        for po_no in po_nos {
            let quantities: Vec<i64> = sizes
                .iter()
                .map(|size| {
                    members
                        .iter()
                        .filter(|r| r.po_no == po_no && &r.size == size)
                        .map(|r| r.quantity)
                        .sum()
                })
                .collect();
            let total: i64 = quantities.iter().sum();
            for (sum, q) in actual_qty.iter_mut().zip(&quantities) {
                *sum += q;
            }
            color_total += total;
            po_rows.push(PoTableRow {
                po_no,
                quantities,
                total,
            });
        }

        let order_qty: Vec<i64> = actual_qty.iter().map(|&q| order_qty_tolerance(q)).collect();
        grand_total += color_total;

        tables.push(ColorTable {
            color,
            sizes,
            po_rows,
            actual_qty,
            order_qty,
            total: color_total,
        });
    }

    PoTables {
        colors: tables,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(po_no: &str, color: &str, size: &str, quantity: i64) -> PoRow {
        PoRow {
            po_no: po_no.to_string(),
            color: color.to_string(),
            size: size.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_parse_po_text_extracts_data_lines() {
        let text = "\
ACME Kidswear Ltd - Purchase Order
Delivery: Chittagong

4500123456 NAVY BLUE 104 1,200
4500123456 NAVY BLUE 116 800
4500123457 OFF WHITE M 400
Total pieces 2,400
";
        let rows = parse_po_text(text);
        assert_eq!(rows.len(), 3);
        let first = rows.first().expect("row");
        assert_eq!(first.po_no, "4500123456");
        assert_eq!(first.color, "NAVY BLUE");
        assert_eq!(first.size, "104");
        assert_eq!(first.quantity, 1200);
    }

    #[test]
    fn test_parse_po_text_skips_headers_and_footers() {
        let rows = parse_po_text("Buyer: ACME\nPage 1 of 3\n\n");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_build_color_tables_pivot() {
        let rows = vec![
            row("PO-10001", "RED", "M", 100),
            row("PO-10001", "RED", "S", 50),
            row("PO-10002", "RED", "M", 200),
            row("PO-10001", "BLUE", "L", 10),
        ];
        let tables = build_color_tables(&rows);
        assert_eq!(tables.colors.len(), 2);
        assert_eq!(tables.grand_total, 360);

        let red = tables
            .colors
            .iter()
            .find(|t| t.color == "RED")
            .expect("RED table");
        assert_eq!(red.sizes, vec!["S", "M"]);
        assert_eq!(red.po_rows.len(), 2);
        assert_eq!(red.actual_qty, vec![50, 300]);
        // 50 * 1.03 = 51.5 -> 52; 300 * 1.03 = 309
        assert_eq!(red.order_qty, vec![52, 309]);
        assert_eq!(red.total, 350);
    }

    #[test]
    fn test_duplicate_po_size_cells_are_summed() {
        let rows = vec![
            row("PO-10001", "RED", "M", 100),
            row("PO-10001", "RED", "M", 25),
        ];
        let tables = build_color_tables(&rows);
        let red = tables.colors.first().expect("RED table");
        assert_eq!(red.po_rows.len(), 1);
        assert_eq!(red.actual_qty, vec![125]);
    }

    #[test]
    fn test_empty_input() {
        let tables = build_color_tables(&[]);
        assert!(tables.colors.is_empty());
        assert_eq!(tables.grand_total, 0);
    }
}
