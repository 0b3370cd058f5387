//! Parsers for the color-wise drill-down lookups.
//!
//! Resolving a challan to its internal system id goes through the ERP's
//! create/search screen, which renders matches either as `<option>`
//! elements or as result table rows depending on the screen variant. Both
//! shapes are tried; the match is fuzzy text containment because the
//! screen decorates challan numbers with dates and company names.

use scraper::Html;

use seamline_core::qty::{clean_text, parse_qty};

use super::{cell_texts, sel};

/// Element id of the per-challan breakdown table body.
pub(crate) const DETAIL_TABLE_ID: &str = "tblChallanDetail";

/// One parsed row of the per-challan breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub line: String,
    pub color: String,
    pub quantity: i64,
}

/// Resolve a challan number to its internal system id from search-result
/// markup.
///
/// Tries `<option value="id">...text...</option>` first, then result rows
/// whose first cell holds the id and whose text mentions the challan.
#[must_use]
pub fn parse_search_system_id(html: &str, challan_no: &str) -> Option<i64> {
    let document = Html::parse_document(html);

    for option in document.select(&sel("option")) {
        let text = clean_text(&option.text().collect::<String>());
        if text.contains(challan_no)
            && let Some(value) = option.value().attr("value")
            && let Ok(id) = value.trim().parse::<i64>()
        {
            return Some(id);
        }
    }

    for row in document.select(&sel("tr")) {
        let cells = cell_texts(row);
        if cells.iter().any(|c| c.contains(challan_no))
            && let Some(first) = cells.first()
            && let Ok(id) = first.parse::<i64>()
        {
            return Some(id);
        }
    }

    None
}

/// Parse the per-challan size/line/color breakdown.
#[must_use]
pub fn parse_detail_rows(html: &str) -> Vec<DetailRow> {
    let document = Html::parse_document(html);
    let row_selector = sel(&format!("#{DETAIL_TABLE_ID} tr"));

    let mut rows = Vec::new();
    for row in document.select(&row_selector) {
        let cells = cell_texts(row);
        if cells.len() < 3 {
            continue;
        }
        let line = cells.first().cloned().unwrap_or_default();
        if line.is_empty() || line.to_lowercase().contains("line") {
            continue;
        }
        rows.push(DetailRow {
            line,
            color: cells.get(1).cloned().unwrap_or_default(),
            quantity: cells.get(2).map_or(0, |c| parse_qty(c)),
        });
    }
    rows
}
