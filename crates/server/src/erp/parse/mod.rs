//! Parsers for the ERP's server-rendered report HTML.
//!
//! All parsers are pure functions over the markup string - no I/O - and
//! degrade row by row: a fragment that does not match the expected shape
//! is skipped, never fatal. The label fragments, marker colors and table
//! ids in these modules encode undocumented knowledge of the ERP's markup
//! quirks; change them only against real sample documents.

pub mod challan;
pub mod closing;
pub mod drill;
pub mod hourly;
pub mod sewing;

use scraper::{ElementRef, Selector};

use seamline_core::qty::clean_text;

/// Parse a static CSS selector.
///
/// Only called with literal selectors, so failure is a programming error.
pub(crate) fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("valid static selector")
}

/// The cleaned text of every `td`/`th` cell of a row, in document order.
pub(crate) fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&sel("td, th"))
        .map(|cell| clean_text(&cell.text().collect::<String>()))
        .collect()
}

/// Case-insensitive equality against a `bgcolor`-style attribute value.
pub(crate) fn attr_eq(value: Option<&str>, expected: &str) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
}
