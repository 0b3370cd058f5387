//! Tolerant extraction of quantities and text from scraped table cells.
//!
//! ERP report cells arrive with thousands separators, non-breaking spaces,
//! stray whitespace and occasionally plain garbage. Extraction never fails:
//! a cell that does not parse contributes 0.

/// Parse a quantity cell into an integer.
///
/// Strips thousands separators (commas), ordinary and non-breaking
/// whitespace, then parses the remainder. Anything that still fails to
/// parse - empty cells, dashes, labels - yields 0.
#[must_use]
pub fn parse_qty(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '\u{a0}')
        .collect();
    cleaned.parse::<i64>().unwrap_or(0)
}

/// Normalize a scraped text cell: decode non-breaking spaces and collapse
/// internal whitespace runs to single spaces.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qty_strips_thousands_separators() {
        assert_eq!(parse_qty("1,234"), 1234);
        assert_eq!(parse_qty("1234"), 1234);
        assert_eq!(parse_qty(" 12,345,678 "), 12_345_678);
    }

    #[test]
    fn test_parse_qty_non_numeric_is_zero() {
        assert_eq!(parse_qty(""), 0);
        assert_eq!(parse_qty("-"), 0);
        assert_eq!(parse_qty("N/A"), 0);
        assert_eq!(parse_qty("\u{a0}"), 0);
    }

    #[test]
    fn test_parse_qty_negative() {
        assert_eq!(parse_qty("-30"), -30);
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Sewing \n Input \u{a0} "), "Sewing Input");
        assert_eq!(clean_text(""), "");
    }
}
