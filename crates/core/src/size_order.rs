//! Canonical garment size ordering.
//!
//! PO sheets and ERP reports print sizes in whatever order the buyer's
//! template used. Export tables need one canonical order: numeric and
//! infant sizes first in ascending numeric order, then the letter sizes in
//! the fixed S..XXXXXL progression, then anything unrecognised
//! alphabetically.

use std::cmp::Ordering;

/// Letter sizes in progression order.
const LETTER_PROGRESSION: [&str; 8] = ["S", "M", "L", "XL", "XXL", "XXXL", "XXXXL", "XXXXXL"];

/// Ordering class for one size label. Lower classes sort first.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SizeClass {
    /// Purely numeric label ("10", "104").
    Numeric(i64),
    /// Leading-digit infant/toddler label ("2A", "6M", "18-24M").
    Infant(i64, String),
    /// Known letter size; payload is the progression index.
    Letter(usize),
    /// Anything else, alphabetical fallback.
    Other(String),
}

impl SizeClass {
    const fn rank(&self) -> u8 {
        match self {
            Self::Numeric(_) => 0,
            Self::Infant(..) => 1,
            Self::Letter(_) => 2,
            Self::Other(_) => 3,
        }
    }
}

fn classify(label: &str) -> SizeClass {
    let normalized = label.trim().to_ascii_uppercase();
    if !normalized.is_empty() && normalized.bytes().all(|b| b.is_ascii_digit()) {
        // Labels long enough to overflow i64 fall through to Other.
        if let Ok(n) = normalized.parse::<i64>() {
            return SizeClass::Numeric(n);
        }
    }
    if normalized
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit())
    {
        let prefix: String = normalized
            .bytes()
            .take_while(u8::is_ascii_digit)
            .map(char::from)
            .collect();
        if let Ok(n) = prefix.parse::<i64>() {
            return SizeClass::Infant(n, normalized);
        }
    }
    if let Some(idx) = LETTER_PROGRESSION.iter().position(|s| *s == normalized) {
        return SizeClass::Letter(idx);
    }
    SizeClass::Other(normalized)
}

/// Compare two size labels in canonical order.
#[must_use]
pub fn canonical_cmp(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (classify(a), classify(b));
    match ca.rank().cmp(&cb.rank()) {
        Ordering::Equal => match (ca, cb) {
            (SizeClass::Numeric(x), SizeClass::Numeric(y)) => x.cmp(&y),
            (SizeClass::Infant(x, sa), SizeClass::Infant(y, sb)) => {
                x.cmp(&y).then_with(|| sa.cmp(&sb))
            }
            (SizeClass::Letter(x), SizeClass::Letter(y)) => x.cmp(&y),
            (SizeClass::Other(sa), SizeClass::Other(sb)) => sa.cmp(&sb),
            // Ranks were equal, so the variants match; unreachable otherwise.
            _ => Ordering::Equal,
        },
        unequal => unequal,
    }
}

/// Sort size labels in place into canonical order.
pub fn canonical_sort(sizes: &mut [String]) {
    sizes.sort_by(|a, b| canonical_cmp(a, b));
}
