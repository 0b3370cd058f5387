//! Color-wise grouping of challan drill-down records.

use serde::Serialize;

use crate::report::ChallanDetailRecord;

/// Bucket name for records whose color could not be resolved.
pub const UNKNOWN_COLOR: &str = "Unknown Color";

/// All drill-down records of one color, with their subtotal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorGroup {
    pub color: String,
    pub challans: Vec<ChallanDetailRecord>,
    /// Sum of member quantities.
    pub subtotal: i64,
}

/// Group drill-down records by color text (exact match, case-sensitive as
/// extracted).
///
/// Records with an empty color land in the literal [`UNKNOWN_COLOR`]
/// bucket rather than being dropped. Within each group members are ordered
/// by challan number descending (lexicographic); groups are ordered by
/// color name so output is deterministic regardless of fetch arrival
/// order.
#[must_use]
pub fn group_by_color(details: Vec<ChallanDetailRecord>) -> Vec<ColorGroup> {
    let mut groups: Vec<ColorGroup> = Vec::new();

    for mut record in details {
        if record.color.trim().is_empty() {
            record.color = UNKNOWN_COLOR.to_string();
        }
        match groups.iter_mut().find(|g| g.color == record.color) {
            Some(group) => {
                group.subtotal += record.quantity;
                group.challans.push(record);
            }
            None => groups.push(ColorGroup {
                color: record.color.clone(),
                subtotal: record.quantity,
                challans: vec![record],
            }),
        }
    }

    for group in &mut groups {
        group
            .challans
            .sort_by(|a, b| b.challan_no.cmp(&a.challan_no));
    }
    groups.sort_by(|a, b| a.color.cmp(&b.color));
    groups
}
