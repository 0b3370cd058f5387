//! Sewing closing report parser.
//!
//! Sections look like the closing report (same marker row, same
//! label/value rows), but each section's numbers arrive in one wide
//! "Color Total" row that holds the input side and the output side back to
//! back: an optional leading zero-padding cell, `size_count` input cells,
//! one input subtotal, `size_count` output cells, one output subtotal,
//! then trailing rejection and WIP cells. The split arithmetic below was
//! inferred from sample markup; keep the fixture tests in sync with real
//! documents.

use scraper::Html;

use seamline_core::qty::parse_qty;
use seamline_core::report::{ReportBlock, SewingBlock};

use super::closing::{apply_row, is_marker_row};
use super::{cell_texts, sel};

/// Exact label of the wide totals row. A lookalike row without this label
/// must not be split.
const COLOR_TOTAL_LABEL: &str = "Color Total";

#[derive(Debug, Default)]
struct Section {
    head: ReportBlock,
    totals: Option<Vec<i64>>,
}

/// Split one "Color Total" row into a [`SewingBlock`], given the section's
/// size count.
fn split_color_total(head: &ReportBlock, mut nums: Vec<i64>) -> Option<SewingBlock> {
    let size_count = head.sizes.len();
    if size_count == 0 {
        return None;
    }
    let expected = 2 * size_count + 2;
    // Some report variants pad the row with a leading zero cell.
    if nums.len() > expected && nums.first() == Some(&0) {
        nums.remove(0);
    }
    if nums.len() < expected {
        return None;
    }

    let input = nums.get(..size_count)?.to_vec();
    let input_total = nums.get(size_count).copied()?;
    let output = nums.get(size_count + 1..2 * size_count + 1)?.to_vec();
    let output_total = nums.get(2 * size_count + 1).copied()?;
    let rejection = nums.get(2 * size_count + 2).copied().unwrap_or(0);
    let wip = nums.get(2 * size_count + 3).copied().unwrap_or(0);

    Some(SewingBlock {
        buyer: head.buyer.clone(),
        style: head.style.clone(),
        color: head.color.clone(),
        sizes: head.sizes.clone(),
        input,
        input_total,
        output,
        output_total,
        rejection,
        wip,
    })
}

fn finish(blocks: &mut Vec<SewingBlock>, section: Option<Section>) {
    if let Some(section) = section
        && let Some(nums) = section.totals
        && let Some(block) = split_color_total(&section.head, nums)
    {
        blocks.push(block);
    }
}

/// Parse the sewing closing report into per-color input/output blocks.
#[must_use]
pub fn parse_sewing_blocks(html: &str) -> Vec<SewingBlock> {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();
    let mut current: Option<Section> = None;

    for row in document.select(&sel("tr")) {
        if is_marker_row(row) {
            finish(&mut blocks, current.take());
            current = Some(Section::default());
            continue;
        }
        let Some(section) = current.as_mut() else {
            continue;
        };

        let cells = cell_texts(row);
        if let Some(label_idx) = cells.iter().position(|c| c == COLOR_TOTAL_LABEL) {
            let nums: Vec<i64> = cells
                .iter()
                .skip(label_idx + 1)
                .map(|c| parse_qty(c))
                .collect();
            section.totals = Some(nums);
        } else {
            apply_row(&mut section.head, &cells);
        }
    }
    finish(&mut blocks, current.take());

    blocks
}
