//! Reading order within a column.

use std::cmp::Ordering;

use crate::model::Fragment;

/// Compare two fragments top-to-bottom, then left-to-right.
fn reading_order(a: &Fragment, b: &Fragment) -> Ordering {
    a.bbox
        .y0
        .total_cmp(&b.bbox.y0)
        .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
}

/// Sort fragments by `(y0, x0)`.
///
/// The sort is stable: fragments with identical keys keep their input order.
pub fn sort(mut fragments: Vec<Fragment>) -> Vec<Fragment> {
    fragments.sort_by(reading_order);
    fragments
}

/// Join fragment texts with newlines, trimming each and skipping blank ones.
pub fn join_texts(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .map(|f| f.trimmed_text())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
