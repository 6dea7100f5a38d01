//! Single vs. two-column layout detection.

use serde::{Deserialize, Serialize};

use super::Columns;
use crate::model::Fragment;

/// Minimum fragments on each side for a page to be read as two columns.
///
/// A stray fragment on the opposite side (a page number, a caption) never
/// turns a single-column page into a spread. Sparse spreads with a single
/// block per side are read as one column.
pub const MIN_FRAGMENTS_PER_COLUMN: usize = 2;

/// Layout of a physical page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLayout {
    SingleColumn,
    TwoColumn,
}

impl PageLayout {
    /// Number of logical pages this layout produces.
    pub fn logical_pages(&self) -> u32 {
        match self {
            PageLayout::SingleColumn => 1,
            PageLayout::TwoColumn => 2,
        }
    }
}

/// Two-column test with the default threshold.
pub fn is_two_column(left: &[Fragment], right: &[Fragment]) -> bool {
    left.len() >= MIN_FRAGMENTS_PER_COLUMN && right.len() >= MIN_FRAGMENTS_PER_COLUMN
}

/// Decide the layout of classified columns with a custom threshold.
pub fn detect(columns: &Columns, min_per_column: usize) -> PageLayout {
    if columns.left.len() >= min_per_column && columns.right.len() >= min_per_column {
        PageLayout::TwoColumn
    } else {
        PageLayout::SingleColumn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn frags(n: usize) -> Vec<Fragment> {
        (0..n)
            .map(|i| Fragment::text(BBox::default(), "x", i as u32))
            .collect()
    }

    #[test]
    fn test_threshold_grid() {
        for left in 0..5 {
            for right in 0..5 {
                let expected = left >= 2 && right >= 2;
                assert_eq!(
                    is_two_column(&frags(left), &frags(right)),
                    expected,
                    "left={left} right={right}"
                );
            }
        }
    }

    #[test]
    fn test_stray_fragment_stays_single() {
        assert!(!is_two_column(&frags(1), &frags(5)));
        assert!(!is_two_column(&frags(30), &frags(1)));
    }

    #[test]
    fn test_detect_custom_threshold() {
        let columns = Columns {
            left: frags(2),
            right: frags(3),
        };
        assert_eq!(detect(&columns, 2), PageLayout::TwoColumn);
        assert_eq!(detect(&columns, 3), PageLayout::SingleColumn);
        assert_eq!(detect(&columns, 1), PageLayout::TwoColumn);
    }

    #[test]
    fn test_logical_page_count() {
        assert_eq!(PageLayout::SingleColumn.logical_pages(), 1);
        assert_eq!(PageLayout::TwoColumn.logical_pages(), 2);
    }
}
