//! Left/right column classification.

use crate::model::{ColumnSide, Fragment};

/// Fragments of one page split by side. Input order is kept in each group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub left: Vec<Fragment>,
    pub right: Vec<Fragment>,
}

impl Columns {
    /// Total number of classified fragments.
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Side of the page a fragment belongs to.
///
/// A fragment is on the left when its horizontal midpoint lies strictly left
/// of the page center; a midpoint exactly on the center goes right.
pub fn side_of(fragment: &Fragment, page_width: f32) -> ColumnSide {
    if fragment.bbox.center_x() < page_width / 2.0 {
        ColumnSide::Left
    } else {
        ColumnSide::Right
    }
}

/// Partition fragments into left and right groups by their midpoint.
pub fn classify(fragments: Vec<Fragment>, page_width: f32) -> Columns {
    let mut columns = Columns::default();
    for fragment in fragments {
        match side_of(&fragment, page_width) {
            ColumnSide::Left => columns.left.push(fragment),
            ColumnSide::Right => columns.right.push(fragment),
        }
    }
    columns
}
