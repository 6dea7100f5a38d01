//! Page-level types.

use super::Fragment;
use serde::{Deserialize, Serialize};

/// A single physical page as delivered by the decoding backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed, physical order)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch); the column-split axis
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Fragments in decoder order, not necessarily reading order
    pub fragments: Vec<Fragment>,
}

impl Page {
    /// Create a new empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            fragments: Vec::new(),
        }
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(number: u32) -> Self {
        Self::new(number, 595.0, 842.0)
    }

    /// Create a landscape A3 page, the usual size of a scanned two-page spread.
    pub fn a3_landscape(number: u32) -> Self {
        Self::new(number, 1191.0, 842.0)
    }

    /// Add a fragment to the page.
    pub fn add_fragment(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Builder-style variant of [`Page::add_fragment`].
    pub fn with_fragment(mut self, fragment: Fragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Check if the page has no fragments at all.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    #[test]
    fn test_page_builders() {
        let page = Page::a3_landscape(3)
            .with_fragment(Fragment::text(BBox::new(0.0, 0.0, 10.0, 10.0), "a", 0));
        assert_eq!(page.number, 3);
        assert!(page.width > page.height);
        assert!(!page.is_empty());
        assert!(Page::a4(1).is_empty());
    }
}
