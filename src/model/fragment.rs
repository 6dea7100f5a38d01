//! Positioned text fragments.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page space.
///
/// `(x0, y0)` is the top-left corner and `(x1, y1)` the bottom-right one.
/// Y grows downward, so smaller `y0` means higher on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from its corner coordinates.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Horizontal midpoint of the box.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// What a fragment represents on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// A block of text
    #[default]
    Text,
    /// An image or other graphic placement
    NonText,
}

/// A single chunk of positioned content on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Bounding box in page space
    pub bbox: BBox,

    /// Raw extracted text; may carry surrounding whitespace
    pub text: String,

    /// Position of the fragment in the decoder's extraction order
    pub sequence_id: Option<u32>,

    /// Text or non-text discriminator
    pub kind: FragmentKind,
}

impl Fragment {
    /// Create a text fragment.
    pub fn text(bbox: BBox, text: impl Into<String>, sequence_id: u32) -> Self {
        Self {
            bbox,
            text: text.into(),
            sequence_id: Some(sequence_id),
            kind: FragmentKind::Text,
        }
    }

    /// Create a non-text fragment (image, graphic).
    pub fn non_text(bbox: BBox, sequence_id: u32) -> Self {
        Self {
            bbox,
            text: String::new(),
            sequence_id: Some(sequence_id),
            kind: FragmentKind::NonText,
        }
    }

    /// Drop the sequence id.
    pub fn without_sequence_id(mut self) -> Self {
        self.sequence_id = None;
        self
    }

    /// Text with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Whether the fragment takes part in layout reconstruction.
    pub fn is_usable_text(&self) -> bool {
        self.kind == FragmentKind::Text
            && self.sequence_id.is_some()
            && !self.text.trim().is_empty()
    }
}
