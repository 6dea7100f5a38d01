//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the document-decoding collaborator,
//! isolating the concrete PDF library (lopdf) from the layout logic. The
//! layout pipeline only ever sees [`Page`] and [`Fragment`] values.
//!
//! [`Fragment`]: crate::model::Fragment

mod content;
mod lopdf_backend;
mod memory;

pub use lopdf_backend::LopdfBackend;
pub use memory::MemoryBackend;

use crate::error::Result;
use crate::model::Page;

/// Abstract interface for page-level PDF access.
///
/// Pages are numbered from 1 in physical order.
pub trait PdfBackend {
    /// Number of physical pages.
    fn page_count(&self) -> u32;

    /// Page metrics plus every text and non-text fragment of the page.
    fn page(&self, number: u32) -> Result<Page>;

    /// The decoder's own whole-page text extraction.
    fn page_text(&self, number: u32) -> Result<String>;
}

impl<B: PdfBackend + ?Sized> PdfBackend for &B {
    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn page(&self, number: u32) -> Result<Page> {
        (**self).page(number)
    }

    fn page_text(&self, number: u32) -> Result<String> {
        (**self).page_text(number)
    }
}

impl<B: PdfBackend + ?Sized> PdfBackend for Box<B> {
    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn page(&self, number: u32) -> Result<Page> {
        (**self).page(number)
    }

    fn page_text(&self, number: u32) -> Result<String> {
        (**self).page_text(number)
    }
}
