//! In-memory backend.
//!
//! Serves pages that were built or decoded elsewhere. Used for replaying
//! fragment dumps and for exercising the pipeline without PDF files.

use std::collections::HashSet;

use super::PdfBackend;
use crate::error::{Error, Result};
use crate::model::Page;

#[derive(Debug, Clone)]
struct StoredPage {
    page: Page,
    text: String,
}

/// A [`PdfBackend`] over pre-built pages.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pages: Vec<StoredPage>,
    failing: HashSet<u32>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page with its whole-page text.
    ///
    /// The page is renumbered to its position in the backend.
    pub fn push_page(&mut self, mut page: Page, text: impl Into<String>) {
        page.number = self.pages.len() as u32 + 1;
        self.pages.push(StoredPage {
            page,
            text: text.into(),
        });
    }

    /// Builder-style variant of [`MemoryBackend::push_page`].
    pub fn with_page(mut self, page: Page, text: impl Into<String>) -> Self {
        self.push_page(page, text);
        self
    }

    /// Make every request for `number` fail with a decode error.
    pub fn fail_on(mut self, number: u32) -> Self {
        self.failing.insert(number);
        self
    }

    fn stored(&self, number: u32) -> Result<&StoredPage> {
        if self.failing.contains(&number) {
            return Err(Error::DecodeFragment {
                page: number,
                reason: "page data unavailable".to_string(),
            });
        }
        number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .ok_or(Error::PageOutOfRange(number, self.pages.len() as u32))
    }
}

impl PdfBackend for MemoryBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Result<Page> {
        self.stored(number).map(|s| s.page.clone())
    }

    fn page_text(&self, number: u32) -> Result<String> {
        self.stored(number).map(|s| s.text.clone())
    }
}
