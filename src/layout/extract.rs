//! Fragment extraction from a decoding backend.

use crate::backend::PdfBackend;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::{Fragment, Page};

/// Pulls a page from the backend and keeps only usable text fragments.
///
/// This is the single filtering point of the pipeline: everything downstream
/// may assume `Text` fragments with a sequence id and non-blank content.
pub struct FragmentExtractor<'a> {
    diagnostics: &'a Diagnostics,
}

impl<'a> FragmentExtractor<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        Self { diagnostics }
    }

    /// Fetch page `number` and filter its fragments in place.
    ///
    /// Backend failures are returned with page context; they are fatal for
    /// the document being processed.
    pub fn extract<B: PdfBackend + ?Sized>(&self, backend: &B, number: u32) -> Result<Page> {
        let mut page = backend.page(number).map_err(|e| e.at_page(number))?;

        if self.diagnostics.debug_enabled() {
            self.diagnostics
                .debug(format_args!("page {} blocks: {:?}", number, page.fragments));
        }

        let total = page.fragments.len();
        page.fragments = filter_text(page.fragments);

        self.diagnostics.debug(format_args!(
            "extracted {} text blocks from page {} ({} raw)",
            page.fragments.len(),
            number,
            total
        ));

        Ok(page)
    }
}

/// Keep `Text` fragments that have a sequence id and non-blank text.
pub fn filter_text(fragments: Vec<Fragment>) -> Vec<Fragment> {
    fragments
        .into_iter()
        .filter(Fragment::is_usable_text)
        .collect()
}
