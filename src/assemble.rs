//! Page assembly: physical pages in, numbered logical pages out.
//!
//! The assembler drives one document through the layout stages page by page:
//!
//! ```text
//! AwaitingPage --two columns--> EmittingDouble --+
//!      ^    \                                    |
//!      |     +--one column--> EmittingSingle ----+
//!      +-----------------------------------------+
//! AwaitingPage --no pages left--> Done
//! ```
//!
//! Two-column pages are rebuilt from positioned fragments, one logical page
//! per column. Single-column pages use the backend's own whole-page text.

use std::path::PathBuf;

use crate::backend::PdfBackend;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::layout::{classify, detect, join_texts, sort, FragmentExtractor, PageLayout};
use crate::model::{ColumnSide, Document, LogicalPage};
use crate::options::LayoutOptions;

/// Where the assembler is in its page loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Ready for the next physical page.
    AwaitingPage,
    /// Emitting the whole-page text of a single-column page.
    EmittingSingle,
    /// Emitting the left then right column of a two-column page.
    EmittingDouble,
    /// All pages consumed; the document is complete.
    Done,
}

/// Builds a [`Document`] from a backend, one physical page at a time.
pub struct PageAssembler<'a> {
    options: LayoutOptions,
    diagnostics: &'a Diagnostics,
    state: AssemblerState,
    next_number: u32,
    document: Document,
}

impl<'a> PageAssembler<'a> {
    /// Create an assembler. Logical page numbering starts at 1.
    pub fn new(options: LayoutOptions, diagnostics: &'a Diagnostics) -> Self {
        Self {
            options,
            diagnostics,
            state: AssemblerState::AwaitingPage,
            next_number: 1,
            document: Document::default(),
        }
    }

    /// Record the source path on the produced document.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.document.source = source.into();
        self
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Number the next emitted logical page will get.
    pub fn next_number(&self) -> u32 {
        self.next_number
    }

    /// Logical pages emitted so far.
    pub fn pages(&self) -> &[LogicalPage] {
        &self.document.pages
    }

    /// Markdown accumulated so far.
    pub fn markdown(&self) -> &str {
        &self.document.markdown
    }

    /// Process physical page `number` and return the logical pages it emitted.
    ///
    /// Given identical page data and the same starting number, the emitted
    /// pages are identical.
    pub fn process_page<B: PdfBackend + ?Sized>(
        &mut self,
        backend: &B,
        number: u32,
    ) -> Result<&[LogicalPage]> {
        if self.state == AssemblerState::Done {
            return Err(Error::DecodeFragment {
                page: number,
                reason: "assembler already finished".to_string(),
            });
        }

        let page = FragmentExtractor::new(self.diagnostics).extract(backend, number)?;
        let fragment_count = page.fragments.len();
        let columns = classify(page.fragments, page.width);
        let layout = detect(&columns, self.options.min_column_fragments);

        self.diagnostics.debug(format_args!(
            "page {}: {} left, {} right -> {:?}",
            number,
            columns.left.len(),
            columns.right.len(),
            layout
        ));

        let first = self.document.pages.len();
        let start = self.next_number;

        match layout {
            PageLayout::TwoColumn => {
                self.state = AssemblerState::EmittingDouble;
                let left = join_texts(&sort(columns.left));
                let right = join_texts(&sort(columns.right));
                self.emit(LogicalPage::column(start, number, ColumnSide::Left, left));
                self.emit(LogicalPage::column(start + 1, number, ColumnSide::Right, right));
                self.document.stats.two_column_pages += 1;
            }
            PageLayout::SingleColumn => {
                self.state = AssemblerState::EmittingSingle;
                let text = backend
                    .page_text(number)
                    .map_err(|e| e.at_page(number))?;
                self.emit(LogicalPage::single(start, number, text.trim()));
                self.document.stats.single_column_pages += 1;
            }
        }

        self.next_number = start + layout.logical_pages();
        self.document.stats.physical_pages += 1;
        self.document.stats.fragments += fragment_count as u32;
        self.state = AssemblerState::AwaitingPage;

        Ok(&self.document.pages[first..])
    }

    fn emit(&mut self, page: LogicalPage) {
        page.write_markdown(&self.options.heading_label, &mut self.document.markdown);
        self.document.stats.logical_pages += 1;
        self.document.pages.push(page);
    }

    /// Close the assembler and hand out the finished document.
    pub fn finish(mut self) -> Document {
        self.state = AssemblerState::Done;
        self.document
    }

    /// Process every page of `backend` in physical order.
    ///
    /// The first page error aborts the whole document; no partial document
    /// is returned.
    pub fn assemble<B: PdfBackend + ?Sized>(mut self, backend: &B) -> Result<Document> {
        let count = backend.page_count();
        for number in 1..=count {
            self.process_page(backend, number)?;
        }

        self.diagnostics.info(format_args!(
            "assembled {} logical pages from {} physical pages",
            self.document.stats.logical_pages, count
        ));

        Ok(self.finish())
    }
}

/// Assemble a whole document with the given options.
pub fn assemble_document<B: PdfBackend + ?Sized>(
    backend: &B,
    source: impl Into<PathBuf>,
    options: &LayoutOptions,
    diagnostics: &Diagnostics,
) -> Result<Document> {
    PageAssembler::new(options.clone(), diagnostics)
        .with_source(source)
        .assemble(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::model::{BBox, Fragment, Page};

    fn block(x0: f32, y0: f32, text: &str, id: u32) -> Fragment {
        Fragment::text(BBox::new(x0, y0, x0 + 40.0, y0 + 12.0), text, id)
    }

    fn spread() -> Page {
        Page::new(1, 600.0, 400.0)
            .with_fragment(block(20.0, 10.0, "L1", 0))
            .with_fragment(block(20.0, 50.0, "L2", 1))
            .with_fragment(block(400.0, 10.0, "R1", 2))
            .with_fragment(block(400.0, 50.0, "R2", 3))
    }

    #[test]
    fn test_state_returns_to_awaiting() {
        let backend = MemoryBackend::new().with_page(spread(), "");
        let diagnostics = Diagnostics::new();
        let mut assembler = PageAssembler::new(LayoutOptions::default(), &diagnostics);
        assert_eq!(assembler.state(), AssemblerState::AwaitingPage);

        let emitted = assembler.process_page(&backend, 1).unwrap();
        assert_eq!(emitted.len(), 2);
        assert_eq!(assembler.state(), AssemblerState::AwaitingPage);
        assert_eq!(assembler.next_number(), 3);
    }

    #[test]
    fn test_two_column_bodies() {
        let backend = MemoryBackend::new().with_page(spread(), "ignored");
        let diagnostics = Diagnostics::new();
        let doc = PageAssembler::new(LayoutOptions::default(), &diagnostics)
            .assemble(&backend)
            .unwrap();

        assert_eq!(doc.pages[0].body, "L1\nL2");
        assert_eq!(doc.pages[0].side, Some(ColumnSide::Left));
        assert_eq!(doc.pages[1].body, "R1\nR2");
        assert_eq!(
            doc.to_markdown(),
            "## Page 1\n\nL1\nL2\n\n## Page 2\n\nR1\nR2\n\n"
        );
        assert_eq!(doc.stats.two_column_pages, 1);
        assert_eq!(doc.stats.fragments, 4);
    }

    #[test]
    fn test_single_column_uses_page_text() {
        let page = Page::new(1, 600.0, 400.0).with_fragment(block(20.0, 10.0, "only", 0));
        let backend = MemoryBackend::new().with_page(page, "\n  whole page text \n");
        let diagnostics = Diagnostics::new();
        let doc = PageAssembler::new(LayoutOptions::default(), &diagnostics)
            .assemble(&backend)
            .unwrap();

        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].body, "whole page text");
        assert_eq!(doc.pages[0].side, None);
    }

    #[test]
    fn test_threshold_override() {
        let backend = MemoryBackend::new().with_page(spread(), "whole");
        let diagnostics = Diagnostics::new();
        let options = LayoutOptions::new().with_min_column_fragments(3);
        let doc = PageAssembler::new(options, &diagnostics)
            .assemble(&backend)
            .unwrap();

        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].body, "whole");
    }

    #[test]
    fn test_custom_heading_label() {
        let backend = MemoryBackend::new().with_page(Page::a4(1), "本文");
        let diagnostics = Diagnostics::new();
        let options = LayoutOptions::new().with_heading_label("ページ");
        let doc = PageAssembler::new(options, &diagnostics)
            .assemble(&backend)
            .unwrap();
        assert_eq!(doc.to_markdown(), "## ページ 1\n\n本文\n\n");
    }

    #[test]
    fn test_finished_assembler_rejects_pages() {
        let backend = MemoryBackend::new().with_page(Page::a4(1), "");
        let diagnostics = Diagnostics::new();
        let mut assembler = PageAssembler::new(LayoutOptions::default(), &diagnostics);
        assembler.state = AssemblerState::Done;
        assert!(assembler.process_page(&backend, 1).is_err());
    }

    #[test]
    fn test_page_text_failure_aborts() {
        let backend = MemoryBackend::new()
            .with_page(Page::a4(1), "one")
            .with_page(Page::a4(2), "two")
            .fail_on(2);
        let diagnostics = Diagnostics::new();
        let result = assemble_document(&backend, "x.pdf", &LayoutOptions::default(), &diagnostics);
        assert!(matches!(result, Err(Error::DecodeFragment { page: 2, .. })));
    }
}
