//! # unspread
//!
//! Two-column aware page text reconstruction for PDF documents.
//!
//! Scanned books and exported spreads often put two facing pages side by side
//! on one physical page. Plain text extraction reads such a page line by line
//! across both halves. unspread detects those pages, splits them into a left
//! and a right logical page, and writes every logical page as a numbered
//! Markdown section.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unspread::{convert_file, LayoutOptions};
//!
//! fn main() -> unspread::Result<()> {
//!     let doc = convert_file("book.pdf", &LayoutOptions::default())?;
//!     print!("{}", doc.to_markdown());
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`layout::FragmentExtractor`] pulls positioned text blocks from a backend
//! - [`layout::classify`] splits them at the page center
//! - [`layout::detect`] decides between one and two columns
//! - [`layout::sort`] restores reading order inside a column
//! - [`PageAssembler`] numbers the logical pages and builds the Markdown
//! - [`BatchConverter`] runs all of the above over a directory

pub mod assemble;
pub mod backend;
pub mod batch;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod model;
pub mod options;

pub use assemble::{assemble_document, AssemblerState, PageAssembler};
pub use backend::{LopdfBackend, MemoryBackend, PdfBackend};
pub use batch::{write_atomic, BatchConverter, BatchFailure, BatchReport};
pub use diagnostics::Diagnostics;
pub use error::{Error, Result};
pub use layout::{PageLayout, MIN_FRAGMENTS_PER_COLUMN};
pub use model::{
    BBox, ColumnSide, ConversionStats, Document, Fragment, FragmentKind, LogicalPage, Page,
};
pub use options::{BatchOptions, LayoutOptions};

use std::path::Path;

/// Convert a PDF file into a document of logical pages.
///
/// # Example
///
/// ```no_run
/// use unspread::{convert_file, LayoutOptions};
///
/// let doc = convert_file("spread.pdf", &LayoutOptions::default()).unwrap();
/// println!("Logical pages: {}", doc.page_count());
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, options: &LayoutOptions) -> Result<Document> {
    let path = path.as_ref();
    let backend = LopdfBackend::open(path)?;
    assemble_document(&backend, path, options, &Diagnostics::new())
}

/// Convert PDF bytes into a document of logical pages.
pub fn convert_bytes(data: &[u8], options: &LayoutOptions) -> Result<Document> {
    let backend = LopdfBackend::from_bytes(data)?;
    assemble_document(&backend, "<memory>", options, &Diagnostics::new())
}

/// Convert a PDF file straight to Markdown with default options.
///
/// ```no_run
/// let markdown = unspread::to_markdown("spread.pdf").unwrap();
/// assert!(markdown.starts_with("## Page 1"));
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = convert_file(path, &LayoutOptions::default())?;
    Ok(doc.markdown)
}

/// Dump the raw fragments of every page, or of one page, without filtering.
pub fn page_fragments<P: AsRef<Path>>(path: P, page: Option<u32>) -> Result<Vec<Page>> {
    let backend = LopdfBackend::open(path)?;
    match page {
        Some(n) => Ok(vec![backend.page(n)?]),
        None => (1..=backend.page_count())
            .map(|n| backend.page(n))
            .collect(),
    }
}
