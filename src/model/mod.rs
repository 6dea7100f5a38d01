//! Document model types for page layout reconstruction.
//!
//! Fragments and pages are read-only views produced by a decoding backend;
//! logical pages and documents are what the assembler emits.

mod document;
mod fragment;
mod logical;
mod page;

pub use document::{base_name, ConversionStats, Document, DEFAULT_OUTPUT_EXTENSION};
pub use fragment::{BBox, Fragment, FragmentKind};
pub use logical::{ColumnSide, LogicalPage, DEFAULT_HEADING_LABEL};
pub use page::Page;
