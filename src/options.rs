//! Layout and batch configuration.

use std::path::PathBuf;

use crate::layout::MIN_FRAGMENTS_PER_COLUMN;
use crate::model::{DEFAULT_HEADING_LABEL, DEFAULT_OUTPUT_EXTENSION};

/// Default input directory of the batch converter.
pub const DEFAULT_INPUT_DIR: &str = "./input_data/documents/";

/// Default output directory of the batch converter.
pub const DEFAULT_OUTPUT_DIR: &str = "./preprocessed_data/documents/";

/// Default input file pattern.
pub const DEFAULT_PATTERN: &str = "*.pdf";

/// Options controlling per-page layout reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Minimum fragments each side needs before a page counts as two-column
    pub min_column_fragments: usize,

    /// Label written in page headings (`## {label} {number}`)
    pub heading_label: String,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the two-column threshold. Values below 1 are raised to 1.
    pub fn with_min_column_fragments(mut self, min: usize) -> Self {
        self.min_column_fragments = min.max(1);
        self
    }

    /// Set the page heading label.
    pub fn with_heading_label(mut self, label: impl Into<String>) -> Self {
        self.heading_label = label.into();
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_column_fragments: MIN_FRAGMENTS_PER_COLUMN,
            heading_label: DEFAULT_HEADING_LABEL.to_string(),
        }
    }
}

/// Options for converting a directory of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Directory scanned for source documents
    pub input_dir: PathBuf,

    /// Directory receiving one output file per document
    pub output_dir: PathBuf,

    /// File name pattern (`*` and `?` wildcards)
    pub pattern: String,

    /// Extension of written output files
    pub output_extension: String,

    /// Per-page layout options
    pub layout: LayoutOptions,
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input directory.
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the input file pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the output file extension (without the leading dot).
    pub fn with_output_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.output_extension = ext.trim_start_matches('.').to_string();
        self
    }

    /// Set layout options.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pattern: DEFAULT_PATTERN.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            layout: LayoutOptions::default(),
        }
    }
}
