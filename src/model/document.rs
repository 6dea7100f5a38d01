//! Document-level types.

use super::LogicalPage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default extension of written output files.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "md";

/// A fully assembled document: the ordered logical pages and their Markdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Path of the source document
    pub source: PathBuf,

    /// Logical pages in emission order
    pub pages: Vec<LogicalPage>,

    /// Concatenated Markdown of all logical pages
    #[serde(skip)]
    pub markdown: String,

    /// Counters collected while assembling
    pub stats: ConversionStats,
}

impl Document {
    /// Create an empty document for `source`.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Markdown output of the document.
    pub fn to_markdown(&self) -> &str {
        &self.markdown
    }

    /// Serialize the document model to JSON.
    pub fn to_json(&self, pretty: bool) -> crate::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Number of logical pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Base name of the source document, without directory or extension.
    pub fn base_name(&self) -> String {
        base_name(&self.source)
    }

    /// Output file name: `{base_name}.{extension}`.
    pub fn output_file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.base_name(), extension)
    }
}

/// Base name of a path: file name without its last extension.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Counters collected while assembling a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Physical pages processed
    pub physical_pages: u32,

    /// Physical pages emitted through the whole-page text path
    pub single_column_pages: u32,

    /// Physical pages split into two logical pages
    pub two_column_pages: u32,

    /// Logical pages emitted
    pub logical_pages: u32,

    /// Text fragments kept by the extractor
    pub fragments: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        let doc = Document::new("./input_data/documents/annual report.v2.pdf");
        assert_eq!(doc.base_name(), "annual report.v2");
        assert_eq!(doc.output_file_name("md"), "annual report.v2.md");
    }

    #[test]
    fn test_base_name_fallback() {
        assert_eq!(base_name(Path::new("/")), "document");
    }

    #[test]
    fn test_json_skips_markdown_buffer() {
        let mut doc = Document::new("a.pdf");
        doc.markdown = "## Page 1\n\n\n\n".to_string();
        doc.pages.push(LogicalPage::single(1, 1, ""));
        let json = doc.to_json(false).unwrap();
        assert!(json.contains("\"pages\""));
        assert!(!json.contains("markdown"));
    }
}
