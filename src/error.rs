//! Error types for unspread.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for unspread operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing page text.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source document could not be opened by the decoding backend.
    #[error("Failed to open {}: {reason}", path.display())]
    DecodeOpen { path: PathBuf, reason: String },

    /// The fragments or text of a page could not be retrieved.
    #[error("Failed to decode page {page}: {reason}")]
    DecodeFragment { page: u32, reason: String },

    /// The output artifact could not be persisted.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF document is encrypted and cannot be decoded.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The input file pattern could not be compiled.
    #[error("Invalid file pattern '{0}'")]
    InvalidPattern(String),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap any page-level failure as a fragment decoding error for `page`.
    ///
    /// Errors that already carry page context are returned unchanged.
    pub fn at_page(self, page: u32) -> Self {
        match self {
            Error::DecodeFragment { .. } => self,
            other => Error::DecodeFragment {
                page,
                reason: other.to_string(),
            },
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DecodeFragment {
            page: 5,
            reason: "broken content stream".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to decode page 5: broken content stream"
        );

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_at_page_keeps_existing_context() {
        let err = Error::DecodeFragment {
            page: 2,
            reason: "x".to_string(),
        };
        assert!(matches!(
            err.at_page(7),
            Error::DecodeFragment { page: 2, .. }
        ));

        let err = Error::PdfParse("bad xref".to_string()).at_page(7);
        match err {
            Error::DecodeFragment { page, reason } => {
                assert_eq!(page, 7);
                assert!(reason.contains("bad xref"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
