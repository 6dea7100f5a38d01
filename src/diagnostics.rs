//! Diagnostics handle passed to the layout components.
//!
//! Components never log through ambient global state of their own: the batch
//! driver builds a [`Diagnostics`] handle, scopes it to each document, and
//! hands it down by reference. Messages go through the `log` facade, so any
//! installed logger (e.g. `env_logger` in the CLI) receives them.

use std::fmt;

use log::Level;

/// Log target used by all unspread diagnostics.
pub const LOG_TARGET: &str = "unspread";

/// Logging handle carrying document context.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    target: String,
    document: Option<String>,
}

impl Diagnostics {
    /// Create a handle logging under the default target.
    pub fn new() -> Self {
        Self::with_target(LOG_TARGET)
    }

    /// Create a handle logging under a custom target.
    pub fn with_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            document: None,
        }
    }

    /// Derive a handle whose messages are prefixed with a document name.
    pub fn for_document(&self, document: impl Into<String>) -> Self {
        Self {
            target: self.target.clone(),
            document: Some(document.into()),
        }
    }

    /// Log target of this handle.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Document this handle is scoped to, if any.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    /// Whether debug output would be recorded; used to skip building dumps.
    pub fn debug_enabled(&self) -> bool {
        log::log_enabled!(target: self.target.as_str(), Level::Debug)
    }

    /// Flush the installed logger. Called by the driver at shutdown.
    pub fn flush(&self) {
        log::logger().flush();
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        match &self.document {
            Some(doc) => log::log!(target: self.target.as_str(), level, "[{}] {}", doc, args),
            None => log::log!(target: self.target.as_str(), level, "{}", args),
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_scope() {
        let root = Diagnostics::new();
        assert_eq!(root.target(), LOG_TARGET);
        assert_eq!(root.document(), None);

        let scoped = root.for_document("report.pdf");
        assert_eq!(scoped.document(), Some("report.pdf"));
        assert_eq!(scoped.target(), LOG_TARGET);
    }

    #[test]
    fn test_logging_without_logger_is_noop() {
        let diag = Diagnostics::with_target("unspread::test").for_document("a.pdf");
        diag.info(format_args!("page {} done", 1));
        diag.debug(format_args!("blocks: {:?}", Vec::<u8>::new()));
        diag.error(format_args!("failed"));
        diag.flush();
    }
}
