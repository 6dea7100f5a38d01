//! Directory batch conversion.
//!
//! Every document matching the input pattern is converted independently: a
//! failure is logged with the document name and the batch moves on.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::assemble::PageAssembler;
use crate::backend::{LopdfBackend, PdfBackend};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::model::Document;
use crate::options::BatchOptions;

/// File name matching used by [`BatchConverter::discover`].
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A document that could not be converted.
#[derive(Debug)]
pub struct BatchFailure {
    pub source: PathBuf,
    pub error: Error,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written, in processing order
    pub converted: Vec<PathBuf>,

    /// Documents that failed, with the error that stopped them
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of converting `source`.
    pub fn record(&mut self, source: &Path, result: Result<PathBuf>) {
        match result {
            Ok(output) => self.converted.push(output),
            Err(error) => self.failed.push(BatchFailure {
                source: source.to_path_buf(),
                error,
            }),
        }
    }

    /// Number of documents attempted.
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converts a directory of documents into one Markdown file each.
pub struct BatchConverter {
    options: BatchOptions,
    diagnostics: Diagnostics,
}

impl BatchConverter {
    pub fn new(options: BatchOptions) -> Self {
        Self::with_diagnostics(options, Diagnostics::new())
    }

    /// Create a converter logging through `diagnostics`.
    pub fn with_diagnostics(options: BatchOptions, diagnostics: Diagnostics) -> Self {
        Self {
            options,
            diagnostics,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Create the output directory and its parents. Safe to call repeatedly.
    pub fn setup_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.options.output_dir)?;
        Ok(())
    }

    /// Regular files of the input directory whose name matches the pattern,
    /// sorted by path.
    ///
    /// Matching is case-sensitive and a leading dot must be matched
    /// literally, so hidden files and editor lock files are skipped.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let pattern = Pattern::new(&self.options.pattern)
            .map_err(|_| Error::InvalidPattern(self.options.pattern.clone()))?;

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.options.input_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if pattern.matches_with(&name.to_string_lossy(), MATCH_OPTIONS) {
                files.push(entry.path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Path of the output file for `document`.
    pub fn output_path(&self, document: &Document) -> PathBuf {
        self.options
            .output_dir
            .join(document.output_file_name(&self.options.output_extension))
    }

    /// Convert one PDF file and return the written output path.
    pub fn convert_file(&self, path: &Path) -> Result<PathBuf> {
        self.convert_source(path, |p| LopdfBackend::open(p))
    }

    /// Assemble `source` from an already opened backend and write it out.
    pub fn convert_with<B: PdfBackend + ?Sized>(
        &self,
        source: &Path,
        backend: &B,
    ) -> Result<PathBuf> {
        let diagnostics = self.scoped(source);
        self.convert_backend(source, backend, &diagnostics)
    }

    /// Open, assemble and write one document. Failures are logged here.
    fn convert_source<F, B>(&self, source: &Path, open: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> Result<B>,
        B: PdfBackend,
    {
        let diagnostics = self.scoped(source);
        diagnostics.info(format_args!("opening {}", source.display()));

        let result = open(source)
            .and_then(|backend| self.convert_backend(source, &backend, &diagnostics));
        if let Err(ref e) = result {
            diagnostics.error(format_args!("conversion failed: {}", e));
        }
        result
    }

    fn convert_backend<B: PdfBackend + ?Sized>(
        &self,
        source: &Path,
        backend: &B,
        diagnostics: &Diagnostics,
    ) -> Result<PathBuf> {
        let document = PageAssembler::new(self.options.layout.clone(), diagnostics)
            .with_source(source)
            .assemble(backend)?;

        let output = self.output_path(&document);
        write_atomic(&output, &document)?;
        diagnostics.info(format_args!("wrote {}", output.display()));
        Ok(output)
    }

    /// Convert every discovered PDF with the lopdf backend.
    pub fn process_all(&self) -> Result<BatchReport> {
        self.process_all_with(|path| LopdfBackend::open(path))
    }

    /// Convert every discovered document, opening each with `open`.
    ///
    /// Per-document errors are logged and collected in the report. Only
    /// failures to prepare the output directory or list the input directory
    /// are returned as errors.
    pub fn process_all_with<F, B>(&self, open: F) -> Result<BatchReport>
    where
        F: FnMut(&Path) -> Result<B>,
        B: PdfBackend,
    {
        self.setup_directories()?;
        let sources = self.discover()?;
        Ok(self.process_sources(&sources, open, |_, _| {}))
    }

    /// Convert `sources` in order, calling `progress` after each document.
    ///
    /// The output directory must already exist.
    pub fn process_sources<F, B, P>(
        &self,
        sources: &[PathBuf],
        mut open: F,
        mut progress: P,
    ) -> BatchReport
    where
        F: FnMut(&Path) -> Result<B>,
        B: PdfBackend,
        P: FnMut(&Path, &Result<PathBuf>),
    {
        self.diagnostics.info(format_args!(
            "processing {} documents from {}",
            sources.len(),
            self.options.input_dir.display()
        ));

        let mut report = BatchReport::new();
        for source in sources {
            let result = self.convert_source(source, &mut open);
            progress(source, &result);
            report.record(source, result);
        }

        self.diagnostics.info(format_args!(
            "converted {} of {} documents",
            report.converted.len(),
            report.total()
        ));
        report
    }

    fn scoped(&self, source: &Path) -> Diagnostics {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        self.diagnostics.for_document(name)
    }
}

/// Write the document's Markdown to `path` through a temporary sibling file.
///
/// Either the complete file appears at `path` or nothing does.
pub fn write_atomic(path: &Path, document: &Document) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    let result = fs::write(&tmp, document.to_markdown()).and_then(|_| fs::rename(&tmp, path));

    result.map_err(|source| {
        let _ = fs::remove_file(&tmp);
        Error::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::model::{base_name, Page};
    use std::sync::{Mutex, Once};

    static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut lines) = LINES.lock() {
                lines.push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    fn capture_logs() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::set_logger(&CaptureLogger).unwrap();
            log::set_max_level(log::LevelFilter::Debug);
        });
    }

    fn discover_names(files: &[&str], pattern: &str) -> Vec<String> {
        let input = tempfile::tempdir().unwrap();
        for name in files {
            fs::write(input.path().join(name), b"").unwrap();
        }
        let converter = BatchConverter::new(
            BatchOptions::new()
                .with_input_dir(input.path())
                .with_pattern(pattern),
        );
        converter
            .discover()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_discover_skips_hidden_files() {
        let names = discover_names(&["a.pdf", ".~lock.pdf", ".pdf"], "*.pdf");
        assert_eq!(names, vec!["a.pdf"]);
    }

    #[test]
    fn test_discover_pattern_syntax() {
        let files = ["a.pdf", "b.pdf", "c.pdf", "report.PDF", "report.pdf.bak"];
        assert_eq!(discover_names(&files, "[ab].pdf"), vec!["a.pdf", "b.pdf"]);
        assert_eq!(discover_names(&files, "?.pdf"), vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert_eq!(
            discover_names(&files, "*.pdf"),
            vec!["a.pdf", "b.pdf", "c.pdf"]
        );
        assert_eq!(
            discover_names(&["a+b(1).pdf", "aab1.pdf"], "a+b(1).pdf"),
            vec!["a+b(1).pdf"]
        );
    }

    #[test]
    fn test_discover_invalid_pattern() {
        let input = tempfile::tempdir().unwrap();
        let converter = BatchConverter::new(
            BatchOptions::new()
                .with_input_dir(input.path())
                .with_pattern("[a.pdf"),
        );
        assert!(matches!(
            converter.discover(),
            Err(Error::InvalidPattern(p)) if p == "[a.pdf"
        ));
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let input = tempfile::tempdir().unwrap();
        fs::write(input.path().join("b.pdf"), b"").unwrap();
        fs::write(input.path().join("a.pdf"), b"").unwrap();
        fs::write(input.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(input.path().join("dir.pdf")).unwrap();

        let converter = BatchConverter::new(BatchOptions::new().with_input_dir(input.path()));
        let names: Vec<String> = converter
            .discover()
            .unwrap()
            .iter()
            .map(|p| base_name(p))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_setup_directories_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("nested").join("out");
        let converter = BatchConverter::new(BatchOptions::new().with_output_dir(&out));
        converter.setup_directories().unwrap();
        converter.setup_directories().unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_convert_with_writes_markdown() {
        let out = tempfile::tempdir().unwrap();
        let converter = BatchConverter::new(BatchOptions::new().with_output_dir(out.path()));
        let backend = MemoryBackend::new().with_page(Page::a4(1), " hello ");

        let written = converter
            .convert_with(Path::new("in/sample.pdf"), &backend)
            .unwrap();
        assert_eq!(written, out.path().join("sample.md"));
        assert_eq!(
            fs::read_to_string(&written).unwrap(),
            "## Page 1\n\nhello\n\n"
        );
        assert!(!out.path().join(".sample.md.tmp").exists());
    }

    #[test]
    fn test_write_failure_leaves_no_file() {
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("blocked.md");
        fs::create_dir(&target).unwrap();

        let result = write_atomic(&target, &Document::new("blocked.pdf"));
        assert!(matches!(result, Err(Error::Write { .. })));
        assert!(target.is_dir());
        assert!(!out.path().join(".blocked.md.tmp").exists());
    }

    #[test]
    fn test_process_all_logs_each_document() {
        capture_logs();
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(input.path().join("traced.pdf"), b"").unwrap();

        let converter = BatchConverter::new(
            BatchOptions::new()
                .with_input_dir(input.path())
                .with_output_dir(out.path()),
        );
        let report = converter
            .process_all_with(|_| Ok(MemoryBackend::new().with_page(Page::a4(1), "text")))
            .unwrap();
        assert!(report.is_success());

        let lines = LINES.lock().unwrap();
        assert!(lines
            .iter()
            .any(|l| l.starts_with("[traced.pdf] opening ") && l.ends_with("traced.pdf")));
        assert!(lines.iter().any(|l| l.starts_with("[traced.pdf] wrote ")));
    }

    #[test]
    fn test_report_record() {
        let mut report = BatchReport::new();
        report.record(Path::new("a.pdf"), Ok(PathBuf::from("a.md")));
        report.record(Path::new("b.pdf"), Err(Error::UnknownFormat));
        assert_eq!(report.total(), 2);
        assert!(!report.is_success());
        assert_eq!(report.failed[0].source, PathBuf::from("b.pdf"));
    }
}
