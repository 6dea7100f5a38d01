//! unspread CLI - two-column aware PDF to Markdown conversion.

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::Log;
use std::fs;
use std::path::{Path, PathBuf};
use unspread::options::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_PATTERN};
use unspread::{
    BatchConverter, BatchOptions, BatchReport, Diagnostics, LayoutOptions, LopdfBackend,
    PageAssembler, MIN_FRAGMENTS_PER_COLUMN,
};

#[derive(Parser)]
#[command(name = "unspread")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Split two-column PDF pages into numbered Markdown pages", long_about = None)]
struct Cli {
    /// Label used in page headings
    #[arg(long, global = true, default_value = unspread::model::DEFAULT_HEADING_LABEL)]
    label: String,

    /// Fragments each side needs before a page is read as two columns
    #[arg(long, global = true, default_value_t = MIN_FRAGMENTS_PER_COLUMN)]
    min_column_fragments: usize,

    /// Also append debug log output to this file
    #[arg(long, global = true, env = "UNSPREAD_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every PDF in a directory (one .md file per document)
    Batch {
        /// Directory containing source PDFs
        #[arg(short, long, env = "UNSPREAD_INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
        input: PathBuf,

        /// Directory receiving Markdown files
        #[arg(short, long, env = "UNSPREAD_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// File name pattern
        #[arg(long, default_value = DEFAULT_PATTERN)]
        pattern: String,
    },

    /// Convert one PDF to Markdown
    #[command(alias = "md")]
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the logical pages as JSON
    Json {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Compact JSON output
        #[arg(long)]
        compact: bool,
    },

    /// Dump raw positioned blocks as JSON
    Blocks {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only this physical page (1-indexed)
        #[arg(short, long)]
        page: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref(), cli.verbose) {
        eprintln!("{}: cannot open log file: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    let diagnostics = Diagnostics::new();
    let layout = LayoutOptions::new()
        .with_min_column_fragments(cli.min_column_fragments)
        .with_heading_label(cli.label);

    let result = match cli.command {
        Commands::Batch {
            input,
            output,
            pattern,
        } => {
            let options = BatchOptions::new()
                .with_input_dir(input)
                .with_output_dir(output)
                .with_pattern(pattern)
                .with_layout(layout);
            cmd_batch(options, &diagnostics)
        }
        Commands::Convert { input, output } => {
            cmd_convert(&input, output.as_deref(), layout, &diagnostics)
        }
        Commands::Json { input, compact } => cmd_json(&input, compact, layout, &diagnostics),
        Commands::Blocks { input, page } => cmd_blocks(&input, page),
    };

    diagnostics.flush();

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Sends each record to stderr and, when configured, to a log file.
///
/// The console shows unspread messages at info level (debug with
/// `--verbose`). The file always records them at debug level.
struct TeeLogger {
    console: env_logger::Logger,
    file: Option<env_logger::Logger>,
}

impl TeeLogger {
    fn new(log_file: Option<&Path>, verbose: bool) -> std::io::Result<Self> {
        let console = env_logger::Builder::from_default_env()
            .filter_module(
                unspread::diagnostics::LOG_TARGET,
                if verbose {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                },
            )
            .build();

        let file = match log_file {
            Some(path) => {
                let file = fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                let logger = env_logger::Builder::from_default_env()
                    .filter_module(unspread::diagnostics::LOG_TARGET, log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .write_style(env_logger::WriteStyle::Never)
                    .build();
                Some(logger)
            }
            None => None,
        };

        Ok(Self { console, file })
    }

    fn max_level(&self) -> log::LevelFilter {
        let file = self.file.as_ref().map_or(log::LevelFilter::Off, |f| f.filter());
        self.console.filter().max(file)
    }
}

impl Log for TeeLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.console.enabled(metadata) || self.file.as_ref().is_some_and(|f| f.enabled(metadata))
    }

    fn log(&self, record: &log::Record) {
        self.console.log(record);
        if let Some(file) = &self.file {
            file.log(record);
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            file.flush();
        }
    }
}

fn init_logging(log_file: Option<&Path>, verbose: bool) -> std::io::Result<()> {
    let logger = TeeLogger::new(log_file, verbose)?;
    log::set_max_level(logger.max_level());
    log::set_boxed_logger(Box::new(logger)).map_err(std::io::Error::other)?;
    Ok(())
}

type CmdResult = Result<bool, Box<dyn std::error::Error>>;

fn cmd_batch(options: BatchOptions, diagnostics: &Diagnostics) -> CmdResult {
    let converter = BatchConverter::with_diagnostics(options, diagnostics.clone());
    converter.setup_directories()?;
    let sources = converter.discover()?;

    if sources.is_empty() {
        println!(
            "{} no files matching '{}' in {}",
            "Nothing to do:".yellow(),
            converter.options().pattern,
            converter.options().input_dir.display()
        );
        return Ok(true);
    }

    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = converter.process_sources(
        &sources,
        |path| LopdfBackend::open(path),
        |source, _| {
            pb.set_message(unspread::model::base_name(source));
            pb.inc(1);
        },
    );
    pb.finish_and_clear();

    print_report(&report, &converter.options().output_dir);
    Ok(report.is_success())
}

fn print_report(report: &BatchReport, output_dir: &Path) {
    println!(
        "{} {} of {} documents into {}",
        "Converted".green().bold(),
        report.converted.len(),
        report.total(),
        output_dir.display()
    );
    for output in &report.converted {
        println!("  {} {}", "├─".dimmed(), output.display());
    }
    if !report.failed.is_empty() {
        println!("{} {}", "Failed:".red().bold(), report.failed.len());
        for failure in &report.failed {
            println!(
                "  {} {}: {}",
                "└─".dimmed(),
                failure.source.display(),
                failure.error
            );
        }
    }
}

fn assemble(
    input: &Path,
    layout: LayoutOptions,
    diagnostics: &Diagnostics,
) -> Result<unspread::Document, Box<dyn std::error::Error>> {
    let diagnostics = diagnostics.for_document(input.display().to_string());
    let backend = LopdfBackend::open(input)?;
    let doc = PageAssembler::new(layout, &diagnostics)
        .with_source(input)
        .assemble(&backend)?;
    Ok(doc)
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    layout: LayoutOptions,
    diagnostics: &Diagnostics,
) -> CmdResult {
    let doc = assemble(input, layout, diagnostics)?;

    if let Some(output_path) = output {
        unspread::write_atomic(output_path, &doc)?;
        println!(
            "{} {} ({} logical pages)",
            "Written to".green(),
            output_path.display(),
            doc.page_count()
        );
    } else {
        print!("{}", doc.to_markdown());
    }

    Ok(true)
}

fn cmd_json(
    input: &Path,
    compact: bool,
    layout: LayoutOptions,
    diagnostics: &Diagnostics,
) -> CmdResult {
    let doc = assemble(input, layout, diagnostics)?;
    println!("{}", doc.to_json(!compact)?);
    Ok(true)
}

fn cmd_blocks(input: &Path, page: Option<u32>) -> CmdResult {
    let pages = unspread::page_fragments(input, page)?;
    println!("{}", serde_json::to_string_pretty(&pages)?);
    Ok(true)
}
