//! pdfwork command-line tool for importing, exporting, and erasing PDF
//! outlines.
//!
//! Usage: pdfwork [-v...] outline <COMMAND>
//!
//! Commands:
//!   import  -o OUT [-i FILE] [--offset N] [--no-number]
//!           [--skip-out-of-range] PDF
//!   export  [-o FILE] PDF
//!   erase   -o OUT PDF
//!   check   [-i FILE]
//!
//! Outline files are read from stdin and written to stdout when no file is
//! given.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use libpdfwork::{
    decode_with_filename, encode, OutlineNode, PdfDocument, RangePolicy, SyncOptions,
};
use log::{info, LevelFilter};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(
    name = "pdfwork",
    about = "Import, export, and erase PDF outlines",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with a document's outline (bookmarks)
    Outline {
        #[command(subcommand)]
        command: OutlineCommand,
    },
}

#[derive(Subcommand)]
enum OutlineCommand {
    /// Replace a document's bookmarks with an outline file
    Import {
        /// Input PDF file
        pdf: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Outline file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of front-matter pages before logical page 1
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,

        /// Do not prefix titles with section numbers
        #[arg(long)]
        no_number: bool,

        /// Leave out entries whose page does not exist instead of failing
        #[arg(long)]
        skip_out_of_range: bool,
    },

    /// Write a document's bookmarks as an outline file
    Export {
        /// Input PDF file
        pdf: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove every bookmark from a document
    Erase {
        /// Input PDF file
        pdf: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check that an outline file parses
    Check {
        /// Outline file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// `RUST_LOG` wins over `-v`; without either only warnings are shown.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> Result<()> {
    let Commands::Outline { command } = command;
    match command {
        OutlineCommand::Import {
            pdf,
            output,
            input,
            offset,
            no_number,
            skip_out_of_range,
        } => {
            let root = read_outline(input.as_deref())?;
            let options = SyncOptions {
                offset,
                numbering: !no_number,
                out_of_range: if skip_out_of_range {
                    RangePolicy::Skip
                } else {
                    RangePolicy::Abort
                },
            };

            let mut document = open_pdf(&pdf)?;
            let report = document
                .import_outline(&root, &options)
                .with_context(|| format!("Cannot import outline into {}", pdf.display()))?;
            document
                .save(&output)
                .with_context(|| format!("Cannot write {}", output.display()))?;
            info!(
                "Wrote {} bookmarks to {} ({} skipped)",
                report.created,
                output.display(),
                report.skipped
            );
        }
        OutlineCommand::Export { pdf, output } => {
            let document = open_pdf(&pdf)?;
            let root = document
                .export_outline()
                .with_context(|| format!("Cannot read outline of {}", pdf.display()))?;
            write_text_output(&encode(&root), output.as_deref())?;
        }
        OutlineCommand::Erase { pdf, output } => {
            let mut document = open_pdf(&pdf)?;
            if !document.erase_outline()? {
                info!("{} has no outline", pdf.display());
            }
            document
                .save(&output)
                .with_context(|| format!("Cannot write {}", output.display()))?;
        }
        OutlineCommand::Check { input } => {
            let root = read_outline(input.as_deref())?;
            info!("{} entries", root.len());
            println!("ok");
        }
    }
    Ok(())
}

fn open_pdf(path: &Path) -> Result<PdfDocument> {
    PdfDocument::open(path).with_context(|| format!("Cannot open {}", path.display()))
}

/// Read and decode an outline file, or stdin when `path` is `None`.
fn read_outline(path: Option<&Path>) -> Result<OutlineNode> {
    let source = match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Cannot read stdin")?;
            source
        }
    };

    let filename = path.map(|p| p.display().to_string());
    Ok(decode_with_filename(&source, filename.as_deref())?)
}

/// Write to `path`, or to stdout when `path` is `None`.
fn write_text_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Cannot write {}", path.display()))?
        }
        None => {
            print!("{}", output);
            // Ensure output ends with newline
            if !output.is_empty() && !output.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
