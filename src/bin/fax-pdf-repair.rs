//! Fax PDF Repair CLI tool
//!
//! Rebuilds the page tree, xref table and trailer of a truncated fax PDF.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use fax_pdf_repair::{RepairOptions, Repairer, ScanMode};

/// Fax PDF Repair - Rebuild missing trailer, xref and page tree
#[derive(Parser)]
#[command(name = "fax-pdf-repair")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Repair a file in place of a copy
    fax-pdf-repair fax.pdf fax-fixed.pdf

    # Use as a filter and report what was missing
    fax-pdf-repair --verbose < fax.pdf > fax-fixed.pdf")]
struct Cli {
    /// Report missing parts and repair progress on stderr
    #[arg(long)]
    verbose: bool,

    /// Pair each object header with the first endobj after it, even across other objects
    #[arg(long)]
    compat_scan: bool,

    /// Re-open the repaired PDF and check its page tree before writing it
    #[arg(long)]
    check: bool,

    /// Damaged input file (stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Repaired output file (stdout when omitted or "-")
    output: Option<PathBuf>,
}

/// Status lines go to stderr so stdout can carry the PDF
fn status(msg: &str) {
    eprintln!("{}", msg);
}

/// A path of "-" stands for stdin/stdout, same as no path
fn file_path(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| *p != Path::new("-"))
}

fn read_input(input: &Option<PathBuf>) -> Result<Vec<u8>> {
    match file_path(input) {
        Some(path) => fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("Failed to read PDF from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(output: &Option<PathBuf>, bytes: &[u8]) -> Result<()> {
    match file_path(output) {
        Some(path) => fs::write(path, bytes)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write PDF to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the document could not be repaired
fn run(cli: &Cli) -> Result<bool> {
    let options = RepairOptions {
        scan_mode: if cli.compat_scan { ScanMode::Compatible } else { ScanMode::Bounded },
        verify: cli.check,
    };

    let mut repairer = Repairer::new(read_input(&cli.input)?, options);

    if cli.verbose {
        status("Missing parts:");
        for part in repairer.damage_report().missing_parts() {
            status(&format!("\t{}", part));
        }
        status("Starting to repair");
    }

    let summary = match repairer.recover() {
        Ok(summary) => summary,
        Err(e) => {
            status("Repair unsuccessful:");
            status(&e.to_string());
            return Ok(false);
        }
    };

    if cli.verbose {
        if let Some(pages) = summary.pages {
            status(&format!("Rebuilt page tree as {}", pages));
        }
        if !summary.holes.is_empty() {
            status(&format!("Stubbed missing objects: {:?}", summary.holes));
        }
        if let Some(info) = &summary.verified {
            status(&format!("Verified: {} page(s)", info.page_count));
        }
        status("Repair successful.");
    }

    let output = repairer
        .output()
        .context("Repair reported success without producing output")?;
    write_output(&cli.output, output)?;

    Ok(true)
}
