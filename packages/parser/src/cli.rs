//! Command-line interface for the dictamen parser.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use cotejo_shared::Operation;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ResolverConfig;
use crate::error::{ParserError, Result};
use crate::normalize::{normalize_text, numbered_listing};
use crate::overlay::Overlay;
use crate::parse_normalized;

/// Width used when echoing unresolved headers.
const HEADER_WRAP_WIDTH: usize = 100;

/// Cotejo parser - Extract amendment operations from a dictamen.
#[derive(Parser)]
#[command(name = "cotejo-parser")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse extracted dictamen text into operations JSON.
    Parse {
        /// Text file with the lines extracted from the dictamen PDF
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML corpus file with law aliases and title context
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Manual corrections (.json or .yaml)
        #[arg(long)]
        overlay: Option<PathBuf>,

        /// Also write the normalized lines as a numbered listing
        #[arg(long)]
        listing: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the normalized lines with line numbers.
    Normalize {
        /// Text file with the lines extracted from the dictamen PDF
        input: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            input,
            output,
            config,
            overlay,
            listing,
            pretty,
        } => parse_command(&ParseArgs {
            input: &input,
            output: output.as_deref(),
            config: config.as_deref(),
            overlay: overlay.as_deref(),
            listing: listing.as_deref(),
            pretty,
        }),
        Commands::Normalize { input } => {
            let text = std::fs::read_to_string(&input)?;
            print!("{}", numbered_listing(&normalize_text(&text)));
            Ok(())
        }
    }
}

struct ParseArgs<'a> {
    input: &'a Path,
    output: Option<&'a Path>,
    config: Option<&'a Path>,
    overlay: Option<&'a Path>,
    listing: Option<&'a Path>,
    pretty: bool,
}

/// Execute the parse command.
fn parse_command(args: &ParseArgs<'_>) -> Result<()> {
    let config = match args.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    let overlay = args.overlay.map(Overlay::load).transpose()?;

    let text = std::fs::read_to_string(args.input)?;

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("Normalizing lines...");

    let lines = normalize_text(&text);
    if let Some(path) = args.listing {
        std::fs::write(path, numbered_listing(&lines))?;
    }

    pb.set_message("Parsing operations...");
    let mut operations = parse_normalized(&lines, &config);

    if let Some(overlay) = &overlay {
        pb.set_message("Applying overlay...");
        let changed = overlay.apply(&mut operations);
        tracing::info!(changed, "overlay applied");
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&operations)?
    } else {
        serde_json::to_string(&operations)?
    };

    pb.finish_and_clear();

    match args.output {
        Some(path) => {
            write_output(path, &json)?;
            print_summary(&operations);
            println!(
                "{} {}",
                style("Saved to:").green().bold(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(ParserError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Output directory does not exist: {}", parent.display()),
            )));
        }
    }
    std::fs::write(path, json)?;
    Ok(())
}

fn print_summary(operations: &[Operation]) {
    let unknown_law = operations.iter().filter(|op| op.affected_law.is_unknown()).count();
    let unresolved: Vec<&Operation> = operations.iter().filter(|op| op.target.is_none()).collect();

    println!("  Operations: {}", style(operations.len()).green());
    if unknown_law > 0 {
        println!("  Unknown law: {}", style(unknown_law).yellow().bold());
    }
    if !unresolved.is_empty() {
        println!("  Without target: {}", style(unresolved.len()).yellow().bold());
        for op in unresolved {
            let wrapped = textwrap::fill(&op.header, HEADER_WRAP_WIDTH);
            for line in wrapped.lines() {
                println!("    {}", style(line).dim());
            }
        }
    }
    println!();
}
