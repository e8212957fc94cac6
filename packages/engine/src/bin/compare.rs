//! CLI binary for reconciling dictamen operations with law trees.
//!
//! Usage:
//!   cotejo-compare single --law ley_20744.json --ops operaciones.json -o comparacion.json
//!   cotejo-compare batch --ops operaciones.json --laws-dir leyes/ --out-dir salida/
//!
//! `single` reconciles one law with the operations addressed to it. `batch`
//! reconciles every law in a directory, writes one `comparacion_ley_<n>.json`
//! per law and an `audit.json` listing operations that surfaced nowhere.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use cotejo_engine::{
    audit, comparison_file_name, BatchReport, Comparison, EngineError, Mismatch, ReconcileConfig,
    ReconciliationService, Result,
};
use cotejo_shared::Operation;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// File the batch audit is written to.
const AUDIT_FILE: &str = "audit.json";

/// Cotejo compare - Reconcile amendment operations with statute trees.
#[derive(Parser)]
#[command(name = "cotejo-compare")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one law.
    Single {
        /// Law tree JSON (bare or wrapped in {"ley": ...})
        #[arg(long)]
        law: PathBuf,

        /// Operations JSON produced by cotejo-parser
        #[arg(long)]
        ops: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML corpus file with a `reconcile` section
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Reconcile every law of a directory and audit the result.
    Batch {
        /// Operations JSON produced by cotejo-parser
        #[arg(long)]
        ops: PathBuf,

        /// Directory with ley_<numero>.json law trees
        #[arg(long)]
        laws_dir: PathBuf,

        /// Directory the comparisons and the audit are written to
        #[arg(long)]
        out_dir: PathBuf,

        /// YAML corpus file with a `reconcile` section
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    // Initialize tracing with WARN level by default, respecting RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    match Cli::parse().command {
        Commands::Single {
            law,
            ops,
            output,
            config,
            pretty,
        } => single(&law, &ops, output.as_deref(), config.as_deref(), pretty),
        Commands::Batch {
            ops,
            laws_dir,
            out_dir,
            config,
        } => batch(&ops, &laws_dir, &out_dir, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<ReconcileConfig> {
    path.map_or_else(|| Ok(ReconcileConfig::default()), ReconcileConfig::load)
}

fn load_operations(path: &Path) -> Result<Vec<Operation>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn single(
    law: &Path,
    ops: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let mut service = ReconciliationService::new(load_config(config)?);
    let number = service.load_law_file(law)?;
    let operations = load_operations(ops)?;

    let pb = spinner();
    pb.set_message(format!("Reconciling law {number}..."));
    let outcome = service
        .reconcile_law(&number, &operations)
        .ok_or_else(|| EngineError::InvalidLaw {
            path: law.display().to_string(),
            reason: "law tree not registered".to_string(),
        })?;
    pb.finish_and_clear();

    let json = if pretty {
        outcome.comparison.to_json_pretty()?
    } else {
        serde_json::to_string(&outcome.comparison)?
    };

    match output {
        Some(path) => {
            write_file(path, &json)?;
            print_comparison_summary(&number, &outcome.comparison);
            println!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn batch(ops: &Path, laws_dir: &Path, out_dir: &Path, config: Option<&Path>) -> Result<()> {
    let mut service = ReconciliationService::new(load_config(config)?);
    let operations = load_operations(ops)?;

    let pb = spinner();
    pb.set_message("Loading law trees...");
    let loaded = service.load_laws_dir(laws_dir)?;
    tracing::info!(laws = loaded, dir = %laws_dir.display(), "law trees loaded");

    pb.set_message("Reconciling...");
    let report = service.reconcile_all(&operations);
    let mismatches = audit(&operations, &report);

    pb.set_message("Writing comparisons...");
    std::fs::create_dir_all(out_dir)?;
    for (number, outcome) in &report.outcomes {
        write_file(
            &out_dir.join(comparison_file_name(number)),
            &outcome.comparison.to_json_pretty()?,
        )?;
    }
    write_file(&out_dir.join(AUDIT_FILE), &serde_json::to_string_pretty(&mismatches)?)?;
    pb.finish_and_clear();

    for (number, outcome) in &report.outcomes {
        print_comparison_summary(number, &outcome.comparison);
    }
    print_batch_summary(&report, &mismatches);
    println!("{} {}", style("Saved to:").green().bold(), out_dir.display());
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn print_comparison_summary(number: &str, comparison: &Comparison) {
    let metadata = &comparison.metadatos;
    println!(
        "{} {}: {} sustituidos, {} incorporados, {} derogados",
        style("Ley").cyan().bold(),
        number,
        metadata.total_sustituciones,
        metadata.total_incorporaciones,
        metadata.total_derogaciones,
    );
    if metadata.derogacion_total {
        println!("  {}", style("derogación total").red());
    }
    for warning in &metadata.advertencias {
        println!("  {} {}", style("!").yellow(), warning);
    }
}

fn print_batch_summary(report: &BatchReport, mismatches: &[Mismatch]) {
    for (law, articles) in &report.missing_laws {
        println!(
            "{} ley {} sin árbol ({} operaciones)",
            style("!").yellow(),
            law,
            articles.len()
        );
    }
    let label = if mismatches.is_empty() {
        style("Audit:").green().bold()
    } else {
        style("Audit:").yellow().bold()
    };
    println!("{label} {} operaciones sin reflejo", mismatches.len());
}
