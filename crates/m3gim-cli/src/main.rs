//! M³GIM CLI
//!
//! - `m3gim transform`: compile the catalog sheets into the RiC-O JSON-LD graph
//! - `m3gim index`: inspect the entity indices (header repair, duplicates,
//!   reconciliation coverage)
//!
//! Logging goes to stderr (`RUST_LOG` overrides the default `info` filter);
//! the summary goes to stdout.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use m3gim_transform::input::{load_cache, load_indices};
use m3gim_transform::{
    load_sheets, transform, write_atomic, EntityIndex, EntityKind, ReconciliationCache, ReconciliationStatus,
    TransformOptions, TransformReport,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::{PipelineConfig, DEFAULT_DATA_DIR, DEFAULT_OUTPUT};

#[derive(Parser)]
#[command(name = "m3gim")]
#[command(author, version, about = "M³GIM: archival catalog → RiC-O JSON-LD")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the sheet exports into the JSON-LD graph document.
    Transform {
        #[command(flatten)]
        input: InputArgs,
        /// Output graph document (written via `<out>.tmp` + rename)
        #[arg(short, long, env = "M3GIM_OUTPUT", default_value = DEFAULT_OUTPUT)]
        out: PathBuf,
    },

    /// Build the entity indices and report on them.
    Index {
        #[command(flatten)]
        input: InputArgs,
        /// Print the entries of one index as JSON
        #[arg(long, value_enum)]
        json: Option<KindArg>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Directory holding the `M3GIM-*.csv` sheet exports
    #[arg(short, long, env = "M3GIM_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Reconciliation cache (default: `<data-dir>/wikidata-reconciliation.json`)
    #[arg(long)]
    reconciliation: Option<PathBuf>,
    /// Ignore the reconciliation cache
    #[arg(long)]
    no_reconciliation: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Person,
    Org,
    Place,
    Work,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Person => EntityKind::Person,
            KindArg::Org => EntityKind::Organization,
            KindArg::Place => EntityKind::Place,
            KindArg::Work => EntityKind::Work,
        }
    }
}

impl InputArgs {
    fn config(&self, output: PathBuf) -> PipelineConfig {
        PipelineConfig::new(
            self.data_dir.clone(),
            output,
            self.reconciliation.clone(),
            !self.no_reconciliation,
        )
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Transform { input, out } => cmd_transform(&input.config(out)),
        Commands::Index { input, json } => {
            cmd_index(&input.config(PathBuf::from(DEFAULT_OUTPUT)), json.map(EntityKind::from))
        }
    }
}

fn read_cache(config: &PipelineConfig) -> Result<Option<ReconciliationCache>> {
    match config.reconciliation_path() {
        Some(path) => load_cache(path)
            .with_context(|| format!("failed to load reconciliation cache {}", path.display())),
        None => Ok(None),
    }
}

// ============================================================================
// transform
// ============================================================================

fn cmd_transform(config: &PipelineConfig) -> Result<()> {
    println!("{} {}", "Transforming".green().bold(), config.data_dir.display());

    let sheets = load_sheets(&config.sheets())
        .with_context(|| format!("failed to load sheets from {}", config.data_dir.display()))?;
    let cache = read_cache(config)?;

    let (document, report) = transform(sheets, cache.as_ref(), &TransformOptions::default())
        .context("transform failed")?;
    let size = write_atomic(&config.output, &document)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    if !report.attach.unattached_owners.is_empty() {
        tracing::warn!(
            owners = ?report.attach.unattached_owners,
            "relation owners without a matching record or container"
        );
    }
    if !report.duplicate_ids.is_empty() {
        let ids: Vec<&str> = report.duplicate_ids.iter().map(|id| id.as_str()).collect();
        tracing::warn!(ids = ?ids, "duplicate record ids dropped");
    }
    tracing::info!(output = %config.output.display(), bytes = size, "transform finished");

    print_transform_summary(&report, &config.output, size);
    Ok(())
}

fn print_transform_summary(report: &TransformReport, out: &Path, size: u64) {
    println!("  {} {}", "→".cyan(), out.display());
    println!(
        "  {} {} records, {} containers, {} graph nodes ({:.1} KB)",
        "→".yellow(),
        report.records,
        report.containers,
        report.graph_nodes,
        size as f64 / 1024.0
    );
    println!(
        "  {} {} relations for {} rows ({} skipped, {} unknown type tokens)",
        "→".yellow(),
        report.relations.relations,
        report.relations.rows,
        report.relations.skipped_rows,
        report.relations.unknown_tokens
    );
    if let Some(column) = &report.qualifier_column {
        println!("  {} qualifier column: {}", "→".cyan(), column);
    }
    if !report.duplicate_ids.is_empty() {
        println!(
            "  {} {} duplicate record ids dropped",
            "warning:".yellow().bold(),
            report.duplicate_ids.len()
        );
    }
    if !report.attach.unattached_owners.is_empty() {
        println!(
            "  {} {} relation owners match no record",
            "warning:".yellow().bold(),
            report.attach.unattached_owners.len()
        );
    }
    if !report.attach.refused_extension_keys.is_empty() {
        println!(
            "  {} {} extension keys refused",
            "warning:".yellow().bold(),
            report.attach.refused_extension_keys.len()
        );
    }
}

// ============================================================================
// index
// ============================================================================

#[derive(Default)]
struct StatusCounts {
    matched: usize,
    unmatched: usize,
    skipped: usize,
    unknown: usize,
}

fn status_counts(index: &EntityIndex, kind: EntityKind, cache: &ReconciliationCache) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for entry in index.table(kind).entries() {
        match cache.status(kind, &entry.name) {
            ReconciliationStatus::Matched => counts.matched += 1,
            ReconciliationStatus::Unmatched => counts.unmatched += 1,
            ReconciliationStatus::Skipped => counts.skipped += 1,
            ReconciliationStatus::Unknown => counts.unknown += 1,
        }
    }
    counts
}

fn cmd_index(config: &PipelineConfig, json: Option<EntityKind>) -> Result<()> {
    let tables = load_indices(&config.sheets())
        .with_context(|| format!("failed to load indices from {}", config.data_dir.display()))?;
    let cache = read_cache(config)?;
    let (index, stats) = EntityIndex::build(tables, cache.as_ref());

    if let Some(kind) = json {
        let entries = index.table(kind).entries();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{} {}", "Indices".green().bold(), config.data_dir.display());
    for (kind, s) in &stats {
        println!(
            "  {} {}: {} entries ({} rows, {} without name, {} duplicate names)",
            "→".cyan(),
            kind.sheet_name(),
            s.entries,
            s.rows,
            s.skipped_rows,
            s.duplicate_names
        );
        if s.header_repaired {
            println!("    {} header row was shifted and has been repaired", "→".yellow());
        }
        if let Some(cache) = &cache {
            let counts = status_counts(&index, *kind, cache);
            println!(
                "    {} reconciliation: {} matched, {} unmatched, {} skipped, {} unknown ({} ids filled)",
                "→".yellow(),
                counts.matched,
                counts.unmatched,
                counts.skipped,
                counts.unknown,
                s.reconciled
            );
        }
    }
    let missing: Vec<&str> = EntityKind::ALL
        .iter()
        .filter(|k| !stats.iter().any(|(s, _)| s == *k))
        .map(|k| k.sheet_name())
        .collect();
    if !missing.is_empty() {
        tracing::warn!(sheets = ?missing, "index sheets missing");
        println!("  {} missing: {}", "warning:".yellow().bold(), missing.join(", "));
    }
    Ok(())
}
