//! `pci-rsi`: suggests PCI and RSI identifiers for newly planned cells.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pci_rsi_planner::core::output::{DetailFile, Suggestion, SummaryFile};
use pci_rsi_planner::core::request::Request;
use pci_rsi_planner::mapping::loader::{load_master, load_neighbors, load_requests, to_toon};
use pci_rsi_planner::mapping::normalize::normalize_band;
use pci_rsi_planner::{ClusterAllocator, Planner, Suffix};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Master record of cells in service (TOON)
    #[arg(long, env = "PCI_RSI_MASTER")]
    master: PathBuf,

    /// Location-area neighbor table (TOON)
    #[arg(long, env = "PCI_RSI_NEIGHBORS")]
    neighbors: PathBuf,

    /// Where summary.toon and detail.toon are written
    #[arg(long, default_value = "salida", env = "PCI_RSI_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Plan one site and band
    Single {
        #[arg(long)]
        site: String,

        /// Free-text band label, e.g. 700, B28, N78
        #[arg(long)]
        band: String,

        /// Technology (4G, 5G, ...); not needed for 700, which plans both
        #[arg(long)]
        tech: Option<String>,

        /// Owning node code; defaults to the master record's, then the site
        #[arg(long)]
        node: Option<String>,

        /// Cells to plan; defaults to the site's detected sector count
        #[arg(long)]
        cells: Option<usize>,

        #[arg(long, default_value_t = 0)]
        min_pci: u16,

        #[arg(long, default_value_t = 0)]
        min_rsi: u16,

        /// A or B
        #[arg(long, default_value = "A")]
        suffix: String,
    },

    /// Plan every request of a TOON request file in one session
    Batch {
        #[arg(long)]
        requests: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let master = load_master(&args.master).context("loading master record")?;
    let neighbors = load_neighbors(&args.neighbors).context("loading neighbor table")?;
    let planner = Planner::new(&master, &neighbors);

    //one session per invocation
    let mut alloc = ClusterAllocator::new();

    let suggestion = match args.command {
        Command::Single {
            site,
            band,
            tech,
            node,
            cells,
            min_pci,
            min_rsi,
            suffix,
        } => {
            if tech.is_none() && !normalize_band(&band).requires_coordination() {
                bail!("--tech is required for band {band}");
            }
            let mut req = Request::new(&site, tech.as_deref().unwrap_or_default(), &band)
                .with_floors(min_pci, min_rsi)
                .with_suffix(Suffix::parse(&suffix));
            if let Some(node) = node {
                req = req.with_node(&node);
            }
            if let Some(cells) = cells {
                req = req.with_cells(cells);
            }
            planner.plan(&mut alloc, &req)?
        }
        Command::Batch { requests } => {
            let requests = load_requests(&requests).context("loading requests")?;
            //skipped items are already logged by plan_batch
            planner
                .plan_batch(&mut alloc, requests.into_iter().map(Request::from))?
                .suggestion
        }
    };

    write_outputs(&args.output_dir, &suggestion)
}

fn write_outputs(dir: &Path, suggestion: &Suggestion) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let summary = to_toon("summary", &SummaryFile { groups: &suggestion.groups })?;
    let detail = to_toon("detail", &DetailFile { cells: &suggestion.cells })?;

    let summary_path = dir.join("summary.toon");
    let detail_path = dir.join("detail.toon");
    fs::write(&summary_path, &summary).with_context(|| format!("writing {}", summary_path.display()))?;
    fs::write(&detail_path, &detail).with_context(|| format!("writing {}", detail_path.display()))?;

    println!("{summary}\n");
    println!("{detail}");
    info!(
        "wrote {} and {} ({} cells, {} empty PCI slots)",
        summary_path.display(),
        detail_path.display(),
        suggestion.cells.len(),
        suggestion.shortfall()
    );
    Ok(())
}
