use anyhow::{Context, Result};
use arrow::{record_batch::RecordBatch, util::pretty::pretty_format_batches};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tquant_data::{GetOptions, Skipped, StoreConfig, TableAssembler};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "tquant-data", version, about = "Query the Parquet data lake")]
struct Cli {
    /// JSON file with `base_path_load` and `base_path_get`.
    #[arg(long, env = "TQUANT_CONFIG", default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the catalog's logical dataset names.
    Datasets,
    /// Show the value columns found in each folder of the load root.
    Subfolders,
    /// List the parquet files in a directory.
    Files { dir: PathBuf },
    /// Pivot one or more raw datasets and join them on date.
    Raw {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Read a curated dataset.
    Get {
        name: String,
        /// Return only the first file instead of merging all of them.
        #[arg(long)]
        no_merge: bool,
        /// Keep only ordinary-share rows.
        #[arg(long)]
        common_stock: bool,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ─── 2) config + assembler ───────────────────────────────────────
    let config = StoreConfig::discover(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    info!(load = %config.base_path_load, get = %config.base_path_get, "config loaded");
    let assembler = TableAssembler::from_config(&config);

    // ─── 3) run ──────────────────────────────────────────────────────
    match cli.command {
        Command::Datasets => {
            println!("Available datasets:");
            for name in assembler.list_datasets() {
                println!("- {}", name);
            }
        }
        Command::Subfolders => {
            let scan = assembler.list_subfolders()?;
            report_skipped(&scan.skipped);
            for info in scan.folders {
                println!(
                    "{}: {} columns [{}]",
                    info.name,
                    info.distinct_column_count,
                    info.distinct_column_names.join(", ")
                );
            }
        }
        Command::Files { dir } => {
            for file in assembler.list_data_files(&dir)? {
                println!("{}", file);
            }
        }
        Command::Raw { names, limit } => {
            let load = assembler.load_raw(&names)?;
            report_skipped(&load.skipped);
            if load.is_empty() {
                println!("No dataset could be loaded.");
                return Ok(());
            }
            if load.combined.num_columns() > 0 {
                print_table(&load.combined, limit)?;
            }
            for tagged in &load.passthrough {
                println!("\n{} (key columns only)", tagged.dataset);
                print_table(&tagged.table, limit)?;
            }
        }
        Command::Get {
            name,
            no_merge,
            common_stock,
            limit,
        } => {
            let options = GetOptions::default()
                .merge_files(!no_merge)
                .filter_reference_entities(common_stock);
            let load = assembler
                .get_dataset(&name, options)
                .with_context(|| format!("reading dataset {}", name))?;
            report_skipped(&load.skipped);
            print_table(&load.table, limit)?;
        }
    }

    Ok(())
}

fn report_skipped(skipped: &[Skipped]) {
    for s in skipped {
        warn!(item = %s.item, error = %s.error, "skipped");
    }
}

fn print_table(table: &RecordBatch, limit: usize) -> Result<()> {
    let shown = table.slice(0, limit.min(table.num_rows()));
    println!("{}", pretty_format_batches(&[shown])?);
    println!("({} rows x {} columns)", table.num_rows(), table.num_columns());
    Ok(())
}
