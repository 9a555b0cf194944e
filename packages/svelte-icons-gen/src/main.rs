use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use svelte_icons_build::Options;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Parser)]
#[command(name = "svelte-icons-gen")]
#[command(about = "Generate Svelte icon components from SVG icon sets", long_about = None)]
struct Cli {
    /// Project root that source patterns are resolved against.
    #[arg(long, env = "SVELTE_ICONS_ROOT")]
    root: Option<PathBuf>,

    /// Output directory [default: <root>/src/lib]
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,

    /// Catalog file to use instead of the bundled one.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Only generate these collections.
    #[arg(long, value_name = "ID")]
    only: Vec<String>,

    /// Log every generated and skipped icon.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("could not determine current directory")?,
    };

    let mut opts = Options::new(root).with_only(cli.only);
    if let Some(out) = cli.out {
        opts = opts.with_output_dir(out);
    }
    if let Some(catalog) = cli.catalog {
        opts = opts.with_catalog_file(catalog);
    }

    let summary = svelte_icons_build::generate(opts)?;
    info!(
        collections = summary.collections.len(),
        icons = summary.generated(),
        "done"
    );
    println!("build completed successfully");
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
