use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use simfold::cache::JsonFileCache;
use simfold::discovery::directory_fingerprint;
use simfold::export::write_csv_file;
use simfold::{Pipeline, PipelineConfig};

/// Fold simulation-run exports into per-experiment mean datasets.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON pipeline configuration; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the data directory of the configuration.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Experiment to process (repeatable); replaces the configured list.
    #[arg(long = "experiment")]
    experiments: Vec<String>,

    /// Reuse and update cached datasets in this directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Write one `<experiment>.csv` per dataset into this directory.
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if !args.experiments.is_empty() {
        config.experiments = args.experiments;
    }

    let pipeline = Pipeline::new(config);
    let report = match &args.cache_dir {
        Some(dir) => {
            let fingerprint = directory_fingerprint(&pipeline.config().data_dir)
                .context("fingerprinting data directory")?;
            let mut cache = JsonFileCache::new(dir);
            pipeline.run_with_cache(&mut cache, fingerprint)
        }
        None => pipeline.run(),
    };

    if let Some(dir) = &args.csv_dir {
        std::fs::create_dir_all(dir).context("creating CSV directory")?;
        for (experiment, dataset) in &report.means {
            let path = dir.join(format!("{experiment}.csv"));
            write_csv_file(dataset, &path)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
    }

    for diagnostic in &report.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    for (experiment, error) in &report.failures {
        eprintln!("error: {experiment}: {error}");
    }
    if !report.is_success() {
        bail!("{} experiment(s) failed", report.failures.len());
    }
    Ok(())
}
