use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Write a small synthetic experiment in the run export format.
#[derive(Debug, Parser)]
struct Args {
    /// Output directory.
    #[arg(long, default_value = "data")]
    out: PathBuf,

    /// Experiment name used in the file names.
    #[arg(long, default_value = "demo")]
    experiment: String,

    /// Replicates per setting.
    #[arg(long, default_value_t = 3)]
    seeds: u32,

    #[arg(long, default_value_t = 42)]
    rng_seed: u64,
}

fn write_run(path: &Path, x: f64, seed: u32, rng: &mut StdRng) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "#####################################################")?;
    writeln!(out, "# synthetic run")?;
    writeln!(out, "#####################################################")?;
    writeln!(out, "#")?;
    writeln!(out, "# x = {x:?}, random = {seed}")?;
    writeln!(out, "#")?;
    writeln!(out, "# The columns have the following meaning:")?;
    writeln!(out, "# time value nodes")?;

    // Irregular steps, like an event-driven simulator would log.
    let mut t = 0.0_f64;
    let mut value = 0.0_f64;
    while t <= 100.0 {
        let nodes = 50 + rng.gen_range(0..5);
        writeln!(out, "{t:.4} {value:.6} {nodes}")?;
        t += rng.gen_range(0.2..1.8);
        value += x * rng.gen_range(0.5..1.5);
    }
    writeln!(out, "# End of data export.")?;
    out.flush()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.rng_seed);
    std::fs::create_dir_all(&args.out).context("creating output directory")?;

    let mut written = 0;
    for x in [0.5, 1.0, 2.0] {
        for seed in 0..args.seeds {
            let name = format!("{}_x-{x}_random-{seed}.txt", args.experiment);
            let path = args.out.join(name);
            write_run(&path, x, seed, &mut rng)
                .with_context(|| format!("writing {}", path.display()))?;
            written += 1;
        }
    }

    println!("Wrote {written} runs to {}", args.out.display());
    Ok(())
}
