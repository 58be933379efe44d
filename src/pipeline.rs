//! Per-experiment orchestration.
//!
//! ```text
//!  run files ──► header + body ──► merged domain ──► time grid
//!                                        │
//!                                        ▼
//!                  DatasetBuilder (resample + scatter per run)
//!                                        │
//!                                        ▼
//!                        fold_seeds ──► MeanDataset
//! ```
//!
//! A fatal error in any file aborts only the experiment it belongs to.

use std::collections::BTreeMap;
use std::fmt;

use log::{info, warn};

use crate::cache::{DatasetCache, Fingerprint};
use crate::config::{PipelineConfig, TimeGridConfig};
use crate::data::loader::{load_run, RunFile};
use crate::data::model::CoordinateDomain;
use crate::dataset::builder::DatasetBuilder;
use crate::dataset::reduce::fold_seeds;
use crate::dataset::tensor::MeanDataset;
use crate::discovery::experiment_files;
use crate::error::{FoldError, Result};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Non-fatal conditions worth telling the caller about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No file matched the experiment; its dataset is empty.
    EmptyExperiment { experiment: String },
    /// The cache could not be read or written; the dataset was recomputed
    /// or simply not stored.
    CacheUnavailable { experiment: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyExperiment { experiment } => {
                write!(f, "no data for experiment {experiment}")
            }
            Diagnostic::CacheUnavailable { experiment, reason } => {
                write!(f, "cache unavailable for experiment {experiment}: {reason}")
            }
        }
    }
}

/// Outcome of a batch: one entry per experiment in either `means` or
/// `failures`.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub means: BTreeMap<String, MeanDataset>,
    pub failures: BTreeMap<String, FoldError>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn diagnose(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every configured experiment from disk.
    pub fn run(&self) -> BatchReport {
        self.run_with(BTreeMap::new())
    }

    /// Like [`Pipeline::run`], but experiments already in `precomputed` are
    /// taken as they are instead of being rebuilt.
    pub fn run_with(&self, mut precomputed: BTreeMap<String, MeanDataset>) -> BatchReport {
        let mut report = BatchReport::default();
        for experiment in &self.config.experiments {
            if let Some(ds) = precomputed.remove(experiment) {
                info!("{experiment}: using precomputed dataset");
                report.means.insert(experiment.clone(), ds);
                continue;
            }
            self.process_into(experiment, &mut report);
        }
        report
    }

    /// Reuse cache entries whose fingerprint matches, rebuild and store the
    /// rest. Cache trouble is reported as a diagnostic, never as a failure.
    pub fn run_with_cache(
        &self,
        cache: &mut dyn DatasetCache,
        fingerprint: Fingerprint,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for experiment in &self.config.experiments {
            let cached = cache
                .is_stale(experiment, fingerprint)
                .and_then(|stale| if stale { Ok(None) } else { cache.load(experiment) });
            match cached {
                Ok(Some(ds)) => {
                    info!("{experiment}: cache hit");
                    report.means.insert(experiment.clone(), ds);
                    continue;
                }
                Ok(None) => {}
                Err(e) => report.diagnose(Diagnostic::CacheUnavailable {
                    experiment: experiment.clone(),
                    reason: e.to_string(),
                }),
            }

            self.process_into(experiment, &mut report);
            let stored = report
                .means
                .get(experiment)
                .map(|ds| cache.store(experiment, ds, fingerprint));
            if let Some(Err(e)) = stored {
                report.diagnose(Diagnostic::CacheUnavailable {
                    experiment: experiment.clone(),
                    reason: e.to_string(),
                });
            }
        }
        report
    }

    fn process_into(&self, experiment: &str, report: &mut BatchReport) {
        match self.process_experiment(experiment) {
            Ok((ds, diagnostic)) => {
                if let Some(d) = diagnostic {
                    report.diagnose(d);
                }
                report.means.insert(experiment.to_string(), ds);
            }
            Err(e) => {
                warn!("{experiment}: {e}");
                report.failures.insert(experiment.to_string(), e);
            }
        }
    }

    /// Load and fold all files of one experiment.
    pub fn process_experiment(
        &self,
        experiment: &str,
    ) -> Result<(MeanDataset, Option<Diagnostic>)> {
        let files = experiment_files(
            &self.config.data_dir,
            &self.config.file_prefix,
            experiment,
        )?;
        info!("{experiment}: {} files", files.len());

        let runs = files
            .iter()
            .map(|path| load_run(path))
            .collect::<Result<Vec<RunFile>>>()?;

        let diagnostic = runs.is_empty().then(|| Diagnostic::EmptyExperiment {
            experiment: experiment.to_string(),
        });
        let ds = fold_runs(
            &runs,
            &self.config.time_column,
            &self.config.seed_axes,
            &self.config.time,
        )?;
        Ok((ds, diagnostic))
    }
}

// ---------------------------------------------------------------------------
// Core fold over parsed runs
// ---------------------------------------------------------------------------

/// Merge domains, resample and scatter every run, then average the seed
/// axes. `runs` are written in the given order.
///
/// With no runs the result has only a time axis (empty unless both grid
/// bounds are configured) and no variables.
pub fn fold_runs(
    runs: &[RunFile],
    time_column: &str,
    seed_axes: &[String],
    grid: &TimeGridConfig,
) -> Result<MeanDataset> {
    let domain = runs
        .iter()
        .fold(CoordinateDomain::new(), |d, run| d.merge(&run.header.coordinates));
    let time = grid.resolve(data_bounds(runs, time_column))?;
    let frozen = domain.freeze(time_column, time);

    let variables: Vec<String> = runs
        .first()
        .map(|run| {
            run.matrix
                .variables
                .iter()
                .filter(|v| *v != time_column)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let mut builder = DatasetBuilder::new(frozen, &variables);
    for run in runs {
        builder.add_run(run)?;
    }
    Ok(fold_seeds(builder.finish(), seed_axes))
}

/// Earliest first-row time and latest last-row time over all runs.
fn data_bounds(runs: &[RunFile], time_column: &str) -> Option<(f64, f64)> {
    runs.iter()
        .filter_map(|run| {
            let column = run.matrix.column_index(time_column)?;
            let times = run.matrix.values.column(column);
            let n = times.len();
            (n > 0).then(|| (times[0], times[n - 1]))
        })
        .reduce(|(lo, hi), (first, last)| (lo.min(first), hi.max(last)))
}
