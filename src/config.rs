use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, Result};

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Everything the pipeline needs to know, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the run exports.
    #[serde(default = "PipelineConfig::default_data_dir")]
    pub data_dir: PathBuf,
    /// Common file-name prefix in front of every experiment name.
    #[serde(default)]
    pub file_prefix: String,
    /// Experiment names; files match `{file_prefix}{experiment}_*`.
    #[serde(default)]
    pub experiments: Vec<String>,
    #[serde(default = "PipelineConfig::default_time_column")]
    pub time_column: String,
    /// Coordinates averaged away instead of kept as axes.
    #[serde(default = "PipelineConfig::default_seed_axes")]
    pub seed_axes: Vec<String>,
    #[serde(default)]
    pub time: TimeGridConfig,
}

impl PipelineConfig {
    fn default_data_dir() -> PathBuf {
        PathBuf::from("data")
    }
    fn default_time_column() -> String {
        "time".to_string()
    }
    fn default_seed_axes() -> Vec<String> {
        vec!["random".to_string()]
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FoldError::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            file_prefix: String::new(),
            experiments: Vec::new(),
            time_column: Self::default_time_column(),
            seed_axes: Self::default_seed_axes(),
            time: TimeGridConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Time grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Spacing {
    #[default]
    Linear,
    /// `10^x` for `x` evenly spaced between `min` and `max`.
    Logarithmic,
}

/// Shared time grid every run is resampled onto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGridConfig {
    #[serde(default = "TimeGridConfig::default_samples")]
    pub samples: usize,
    /// Lower bound; taken from the data when absent.
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound; taken from the data when absent.
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub spacing: Spacing,
}

impl TimeGridConfig {
    fn default_samples() -> usize {
        1001
    }

    /// Grid points, given the `(earliest, latest)` time seen in the data.
    /// Empty when a bound is neither configured nor known from data.
    ///
    /// The grid is strictly increasing. Equal bounds collapse to a single
    /// point; `min > max` (or a NaN bound) is an error.
    pub fn resolve(&self, data_bounds: Option<(f64, f64)>) -> Result<Vec<f64>> {
        let min = self.min.or(data_bounds.map(|b| b.0));
        let max = self.max.or(data_bounds.map(|b| b.1));
        let (Some(min), Some(max)) = (min, max) else {
            return Ok(Vec::new());
        };
        let invalid = || FoldError::InvalidTimeGrid { min, max };
        if min.is_nan() || max.is_nan() || min > max {
            return Err(invalid());
        }
        let samples = if min == max { self.samples.min(1) } else { self.samples };
        let points: Vec<f64> = match self.spacing {
            Spacing::Linear => linspace(min, max, samples),
            Spacing::Logarithmic => linspace(min, max, samples)
                .into_iter()
                .map(|x| 10f64.powf(x))
                .collect(),
        };
        if points.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid());
        }
        Ok(points)
    }
}

impl Default for TimeGridConfig {
    fn default() -> Self {
        Self {
            samples: Self::default_samples(),
            min: None,
            max: None,
            spacing: Spacing::default(),
        }
    }
}

/// `n` evenly spaced points from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            points[n - 1] = stop;
            points
        }
    }
}
