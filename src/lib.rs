//! Fold simulation-run exports into one dense dataset per experiment.
//!
//! Each run file carries its independent-variable settings in the header and
//! an irregularly sampled time series in the body. Runs are placed on a
//! shared coordinate grid, resampled onto a common time axis by nearest
//! lookup, and averaged over the seed coordinates.

pub mod cache;
pub mod config;
pub mod data;
pub mod dataset;
pub mod discovery;
pub mod error;
pub mod export;
pub mod pipeline;

pub use config::PipelineConfig;
pub use data::filter::Selection;
pub use data::model::CoordinateValue;
pub use dataset::{Dataset, MeanDataset};
pub use error::{FoldError, Result};
pub use pipeline::{BatchReport, Diagnostic, Pipeline};
