use log::{debug, warn};

use super::tensor::ExperimentTensor;
use crate::data::loader::RunFile;
use crate::data::model::{CoordinateValue, FrozenDomain};
use crate::data::sampler;
use crate::error::{FoldError, Result};

// ---------------------------------------------------------------------------
// DatasetBuilder – scatter resampled runs into a dense tensor
// ---------------------------------------------------------------------------

/// Fills an [`ExperimentTensor`] shaped by a frozen domain.
///
/// The domain must already contain every coordinate value of every run that
/// is added; runs are written in the order they are added, so with duplicate
/// coordinate tuples the last one wins.
pub struct DatasetBuilder {
    tensor: ExperimentTensor,
    targets: Vec<f64>,
}

impl DatasetBuilder {
    /// Allocate the tensor. `variables` are the measured variable names, time
    /// column excluded; each gets a NaN-filled array.
    pub fn new(domain: FrozenDomain, variables: &[String]) -> Self {
        let time_name = domain.time_axis().name.clone();
        let targets: Vec<f64> = domain
            .time_axis()
            .values
            .iter()
            .filter_map(CoordinateValue::as_f64)
            .collect();

        let mut tensor = ExperimentTensor::new(domain.into_axes(), time_name);
        for name in variables {
            let values = tensor.nan_array();
            tensor.insert_variable(name.clone(), values);
        }
        Self { tensor, targets }
    }

    /// Resample `run` onto the time axis and write it into its slice.
    ///
    /// A coordinate of the domain that the run does not assign spans its
    /// whole axis.
    pub fn add_run(&mut self, run: &RunFile) -> Result<()> {
        let time_name = self.tensor.time_axis_name().to_string();
        let time_column =
            run.matrix
                .column_index(&time_name)
                .ok_or_else(|| FoldError::MissingTimeColumn {
                    path: run.path.clone(),
                    column: time_name.clone(),
                })?;

        let positions = self.slice_positions(run)?;

        if run.matrix.is_empty() {
            warn!("{}: no data rows, slice stays NaN", run.path.display());
        }
        let resampled = sampler::resample(&run.matrix.values, time_column, &self.targets)
            .map_err(|source| FoldError::Resample {
                path: run.path.clone(),
                source: Box::new(source),
            })?;

        let names: Vec<String> = self.tensor.variable_names().map(str::to_string).collect();
        for name in names {
            let Some(column) = run.matrix.column_index(&name) else {
                debug!("{}: no column {name}", run.path.display());
                continue;
            };
            let Some(array) = self.tensor.variable_mut(&name) else {
                continue;
            };
            for prefix in &positions {
                let mut index = prefix.clone();
                index.push(0);
                let last = index.len() - 1;
                for (t, value) in resampled.column(column).iter().enumerate() {
                    index[last] = t;
                    array[index.as_slice()] = *value;
                }
            }
        }

        for extra in run
            .matrix
            .variables
            .iter()
            .filter(|v| **v != time_name && self.tensor.variable(v).is_none())
        {
            debug!("{}: ignoring undeclared column {extra}", run.path.display());
        }
        Ok(())
    }

    pub fn finish(self) -> ExperimentTensor {
        self.tensor
    }

    /// Every coordinate index tuple (time excluded) the run writes to.
    fn slice_positions(&self, run: &RunFile) -> Result<Vec<Vec<usize>>> {
        let axes = self.tensor.axes();
        let time_name = self.tensor.time_axis_name();
        let coordinates = &run.header.coordinates;

        if let Some((name, value)) = coordinates
            .iter()
            .find(|(name, _)| *name != time_name && self.tensor.axis(name).is_none())
        {
            return Err(mismatch(run, name, value));
        }

        let mut choices = Vec::with_capacity(axes.len().saturating_sub(1));
        for axis in axes.iter().filter(|a| a.name != time_name) {
            match coordinates.get(&axis.name) {
                Some(value) => {
                    let position = axis
                        .position(value)
                        .ok_or_else(|| mismatch(run, &axis.name, value))?;
                    choices.push(vec![position]);
                }
                None => choices.push((0..axis.len()).collect()),
            }
        }
        Ok(cartesian(&choices))
    }
}

fn mismatch(run: &RunFile, name: &str, value: &CoordinateValue) -> FoldError {
    FoldError::DomainMismatch {
        path: run.path.clone(),
        coordinate: name.to_string(),
        value: value.to_string(),
    }
}

fn cartesian(choices: &[Vec<usize>]) -> Vec<Vec<usize>> {
    choices.iter().fold(vec![Vec::new()], |acc, options| {
        acc.iter()
            .flat_map(|prefix| {
                options.iter().map(move |&i| {
                    let mut next = prefix.clone();
                    next.push(i);
                    next
                })
            })
            .collect()
    })
}
