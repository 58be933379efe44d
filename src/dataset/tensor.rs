use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::data::filter::{self, Selection};
use crate::data::model::{Axis, CoordinateValue};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Dataset – named axes plus one dense array per measured variable
// ---------------------------------------------------------------------------

/// Dense N-dimensional dataset. Every variable array has exactly the shape
/// given by `axes`; NaN marks cells no run wrote to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "DatasetRecord", try_from = "DatasetRecord")]
pub struct Dataset {
    axes: Vec<Axis>,
    time_axis: String,
    variables: BTreeMap<String, ArrayD<f64>>,
}

/// A dataset before seed folding: one axis per coordinate, then time.
pub type ExperimentTensor = Dataset;

/// A dataset after seed folding; what callers get back from the pipeline.
pub type MeanDataset = Dataset;

impl Dataset {
    /// Dataset with the given axes and no variables yet.
    pub fn new(axes: Vec<Axis>, time_axis: impl Into<String>) -> Self {
        Self {
            axes,
            time_axis: time_axis.into(),
            variables: BTreeMap::new(),
        }
    }

    /// NaN-filled array with this dataset's shape.
    pub fn nan_array(&self) -> ArrayD<f64> {
        ArrayD::from_elem(IxDyn(&self.shape()), f64::NAN)
    }

    pub(crate) fn insert_variable(&mut self, name: String, values: ArrayD<f64>) {
        debug_assert_eq!(values.shape(), self.shape().as_slice());
        self.variables.insert(name, values);
    }

    pub(crate) fn variable_mut(&mut self, name: &str) -> Option<&mut ArrayD<f64>> {
        self.variables.get_mut(name)
    }

    pub(crate) fn into_parts(self) -> (Vec<Axis>, String, BTreeMap<String, ArrayD<f64>>) {
        (self.axes, self.time_axis, self.variables)
    }

    pub(crate) fn from_parts(
        axes: Vec<Axis>,
        time_axis: String,
        variables: BTreeMap<String, ArrayD<f64>>,
    ) -> Self {
        Self {
            axes,
            time_axis,
            variables,
        }
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn axis_index(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name == name)
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(Axis::len).collect()
    }

    pub fn time_axis_name(&self) -> &str {
        &self.time_axis
    }

    /// Sample times, or `None` once the time axis was selected away.
    pub fn time(&self) -> Option<Vec<f64>> {
        self.axis(&self.time_axis)
            .map(|a| a.values.iter().filter_map(CoordinateValue::as_f64).collect())
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn variable(&self, name: &str) -> Option<&ArrayD<f64>> {
        self.variables.get(name)
    }

    /// Whether the dataset holds no variables (e.g. nothing was loaded).
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Sub-dataset with the selected axes fixed and removed.
    pub fn select(&self, selection: &Selection) -> Result<Dataset> {
        filter::select(self, selection)
    }

    /// Single value of `variable` at a position given by one value per axis.
    pub fn value_at(&self, variable: &str, at: &[CoordinateValue]) -> Option<f64> {
        if at.len() != self.axes.len() {
            return None;
        }
        let index = self
            .axes
            .iter()
            .zip(at)
            .map(|(axis, value)| axis.position(value))
            .collect::<Option<Vec<usize>>>()?;
        self.variables.get(variable).map(|a| a[index.as_slice()])
    }
}

// ---------------------------------------------------------------------------
// Serialised form
// ---------------------------------------------------------------------------

/// On-disk shape of a [`Dataset`]. JSON has no NaN, so missing cells are
/// stored as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    axes: Vec<Axis>,
    time_axis: String,
    variables: BTreeMap<String, Vec<Option<f64>>>,
}

impl From<Dataset> for DatasetRecord {
    fn from(ds: Dataset) -> Self {
        let variables = ds
            .variables
            .into_iter()
            .map(|(name, values)| {
                let cells = values
                    .iter()
                    .map(|v| if v.is_nan() { None } else { Some(*v) })
                    .collect();
                (name, cells)
            })
            .collect();
        DatasetRecord {
            axes: ds.axes,
            time_axis: ds.time_axis,
            variables,
        }
    }
}

impl TryFrom<DatasetRecord> for Dataset {
    type Error = String;

    fn try_from(record: DatasetRecord) -> std::result::Result<Self, Self::Error> {
        let shape: Vec<usize> = record.axes.iter().map(Axis::len).collect();
        let variables = record
            .variables
            .into_iter()
            .map(|(name, cells)| {
                let values = cells.into_iter().map(|c| c.unwrap_or(f64::NAN)).collect();
                ArrayD::from_shape_vec(IxDyn(&shape), values)
                    .map(|array| (name.clone(), array))
                    .map_err(|e| format!("variable {name}: {e}"))
            })
            .collect::<std::result::Result<BTreeMap<_, _>, String>>()?;
        Ok(Dataset {
            axes: record.axes,
            time_axis: record.time_axis,
            variables,
        })
    }
}
