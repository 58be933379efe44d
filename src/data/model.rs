use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CoordinateValue – the value of one independent variable in one run
// ---------------------------------------------------------------------------

/// A dynamically-typed coordinate value as found in a run header.
/// Domains are kept in `BTreeSet`s, so `CoordinateValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

// -- Manual Eq/Ord so we can put CoordinateValue in BTreeSet --

impl Eq for CoordinateValue {}

impl PartialOrd for CoordinateValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CoordinateValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CoordinateValue::*;
        fn discriminant(v: &CoordinateValue) -> u8 {
            match v {
                Boolean(_) => 0,
                Number(_) => 1,
                Text(_) => 2,
            }
        }
        match (self, other) {
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for CoordinateValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CoordinateValue::Number(v) => v.to_bits().hash(state),
            CoordinateValue::Boolean(b) => b.hash(state),
            CoordinateValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for CoordinateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateValue::Number(v) => write!(f, "{v}"),
            CoordinateValue::Boolean(b) => write!(f, "{b}"),
            CoordinateValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for CoordinateValue {
    fn from(v: f64) -> Self {
        CoordinateValue::Number(v)
    }
}

impl From<bool> for CoordinateValue {
    fn from(b: bool) -> Self {
        CoordinateValue::Boolean(b)
    }
}

impl From<&str> for CoordinateValue {
    fn from(s: &str) -> Self {
        CoordinateValue::Text(s.to_string())
    }
}

impl CoordinateValue {
    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CoordinateValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// Coordinate name → value, parsed from one run header.
pub type CoordinateAssignment = BTreeMap<String, CoordinateValue>;

// ---------------------------------------------------------------------------
// CoordinateDomain – union of all assignments of an experiment
// ---------------------------------------------------------------------------

/// Set of values seen per coordinate while files are still being merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateDomain {
    values: BTreeMap<String, BTreeSet<CoordinateValue>>,
}

impl CoordinateDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of `self` and one more assignment. Each scalar counts as a
    /// singleton set, so the result does not depend on merge order.
    pub fn merge(mut self, assignment: &CoordinateAssignment) -> Self {
        for (name, value) in assignment {
            self.values
                .entry(name.clone())
                .or_default()
                .insert(value.clone());
        }
        self
    }

    /// Union of two partial domains.
    pub fn union(mut self, other: CoordinateDomain) -> Self {
        for (name, values) in other.values {
            self.values.entry(name).or_default().extend(values);
        }
        self
    }

    /// Value set for one coordinate.
    pub fn values(&self, name: &str) -> Option<&BTreeSet<CoordinateValue>> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fix positional indices: every coordinate becomes a sorted axis, in
    /// name order, followed by the time axis.
    pub fn freeze(self, time_name: &str, time: Vec<f64>) -> FrozenDomain {
        let mut axes: Vec<Axis> = self
            .values
            .into_iter()
            .filter(|(name, _)| name != time_name)
            .map(|(name, values)| Axis {
                name,
                values: values.into_iter().collect(),
            })
            .collect();
        axes.push(Axis {
            name: time_name.to_string(),
            values: time.into_iter().map(CoordinateValue::Number).collect(),
        });
        FrozenDomain { axes }
    }
}

// ---------------------------------------------------------------------------
// Axis / FrozenDomain – read-only shape of an experiment tensor
// ---------------------------------------------------------------------------

/// One named tensor axis with its sorted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub values: Vec<CoordinateValue>,
}

impl Axis {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of `value` on this axis (values are sorted).
    pub fn position(&self, value: &CoordinateValue) -> Option<usize> {
        self.values.binary_search(value).ok()
    }
}

/// The merged domain with fixed axis order; the time axis is always last.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenDomain {
    axes: Vec<Axis>,
}

impl FrozenDomain {
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(Axis::len).collect()
    }

    pub fn axis_index(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name == name)
    }

    /// Axes before the time axis.
    pub fn coordinate_axes(&self) -> &[Axis] {
        &self.axes[..self.axes.len() - 1]
    }

    pub fn time_axis(&self) -> &Axis {
        &self.axes[self.axes.len() - 1]
    }

    pub fn into_axes(self) -> Vec<Axis> {
        self.axes
    }
}

// ---------------------------------------------------------------------------
// RunMatrix – the numeric body of one run file
// ---------------------------------------------------------------------------

/// Rows are time samples, columns follow the header's variable order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMatrix {
    pub variables: Vec<String>,
    pub values: Array2<f64>,
}

impl RunMatrix {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }
}
