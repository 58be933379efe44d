use std::collections::BTreeMap;

use ndarray::Axis as ArrayAxis;

use super::model::CoordinateValue;
use crate::dataset::tensor::Dataset;
use crate::error::{FoldError, Result};

// ---------------------------------------------------------------------------
// Selection: which value is fixed per axis
// ---------------------------------------------------------------------------

/// Per-axis fixed value: maps axis name → the one value to keep.
/// Axes absent from the map are kept whole.
pub type Selection = BTreeMap<String, CoordinateValue>;

/// Sub-dataset with every selected axis fixed to its value and removed.
///
/// Selecting on the time axis is allowed; the result then has no time axis
/// and [`Dataset::time`] returns `None`.
pub fn select(dataset: &Dataset, selection: &Selection) -> Result<Dataset> {
    let mut fixed: Vec<(usize, usize)> = Vec::with_capacity(selection.len());
    for (name, value) in selection {
        let unknown = || FoldError::UnknownCoordinate {
            axis: name.clone(),
            value: value.to_string(),
        };
        let axis_index = dataset.axis_index(name).ok_or_else(unknown)?;
        let position = dataset.axes()[axis_index]
            .position(value)
            .ok_or_else(unknown)?;
        fixed.push((axis_index, position));
    }
    // Highest axis first so lower indices stay valid while removing.
    fixed.sort_unstable_by(|a, b| b.0.cmp(&a.0));

    let axes = dataset
        .axes()
        .iter()
        .enumerate()
        .filter(|(i, _)| !fixed.iter().any(|(f, _)| f == i))
        .map(|(_, a)| a.clone())
        .collect();

    let variables = dataset
        .variable_names()
        .filter_map(|name| dataset.variable(name).map(|values| (name, values)))
        .map(|(name, values)| {
            let mut view = values.view();
            for &(axis, position) in &fixed {
                view = view.index_axis_move(ArrayAxis(axis), position);
            }
            (name.to_string(), view.to_owned())
        })
        .collect();

    Ok(Dataset::from_parts(
        axes,
        dataset.time_axis_name().to_string(),
        variables,
    ))
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayD, IxDyn};

    use super::*;
    use crate::data::model::Axis;

    fn dataset() -> Dataset {
        let axes = vec![
            Axis {
                name: "mode".into(),
                values: vec!["fast".into(), "slow".into()],
            },
            Axis {
                name: "x".into(),
                values: vec![1.0.into(), 2.0.into(), 3.0.into()],
            },
            Axis {
                name: "time".into(),
                values: vec![0.0.into(), 1.0.into()],
            },
        ];
        let mut ds = Dataset::new(axes, "time");
        let values = ArrayD::from_shape_fn(IxDyn(&[2, 3, 2]), |ix| {
            (ix[0] * 100 + ix[1] * 10 + ix[2]) as f64
        });
        ds.insert_variable("v".into(), values);
        ds
    }

    #[test]
    fn fixing_axes_removes_them() {
        let ds = dataset();
        let selection = Selection::from([
            ("x".to_string(), CoordinateValue::from(3.0)),
            ("mode".to_string(), CoordinateValue::from("slow")),
        ]);
        let sub = select(&ds, &selection).expect("select");
        let names: Vec<_> = sub.axes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["time"]);
        let v = sub.variable("v").expect("v");
        assert_eq!(v.iter().copied().collect::<Vec<_>>(), vec![120.0, 121.0]);
        assert_eq!(sub.time(), Some(vec![0.0, 1.0]));
    }

    #[test]
    fn fixing_time_drops_time_axis() {
        let ds = dataset();
        let selection = Selection::from([("time".to_string(), CoordinateValue::from(1.0))]);
        let sub = select(&ds, &selection).expect("select");
        assert_eq!(sub.shape(), vec![2, 3]);
        assert_eq!(sub.time(), None);
        assert_eq!(sub.variable("v").expect("v")[IxDyn(&[1, 2])], 121.0);
    }

    #[test]
    fn empty_selection_is_identity() {
        let ds = dataset();
        assert_eq!(select(&ds, &Selection::new()).expect("select"), ds);
    }

    #[test]
    fn unknown_value_is_an_error() {
        let ds = dataset();
        let selection = Selection::from([("x".to_string(), CoordinateValue::from(9.0))]);
        assert!(matches!(
            select(&ds, &selection),
            Err(FoldError::UnknownCoordinate { .. })
        ));
        let selection = Selection::from([("y".to_string(), CoordinateValue::from(1.0))]);
        assert!(select(&ds, &selection).is_err());
    }
}
