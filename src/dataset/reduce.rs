use ndarray::{ArrayD, Dimension, IxDyn};

use super::tensor::{ExperimentTensor, MeanDataset};

/// Mean over the seed axes, ignoring NaN.
///
/// All seed axes are folded jointly; names not present in the tensor are
/// ignored and the time axis is never folded. A position whose replicates are
/// all NaN stays NaN.
pub fn fold_seeds(tensor: ExperimentTensor, seed_axes: &[String]) -> MeanDataset {
    let folded: Vec<usize> = tensor
        .axes()
        .iter()
        .enumerate()
        .filter(|(_, a)| a.name != tensor.time_axis_name() && seed_axes.contains(&a.name))
        .map(|(i, _)| i)
        .collect();
    if folded.is_empty() {
        return tensor;
    }

    let (axes, time_axis, variables) = tensor.into_parts();
    let kept: Vec<usize> = (0..axes.len()).filter(|i| !folded.contains(i)).collect();
    let outer_shape: Vec<usize> = kept.iter().map(|&i| axes[i].len()).collect();
    let inner: usize = folded.iter().map(|&i| axes[i].len()).product();

    let order: Vec<usize> = kept.iter().chain(&folded).copied().collect();
    let variables = variables
        .into_iter()
        .map(|(name, values)| {
            let means = fold_last(&values, &order, &outer_shape, inner);
            (name, means)
        })
        .collect();

    let kept_axes = kept.iter().map(|&i| axes[i].clone()).collect();
    MeanDataset::from_parts(kept_axes, time_axis, variables)
}

// Permute so the folded axes come last; the logical iteration order then
// visits each replicate group as one contiguous run of `inner` values.
fn fold_last(
    values: &ArrayD<f64>,
    order: &[usize],
    outer_shape: &[usize],
    inner: usize,
) -> ArrayD<f64> {
    let outer: usize = outer_shape.iter().product();
    if inner == 0 || outer == 0 {
        return ArrayD::from_elem(IxDyn(outer_shape), f64::NAN);
    }

    let permuted: Vec<f64> = values
        .view()
        .permuted_axes(order.to_vec())
        .iter()
        .copied()
        .collect();
    let means: Vec<f64> = permuted.chunks(inner).map(nan_mean).collect();
    ArrayD::from_shape_fn(IxDyn(outer_shape), |index| {
        let flat = index
            .slice()
            .iter()
            .zip(outer_shape)
            .fold(0, |acc, (&i, &len)| acc * len + i);
        means[flat]
    })
}

/// Arithmetic mean of the non-NaN values; NaN if there are none.
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
