use std::io::Write;
use std::path::Path;

use ndarray::IxDyn;

use crate::dataset::tensor::Dataset;
use crate::error::{FoldError, Result};

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Long-format CSV: one column per axis, then one per variable, one row per
/// cell. Missing values are written as `NaN`.
///
/// ```text
/// x,time,value
/// 1,0,11
/// 1,1,19
/// ```
pub fn write_csv<W: Write>(dataset: &Dataset, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let names: Vec<&str> = dataset.variable_names().collect();
    let header = dataset
        .axes()
        .iter()
        .map(|a| a.name.as_str())
        .chain(names.iter().copied());
    writer.write_record(header)?;

    let shape = dataset.shape();
    let cells: usize = shape.iter().product();
    let mut index = vec![0usize; shape.len()];
    for _ in 0..cells {
        let mut record: Vec<String> = dataset
            .axes()
            .iter()
            .zip(&index)
            .map(|(axis, &i)| axis.values[i].to_string())
            .collect();
        for name in &names {
            let value = dataset
                .variable(name)
                .map_or(f64::NAN, |a| a[IxDyn(&index)]);
            record.push(value.to_string());
        }
        writer.write_record(&record)?;
        advance(&mut index, &shape);
    }

    writer
        .flush()
        .map_err(|e| FoldError::Csv(csv::Error::from(e)))
}

pub fn write_csv_file(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| FoldError::io(path, e))?;
    write_csv(dataset, file)
}

// Row-major odometer step.
fn advance(index: &mut [usize], shape: &[usize]) {
    for (i, len) in index.iter_mut().zip(shape).rev() {
        *i += 1;
        if *i < *len {
            return;
        }
        *i = 0;
    }
}

#[cfg(test)]
mod tests {
    use ndarray::ArrayD;

    use super::*;
    use crate::data::model::Axis;

    #[test]
    fn writes_one_row_per_cell() {
        let axes = vec![
            Axis {
                name: "mode".into(),
                values: vec!["a".into(), "b".into()],
            },
            Axis {
                name: "time".into(),
                values: vec![0.0.into(), 0.5.into()],
            },
        ];
        let mut ds = Dataset::new(axes, "time");
        let values =
            ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1.0, 2.0, f64::NAN, 4.5]).expect("shape");
        ds.insert_variable("v".into(), values);

        let mut out = Vec::new();
        write_csv(&ds, &mut out).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "mode,time,v\na,0,1\na,0.5,2\nb,0,NaN\nb,0.5,4.5\n");
    }

    #[test]
    fn advance_walks_row_major() {
        let shape = [2, 3];
        let mut index = vec![0, 0];
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(index.clone());
            advance(&mut index, &shape);
        }
        assert_eq!(seen[1], vec![0, 1]);
        assert_eq!(seen[3], vec![1, 0]);
        assert_eq!(index, vec![0, 0]);
    }
}
