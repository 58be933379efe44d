use std::path::{Path, PathBuf};

use log::debug;
use ndarray::Array2;

use super::header::{is_data_line, parse_header, RunHeader};
use super::model::RunMatrix;
use crate::error::{FoldError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// One parsed run file: header plus numeric body.
#[derive(Debug, Clone)]
pub struct RunFile {
    pub path: PathBuf,
    pub header: RunHeader,
    pub matrix: RunMatrix,
}

/// Read and parse a run export from disk.
pub fn load_run(path: &Path) -> Result<RunFile> {
    let text = std::fs::read_to_string(path).map_err(|e| FoldError::io(path, e))?;
    parse_run(path, &text)
}

/// Parse run text. `path` is only used for error reporting.
///
/// Expected layout:
///
/// ```text
/// # x = 1.0, random = 0
/// # time value
/// 0 10
/// 1 20
/// ```
pub fn parse_run(path: &Path, text: &str) -> Result<RunFile> {
    let header = parse_header(text.lines());
    if header.variables.is_empty() {
        return Err(FoldError::HeaderParse {
            path: path.to_path_buf(),
        });
    }

    let values = parse_body(path, text, header.variables.len())?;
    debug!(
        "{}: {} rows x {} variables, coordinates {:?}",
        path.display(),
        values.nrows(),
        values.ncols(),
        header.coordinates
    );

    let matrix = RunMatrix {
        variables: header.variables.clone(),
        values,
    };
    Ok(RunFile {
        path: path.to_path_buf(),
        header,
        matrix,
    })
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Parse every data line into a row of exactly `width` floats.
/// Non-data lines (header, trailing comments) are skipped.
pub fn parse_body(path: &Path, text: &str, width: usize) -> Result<Array2<f64>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if !is_data_line(line) {
            // Only lines after the body started are worth mentioning.
            if !rows.is_empty() && !line.trim().is_empty() {
                debug!("{}:{}: skipping non-data line", path.display(), idx + 1);
            }
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>().map_err(|_| FoldError::InvalidNumber {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    token: tok.to_string(),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if row.len() != width {
            return Err(FoldError::MalformedRow {
                path: path.to_path_buf(),
                line: idx + 1,
                expected: width,
                found: row.len(),
            });
        }
        rows.push(row);
    }

    Ok(Array2::from_shape_fn((rows.len(), width), |(r, c)| rows[r][c]))
}
