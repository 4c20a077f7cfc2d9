//! Affine normalization shared between training and evaluation data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column-wise statistics used by the affine pair. Computed once from a
/// reference dataset and reusable to transform other data consistently,
/// e.g. validation data scaled with training statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    pub max: Vec<f64>,
    pub min: Vec<f64>,
    pub mean: Vec<f64>,
}

/// Optional pre-computed statistics; each absent field is computed from
/// the input itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalingOverrides {
    pub max: Option<Vec<f64>>,
    pub min: Option<Vec<f64>>,
    pub mean: Option<Vec<f64>>,
}

#[derive(Debug, Error)]
pub enum ScalingError {
    #[error("input has no rows, statistics cannot be computed")]
    EmptyInput,
    #[error("{field} has {found} entries, expected {expected}")]
    ParamWidthMismatch {
        field: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("row {row} has {found} entries, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Scale `x` to `(x - mean) / (max - min)` and return the parameters
/// actually used.
///
/// A column with `max == min` divides by zero and produces non-finite
/// output; guarding against that is the caller's responsibility.
pub fn normalize(
    x: &[Vec<f64>],
    overrides: &ScalingOverrides,
) -> Result<(Vec<Vec<f64>>, ScalingParams), ScalingError> {
    let width = infer_width(x, overrides)?;
    check_rows(x, width)?;

    let max = match &overrides.max {
        Some(given) => checked_param("max", given, width)?,
        None => column_fold(x, width, f64::MIN, f64::max),
    };
    let min = match &overrides.min {
        Some(given) => checked_param("min", given, width)?,
        None => column_fold(x, width, f64::MAX, f64::min),
    };
    let mean = match &overrides.mean {
        Some(given) => checked_param("mean", given, width)?,
        None => column_mean(x, width),
    };

    let params = ScalingParams { max, min, mean };
    let x_norm = x
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(c, value)| (value - params.mean[c]) / (params.max[c] - params.min[c]))
                .collect()
        })
        .collect();

    Ok((x_norm, params))
}

/// Exact inverse of [`normalize`]: `x_norm * (max - min) + mean`.
pub fn denormalize(
    x_norm: &[Vec<f64>],
    params: &ScalingParams,
) -> Result<Vec<Vec<f64>>, ScalingError> {
    let width = params.max.len();
    checked_param("min", &params.min, width)?;
    checked_param("mean", &params.mean, width)?;
    check_rows(x_norm, width)?;

    Ok(x_norm
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(c, value)| value * (params.max[c] - params.min[c]) + params.mean[c])
                .collect()
        })
        .collect())
}

fn infer_width(x: &[Vec<f64>], overrides: &ScalingOverrides) -> Result<usize, ScalingError> {
    if let Some(row) = x.first() {
        return Ok(row.len());
    }
    // With no rows, the width can only come from fully supplied params.
    match (&overrides.max, &overrides.min, &overrides.mean) {
        (Some(max), Some(_), Some(_)) => Ok(max.len()),
        _ => Err(ScalingError::EmptyInput),
    }
}

fn check_rows(x: &[Vec<f64>], width: usize) -> Result<(), ScalingError> {
    for (row, values) in x.iter().enumerate() {
        if values.len() != width {
            return Err(ScalingError::RaggedRow {
                row,
                found: values.len(),
                expected: width,
            });
        }
    }
    Ok(())
}

fn checked_param(
    field: &'static str,
    given: &[f64],
    width: usize,
) -> Result<Vec<f64>, ScalingError> {
    if given.len() != width {
        return Err(ScalingError::ParamWidthMismatch {
            field,
            found: given.len(),
            expected: width,
        });
    }
    Ok(given.to_vec())
}

fn column_fold(x: &[Vec<f64>], width: usize, init: f64, fold: fn(f64, f64) -> f64) -> Vec<f64> {
    let mut out = vec![init; width];
    for row in x {
        for (c, value) in row.iter().enumerate() {
            out[c] = fold(out[c], *value);
        }
    }
    out
}

fn column_mean(x: &[Vec<f64>], width: usize) -> Vec<f64> {
    let mut out = vec![0.0; width];
    for row in x {
        for (c, value) in row.iter().enumerate() {
            out[c] += value;
        }
    }
    let rows = x.len() as f64;
    for sum in &mut out {
        *sum /= rows;
    }
    out
}
