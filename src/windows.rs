//! Sliding-window supervised dataset assembly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::omni_table::{read_range, OmniColumn, OmniTableError, RowRange};

/// Loader configuration.
///
/// `dt` is the spacing in hours between consecutive history samples,
/// `nt` the number of history samples per window, and `fcast` the
/// forecast horizon in hours after the window end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmniLoaderConfig {
    pub filename: PathBuf,
    pub dt: usize,
    pub nt: usize,
    pub fcast: usize,
}

impl Default for OmniLoaderConfig {
    fn default() -> Self {
        Self {
            filename: PathBuf::from("data/omni.dat"),
            dt: 1,
            nt: 5,
            fcast: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowReport {
    pub rows_read: usize,
    pub candidate_windows: usize,
    pub kept_windows: usize,
    pub dropped_windows: usize,
}

/// Kept feature windows and target rows, in window-start order.
///
/// `x` rows are flattened windows of width `nt * xcols.len()`, `y` rows
/// have width `ycols.len()`; row `i` of both refers to the same window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedDataset {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub report: WindowReport,
}

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("invalid loader config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Table(#[from] OmniTableError),
}

/// Read `range` of the configured file and assemble supervised pairs.
///
/// A window starting at row `i` takes rows `i, i+dt, ..., i+(nt-1)*dt`
/// restricted to `xcols` and row `i + dt*nt + fcast` restricted to
/// `ycols`. Windows touching any sentinel value are dropped; the
/// surviving pairs keep their original order.
pub fn load_windows(
    cfg: &OmniLoaderConfig,
    xcols: &[OmniColumn],
    ycols: &[OmniColumn],
    range: RowRange,
) -> Result<WindowedDataset, WindowError> {
    validate_config(cfg)?;

    let t0 = cfg.dt * cfg.nt;
    let tau = t0 + cfg.fcast;

    info!(
        component = "windows",
        event = "windows.load.start",
        filename = %cfg.filename.display(),
        dt = cfg.dt,
        nt = cfg.nt,
        fcast = cfg.fcast,
        rowbeg = range.rowbeg,
        x_columns = xcols.len(),
        y_columns = ycols.len()
    );

    let xslice = read_range(&cfg.filename, range, xcols)?;
    let yslice = read_range(&cfg.filename, range, ycols)?;

    let rows_read = xslice.values.len();
    let candidate_windows = rows_read.saturating_sub(tau);

    let mut x = Vec::new();
    let mut y = Vec::new();

    for i in 0..candidate_windows {
        let mut window_valid = true;
        let mut window = Vec::with_capacity(cfg.nt * xcols.len());
        for k in 0..cfg.nt {
            let row = i + k * cfg.dt;
            window_valid &= xslice.mask[row].iter().all(|valid| *valid);
            window.extend_from_slice(&xslice.values[row]);
        }

        let target_row = i + tau;
        window_valid &= yslice.mask[target_row].iter().all(|valid| *valid);

        if window_valid {
            x.push(window);
            y.push(yslice.values[target_row].clone());
        }
    }

    let report = WindowReport {
        rows_read,
        candidate_windows,
        kept_windows: x.len(),
        dropped_windows: candidate_windows - x.len(),
    };

    if report.dropped_windows > 0 {
        info!(
            component = "windows",
            event = "windows.load.dropped",
            dropped_windows = report.dropped_windows,
            candidate_windows = report.candidate_windows
        );
    }

    info!(
        component = "windows",
        event = "windows.load.finish",
        rows_read = report.rows_read,
        candidate_windows = report.candidate_windows,
        kept_windows = report.kept_windows,
        dropped_windows = report.dropped_windows
    );

    Ok(WindowedDataset { x, y, report })
}

fn validate_config(cfg: &OmniLoaderConfig) -> Result<(), WindowError> {
    if cfg.dt == 0 {
        return Err(WindowError::InvalidConfig("dt must be >= 1".to_string()));
    }
    if cfg.nt == 0 {
        return Err(WindowError::InvalidConfig("nt must be >= 1".to_string()));
    }
    Ok(())
}
