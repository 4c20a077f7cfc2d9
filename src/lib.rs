//! Solar-wind (OMNI) data preparation crate.
//!
//! Implemented scope:
//! - whitespace-delimited OMNI table reading with sentinel masking
//! - sliding-window history/target dataset assembly
//! - affine normalization shared between training and validation data

mod observability;
mod omni_table;
mod scaling;
mod windows;

pub use observability::{
    init_logging, logging_config_from_env, LogFormat, LoggingConfig, LoggingInitError,
};
pub use omni_table::{
    count_rows, read_range, OmniColumn, OmniTableError, RowRange, TableSlice, COLUMN_COUNT,
};
pub use scaling::{denormalize, normalize, ScalingError, ScalingOverrides, ScalingParams};
pub use windows::{load_windows, OmniLoaderConfig, WindowError, WindowReport, WindowedDataset};
