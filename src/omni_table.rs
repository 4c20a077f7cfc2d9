//! OMNI flat-file table reading and sentinel masking.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const COLUMN_COUNT: usize = 7;

/// The seven fields of one OMNI data row, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OmniColumn {
    Year,
    Day,
    Hour,
    Bz,
    Np,
    V,
    Dst,
}

impl OmniColumn {
    pub const ALL: [OmniColumn; COLUMN_COUNT] = [
        Self::Year,
        Self::Day,
        Self::Hour,
        Self::Bz,
        Self::Np,
        Self::V,
        Self::Dst,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Bz => "Bz",
            Self::Np => "Np",
            Self::V => "V",
            Self::Dst => "Dst",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, OmniTableError> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == name)
            .ok_or_else(|| OmniTableError::UnknownColumn(name.to_string()))
    }

    pub fn file_index(self) -> usize {
        match self {
            Self::Year => 0,
            Self::Day => 1,
            Self::Hour => 2,
            Self::Bz => 3,
            Self::Np => 4,
            Self::V => 5,
            Self::Dst => 6,
        }
    }

    /// Value the source format writes when no measurement exists.
    pub fn sentinel(self) -> Option<f64> {
        match self {
            Self::Bz | Self::Np => Some(999.9),
            Self::V => Some(9999.0),
            Self::Dst => Some(999.0),
            Self::Year | Self::Day | Self::Hour => None,
        }
    }
}

/// Bounded row slice of the data file; `{0, None}` means the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowRange {
    pub rowbeg: usize,
    pub nrows: Option<usize>,
}

/// Projected sub-table plus its validity mask, both rows x `columns`.
///
/// Column order follows the caller-supplied list, not the file order.
/// A mask entry is true iff the raw value differs from that column's
/// sentinel; sentinel-free columns are always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSlice {
    pub columns: Vec<OmniColumn>,
    pub values: Vec<Vec<f64>>,
    pub mask: Vec<Vec<bool>>,
}

#[derive(Debug, Error)]
pub enum OmniTableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown column name '{0}'")]
    UnknownColumn(String),
    #[error("row {row} has {found} fields, expected {expected}")]
    RowFieldCount {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("failed to parse {column} value '{value}' at row {row}")]
    ParseField {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Count the data rows (lines) in the file.
pub fn count_rows(path: &Path) -> Result<usize, OmniTableError> {
    let file = fs::File::open(path)?;
    let mut count = 0usize;
    for line in BufReader::new(file).lines() {
        line?;
        count += 1;
    }
    Ok(count)
}

/// Read `range` from the file, project `cols` in caller order, and
/// compute the sentinel mask alongside.
pub fn read_range(
    path: &Path,
    range: RowRange,
    cols: &[OmniColumn],
) -> Result<TableSlice, OmniTableError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut values = Vec::new();
    let mut mask = Vec::new();

    for (row_idx, line) in reader.lines().enumerate().skip(range.rowbeg) {
        if let Some(nrows) = range.nrows {
            if values.len() >= nrows {
                break;
            }
        }

        let line = line?;
        let raw = parse_row(&line, row_idx)?;

        let mut row_values = Vec::with_capacity(cols.len());
        let mut row_mask = Vec::with_capacity(cols.len());
        for column in cols {
            let value = raw[column.file_index()];
            row_values.push(value);
            row_mask.push(column.sentinel().map_or(true, |sentinel| value != sentinel));
        }
        values.push(row_values);
        mask.push(row_mask);
    }

    debug!(
        component = "omni_table",
        event = "omni.read.finish",
        path = %path.display(),
        rowbeg = range.rowbeg,
        rows_read = values.len(),
        column_count = cols.len()
    );

    Ok(TableSlice {
        columns: cols.to_vec(),
        values,
        mask,
    })
}

fn parse_row(line: &str, row: usize) -> Result<[f64; COLUMN_COUNT], OmniTableError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != COLUMN_COUNT {
        return Err(OmniTableError::RowFieldCount {
            row,
            found: fields.len(),
            expected: COLUMN_COUNT,
        });
    }

    Ok([
        parse_int(fields[0], row, "year")?,
        parse_int(fields[1], row, "day")?,
        parse_int(fields[2], row, "hour")?,
        parse_float(fields[3], row, "Bz")?,
        parse_float(fields[4], row, "Np")?,
        parse_float(fields[5], row, "V")?,
        parse_int(fields[6], row, "Dst")?,
    ])
}

fn parse_int(raw: &str, row: usize, column: &'static str) -> Result<f64, OmniTableError> {
    raw.parse::<i64>()
        .map(|value| value as f64)
        .map_err(|_| OmniTableError::ParseField {
            row,
            column,
            value: raw.to_string(),
        })
}

fn parse_float(raw: &str, row: usize, column: &'static str) -> Result<f64, OmniTableError> {
    raw.parse::<f64>().map_err(|_| OmniTableError::ParseField {
        row,
        column,
        value: raw.to_string(),
    })
}
