use std::{fs::File, io::Read, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::error::{PlotError, Result};

pub const REQUIRED_COLUMNS: [&str; 4] = ["benchmark_name", "setting", "dataset", "benchmark_time"];

/// One line of the results table. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BenchmarkRow {
    pub benchmark_name: String,
    pub setting: String,
    pub dataset: String,
    pub benchmark_time: f64,
}

pub fn load_rows(path: &Path) -> Result<Vec<BenchmarkRow>> {
    let file = File::open(path).map_err(|e| PlotError::io(path, e))?;
    read_rows(file, path)
}

/// Reads rows from any reader, `path` is only used for error messages
pub fn read_rows<R: Read>(input: R, path: &Path) -> Result<Vec<BenchmarkRow>> {
    let csv_err = |source| PlotError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers().map_err(csv_err)?.clone();
    debug!("Columns in {path:?}: {headers:?}");
    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|h| h == *column))
    {
        return Err(PlotError::MissingColumn {
            path: path.to_path_buf(),
            column,
        });
    }

    reader
        .deserialize::<BenchmarkRow>()
        .map(|row| row.map_err(csv_err))
        .collect()
}
