use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed table {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Missing column {column} in {path:?}")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),
    #[error("Rendering {path:?} failed: {message}")]
    Render { path: PathBuf, message: String },
}

impl PlotError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlotError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = PlotError> = std::result::Result<T, E>;
