// Error type shared by the loader, the pipeline stages and the upload step.
use polars::prelude::PolarsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("{0} is empty or has no header row")]
    EmptyInput(PathBuf),
    #[error("data frame error: {0}")]
    Frame(#[from] PolarsError),
    #[error("only .csv files are accepted, got {0}")]
    NotCsv(PathBuf),
    #[error("could not locate the program directory from {0}")]
    NoBaseDir(PathBuf),
}

impl DashboardError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
