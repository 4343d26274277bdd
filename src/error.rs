use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {what} input")]
    Read {
        what: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("{what} input is missing required column `{column}`")]
    MissingColumn {
        what: &'static str,
        column: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file")]
    Parse(#[from] serde_json::Error),
    #[error("{name} must be a finite, non-negative number of kilometers, got {value}")]
    InvalidRadius { name: &'static str, value: f64 },
}
