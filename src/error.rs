use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the data-access layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("data file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("save rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures while reading or applying `config.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid colour '{value}' for '{token}'")]
    Color { token: String, value: String },

    #[error("unknown theme '{0}'")]
    Theme(String),

    #[error("unknown start action '{0}'")]
    Action(String),
}

/// Top-level failures reported by `main`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("{0}")]
    Usage(String),
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => 2,
            AppError::Config(_) => 3,
            AppError::Store(_) => 4,
            AppError::Terminal(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
