//! Error types for idshield-exemptions

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExemptionError>;

#[derive(Error, Debug)]
pub enum ExemptionError {
    #[error("Exemption code directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid category definition {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid directory pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Exemption category '{0}' is defined more than once")]
    DuplicateCategory(String),

    #[error("Unknown exemption category: {0}")]
    UnknownCategory(String),
}
