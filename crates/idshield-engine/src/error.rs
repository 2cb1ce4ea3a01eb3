use std::path::PathBuf;

use idshield_core::Error as CoreError;
use idshield_redact::RenderError;
use idshield_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{path}: schema version {version} is newer than the supported version {max}")]
    UnsupportedSchema {
        path: PathBuf,
        version: u32,
        max: u32,
    },

    #[error("{path}: file belongs to product '{product}'")]
    WrongProduct { path: PathBuf, product: String },

    #[error("{path}: no item with identity {id} exists in the working set")]
    MissingOriginal { path: PathBuf, id: i64 },

    #[error("Items were added but no manual confidence level is configured")]
    NoManualLevel,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
