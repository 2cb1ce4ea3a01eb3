use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Character index {index} is not present in the text being redacted")]
    MissingIndex { index: usize },

    #[error("Invalid redaction zone: start {start} is after end {end}")]
    InvalidZone { start: usize, end: usize },
}

pub type Result<T> = std::result::Result<T, RenderError>;
