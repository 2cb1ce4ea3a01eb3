use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    #[error("Invalid {field} metadata on '{attribute}': {value}")]
    InvalidMetadata {
        attribute: String,
        field: &'static str,
        value: String,
    },

    #[error("Exemption code '{code}' is not defined for category '{category}'")]
    InvalidExemptionCode { category: String, code: String },

    #[error("Invalid elapsed time: {seconds} seconds")]
    InvalidDuration { seconds: f64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
