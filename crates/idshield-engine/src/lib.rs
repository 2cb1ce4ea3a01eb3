//! Session reconciliation for ID Shield redaction files
//!
//! This crate contains:
//! - Loading a redaction file into a classified working set
//! - Applying a verification session and writing the new snapshot
//! - Pre-save warnings
//! - Text rendering of the redacted items

pub mod error;
pub mod file_info;
pub mod redaction_file;
pub mod render;
pub mod warnings;

pub use error::{EngineError, Result};
pub use file_info::{PRODUCT_NAME, SCHEMA_VERSION};
pub use redaction_file::{RedactionFile, SessionSummary};
pub use render::render_redacted_text;
pub use warnings::{ItemWarning, WarningKind};
