//! Exemption code registry
//!
//! The registry is a closed vocabulary of category -> code -> description,
//! loaded from a directory holding one TOML definition file per category.

pub mod error;
pub mod registry;

pub use error::{ExemptionError, Result};
pub use registry::{ExemptionCategory, ExemptionCode, ExemptionRegistry};
