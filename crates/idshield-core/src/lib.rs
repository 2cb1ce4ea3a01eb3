//! Core domain models for ID Shield redaction data
//!
//! This crate contains:
//! - The attribute tree node model and its selection query language
//! - Confidence levels and classification
//! - Redaction items with stable identities, revisions and exemption codes
//! - Verification session inputs and records

pub mod attribute;
pub mod changes;
pub mod confidence;
pub mod error;
pub mod exemption;
pub mod item;
pub mod query;
pub mod session;

pub use attribute::{Attribute, RasterZone, SpatialInfo, SpatialString};
pub use changes::{Operator, RedactionFileChanges, TimeInterval, VerificationOptions};
pub use confidence::{Classification, ConfidenceLevel, ConfidenceLevels, MANUAL_SHORT_NAME};
pub use error::{Error, Result};
pub use exemption::{ExemptionCodeList, ExemptionCodeLookup};
pub use item::{RedactionItem, SensitiveItem};
pub use query::AttributeQuery;
pub use session::VerificationSession;
