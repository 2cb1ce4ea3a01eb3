//! Text redaction for ID Shield
//!
//! Overlapping character ranges are merged into disjoint [`RedactionZone`]s,
//! then each zone is rewritten according to a [`RedactionStyle`]. Zones are
//! expressed in character (not byte) indices of the original text.

pub mod error;
pub mod redactor;
pub mod zone;

pub use error::{RenderError, Result};
pub use redactor::{IndexRemap, RedactionStyle, TextRedactionOptions, TextRedactor};
pub use zone::{RedactionZone, ZoneSet};
