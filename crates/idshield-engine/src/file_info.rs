//! Product and schema version header of a redaction file

use std::path::Path;

use idshield_core::Attribute;
use tracing::warn;

use crate::{EngineError, Result};

pub const FILE_INFO_NAME: &str = "_VOAFileInfo";
pub const PRODUCT_NAME: &str = "IDShield";
/// Newest schema version this build can read and the one it writes
pub const SCHEMA_VERSION: u32 = 2;

/// Header written by this build
pub fn current() -> Attribute {
    Attribute::new(FILE_INFO_NAME, PRODUCT_NAME).with_type(SCHEMA_VERSION.to_string())
}

pub fn is_file_info(attribute: &Attribute) -> bool {
    attribute.name.eq_ignore_ascii_case(FILE_INFO_NAME)
}

/// Check a stored header; files without one are treated as current
pub fn check(path: &Path, header: Option<&Attribute>) -> Result<Attribute> {
    let Some(header) = header else {
        warn!(path = %path.display(), "no file info, assuming current schema");
        return Ok(current());
    };

    let product = header.text().trim();
    if product != PRODUCT_NAME {
        return Err(EngineError::WrongProduct {
            path: path.to_path_buf(),
            product: product.to_string(),
        });
    }

    // Files written before versioning carry no type
    let version_text = header.attribute_type.trim();
    let version = if version_text.is_empty() {
        1
    } else {
        version_text
            .parse::<u32>()
            .map_err(|_| idshield_core::Error::InvalidMetadata {
                attribute: FILE_INFO_NAME.to_string(),
                field: "schema version",
                value: version_text.to_string(),
            })?
    };

    if version > SCHEMA_VERSION {
        return Err(EngineError::UnsupportedSchema {
            path: path.to_path_buf(),
            version,
            max: SCHEMA_VERSION,
        });
    }
    Ok(current())
}
