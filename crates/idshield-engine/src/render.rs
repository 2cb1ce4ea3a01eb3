//! Text output for a redaction file

use idshield_core::SpatialInfo;
use idshield_redact::{RedactionZone, TextRedactionOptions, TextRedactor, ZoneSet};
use rand::Rng;
use tracing::debug;

use crate::{RedactionFile, Result};

impl RedactionFile {
    /// Merged character spans of every redacted item positioned in text
    pub fn text_zones(&self) -> Result<ZoneSet> {
        let mut zones = ZoneSet::new();
        for sensitive in self.items().iter().filter(|s| s.item.is_redacted()) {
            if let Some(SpatialInfo::Text { start, end }) = &sensitive.item.attribute().value.spatial
            {
                zones.merge(RedactionZone::new(*start, *end)?);
            }
        }
        debug!(zones = zones.len(), "collected text zones");
        Ok(zones)
    }

    /// Redact `original` with a caller supplied redactor
    pub fn render_with<R: Rng>(
        &self,
        original: &str,
        redactor: &mut TextRedactor<R>,
    ) -> Result<String> {
        let zones = self.text_zones()?;
        Ok(redactor.redact_merged(original, &zones)?)
    }
}

/// Redact the source text of `file` in the given style
pub fn render_redacted_text(
    original: &str,
    file: &RedactionFile,
    options: &TextRedactionOptions,
) -> Result<String> {
    let mut redactor = TextRedactor::new(options.clone());
    file.render_with(original, &mut redactor)
}
