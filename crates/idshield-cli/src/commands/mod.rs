pub mod config;
pub mod exemptions;
pub mod render;
pub mod show;
pub mod verify;

use anyhow::{Context, Result};
use idshield_config::Config;
use idshield_engine::RedactionFile;
use idshield_exemptions::ExemptionRegistry;
use std::path::Path;
use tracing::warn;

/// Source document name for a redaction file: `deed.tif.voa` -> `deed.tif`
pub fn source_name(voa: &Path) -> String {
    let name = voa
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(".voa").map(str::to_string).unwrap_or(name)
}

pub fn load_file(config: &Config, voa: &Path, source: Option<String>) -> Result<RedactionFile> {
    let levels = config.confidence_levels()?;
    let source = source.unwrap_or_else(|| source_name(voa));
    RedactionFile::load(voa, source, levels)
        .with_context(|| format!("Failed to load {}", voa.display()))
}

/// Registry from the configured directory, if any
pub fn load_registry(config: &Config) -> Option<ExemptionRegistry> {
    let dir = config.exemptions_dir.as_ref()?;
    match ExemptionRegistry::load_dir(dir) {
        Ok(registry) => Some(registry),
        Err(e) => {
            warn!("Exemption codes unavailable: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name() {
        assert_eq!(source_name(Path::new("/scans/deed.tif.voa")), "deed.tif");
        assert_eq!(source_name(Path::new("notes.txt")), "notes.txt");
    }
}
