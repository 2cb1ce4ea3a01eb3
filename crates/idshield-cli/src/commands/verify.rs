use anyhow::{Context, Result};
use idshield_config::Config;
use idshield_core::{ExemptionCodeLookup, RedactionFileChanges, RedactionItem, TimeInterval};
use std::path::Path;
use tracing::warn;

use super::{load_file, load_registry};

pub fn handle(
    config: &Config,
    voa: &Path,
    source: Option<String>,
    changes_path: &Path,
    elapsed: f64,
) -> Result<()> {
    let json = std::fs::read_to_string(changes_path)
        .with_context(|| format!("Failed to read {}", changes_path.display()))?;
    let mut changes = RedactionFileChanges::from_json(&json)
        .with_context(|| format!("Failed to parse {}", changes_path.display()))?;

    // Unknown codes become free text
    if let Some(registry) = load_registry(config) {
        for item in changes.added.iter_mut().chain(changes.modified.iter_mut()) {
            normalize_exemptions(item, &registry);
        }
    }

    let mut file = load_file(config, voa, source)?;
    let summary = file.save_session(
        &changes,
        TimeInterval::ending_now(elapsed)?,
        &config.verification,
        &config.operator(),
    )?;

    println!("✓ Saved session {} to {}", summary.session_id, voa.display());
    println!("  Added: {:?}", summary.added);
    println!("  Deleted: {:?}", summary.deleted);
    println!("  Modified: {:?}", summary.modified);
    println!("  Output items: {}", summary.output_items);
    println!("  Turned off: {}", summary.turned_off);

    for warning in file.pending_warnings(&config.verification, None) {
        warn!(
            id = warning.id.unwrap_or(-1),
            level = %warning.level,
            kind = ?warning.kind,
            "{}",
            warning.text
        );
    }

    Ok(())
}

fn normalize_exemptions(item: &mut RedactionItem, registry: &dyn ExemptionCodeLookup) {
    let exemptions = item.exemptions(Some(registry));
    item.set_exemptions(&exemptions);
}
