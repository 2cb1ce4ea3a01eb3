use anyhow::Result;
use idshield_config::Config;
use idshield_core::{ExemptionCodeLookup, SpatialInfo};
use std::path::Path;

use super::{load_file, load_registry};

pub fn handle(config: &Config, voa: &Path, all: bool) -> Result<()> {
    let file = load_file(config, voa, None)?;
    let registry = load_registry(config);
    let lookup = registry.as_ref().map(|r| r as &dyn ExemptionCodeLookup);

    println!("File: {}", file.path().display());
    println!("  Source: {}", file.source_doc_name());
    println!("  Sessions: {}", file.session_counter());
    println!("  Next ID: {}", file.next_id());

    if file.items().is_empty() {
        println!("\nNo items.");
    } else {
        println!("\nItems ({}):", file.items().len());
        for sensitive in file.items() {
            let item = &sensitive.item;
            let state = if item.is_redacted() { "redacted" } else { "off" };
            let position = match &item.attribute().value.spatial {
                Some(SpatialInfo::Text { start, end }) => format!("chars {}-{}", start, end),
                Some(SpatialInfo::Raster { page, zones }) => {
                    format!("page {} ({} zones)", page, zones.len())
                }
                None => "no position".to_string(),
            };
            println!(
                "  [{}] {:<5} {:?} {} ({}, {})",
                sensitive.id().unwrap_or(-1),
                sensitive.level.short_name(),
                item.text(),
                item.item_type(),
                state,
                position
            );
            if let Some(revision) = item.revision()? {
                println!("    Revision: {}", revision);
            }
            let exemptions = item.exemptions(lookup);
            if !exemptions.is_empty() {
                println!("    Exemptions: {} ({})", exemptions, exemptions.category());
            }
        }
    }

    let warnings = file.pending_warnings(&config.verification, lookup);
    if !warnings.is_empty() {
        println!("\nWarnings ({}):", warnings.len());
        for warning in warnings {
            println!(
                "  [{}] {} {:?}: {:?}",
                warning.id.unwrap_or(-1),
                warning.level,
                warning.text,
                warning.kind
            );
        }
    }

    if all {
        println!("\nUnclassified ({}):", file.unclassified().len());
        for attribute in file.unclassified() {
            println!("  {} = {:?}", attribute.name, attribute.text());
        }
        println!("\nArchived ({}):", file.old_revisions().len());
        for attribute in file.old_revisions() {
            println!("  {} = {:?}", attribute.name, attribute.text());
        }
    }

    Ok(())
}
