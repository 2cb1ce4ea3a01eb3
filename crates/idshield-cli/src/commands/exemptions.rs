use anyhow::{Context, Result, bail};
use idshield_config::Config;
use idshield_exemptions::ExemptionRegistry;
use std::path::PathBuf;

pub fn handle(config: &Config, dir: Option<PathBuf>, category: Option<String>) -> Result<()> {
    let Some(dir) = dir.or_else(|| config.exemptions_dir.clone()) else {
        bail!("No exemption directory given and none configured (exemptions_dir)");
    };
    let registry = ExemptionRegistry::load_dir(&dir)
        .with_context(|| format!("Failed to load exemption codes from {}", dir.display()))?;

    let categories: Vec<_> = match &category {
        Some(name) => match registry.category(name) {
            Some(c) => vec![c],
            None => bail!("Unknown exemption category: {}", name),
        },
        None => registry.categories().collect(),
    };

    if categories.is_empty() {
        println!("No exemption categories.");
        return Ok(());
    }

    for category in categories {
        println!("{} ({})", category.name, category.abbreviation);
        for code in &category.codes {
            println!("  {:<8} {}", code.name, code.summary);
        }
    }

    Ok(())
}
