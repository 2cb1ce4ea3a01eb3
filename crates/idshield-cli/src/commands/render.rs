use anyhow::{Context, Result};
use idshield_config::Config;
use idshield_redact::TextRedactor;
use std::path::Path;

use super::load_file;

pub fn handle(
    config: &Config,
    voa: &Path,
    input: &Path,
    output: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let original = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let file = load_file(config, voa, None)?;

    let options = config.text_redaction.clone();
    let mut redactor = match seed {
        Some(seed) => TextRedactor::seeded(options, seed),
        None => TextRedactor::new(options),
    };
    let redacted = file
        .render_with(&original, &mut redactor)
        .with_context(|| format!("Failed to redact {}", input.display()))?;

    match output {
        Some(path) => {
            std::fs::write(path, &redacted)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote {}", path.display());
        }
        None => print!("{}", redacted),
    }

    Ok(())
}
