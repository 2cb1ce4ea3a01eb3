use anyhow::Context;
use idshield_core::{ConfidenceLevel, ConfidenceLevels, Operator, VerificationOptions};
use idshield_redact::TextRedactionOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for idshield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory of exemption category files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemptions_dir: Option<PathBuf>,

    #[serde(default = "default_levels")]
    pub levels: Vec<LevelConfig>,

    #[serde(default)]
    pub text_redaction: TextRedactionOptions,

    #[serde(default)]
    pub verification: VerificationOptions,

    #[serde(default)]
    pub session: SessionConfig,
}

/// One confidence level, in precedence order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub short_name: String,
    pub query: String,

    #[serde(default = "default_color")]
    pub display_color: String,

    #[serde(default = "default_true")]
    pub include_in_output: bool,

    #[serde(default)]
    pub warn_if_redacted: bool,

    #[serde(default)]
    pub warn_if_not_redacted: bool,
}

/// Operator overrides recorded with each session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exemptions_dir: None,
            levels: default_levels(),
            text_redaction: TextRedactionOptions::default(),
            verification: VerificationOptions::default(),
            session: SessionConfig::default(),
        }
    }
}

fn default_color() -> String {
    "#FF0000".to_string()
}

fn default_true() -> bool {
    true
}

fn default_levels() -> Vec<LevelConfig> {
    let level = |short_name: &str, query: &str, color: &str, output: bool| LevelConfig {
        short_name: short_name.to_string(),
        query: query.to_string(),
        display_color: color.to_string(),
        include_in_output: output,
        warn_if_redacted: false,
        warn_if_not_redacted: false,
    };

    vec![
        LevelConfig {
            warn_if_not_redacted: true,
            ..level("HC", "HCData", "#FF0000", true)
        },
        LevelConfig {
            warn_if_not_redacted: true,
            ..level("MC", "MCData", "#FF8000", true)
        },
        level("LC", "LCData", "#FFFF00", true),
        LevelConfig {
            warn_if_redacted: true,
            ..level("Clues", "Clues", "#8080FF", false)
        },
        level("Man", "Manual", "#00C000", true),
    ]
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "idshield", "idshield") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.idshield/config.toml")
        }
    }

    /// Configured levels with their queries parsed
    pub fn confidence_levels(&self) -> anyhow::Result<ConfidenceLevels> {
        let levels = self
            .levels
            .iter()
            .map(|l| {
                ConfidenceLevel::new(&l.short_name, &l.query, &l.display_color, l.include_in_output)
                    .map(|level| level.with_warnings(l.warn_if_redacted, l.warn_if_not_redacted))
                    .with_context(|| format!("Invalid query for level '{}'", l.short_name))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(ConfidenceLevels::new(levels))
    }

    /// Operator from the environment with configured overrides applied
    pub fn operator(&self) -> Operator {
        let mut operator = Operator::from_env();
        if let Some(user) = &self.session.operator {
            operator.user = user.clone();
        }
        if let Some(machine) = &self.session.machine {
            operator.machine = machine.clone();
        }
        operator
    }
}
