//! Inputs describing one verification pass

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, RedactionItem, Result};

/// Items added, deleted and modified during one verification session.
///
/// Deleted and modified entries are matched to the working set by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionFileChanges {
    #[serde(default)]
    pub added: Vec<RedactionItem>,
    #[serde(default)]
    pub deleted: Vec<RedactionItem>,
    #[serde(default)]
    pub modified: Vec<RedactionItem>,
}

impl RedactionFileChanges {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }
}

/// When a session started and how long it lasted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    pub elapsed_seconds: f64,
}

impl TimeInterval {
    pub fn new(start: OffsetDateTime, elapsed_seconds: f64) -> Self {
        Self {
            start,
            elapsed_seconds,
        }
    }

    /// Interval ending now that started `elapsed_seconds` ago. The elapsed
    /// time must be finite, non-negative and start within the supported date range.
    pub fn ending_now(elapsed_seconds: f64) -> Result<Self> {
        let invalid = || Error::InvalidDuration {
            seconds: elapsed_seconds,
        };
        if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
            return Err(invalid());
        }
        let elapsed = time::Duration::checked_seconds_f64(elapsed_seconds).ok_or_else(invalid)?;
        let start = OffsetDateTime::now_utc()
            .checked_sub(elapsed)
            .ok_or_else(invalid)?;
        Ok(Self::new(start, elapsed_seconds))
    }
}

/// Verification settings recorded with each session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOptions {
    #[serde(default = "default_verify_all_pages")]
    pub verify_all_pages: bool,
    #[serde(default)]
    pub require_exemption_codes: bool,
    #[serde(default)]
    pub verify_full_page_clues: bool,
}

fn default_verify_all_pages() -> bool {
    true
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            verify_all_pages: true,
            require_exemption_codes: false,
            verify_full_page_clues: false,
        }
    }
}

/// Who ran the session and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub user: String,
    pub machine: String,
}

impl Operator {
    pub fn new(user: impl Into<String>, machine: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            machine: machine.into(),
        }
    }

    /// Current user and host from the environment
    pub fn from_env() -> Self {
        let var = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| std::env::var(n).ok().filter(|v| !v.is_empty()))
                .unwrap_or_else(|| "unknown".to_string())
        };
        Self::new(var(&["USER", "USERNAME"]), var(&["HOSTNAME", "COMPUTERNAME"]))
    }
}
