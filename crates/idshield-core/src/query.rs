//! Attribute selection queries
//!
//! Grammar: levels separated by `/`, each level a `|`-separated list of
//! alternatives written as `Name` or `Name@Type`. `*` matches any name or type.
//! Names compare case-insensitively, types exactly.
//!
//! `HCData|MCData` selects top-level high and medium confidence data,
//! `Clues@SSN` selects clues of type SSN, and
//! `_VerificationSession/_EntriesAdded/_ID` walks into session records.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{Attribute, Error, Result};

lazy_static! {
    static ref ALTERNATIVE: Regex =
        Regex::new(r"^(?P<name>\*|[^/|@\s]+)(?:@(?P<type>\*|[^/|@]+))?$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Matcher {
    name: Option<String>,
    attribute_type: Option<String>,
}

impl Matcher {
    fn matches(&self, attribute: &Attribute) -> bool {
        let name_ok = self
            .name
            .as_ref()
            .is_none_or(|n| n.eq_ignore_ascii_case(&attribute.name));
        let type_ok = self
            .attribute_type
            .as_ref()
            .is_none_or(|t| *t == attribute.attribute_type);
        name_ok && type_ok
    }
}

/// Parsed selection query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeQuery {
    source: String,
    levels: Vec<Vec<Matcher>>,
}

impl AttributeQuery {
    pub fn parse(query: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidQuery {
            query: query.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(invalid("query is empty"));
        }

        let mut levels = Vec::new();
        for level in trimmed.split('/') {
            let mut alternatives = Vec::new();
            for alternative in level.split('|') {
                let alternative = alternative.trim();
                let caps = ALTERNATIVE
                    .captures(alternative)
                    .ok_or_else(|| invalid(&format!("malformed term '{}'", alternative)))?;

                let wildcard = |s: &str| (s != "*").then(|| s.to_string());
                alternatives.push(Matcher {
                    name: wildcard(&caps["name"]),
                    attribute_type: caps.name("type").and_then(|t| wildcard(t.as_str())),
                });
            }
            levels.push(alternatives);
        }

        Ok(Self {
            source: trimmed.to_string(),
            levels,
        })
    }

    /// Query selecting top-level attributes with exactly this name
    pub(crate) fn single(name: &str) -> Self {
        Self {
            source: name.to_string(),
            levels: vec![vec![Matcher {
                name: Some(name.to_string()),
                attribute_type: None,
            }]],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of `/`-separated levels
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Whether a top-level attribute is selected by a single-level query
    pub fn matches(&self, attribute: &Attribute) -> bool {
        self.levels.len() == 1 && self.levels[0].iter().any(|m| m.matches(attribute))
    }

    /// Every attribute reached by walking the query levels down from `nodes`
    pub fn select<'a>(&self, nodes: &'a [Attribute]) -> Vec<&'a Attribute> {
        let mut current: Vec<&'a Attribute> = Vec::new();
        for (depth, level) in self.levels.iter().enumerate() {
            let candidates: Vec<&'a Attribute> = if depth == 0 {
                nodes.iter().collect()
            } else {
                current.iter().flat_map(|a| a.sub_attributes.iter()).collect()
            };
            current = candidates
                .into_iter()
                .filter(|a| level.iter().any(|m| m.matches(a)))
                .collect();
        }
        current
    }
}

impl FromStr for AttributeQuery {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AttributeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
