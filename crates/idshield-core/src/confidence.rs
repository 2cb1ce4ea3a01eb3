//! Confidence levels and classification of snapshot attributes

use tracing::debug;

use crate::{Attribute, AttributeQuery, Error, Result};

/// Short name of the level that receives items added during verification
pub const MANUAL_SHORT_NAME: &str = "Man";

/// A named bucket of sensitive data with its selection query and display policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfidenceLevel {
    short_name: String,
    query: AttributeQuery,
    display_color: String,
    include_in_output: bool,
    warn_if_redacted: bool,
    warn_if_not_redacted: bool,
}

impl ConfidenceLevel {
    pub fn new(
        short_name: impl Into<String>,
        query: &str,
        display_color: impl Into<String>,
        include_in_output: bool,
    ) -> Result<Self> {
        let parsed = AttributeQuery::parse(query)?;
        if parsed.depth() > 1 {
            return Err(Error::InvalidQuery {
                query: query.to_string(),
                reason: "confidence levels select top-level attributes only".to_string(),
            });
        }
        Ok(Self {
            short_name: short_name.into(),
            query: parsed,
            display_color: display_color.into(),
            include_in_output,
            warn_if_redacted: false,
            warn_if_not_redacted: false,
        })
    }

    pub fn with_warnings(mut self, warn_if_redacted: bool, warn_if_not_redacted: bool) -> Self {
        self.warn_if_redacted = warn_if_redacted;
        self.warn_if_not_redacted = warn_if_not_redacted;
        self
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    pub fn display_color(&self) -> &str {
        &self.display_color
    }

    pub fn include_in_output(&self) -> bool {
        self.include_in_output
    }

    pub fn warn_if_redacted(&self) -> bool {
        self.warn_if_redacted
    }

    pub fn warn_if_not_redacted(&self) -> bool {
        self.warn_if_not_redacted
    }

    pub fn is_manual(&self) -> bool {
        self.short_name == MANUAL_SHORT_NAME
    }

    /// Whether this level's query selects the given top-level attribute
    pub fn selects(&self, attribute: &Attribute) -> bool {
        self.query.matches(attribute)
    }
}

/// Ordered collection of confidence levels; order is classification precedence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfidenceLevels {
    levels: Vec<ConfidenceLevel>,
}

impl ConfidenceLevels {
    pub fn new(levels: Vec<ConfidenceLevel>) -> Self {
        Self { levels }
    }

    /// High, medium and low confidence data, clues and manual redactions
    pub fn standard() -> Self {
        let level = |name: &str, query: &str, color: &str, output: bool| ConfidenceLevel {
            short_name: name.to_string(),
            query: AttributeQuery::single(query),
            display_color: color.to_string(),
            include_in_output: output,
            warn_if_redacted: false,
            warn_if_not_redacted: false,
        };

        Self {
            levels: vec![
                level("HC", "HCData", "#FF0000", true).with_warnings(false, true),
                level("MC", "MCData", "#FF8000", true).with_warnings(false, true),
                level("LC", "LCData", "#FFFF00", true),
                level("Clues", "Clues", "#8080FF", false).with_warnings(true, false),
                level(MANUAL_SHORT_NAME, "Manual", "#00C000", true),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfidenceLevel> {
        self.levels.iter()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, short_name: &str) -> Option<&ConfidenceLevel> {
        self.levels.iter().find(|l| l.short_name == short_name)
    }

    /// The distinguished manual level, if configured
    pub fn manual(&self) -> Option<&ConfidenceLevel> {
        self.levels.iter().find(|l| l.is_manual())
    }

    /// First level, in precedence order, whose query selects the attribute
    pub fn resolve(&self, attribute: &Attribute) -> Option<&ConfidenceLevel> {
        self.levels.iter().find(|l| l.selects(attribute))
    }

    /// Bucket attributes by level. Each attribute lands in at most one bucket,
    /// the first level that selects it; unselected attributes are returned
    /// separately in their original order.
    pub fn classify(&self, attributes: Vec<Attribute>) -> Classification {
        let mut buckets: Vec<Vec<Attribute>> = vec![Vec::new(); self.levels.len()];
        let mut unclassified = Vec::new();

        for attribute in attributes {
            match self.levels.iter().position(|l| l.selects(&attribute)) {
                Some(index) => buckets[index].push(attribute),
                None => unclassified.push(attribute),
            }
        }

        for (level, bucket) in self.levels.iter().zip(&buckets) {
            debug!(level = level.short_name(), count = bucket.len(), "classified attributes");
        }

        Classification {
            buckets: self.levels.iter().cloned().zip(buckets).collect(),
            unclassified,
        }
    }
}

impl<'a> IntoIterator for &'a ConfidenceLevels {
    type Item = &'a ConfidenceLevel;
    type IntoIter = std::slice::Iter<'a, ConfidenceLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.iter()
    }
}

/// Result of [`ConfidenceLevels::classify`]
#[derive(Debug, Clone)]
pub struct Classification {
    pub buckets: Vec<(ConfidenceLevel, Vec<Attribute>)>,
    pub unclassified: Vec<Attribute>,
}
