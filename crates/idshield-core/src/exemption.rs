//! Exemption codes attached to a redaction

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Attribute, Error, Result};

/// Name of the metadata sub-attribute holding an item's exemption codes
pub const EXEMPTION_CODES_NAME: &str = "_ExemptionCodes";

/// Master list of valid codes, keyed by category
pub trait ExemptionCodeLookup {
    fn has_code(&self, category: &str, code: &str) -> bool;
}

/// Category, codes and free text justifying a redaction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExemptionCodeList {
    category: String,
    codes: BTreeSet<String>,
    #[serde(default)]
    other_text: String,
}

impl ExemptionCodeList {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codes.extend(codes.into_iter().map(Into::into));
        self
    }

    pub fn with_other_text(mut self, text: impl Into<String>) -> Self {
        self.other_text = text.into();
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn other_text(&self) -> &str {
        &self.other_text
    }

    pub fn has_codes(&self) -> bool {
        !self.codes.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty() && self.other_text.is_empty()
    }

    pub fn add_code(&mut self, code: impl Into<String>) {
        self.codes.insert(code.into());
    }

    /// Append to the free text, comma separated
    pub fn push_other_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.other_text.is_empty() {
            self.other_text.push_str(", ");
        }
        self.other_text.push_str(text);
    }

    /// Strict check of every code against the master list
    pub fn validate(&self, lookup: &dyn ExemptionCodeLookup) -> Result<()> {
        match self.codes.iter().find(|c| !lookup.has_code(&self.category, c)) {
            Some(code) => Err(Error::InvalidExemptionCode {
                category: self.category.clone(),
                code: code.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Rebuild a list from its stored text form.
    ///
    /// With a master list, tokens that are not valid codes for the category
    /// are kept as free text instead of failing the parse. Without one, every
    /// token is taken as a code.
    pub fn parse_stored(
        category: &str,
        value: &str,
        lookup: Option<&dyn ExemptionCodeLookup>,
    ) -> Self {
        let mut list = Self::new(category);
        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match lookup {
                Some(lookup) if !lookup.has_code(category, token) => {
                    let err = Error::InvalidExemptionCode {
                        category: category.to_string(),
                        code: token.to_string(),
                    };
                    warn!("{}; keeping it as free text", err);
                    list.push_other_text(token);
                }
                _ => list.add_code(token),
            }
        }
        list
    }

    pub fn to_attribute(&self) -> Attribute {
        Attribute::new(EXEMPTION_CODES_NAME, self.to_string())
            .with_type(self.category.replace(' ', "_"))
    }

    /// The stored type carries the category with spaces written as `_`, so
    /// the decoded category always uses spaces. Lookups are expected to treat
    /// `_` and space as the same character.
    pub fn from_attribute(
        attribute: &Attribute,
        lookup: Option<&dyn ExemptionCodeLookup>,
    ) -> Self {
        let category = attribute.attribute_type.replace('_', " ");
        Self::parse_stored(&category, attribute.text(), lookup)
    }
}

impl PartialEq for ExemptionCodeList {
    fn eq(&self, other: &Self) -> bool {
        // Lists without codes ignore the category
        if self.codes.is_empty() && other.codes.is_empty() {
            return self.other_text == other.other_text;
        }
        self.category == other.category
            && self.codes == other.codes
            && self.other_text == other.other_text
    }
}

impl Eq for ExemptionCodeList {}

impl fmt::Display for ExemptionCodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = self.codes.iter().map(String::as_str).collect();
        if !self.other_text.is_empty() {
            parts.push(&self.other_text);
        }
        f.write_str(&parts.join(", "))
    }
}
