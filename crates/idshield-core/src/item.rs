//! Sensitive item model
//!
//! A [`RedactionItem`] wraps one top-level attribute and keeps its identity,
//! revision and exemption codes in reserved sub-attributes, so the attribute
//! itself is always the persisted form of the item.

use serde::{Deserialize, Serialize};

use crate::{
    Attribute, ConfidenceLevel, Error, ExemptionCodeList, ExemptionCodeLookup, Result,
    exemption::EXEMPTION_CODES_NAME,
};

/// Sub-attribute holding the identity (value) and revision (type `_<n>`)
pub const ID_AND_REVISION_NAME: &str = "_IDAndRevision";
/// Sub-attribute marking an archived item as turned off
pub const ARCHIVE_ACTION_NAME: &str = "ArchiveAction";
/// Value of the archive marker for items that were not output
pub const TURNED_OFF_ACTION: &str = "TurnedOff";

/// One clue or redaction plus its redaction state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionItem {
    attribute: Attribute,
    #[serde(default = "default_redacted")]
    redacted: bool,
}

fn default_redacted() -> bool {
    true
}

impl RedactionItem {
    pub fn new(attribute: Attribute, redacted: bool) -> Self {
        Self {
            attribute,
            redacted,
        }
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn into_attribute(self) -> Attribute {
        self.attribute
    }

    /// Attribute name, e.g. `HCData` or `Manual`
    pub fn category(&self) -> &str {
        &self.attribute.name
    }

    pub fn item_type(&self) -> &str {
        &self.attribute.attribute_type
    }

    pub fn text(&self) -> &str {
        self.attribute.text()
    }

    pub fn is_redacted(&self) -> bool {
        self.redacted
    }

    pub fn set_redacted(&mut self, redacted: bool) {
        self.redacted = redacted;
    }

    /// Stable identity; `None` when unassigned (absent or `-1`)
    pub fn id(&self) -> Result<Option<i64>> {
        let Some(meta) = self.attribute.child(ID_AND_REVISION_NAME) else {
            return Ok(None);
        };
        let text = meta.text().trim();
        if text.is_empty() {
            return Ok(None);
        }
        let id: i64 = text.parse().map_err(|_| self.invalid("identity", text))?;
        Ok((id >= 0).then_some(id))
    }

    /// Identity, treating malformed metadata as unassigned
    pub fn id_or_none(&self) -> Option<i64> {
        self.id().ok().flatten()
    }

    /// Revision; `None` when the item has never been modified
    pub fn revision(&self) -> Result<Option<i32>> {
        let Some(meta) = self.attribute.child(ID_AND_REVISION_NAME) else {
            return Ok(None);
        };
        let Some(rev) = meta.attribute_type.strip_prefix('_') else {
            if meta.attribute_type.is_empty() {
                return Ok(None);
            }
            return Err(self.invalid("revision", &meta.attribute_type));
        };
        rev.parse()
            .map(Some)
            .map_err(|_| self.invalid("revision", &meta.attribute_type))
    }

    /// Assign the identity, keeping any existing revision
    pub fn set_id(&mut self, id: i64) {
        match self.attribute.child_mut(ID_AND_REVISION_NAME) {
            Some(meta) => meta.value = id.to_string().into(),
            None => self
                .attribute
                .push(Attribute::new(ID_AND_REVISION_NAME, id.to_string())),
        }
    }

    pub fn set_revision(&mut self, revision: i32) {
        let rev_type = format!("_{}", revision);
        match self.attribute.child_mut(ID_AND_REVISION_NAME) {
            Some(meta) => meta.attribute_type = rev_type,
            None => self.attribute.push(
                Attribute::new(ID_AND_REVISION_NAME, "-1").with_type(rev_type),
            ),
        }
    }

    /// Bump the revision; an absent revision counts as 0
    pub fn increment_revision(&mut self) -> Result<i32> {
        let next = self.revision()?.unwrap_or(0) + 1;
        self.set_revision(next);
        Ok(next)
    }

    pub fn exemptions(&self, lookup: Option<&dyn ExemptionCodeLookup>) -> ExemptionCodeList {
        self.attribute
            .child(EXEMPTION_CODES_NAME)
            .map(|a| ExemptionCodeList::from_attribute(a, lookup))
            .unwrap_or_default()
    }

    /// Store exemption codes; an empty list removes the metadata
    pub fn set_exemptions(&mut self, exemptions: &ExemptionCodeList) {
        if exemptions.is_empty() {
            self.attribute.remove_children(EXEMPTION_CODES_NAME);
        } else {
            self.attribute.set_child(exemptions.to_attribute());
        }
    }

    pub fn is_turned_off(&self) -> bool {
        self.attribute
            .children(ARCHIVE_ACTION_NAME)
            .any(|a| a.text() == TURNED_OFF_ACTION)
    }

    pub fn mark_turned_off(&mut self) {
        self.attribute
            .set_child(Attribute::new(ARCHIVE_ACTION_NAME, TURNED_OFF_ACTION));
    }

    pub fn clear_archive_action(&mut self) {
        self.attribute.remove_children(ARCHIVE_ACTION_NAME);
    }

    fn invalid(&self, field: &'static str, value: &str) -> Error {
        Error::InvalidMetadata {
            attribute: self.attribute.name.clone(),
            field,
            value: value.to_string(),
        }
    }
}

/// A redaction item together with the confidence level that selected it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveItem {
    pub level: ConfidenceLevel,
    pub item: RedactionItem,
}

impl SensitiveItem {
    pub fn new(level: ConfidenceLevel, item: RedactionItem) -> Self {
        Self { level, item }
    }

    pub fn id(&self) -> Option<i64> {
        self.item.id_or_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ssn() -> RedactionItem {
        RedactionItem::new(
            Attribute::new("HCData", "123-45-6789").with_type("SSN"),
            true,
        )
    }

    #[test]
    fn test_unassigned_identity() {
        let mut item = ssn();
        assert_eq!(item.id().unwrap(), None);
        assert_eq!(item.revision().unwrap(), None);

        item.set_id(-1);
        assert_eq!(item.id().unwrap(), None);
    }

    #[test]
    fn test_identity_and_revision_share_metadata() {
        let mut item = ssn();
        item.set_id(12);
        assert_eq!(item.increment_revision().unwrap(), 1);
        assert_eq!(item.increment_revision().unwrap(), 2);

        let meta = item.attribute().child(ID_AND_REVISION_NAME).unwrap();
        assert_eq!(meta.text(), "12");
        assert_eq!(meta.attribute_type, "_2");
        assert_eq!(item.id().unwrap(), Some(12));
        assert_eq!(item.attribute().sub_attributes.len(), 1);
    }

    #[test]
    fn test_malformed_identity() {
        let item = RedactionItem::new(
            Attribute::new("HCData", "x").with_child(Attribute::new(ID_AND_REVISION_NAME, "abc")),
            true,
        );
        assert!(matches!(
            item.id(),
            Err(Error::InvalidMetadata { field: "identity", .. })
        ));
        assert_eq!(item.id_or_none(), None);
    }

    #[test]
    fn test_archive_marker() {
        let mut item = ssn();
        assert!(!item.is_turned_off());

        item.mark_turned_off();
        item.mark_turned_off();
        assert!(item.is_turned_off());
        assert_eq!(item.attribute().children(ARCHIVE_ACTION_NAME).count(), 1);

        item.clear_archive_action();
        assert!(!item.is_turned_off());
    }

    #[test]
    fn test_exemptions_round_trip() {
        let mut item = ssn();
        let codes = ExemptionCodeList::new("FOIA Exemptions").with_codes(["b6"]);

        item.set_exemptions(&codes);
        assert_eq!(item.exemptions(None), codes);

        item.set_exemptions(&ExemptionCodeList::default());
        assert!(item.attribute().child(EXEMPTION_CODES_NAME).is_none());
    }

    #[test]
    fn test_deserialize_defaults_to_redacted() {
        let item: RedactionItem =
            serde_json::from_str(r#"{"attribute": {"name": "Manual", "value": {"text": "Jones"}}}"#)
                .unwrap();
        assert!(item.is_redacted());
    }
}
