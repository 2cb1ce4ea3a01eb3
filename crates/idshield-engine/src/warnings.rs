//! Pre-save checks on the working set

use idshield_core::{ExemptionCodeLookup, VerificationOptions};

use crate::RedactionFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Redacted although the level warns when its items are redacted
    Redacted,
    /// Not redacted although the level warns when its items are not
    NotRedacted,
    /// Redacted without any exemption code
    MissingExemptionCodes,
}

/// One item the operator should look at before saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemWarning {
    pub id: Option<i64>,
    pub level: String,
    pub text: String,
    pub kind: WarningKind,
}

impl RedactionFile {
    /// Items whose redaction state trips their level's warning flags
    pub fn level_warnings(&self) -> Vec<ItemWarning> {
        self.items()
            .iter()
            .filter_map(|s| {
                let kind = match s.item.is_redacted() {
                    true if s.level.warn_if_redacted() => WarningKind::Redacted,
                    false if s.level.warn_if_not_redacted() => WarningKind::NotRedacted,
                    _ => return None,
                };
                Some(ItemWarning {
                    id: s.id(),
                    level: s.level.short_name().to_string(),
                    text: s.item.text().to_string(),
                    kind,
                })
            })
            .collect()
    }

    /// Level warnings plus, when the options require them, redacted items
    /// that carry no exemption codes
    pub fn pending_warnings(
        &self,
        options: &VerificationOptions,
        lookup: Option<&dyn ExemptionCodeLookup>,
    ) -> Vec<ItemWarning> {
        let mut warnings = self.level_warnings();
        if options.require_exemption_codes {
            warnings.extend(
                self.items()
                    .iter()
                    .filter(|s| s.item.is_redacted() && s.item.exemptions(lookup).is_empty())
                    .map(|s| ItemWarning {
                        id: s.id(),
                        level: s.level.short_name().to_string(),
                        text: s.item.text().to_string(),
                        kind: WarningKind::MissingExemptionCodes,
                    }),
            );
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idshield_core::{
        Attribute, ConfidenceLevels, ExemptionCodeList, Operator, RedactionFileChanges,
        RedactionItem, SpatialString, TimeInterval,
    };

    fn load_with(dir: &tempfile::TempDir, attributes: Vec<Attribute>) -> RedactionFile {
        let path = dir.path().join("doc.voa");
        let mut file = RedactionFile::load(&path, "doc", ConfidenceLevels::standard()).unwrap();
        let changes = RedactionFileChanges {
            added: attributes
                .into_iter()
                .map(|a| RedactionItem::new(a, true))
                .collect(),
            ..Default::default()
        };
        file.save_session(
            &changes,
            TimeInterval::ending_now(1.0).unwrap(),
            &VerificationOptions::default(),
            &Operator::new("alice", "ws-01"),
        )
        .unwrap();
        RedactionFile::load(&path, "doc", ConfidenceLevels::standard()).unwrap()
    }

    #[test]
    fn test_level_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.voa");
        idshield_storage::AttributeStore::new()
            .save(
                &idshield_storage::AttributeTree::new(vec![
                    Attribute::new("Clues", SpatialString::text_span("SSN", 0, 2)),
                    Attribute::new("HCData", SpatialString::text_span("123", 4, 6)),
                ]),
                &path,
            )
            .unwrap();
        let mut file = RedactionFile::load(&path, "doc", ConfidenceLevels::standard()).unwrap();
        assert!(file.level_warnings().is_empty());

        // Redact the clue and un-redact the high confidence item
        let mut clue = file.items()[1].item.clone();
        clue.set_redacted(true);
        let mut data = file.items()[0].item.clone();
        data.set_redacted(false);
        file.save_session(
            &RedactionFileChanges {
                modified: vec![clue, data],
                ..Default::default()
            },
            TimeInterval::ending_now(1.0).unwrap(),
            &VerificationOptions::default(),
            &Operator::new("alice", "ws-01"),
        )
        .unwrap();

        let kinds: Vec<_> = file.level_warnings().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::NotRedacted, WarningKind::Redacted]);
    }

    #[test]
    fn test_missing_exemption_codes() {
        let dir = tempfile::tempdir().unwrap();
        let mut coded = RedactionItem::new(
            Attribute::new("Manual", SpatialString::text_span("Jones", 0, 4)),
            true,
        );
        coded.set_exemptions(&ExemptionCodeList::new("FOIA").with_codes(["b6"]));
        let file = load_with(
            &dir,
            vec![
                coded.into_attribute(),
                Attribute::new("Manual", SpatialString::text_span("Smith", 10, 14)),
            ],
        );

        let options = VerificationOptions {
            require_exemption_codes: true,
            ..Default::default()
        };
        let warnings = file.pending_warnings(&options, None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].text, "Smith");
        assert_eq!(warnings[0].kind, WarningKind::MissingExemptionCodes);

        assert!(file
            .pending_warnings(&VerificationOptions::default(), None)
            .is_empty());
    }
}
