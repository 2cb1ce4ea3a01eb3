//! Session reconciliation over one redaction file
//!
//! [`RedactionFile::load`] turns a stored snapshot into a working set of
//! classified items with stable identities. [`RedactionFile::save_session`]
//! applies one verification pass to that working set, archives whatever the
//! pass superseded, and writes the new snapshot.

use std::path::{Path, PathBuf};

use idshield_core::item::ID_AND_REVISION_NAME;
use idshield_core::{
    Attribute, ConfidenceLevel, ConfidenceLevels, Operator, RedactionFileChanges, RedactionItem,
    SensitiveItem, TimeInterval, VerificationOptions, VerificationSession,
};
use idshield_storage::{AttributeStore, AttributeTree};
use tracing::{debug, info, warn};

use crate::file_info;
use crate::{EngineError, Result};

/// Audit subtree holding superseded and turned off items
pub const OLD_REVISIONS_NAME: &str = "_OldRevisions";

/// Loaded state of one document's redaction file
#[derive(Debug, Clone)]
pub struct RedactionFile {
    path: PathBuf,
    source_doc_name: String,
    levels: ConfidenceLevels,
    store: AttributeStore,
    items: Vec<SensitiveItem>,
    /// Unclassified and metadata nodes, written back unchanged
    passthrough: Vec<Attribute>,
    old_revisions: Attribute,
    file_info: Attribute,
    next_id: i64,
    session_counter: i64,
}

/// What a save wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: i64,
    pub added: Vec<i64>,
    pub deleted: Vec<i64>,
    pub modified: Vec<i64>,
    /// Items written to the output tree
    pub output_items: usize,
    /// Items archived as turned off
    pub turned_off: usize,
}

impl RedactionFile {
    /// Load the snapshot at `path`. A missing file yields an empty working set.
    pub fn load(
        path: impl Into<PathBuf>,
        source_doc_name: impl Into<String>,
        levels: ConfidenceLevels,
    ) -> Result<Self> {
        let path = path.into();
        let store = AttributeStore::new();

        let mut file = Self {
            path,
            source_doc_name: source_doc_name.into(),
            levels,
            store,
            items: Vec::new(),
            passthrough: Vec::new(),
            old_revisions: Attribute::new(OLD_REVISIONS_NAME, ""),
            file_info: file_info::current(),
            next_id: 1,
            session_counter: 0,
        };

        // 1. No prior markup
        let Some(tree) = file.store.load(&file.path)? else {
            info!(path = %file.path.display(), "no redaction file, starting empty");
            return Ok(file);
        };

        // 2. Product and schema header
        let (headers, rest): (Vec<_>, Vec<_>) = tree
            .attributes
            .into_iter()
            .partition(file_info::is_file_info);
        file.file_info = file_info::check(&file.path, headers.first())?;

        // 3. Audit subtree
        let (archives, rest): (Vec<_>, Vec<_>) = rest
            .into_iter()
            .partition(|a| a.name.eq_ignore_ascii_case(OLD_REVISIONS_NAME));
        for archive in archives {
            file.old_revisions
                .sub_attributes
                .extend(archive.sub_attributes);
        }

        // 4. Classify current items and restore turned off ones
        file.classify(rest);

        // 5 and 6. Identities
        file.assign_identities()?;

        // 7. Session counter
        file.session_counter = file
            .passthrough
            .iter()
            .filter_map(VerificationSession::id_of)
            .max()
            .unwrap_or(0);

        info!(
            path = %file.path.display(),
            items = file.items.len(),
            archived = file.old_revisions.sub_attributes.len(),
            next_id = file.next_id,
            sessions = file.session_counter,
            "loaded redaction file"
        );
        Ok(file)
    }

    fn classify(&mut self, attributes: Vec<Attribute>) {
        let classification = self.levels.classify(attributes);
        self.passthrough = classification.unclassified;

        let archived = std::mem::take(&mut self.old_revisions.sub_attributes);
        let mut restorable = Vec::new();
        for attribute in archived {
            let item = RedactionItem::new(attribute, false);
            if item.is_turned_off() && item.attribute().is_spatial() {
                restorable.push(item);
            } else {
                self.old_revisions.sub_attributes.push(item.into_attribute());
            }
        }
        let mut restored: Vec<Vec<RedactionItem>> = vec![Vec::new(); self.levels.len()];
        for mut item in restorable {
            match self
                .levels
                .iter()
                .position(|level| level.selects(item.attribute()))
            {
                Some(index) => {
                    item.clear_archive_action();
                    restored[index].push(item);
                }
                None => self.old_revisions.sub_attributes.push(item.into_attribute()),
            }
        }

        for ((level, bucket), restored) in classification.buckets.into_iter().zip(restored) {
            for attribute in bucket {
                if !attribute.is_spatial() {
                    warn!(
                        level = level.short_name(),
                        name = %attribute.name,
                        "non-spatial item left unclassified"
                    );
                    self.passthrough.push(attribute);
                    continue;
                }
                let mut item = RedactionItem::new(attribute, true);
                // Items an earlier save wrote out were redacted
                let redacted = item.id_or_none().is_some() || level.include_in_output();
                item.set_redacted(redacted);
                self.items.push(SensitiveItem::new(level.clone(), item));
            }

            if !restored.is_empty() {
                debug!(
                    level = level.short_name(),
                    count = restored.len(),
                    "restored turned off items"
                );
            }
            for item in restored {
                self.items.push(SensitiveItem::new(level.clone(), item));
            }
        }
    }

    fn assign_identities(&mut self) -> Result<()> {
        let mut max_id = 0;
        for item in &self.items {
            if let Some(id) = item.item.id()? {
                max_id = max_id.max(id);
            }
        }
        for attribute in &self.old_revisions.sub_attributes {
            if let Some(id) = RedactionItem::new(attribute.clone(), false).id()? {
                max_id = max_id.max(id);
            }
        }

        let mut next_id = following_id(max_id)?;
        for item in &mut self.items {
            if item.item.id()?.is_none() {
                debug!(id = next_id, text = item.item.text(), "assigned identity");
                item.item.set_id(next_id);
                next_id = following_id(next_id)?;
            }
        }
        self.next_id = next_id;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_doc_name(&self) -> &str {
        &self.source_doc_name
    }

    pub fn levels(&self) -> &ConfidenceLevels {
        &self.levels
    }

    /// Working set in level order
    pub fn items(&self) -> &[SensitiveItem] {
        &self.items
    }

    pub fn item(&self, id: i64) -> Option<&SensitiveItem> {
        self.items.iter().find(|s| s.id() == Some(id))
    }

    /// Nodes no level selected, including session records
    pub fn unclassified(&self) -> &[Attribute] {
        &self.passthrough
    }

    /// Archived item versions
    pub fn old_revisions(&self) -> &[Attribute] {
        &self.old_revisions.sub_attributes
    }

    pub fn file_info(&self) -> &Attribute {
        &self.file_info
    }

    /// Identity the next added item receives
    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    /// Id of the most recent session, 0 if none
    pub fn session_counter(&self) -> i64 {
        self.session_counter
    }

    /// Apply one verification pass and write the new snapshot.
    ///
    /// Nothing is written and the loaded state is unchanged if any step fails.
    pub fn save_session(
        &mut self,
        changes: &RedactionFileChanges,
        interval: TimeInterval,
        options: &VerificationOptions,
        operator: &Operator,
    ) -> Result<SessionSummary> {
        // 1. Work on copies
        let mut items = self.items.clone();
        let mut next_id = self.next_id;
        let mut superseded = Vec::new();

        // 2. Deleted
        let mut deleted = Vec::with_capacity(changes.deleted.len());
        for change in &changes.deleted {
            let (id, index) = self.locate(&items, change)?;
            let removed = items.remove(index);
            debug!(id, "deleted item");
            superseded.push(removed.item.into_attribute());
            deleted.push(id);
        }

        // 3. Modified
        let mut modified = Vec::with_capacity(changes.modified.len());
        for change in &changes.modified {
            let (id, index) = self.locate(&items, change)?;
            let original = &items[index];
            let level = original.level.clone();
            let current = original.item.revision()?.unwrap_or(0);
            let revision = current.checked_add(1).ok_or_else(|| {
                exhausted(original.item.attribute().name.clone(), "revision", current)
            })?;
            superseded.push(original.item.attribute().clone());

            let mut updated = change.clone();
            updated.set_id(id);
            updated.set_revision(revision);
            debug!(id, revision, "modified item");
            items[index] = SensitiveItem::new(level, updated);
            modified.push(id);
        }

        // 4. Added
        let mut added = Vec::with_capacity(changes.added.len());
        if !changes.added.is_empty() {
            let manual = self.manual_level()?;
            for change in &changes.added {
                let mut item = change.clone();
                item.set_id(next_id);
                debug!(id = next_id, text = item.text(), "added item");
                added.push(next_id);
                items.push(SensitiveItem::new(manual.clone(), item));
                next_id = following_id(next_id)?;
            }
        }

        // 5. Non-output items
        let turned_off: Vec<Attribute> = items
            .iter()
            .filter(|s| !s.item.is_redacted())
            .map(|s| {
                let mut copy = s.item.clone();
                copy.mark_turned_off();
                copy.into_attribute()
            })
            .collect();

        // 6. Session record
        let session_id = self.session_counter + 1;
        let session = VerificationSession {
            id: session_id,
            operator: operator.clone(),
            interval,
            source_doc_name: self.source_doc_name.clone(),
            data_file: self.path.display().to_string(),
            options: options.clone(),
            added: added.clone(),
            deleted: deleted.clone(),
            modified: modified.clone(),
        };

        // 7. Audit subtree
        let mut old_revisions = self.old_revisions.clone();
        old_revisions.sub_attributes.extend(superseded);
        let mut written_revisions = old_revisions.clone();
        written_revisions
            .sub_attributes
            .extend(turned_off.iter().cloned());

        // 8. Output tree
        let mut passthrough = self.passthrough.clone();
        passthrough.push(session.to_attribute());

        let mut attributes = vec![self.file_info.clone()];
        attributes.extend(
            items
                .iter()
                .filter(|s| s.item.is_redacted())
                .map(|s| s.item.attribute().clone()),
        );
        let output_items = attributes.len() - 1;
        attributes.extend(passthrough.iter().cloned());
        attributes.push(written_revisions);

        self.store
            .save(&AttributeTree::new(attributes), &self.path)?;

        // 9. Commit. Turned off items stay in the working set, so their
        // archived copies are only kept on disk.
        self.items = items;
        self.passthrough = passthrough;
        self.old_revisions = old_revisions;
        self.next_id = next_id;
        self.session_counter = session_id;

        let summary = SessionSummary {
            session_id,
            added,
            deleted,
            modified,
            output_items,
            turned_off: turned_off.len(),
        };
        info!(
            path = %self.path.display(),
            session = session_id,
            added = summary.added.len(),
            deleted = summary.deleted.len(),
            modified = summary.modified.len(),
            output = output_items,
            turned_off = summary.turned_off,
            "saved verification session"
        );
        Ok(summary)
    }

    fn locate(&self, items: &[SensitiveItem], change: &RedactionItem) -> Result<(i64, usize)> {
        let missing = |id| EngineError::MissingOriginal {
            path: self.path.clone(),
            id,
        };
        let id = change.id()?.ok_or_else(|| missing(-1))?;
        let index = items
            .iter()
            .position(|s| s.id() == Some(id))
            .ok_or_else(|| missing(id))?;
        Ok((id, index))
    }

    fn manual_level(&self) -> Result<&ConfidenceLevel> {
        self.levels.manual().ok_or(EngineError::NoManualLevel)
    }
}

/// Identity after `id`; the id space ends at `i64::MAX`
fn following_id(id: i64) -> Result<i64> {
    id.checked_add(1)
        .ok_or_else(|| exhausted(ID_AND_REVISION_NAME.to_string(), "identity", id))
}

fn exhausted(attribute: String, field: &'static str, value: impl std::fmt::Display) -> EngineError {
    idshield_core::Error::InvalidMetadata {
        attribute,
        field,
        value: value.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use idshield_core::SpatialString;

    fn hc(text: &str, start: usize) -> Attribute {
        Attribute::new(
            "HCData",
            SpatialString::text_span(text, start, start + text.chars().count() - 1),
        )
        .with_type("SSN")
    }

    fn clue(text: &str, start: usize) -> Attribute {
        Attribute::new(
            "Clues",
            SpatialString::text_span(text, start, start + text.chars().count() - 1),
        )
    }

    fn write(path: &Path, attributes: Vec<Attribute>) {
        AttributeStore::new()
            .save(&AttributeTree::new(attributes), path)
            .unwrap();
    }

    fn save(file: &mut RedactionFile, changes: RedactionFileChanges) -> Result<SessionSummary> {
        file.save_session(
            &changes,
            TimeInterval::ending_now(12.5).unwrap(),
            &VerificationOptions::default(),
            &Operator::new("alice", "ws-01"),
        )
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file =
            RedactionFile::load(dir.path().join("doc.txt.voa"), "doc.txt", ConfidenceLevels::standard())
                .unwrap();

        assert!(file.items().is_empty());
        assert_eq!(file.next_id(), 1);
        assert_eq!(file.session_counter(), 0);
    }

    #[test]
    fn test_load_classifies_and_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt.voa");
        write(
            &path,
            vec![
                hc("123-45-6789", 4),
                clue("SSN", 0),
                Attribute::new("DocumentType", "Deed"),
                Attribute::new("HCData", "no position"),
            ],
        );

        let file = RedactionFile::load(&path, "doc.txt", ConfidenceLevels::standard()).unwrap();

        let ids: Vec<_> = file.items().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
        assert_eq!(file.items()[0].level.short_name(), "HC");
        assert!(file.items()[0].item.is_redacted());
        // Clues are not output by default
        assert!(!file.items()[1].item.is_redacted());
        assert_eq!(file.unclassified().len(), 2);
        assert_eq!(file.next_id(), 3);
    }

    #[test]
    fn test_numbering_skips_archived_identities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.voa");
        let mut archived = RedactionItem::new(hc("old", 0), true);
        archived.set_id(9);
        write(
            &path,
            vec![
                hc("123-45-6789", 4),
                Attribute::new(OLD_REVISIONS_NAME, "").with_child(archived.into_attribute()),
            ],
        );

        let file = RedactionFile::load(&path, "doc", ConfidenceLevels::standard()).unwrap();

        assert_eq!(file.items()[0].id(), Some(10));
        assert_eq!(file.next_id(), 11);
        assert_eq!(file.old_revisions().len(), 1);
    }

    #[test]
    fn test_load_rejects_exhausted_identities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.voa");
        let mut last = RedactionItem::new(hc("123-45-6789", 4), true);
        last.set_id(i64::MAX);
        write(&path, vec![last.into_attribute(), hc("987-65-4321", 20)]);

        let err = RedactionFile::load(&path, "doc", ConfidenceLevels::standard()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(idshield_core::Error::InvalidMetadata { field: "identity", .. })
        ));
    }

    #[test]
    fn test_save_writes_header_items_session_and_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.voa");
        write(&path, vec![hc("123-45-6789", 4), clue("SSN", 0)]);

        let mut file = RedactionFile::load(&path, "doc", ConfidenceLevels::standard()).unwrap();
        let summary = save(&mut file, RedactionFileChanges::default()).unwrap();

        assert_eq!(summary.session_id, 1);
        assert_eq!(summary.output_items, 1);
        assert_eq!(summary.turned_off, 1);

        let tree = AttributeStore::new().load(&path).unwrap().unwrap();
        let names: Vec<_> = tree.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                file_info::FILE_INFO_NAME,
                "HCData",
                idshield_core::session::SESSION_NAME,
                OLD_REVISIONS_NAME
            ]
        );
        let archive = tree.attributes.last().unwrap();
        assert_eq!(archive.sub_attributes.len(), 1);
        assert!(RedactionItem::new(archive.sub_attributes[0].clone(), false).is_turned_off());
    }

    #[test]
    fn test_missing_original_leaves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.voa");
        write(&path, vec![hc("123-45-6789", 4)]);

        let mut file = RedactionFile::load(&path, "doc", ConfidenceLevels::standard()).unwrap();
        let mut ghost = RedactionItem::new(hc("ghost", 0), true);
        ghost.set_id(7);
        let changes = RedactionFileChanges {
            deleted: vec![ghost],
            ..Default::default()
        };

        let err = save(&mut file, changes).unwrap_err();
        assert!(matches!(err, EngineError::MissingOriginal { id: 7, .. }));
        assert_eq!(file.session_counter(), 0);
        assert_eq!(file.items().len(), 1);
    }

    #[test]
    fn test_added_without_manual_level() {
        let dir = tempfile::tempdir().unwrap();
        let levels = ConfidenceLevels::new(vec![
            ConfidenceLevel::new("HC", "HCData", "#FF0000", true).unwrap(),
        ]);
        let mut file = RedactionFile::load(dir.path().join("doc.voa"), "doc", levels).unwrap();
        let changes = RedactionFileChanges {
            added: vec![RedactionItem::new(
                Attribute::new("Manual", SpatialString::text_span("x", 0, 0)),
                true,
            )],
            ..Default::default()
        };

        assert!(matches!(save(&mut file, changes), Err(EngineError::NoManualLevel)));
        assert!(!dir.path().join("doc.voa").exists());
    }

    #[test]
    fn test_multiple_saves_keep_audit_free_of_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.voa");
        write(&path, vec![clue("SSN", 0)]);

        let mut file = RedactionFile::load(&path, "doc", ConfidenceLevels::standard()).unwrap();
        save(&mut file, RedactionFileChanges::default()).unwrap();
        save(&mut file, RedactionFileChanges::default()).unwrap();

        let tree = AttributeStore::new().load(&path).unwrap().unwrap();
        let archive = tree.attributes.last().unwrap();
        assert_eq!(archive.sub_attributes.len(), 1);
        assert_eq!(file.session_counter(), 2);
    }
}
