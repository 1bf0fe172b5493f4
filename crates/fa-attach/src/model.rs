//! Attachment models

use chrono::{DateTime, Utc};
use fa_core::{AttachMode, SourceUri};
use serde::{Deserialize, Serialize};

/// Opaque managed-file identifier
pub type FileId = i64;

/// Label of the blank "no selection" pseudo-entry
pub const SELECT_FILE_LABEL: &str = "-- Select file --";

/// A file registered in managed storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedFile {
    /// Registry identifier, assigned on registration
    pub id: Option<FileId>,
    /// Filename as stored
    pub filename: String,
    /// Location of the stored bytes
    pub uri: SourceUri,
    /// Size in bytes
    pub size: u64,
    /// MIME content type
    pub content_type: String,
    /// SHA256 digest of the content
    pub digest: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl ManagedFile {
    pub fn new(
        filename: impl Into<String>,
        uri: SourceUri,
        size: u64,
        content_type: impl Into<String>,
        digest: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            filename: filename.into(),
            uri,
            size,
            content_type: content_type.into(),
            digest: digest.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// File extension, if any
    pub fn extension(&self) -> Option<&str> {
        if !self.filename.contains('.') {
            return None;
        }
        self.filename
            .rsplit('.')
            .next()
            .filter(|ext| !ext.is_empty())
    }
}

/// One selectable entry: fully-qualified source URI plus display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachOption {
    pub value: String,
    pub label: String,
}

/// Ordered option list offered to the user. Sorted case-insensitively by
/// label; carries a leading blank sentinel whenever at least one real entry
/// exists; values are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachOptionSet {
    entries: Vec<AttachOption>,
}

impl AttachOptionSet {
    /// Build from `(value, label)` pairs. Duplicate values keep their first
    /// occurrence.
    pub fn from_entries<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut seen = std::collections::HashSet::new();
        let mut entries: Vec<AttachOption> = pairs
            .into_iter()
            .filter(|(value, _)| seen.insert(value.clone()))
            .map(|(value, label)| AttachOption { value, label })
            .collect();

        entries.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));

        if !entries.is_empty() {
            entries.insert(
                0,
                AttachOption {
                    value: String::new(),
                    label: SELECT_FILE_LABEL.to_string(),
                },
            );
        }

        Self { entries }
    }

    /// All entries, sentinel included
    pub fn entries(&self) -> &[AttachOption] {
        &self.entries
    }

    /// True when there is nothing to select
    pub fn is_empty(&self) -> bool {
        !self.entries.iter().any(|e| !e.value.is_empty())
    }

    /// Number of real (selectable) entries
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.value.is_empty()).count()
    }

    /// Whether a submitted value is one of the offered options
    pub fn contains(&self, value: &str) -> bool {
        !value.is_empty() && self.entries.iter().any(|e| e.value == value)
    }

    /// Merge options built for an earlier render of the same form, keeping
    /// current entries first. A file consumed by a prior Move stays
    /// selectable for the submission that offered it.
    pub fn merge_previous(&mut self, older: &AttachOptionSet) {
        for entry in older.entries.iter().filter(|e| !e.value.is_empty()) {
            if !self.contains(&entry.value) {
                self.entries.push(entry.clone());
            }
        }
        let has_real = self.entries.iter().any(|e| !e.value.is_empty());
        let has_sentinel = self.entries.first().is_some_and(|e| e.value.is_empty());
        if has_real && !has_sentinel {
            self.entries.insert(
                0,
                AttachOption {
                    value: String::new(),
                    label: SELECT_FILE_LABEL.to_string(),
                },
            );
        }
    }
}

/// The record (content entity field) attachments land on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachRecord {
    pub file_ids: Vec<FileId>,
}

impl AttachRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.file_ids.contains(&id)
    }

    /// Append an id unless it is already present; returns whether the
    /// record changed
    pub fn push_unique(&mut self, id: FileId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.file_ids.push(id);
        true
    }
}

/// One requested transfer; consumed by the policy
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub source: SourceUri,
    pub destination: SourceUri,
    pub mode: AttachMode,
}

impl TransferRequest {
    pub fn new(source: SourceUri, destination: SourceUri, mode: AttachMode) -> Self {
        Self {
            source,
            destination,
            mode,
        }
    }
}

/// Outcome of a successful transfer
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub file_id: FileId,
    pub file: ManagedFile,
}

impl TransferResult {
    /// Where the registered bytes live
    pub fn final_uri(&self) -> &SourceUri {
        &self.file.uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(v, l)| (v.to_string(), l.to_string()))
            .collect()
    }

    #[test]
    fn test_options_sorted_case_insensitively_with_sentinel() {
        let options = AttachOptionSet::from_entries(pairs(&[
            ("local://uploads/pending/Report.PDF", "Report.PDF"),
            ("local://uploads/pending/notes.txt", "notes.txt"),
        ]));

        let entries = options.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].value, "");
        assert_eq!(entries[0].label, SELECT_FILE_LABEL);
        assert_eq!(entries[1].label, "notes.txt");
        assert_eq!(entries[2].label, "Report.PDF");
        assert_eq!(options.len(), 2);
        assert!(!options.is_empty());
    }

    #[test]
    fn test_empty_options_have_no_sentinel() {
        let options = AttachOptionSet::from_entries(Vec::new());
        assert!(options.is_empty());
        assert!(options.entries().is_empty());
    }

    #[test]
    fn test_duplicate_values_keep_first() {
        let options = AttachOptionSet::from_entries(pairs(&[
            ("local://a/x.txt", "x.txt"),
            ("local://a/x.txt", "duplicate"),
        ]));
        assert_eq!(options.len(), 1);
        assert_eq!(options.entries()[1].label, "x.txt");
    }

    #[test]
    fn test_contains_ignores_blank() {
        let options = AttachOptionSet::from_entries(pairs(&[("local://a/x.txt", "x.txt")]));
        assert!(options.contains("local://a/x.txt"));
        assert!(!options.contains(""));
        assert!(!options.contains("local://a/forged.txt"));
    }

    #[test]
    fn test_merge_previous_keeps_consumed_option() {
        let mut current = AttachOptionSet::from_entries(pairs(&[("local://a/b.txt", "b.txt")]));
        let older = AttachOptionSet::from_entries(pairs(&[
            ("local://a/b.txt", "b.txt"),
            ("local://a/moved.txt", "moved.txt"),
        ]));

        current.merge_previous(&older);
        assert_eq!(current.len(), 2);
        assert!(current.contains("local://a/moved.txt"));

        // Merging again must not duplicate
        current.merge_previous(&older);
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn test_merge_previous_into_empty_gains_sentinel() {
        let mut current = AttachOptionSet::from_entries(Vec::new());
        let older = AttachOptionSet::from_entries(pairs(&[("local://a/old.txt", "old.txt")]));

        current.merge_previous(&older);
        assert_eq!(current.len(), 1);
        assert_eq!(current.entries()[0].value, "");
    }

    #[test]
    fn test_record_push_unique() {
        let mut record = AttachRecord::new();
        assert!(record.push_unique(10));
        assert!(!record.push_unique(10));
        assert!(record.push_unique(11));
        assert_eq!(record.file_ids, vec![10, 11]);
    }

    #[test]
    fn test_managed_file_extension() {
        let file = ManagedFile::new(
            "Report.PDF",
            SourceUri::new("local", "attachments/Report.PDF"),
            12,
            "application/pdf",
            "digest",
        );
        assert_eq!(file.extension(), Some("PDF"));
        assert!(!file.is_persisted());
    }
}
