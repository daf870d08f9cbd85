//! On-disk document shapes for collection directories.
//!
//! # Invariants
//! - `IndexFile.notes` only lists files that were committed before the index.
//! - Per-note files accept `notes` as a string or a list of lines and
//!   tolerate `null` for every optional field.

use crate::model::collection::NotesCollection;
use crate::model::meeting::Meeting;
use crate::model::module::{Module, Template};
use crate::model::note::MeetingNote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Index file name inside every collection directory.
pub const INDEX_FILE_NAME: &str = "collection.json";

/// `collection.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexFile {
    pub collection_name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Vec<IndexEntry>,
    #[serde(default)]
    pub note_count: usize,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
}

/// One `{title, filename}` row of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub title: String,
    pub filename: String,
}

impl IndexFile {
    /// Projects the in-memory collection into an index document.
    pub fn project(
        collection: &NotesCollection,
        slug: &str,
        notes: Vec<IndexEntry>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            collection_name: collection.name.clone(),
            slug: slug.to_string(),
            created_at: Some(collection.created_at),
            updated_at: Some(updated_at),
            note_count: notes.len(),
            notes,
            categories: collection.categories.clone(),
            tags: collection.tags.clone(),
            locations: collection.locations.clone(),
            modules: collection.modules.clone(),
            templates: collection.templates.clone(),
            meetings: collection.meetings.clone(),
        }
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.notes.iter().map(|entry| entry.filename.as_str())
    }
}

/// Body of a note: stored as one string, older files use a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteBody {
    Text(String),
    Lines(Vec<String>),
}

impl NoteBody {
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Lines(lines) => lines.join("\n"),
        }
    }
}

/// Per-note JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub participants: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<NoteBody>,
    #[serde(default)]
    pub todos: Option<Vec<String>>,
}

impl NoteRecord {
    pub fn from_note(note: &MeetingNote, updated_at: &str) -> Self {
        Self {
            title: note.title.clone(),
            created_at: note
                .created_at
                .clone()
                .or_else(|| Some(updated_at.to_string())),
            updated_at: Some(updated_at.to_string()),
            topic: non_empty(&note.topic),
            date: non_empty(&note.date),
            time: non_empty(&note.time),
            location: non_empty(&note.location),
            participants: Some(note.participants.clone()),
            notes: Some(NoteBody::Text(note.notes.clone())),
            todos: Some(note.todos.clone()),
        }
    }

    /// Converts a parsed record into a clean in-memory note.
    ///
    /// `fallback_title` (from the index) is used when the file has no title.
    pub fn into_note(self, filename: &str, fallback_title: &str) -> MeetingNote {
        let title = if self.title.trim().is_empty() {
            fallback_title.to_string()
        } else {
            self.title
        };
        MeetingNote {
            title,
            topic: self.topic,
            date: self.date,
            time: self.time,
            location: self.location,
            participants: self.participants.unwrap_or_default(),
            notes: self.notes.map(NoteBody::into_text).unwrap_or_default(),
            todos: self.todos.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            dirty: false,
            filename: Some(filename.to_string()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{IndexFile, NoteRecord};
    use serde_json::json;

    #[test]
    fn note_record_accepts_line_lists_and_nulls() {
        let record: NoteRecord = serde_json::from_value(json!({
            "title": "Weekly Sync",
            "created_at": null,
            "topic": null,
            "participants": ["Ana", "Ben"],
            "notes": ["- first", "- second"],
            "todos": null
        }))
        .unwrap();

        let note = record.into_note("weekly_sync.json", "ignored");
        assert_eq!(note.notes, "- first\n- second");
        assert!(note.todos.is_empty());
        assert_eq!(note.participants, vec!["Ana", "Ben"]);
        assert_eq!(note.filename.as_deref(), Some("weekly_sync.json"));
        assert!(!note.dirty);
    }

    #[test]
    fn index_file_tolerates_missing_entity_sections() {
        let index: IndexFile = serde_json::from_value(json!({
            "collection_name": "Team",
            "slug": "team",
            "created_at": "2025-10-07T08:00:00Z",
            "notes": [{"title": "A", "filename": "a.json"}],
            "note_count": 1
        }))
        .unwrap();

        assert!(index.modules.is_empty());
        assert!(index.meetings.is_empty());
        assert_eq!(index.filenames().collect::<Vec<_>>(), vec!["a.json"]);
    }
}
