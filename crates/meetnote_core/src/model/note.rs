//! Meeting note record handled by the collection store.
//!
//! # Invariants
//! - `dirty` and `filename` are process-local and never serialized.
//! - Only the store clears `dirty`, and only after a successful write.

use chrono::{SecondsFormat, Utc};

/// Single note inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeetingNote {
    pub title: String,
    pub topic: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub participants: Vec<String>,
    pub notes: String,
    pub todos: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Modified since the last successful write.
    pub dirty: bool,
    /// File this note was loaded from or last written to.
    pub filename: Option<String>,
}

impl MeetingNote {
    /// Creates an unsaved, dirty note stamped with the current time.
    pub fn new(title: impl Into<String>) -> Self {
        let now = utc_now_iso();
        Self {
            title: title.into(),
            created_at: Some(now.clone()),
            updated_at: Some(now),
            dirty: true,
            ..Self::default()
        }
    }

    /// Flags the note for the next incremental save.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.updated_at = Some(utc_now_iso());
    }

    /// Notes without a title are never written to disk.
    pub fn is_persistable(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Current UTC time as ISO-8601 with a `Z` suffix.
pub fn utc_now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
