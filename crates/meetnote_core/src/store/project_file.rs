//! Standalone project document (`templates`, `modules`, `meetings` in one
//! JSON file).
//!
//! # Invariants
//! - `save` keeps exactly one previous version at `<file>.bak`.
//! - The file itself is always replaced through the atomic commit.

use super::atomic::{read_json, sibling_with_suffix, write_json_atomic};
use super::{StoreError, StoreResult};
use crate::model::collection::NotesCollection;
use crate::model::meeting::Meeting;
use crate::model::module::{Module, Template};
use chrono::Local;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const PROJECT_BACKUP_SUFFIX: &str = ".bak";

/// Typed project document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    /// Local time of the last save, `YYYY-MM-DD HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
}

impl ProjectFile {
    /// Reads a project document.
    ///
    /// # Errors
    /// - `NotFound` when `path` does not exist.
    /// - `Parse` when the document is malformed.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let project: Self = read_json(path)?;
        info!(
            "event=project_load module=store status=ok templates={} modules={} meetings={}",
            project.templates.len(),
            project.modules.len(),
            project.meetings.len()
        );
        Ok(project)
    }

    /// Writes the document, moving the previous version to `<file>.bak`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        if path.is_file() {
            let backup = sibling_with_suffix(path, PROJECT_BACKUP_SUFFIX);
            fs::copy(path, &backup).map_err(StoreError::io("copy", path))?;
        }
        self.update = Some(Local::now().format("%Y-%m-%d %H:%M").to_string());
        write_json_atomic(path, self)?;
        info!(
            "event=project_save module=store status=ok path={}",
            path.display()
        );
        Ok(())
    }

    /// Copies the entity sections of a collection.
    pub fn from_collection(collection: &NotesCollection) -> Self {
        Self {
            templates: collection.templates.clone(),
            modules: collection.modules.clone(),
            meetings: collection.meetings.clone(),
            update: None,
        }
    }

    /// Replaces the entity sections of `collection` with this document's.
    pub fn apply_to(self, collection: &mut NotesCollection) {
        collection.templates = self.templates;
        collection.modules = self.modules;
        collection.meetings = self.meetings;
        collection.touch();
    }
}
