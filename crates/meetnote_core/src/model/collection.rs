//! Root aggregate for one collection directory.
//!
//! # Responsibility
//! - Own notes, modules, templates, meetings and the pick lists used by the
//!   note editor (categories, tags, locations).
//! - Assign ids and track the in-memory lifecycle status.
//!
//! # Invariants
//! - `add_*` helpers assign `max(numeric ids) + 1`.
//! - Every mutation helper moves the status to `Changed`.

use super::meeting::Meeting;
use super::module::{Module, Template};
use super::note::MeetingNote;
use super::{next_id, EntityValidationError};
use chrono::{DateTime, Utc};

const DEFAULT_CATEGORIES: &[&str] = &["Standard", "Official", "Information", "Consulting"];
const DEFAULT_TAGS: &[&str] = &["BR", "GBR", "KBR", "ITA", "VG", "AG", "COM"];
const DEFAULT_LOCATIONS: &[&str] = &["Online", "Office", "Conference Room"];
const DEFAULT_MODULES: &[&str] = &["Topic", "Participants", "Date", "Time", "Location", "Notes"];
const DEFAULT_NOTES_CONTENT: &str = "- Bulletpoint 1\n- Bulletpoint 2\n## Subtitle\n- [ ] ToDo 1";
const QUICK_TEMPLATE_MODULES: &[&str] = &["Topic", "Date", "Time", "Participants", "Location", "Notes"];

/// In-memory lifecycle of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Created in memory, never written.
    New,
    /// Read from disk, unmodified.
    Loaded,
    /// Modified since the last load or save.
    Changed,
    /// Written to disk by the last operation.
    Saved,
}

/// One collection, mapped 1:1 to a directory on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct NotesCollection {
    pub name: String,
    pub notes: Vec<MeetingNote>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub modules: Vec<Module>,
    pub templates: Vec<Template>,
    pub meetings: Vec<Meeting>,
    pub locations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: CollectionStatus,
}

impl NotesCollection {
    /// Builds an empty collection without any default content.
    pub fn empty(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            notes: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            modules: Vec::new(),
            templates: Vec::new(),
            meetings: Vec::new(),
            locations: Vec::new(),
            created_at: now,
            updated_at: now,
            status: CollectionStatus::New,
        }
    }

    /// Builds a collection seeded with the default pick lists, modules and
    /// the `Quick` template.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        let mut collection = Self::empty(name);
        collection.categories = to_strings(DEFAULT_CATEGORIES);
        collection.tags = to_strings(DEFAULT_TAGS);
        collection.locations = to_strings(DEFAULT_LOCATIONS);
        collection.modules = DEFAULT_MODULES
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let content = if *name == "Notes" {
                    DEFAULT_NOTES_CONTENT
                } else {
                    ""
                };
                Module::new((index + 1).to_string(), *name, *name, content)
            })
            .collect();

        let mut quick = Template::new("1", "Quick");
        quick.description = "Topic, date, time, participants, location and notes".to_string();
        quick.modules = QUICK_TEMPLATE_MODULES
            .iter()
            .filter_map(|name| {
                collection
                    .modules
                    .iter()
                    .find(|module| module.name == *name)
                    .map(|module| module.id.clone())
            })
            .collect();
        collection.templates.push(quick);
        collection
    }

    /// Returns notes flagged for the next incremental save.
    pub fn dirty_notes(&self) -> impl Iterator<Item = &MeetingNote> {
        self.notes.iter().filter(|note| note.dirty)
    }

    pub fn note_by_title(&self, title: &str) -> Option<&MeetingNote> {
        self.notes.iter().find(|note| note.title == title)
    }

    /// Appends a note and marks the collection changed.
    pub fn add_note(&mut self, note: MeetingNote) {
        self.notes.push(note);
        self.touch();
    }

    pub fn get_module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.id == id)
    }

    pub fn get_template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn get_meeting(&self, id: &str) -> Option<&Meeting> {
        self.meetings.iter().find(|meeting| meeting.id == id)
    }

    /// Adds a module with the next free id and returns that id.
    pub fn add_module(
        &mut self,
        name: impl Into<String>,
        headline: impl Into<String>,
        content: impl Into<String>,
    ) -> String {
        let id = next_id(self.modules.iter().map(|module| module.id.as_str()));
        self.modules
            .push(Module::new(id.clone(), name, headline, content));
        self.touch();
        id
    }

    /// Adds a template with the next free id and returns that id.
    pub fn add_template(&mut self, name: impl Into<String>, modules: Vec<String>) -> String {
        let id = next_id(self.templates.iter().map(|template| template.id.as_str()));
        let mut template = Template::new(id.clone(), name);
        template.modules = modules;
        self.templates.push(template);
        self.touch();
        id
    }

    /// Adds a meeting with the next free id and returns that id.
    ///
    /// The id on `meeting` is overwritten.
    pub fn add_meeting(&mut self, mut meeting: Meeting) -> String {
        let id = next_id(self.meetings.iter().map(|meeting| meeting.id.as_str()));
        meeting.id = id.clone();
        self.meetings.push(meeting);
        self.touch();
        id
    }

    /// Replaces the module with the same id. Returns whether it existed.
    pub fn update_module(&mut self, module: Module) -> Result<bool, EntityValidationError> {
        require_id("module", &module.id)?;
        let changed = replace_by_id(&mut self.modules, module, |m| &m.id);
        Ok(self.changed_if(changed))
    }

    /// Replaces the template with the same id. Returns whether it existed.
    pub fn update_template(&mut self, template: Template) -> Result<bool, EntityValidationError> {
        require_id("template", &template.id)?;
        let changed = replace_by_id(&mut self.templates, template, |t| &t.id);
        Ok(self.changed_if(changed))
    }

    /// Replaces the meeting with the same id. Returns whether it existed.
    pub fn update_meeting(&mut self, meeting: Meeting) -> Result<bool, EntityValidationError> {
        require_id("meeting", &meeting.id)?;
        let changed = replace_by_id(&mut self.meetings, meeting, |m| &m.id);
        Ok(self.changed_if(changed))
    }

    /// Removes a module by id. Returns whether anything was removed.
    ///
    /// References held by templates and meetings are left in place and will
    /// surface as render errors.
    pub fn delete_module(&mut self, id: &str) -> Result<bool, EntityValidationError> {
        require_id("module", id)?;
        let changed = remove_by_id(&mut self.modules, id, |m| &m.id);
        Ok(self.changed_if(changed))
    }

    pub fn delete_template(&mut self, id: &str) -> Result<bool, EntityValidationError> {
        require_id("template", id)?;
        let changed = remove_by_id(&mut self.templates, id, |t| &t.id);
        Ok(self.changed_if(changed))
    }

    pub fn delete_meeting(&mut self, id: &str) -> Result<bool, EntityValidationError> {
        require_id("meeting", id)?;
        let changed = remove_by_id(&mut self.meetings, id, |m| &m.id);
        Ok(self.changed_if(changed))
    }

    /// Marks the collection as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.status = CollectionStatus::Changed;
    }

    fn changed_if(&mut self, changed: bool) -> bool {
        if changed {
            self.touch();
        }
        changed
    }
}

fn require_id(kind: &'static str, id: &str) -> Result<(), EntityValidationError> {
    if id.trim().is_empty() {
        return Err(EntityValidationError::EmptyId(kind));
    }
    Ok(())
}

fn replace_by_id<T>(items: &mut Vec<T>, item: T, id_of: impl Fn(&T) -> &String) -> bool {
    match items.iter().position(|existing| id_of(existing) == id_of(&item)) {
        Some(index) => {
            items[index] = item;
            true
        }
        None => false,
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, id_of: impl Fn(&T) -> &String) -> bool {
    let before = items.len();
    items.retain(|item| id_of(item) != id);
    items.len() < before
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
