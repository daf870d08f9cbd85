//! Meeting agenda model.
//!
//! # Invariants
//! - `tops` order is the only ordering guarantee used for rendering.
//! - A top is exactly one of literal text, a module reference or a template
//!   reference.

use super::module::move_item;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One ordered entry in a meeting body.
///
/// Serialized as `{"type": "text" | "modules" | "templates", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Top {
    /// Inline literal content, rendered as a heading.
    #[serde(rename = "text")]
    Text { value: String },
    /// Reference to a template; expands to its modules in template order.
    #[serde(rename = "templates")]
    TemplateRef { id: String },
    /// Reference to a single module.
    #[serde(rename = "modules")]
    ModuleRef { id: String },
}

impl Top {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn module(id: impl Into<String>) -> Self {
        Self::ModuleRef { id: id.into() }
    }

    pub fn template(id: impl Into<String>) -> Self {
        Self::TemplateRef { id: id.into() }
    }
}

/// A meeting assembled from tops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    #[serde(default = "default_meeting_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form meeting type, used in the rendered title.
    #[serde(default = "default_meeting_kind")]
    pub kind: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub tops: Vec<Top>,
}

impl Meeting {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind: kind.into(),
            date: None,
            tops: Vec::new(),
        }
    }

    /// Moves the top at `from` to position `to`.
    ///
    /// Returns `false` and leaves the order untouched when either index is out
    /// of range.
    pub fn move_top(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.tops, from, to)
    }
}

pub(crate) fn default_meeting_name() -> String {
    "Unnamed".to_string()
}

pub(crate) fn default_meeting_kind() -> String {
    "Meeting".to_string()
}
