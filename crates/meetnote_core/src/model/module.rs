//! Reusable content blocks and the templates that order them.

use serde::{Deserialize, Serialize};

/// Atomic unit of reusable content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Rendered as the module heading.
    #[serde(default = "default_headline")]
    pub headline: String,
    /// Opaque markdown body.
    #[serde(default)]
    pub content: String,
}

impl Module {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        headline: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            headline: headline.into(),
            content: content.into(),
        }
    }
}

/// Ordered list of module references.
///
/// The order of `modules` is the rendering order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Module ids, in rendering order.
    #[serde(default)]
    pub modules: Vec<String>,
}

impl Template {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            modules: Vec::new(),
        }
    }

    /// Moves the module reference at `from` to position `to`.
    ///
    /// Returns `false` and leaves the order untouched when either index is out
    /// of range.
    pub fn move_module(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.modules, from, to)
    }
}

pub(crate) fn default_headline() -> String {
    "Unnamed Module".to_string()
}

pub(crate) fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}
