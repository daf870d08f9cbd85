//! Entity model for meeting-note collections.
//!
//! # Responsibility
//! - Define the plain records a collection is made of (modules, templates,
//!   meetings, notes) and the root aggregate that owns them.
//! - Keep identity and validation predicates next to the data.
//!
//! # Invariants
//! - Ids are unique per entity type inside one collection.
//! - New ids are `max(numeric ids) + 1`, starting at `1`.
//! - Templates and meetings reference modules/templates by id and never own
//!   them; dangling references are detected at render time only.
//!
//! # See also
//! - crate::render for reference resolution.

pub mod collection;
pub mod meeting;
pub mod module;
pub mod note;

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure raised by entity mutation helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityValidationError {
    /// Caller passed an empty id where one is required.
    EmptyId(&'static str),
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId(kind) => write!(f, "{kind} id is required"),
        }
    }
}

impl Error for EntityValidationError {}

/// Returns the next free id for a list of existing ids.
///
/// Non-numeric ids are ignored when computing the maximum. When the maximum
/// is `u64::MAX`, the smallest unused positive id is returned instead.
pub fn next_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let used: BTreeSet<u64> = existing
        .into_iter()
        .filter_map(|id| id.trim().parse::<u64>().ok())
        .collect();
    let max = used.last().copied().unwrap_or(0);
    let next = max
        .checked_add(1)
        .unwrap_or_else(|| (1..).find(|id| !used.contains(id)).unwrap_or(max));
    next.to_string()
}
