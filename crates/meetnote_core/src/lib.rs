//! Core domain logic for MeetNote.
//! Owns the collection model, its on-disk persistence and meeting rendering.

pub mod config;
pub mod logging;
pub mod model;
pub mod render;
pub mod service;
pub mod slug;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::collection::{CollectionStatus, NotesCollection};
pub use model::meeting::{Meeting, Top};
pub use model::module::{Module, Template};
pub use model::note::MeetingNote;
pub use model::EntityValidationError;
pub use render::{
    render_meeting, render_meeting_by_name, ItemKind, ProjectDocument, ReferenceSource,
    RenderError, RenderResult,
};
pub use service::context::{AppContext, ContextError};
pub use store::collection_store::{
    CollectionStore, LoadReport, SaveSummary, SkipReason, SkippedNote,
};
pub use store::project_file::ProjectFile;
pub use store::{DirtySaveError, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
