//! Application context for one open collection.
//!
//! # Responsibility
//! - Hold configuration, the store and the currently open collection.
//! - Route "new", "open", "save", "save as" and "render" requests.
//!
//! # Invariants
//! - At most one collection is open; opening or creating another replaces it.
//! - `save` is always incremental and `save_as` always a full rewrite; the
//!   two are never merged.

use crate::config::{ConfigError, CoreConfig};
use crate::model::collection::NotesCollection;
use crate::render::{render_meeting, RenderError};
use crate::store::collection_store::{CollectionStore, LoadReport, SaveSummary, SkippedNote};
use crate::store::{DirtySaveError, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Failure surfaced by the application context.
#[derive(Debug)]
pub enum ContextError {
    /// Operation needs an open collection.
    NoCollection,
    Config(ConfigError),
    Store(StoreError),
    DirtySave(DirtySaveError),
    Render(RenderError),
}

impl Display for ContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCollection => f.write_str("no collection is open"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::DirtySave(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoCollection => None,
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::DirtySave(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ContextError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for ContextError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<DirtySaveError> for ContextError {
    fn from(value: DirtySaveError) -> Self {
        Self::DirtySave(value)
    }
}

impl From<RenderError> for ContextError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

/// Explicit, typed replacement for shared UI state.
pub struct AppContext {
    config: CoreConfig,
    store: CollectionStore,
    collection: Option<NotesCollection>,
}

impl AppContext {
    pub fn new(config: CoreConfig) -> Self {
        let store = CollectionStore::new(config.data_root.clone());
        Self {
            config,
            store,
            collection: None,
        }
    }

    /// Builds a context from environment configuration.
    pub fn from_env() -> Result<Self, ContextError> {
        Ok(Self::new(CoreConfig::from_env()?))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn collection(&self) -> Option<&NotesCollection> {
        self.collection.as_ref()
    }

    pub fn collection_mut(&mut self) -> Option<&mut NotesCollection> {
        self.collection.as_mut()
    }

    /// Replaces the open collection with a fresh default one.
    pub fn new_collection(&mut self, name: impl Into<String>) -> &mut NotesCollection {
        self.collection.insert(self.store.create(name))
    }

    /// Loads `directory` and makes it the open collection.
    ///
    /// Returns the notes that were skipped while loading.
    pub fn open_collection(
        &mut self,
        directory: impl AsRef<Path>,
    ) -> Result<Vec<SkippedNote>, ContextError> {
        let LoadReport {
            collection,
            skipped,
        } = self.store.load_with_report(directory)?;
        self.collection = Some(collection);
        Ok(skipped)
    }

    /// Incremental save of dirty notes.
    pub fn save(&mut self) -> Result<SaveSummary, ContextError> {
        let collection = self.collection.as_mut().ok_or(ContextError::NoCollection)?;
        Ok(self.store.save_dirty(collection)?)
    }

    /// Full rewrite, optionally under a new name.
    pub fn save_as(&mut self, name: Option<&str>) -> Result<SaveSummary, ContextError> {
        let collection = self.collection.as_mut().ok_or(ContextError::NoCollection)?;
        if let Some(name) = name {
            collection.name = name.to_string();
            collection.touch();
        }
        Ok(self.store.save_all(collection)?)
    }

    /// Renders meeting `meeting_id` of the open collection.
    pub fn render(&self, meeting_id: &str) -> Result<String, ContextError> {
        let collection = self.collection.as_ref().ok_or(ContextError::NoCollection)?;
        Ok(render_meeting(collection, meeting_id)?)
    }
}
