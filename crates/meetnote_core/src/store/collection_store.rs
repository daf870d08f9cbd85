//! Directory-backed collection store.
//!
//! # Responsibility
//! - Load a collection directory into a `NotesCollection`.
//! - Persist it back, either as a full rewrite guarded by a directory backup
//!   (`save_all`) or incrementally, note by note (`save_dirty`).
//! - Keep `collection.json` a projection of the in-memory note list.
//!
//! # Invariants
//! - Loading skips (and logs) missing or malformed note files; it never
//!   fabricates a note from defaults.
//! - `save_all` leaves the directory exactly as it was before the call when
//!   any step fails.
//! - `save_dirty` has no collection-wide rollback: notes committed before a
//!   failing note stay committed, only the failing note keeps its previous
//!   file.
//! - The index never lists a file that was not committed first, nor one
//!   that is absent from the collection directory.
//! - `save_all` only deletes files listed by a previous index of the same
//!   collection.

use super::atomic::{
    copy_dir_all, read_json, remove_dir_if_exists, remove_file_if_exists, sibling_with_suffix,
    write_json_atomic,
};
use super::records::{IndexEntry, IndexFile, NoteRecord, INDEX_FILE_NAME};
use super::{DirtySaveError, StoreError, StoreResult};
use crate::model::collection::{CollectionStatus, NotesCollection};
use crate::model::note::{utc_now_iso, MeetingNote};
use crate::slug::{compact_timestamp, note_filename, slugify, unique_filename};
use chrono::Utc;
use log::{error, info, warn};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const NOTE_BACKUP_SUFFIX: &str = ".bak";

/// Why a note listed in the index was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Listed in the index but absent on disk.
    Missing,
    /// Present but could not be read.
    Unreadable(String),
    /// Present but not a valid note document.
    Malformed(String),
    /// Index entry points outside the collection directory.
    UnsafeFilename,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.write_str("file is missing"),
            Self::Unreadable(message) => write!(f, "file is unreadable: {message}"),
            Self::Malformed(message) => write!(f, "malformed note: {message}"),
            Self::UnsafeFilename => f.write_str("filename points outside the collection"),
        }
    }
}

/// Note skipped during a degraded load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNote {
    pub filename: String,
    pub reason: SkipReason,
}

/// Result of `load_with_report`.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub collection: NotesCollection,
    pub skipped: Vec<SkippedNote>,
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    /// Collection directory that was written.
    pub directory: PathBuf,
    /// Titles of the notes written by this call, in collection order.
    pub written: Vec<String>,
}

/// Single authority for reading and writing collection directories under one
/// data root.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    data_root: PathBuf,
}

impl CollectionStore {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Directory a collection with `name` is stored in.
    pub fn collection_dir(&self, name: &str) -> PathBuf {
        self.data_root.join(slugify(name))
    }

    /// Builds a new collection with default content. No disk I/O.
    pub fn create(&self, name: impl Into<String>) -> NotesCollection {
        NotesCollection::with_defaults(name)
    }

    /// Loads a collection directory, skipping unreadable notes.
    pub fn load(&self, directory: impl AsRef<Path>) -> StoreResult<NotesCollection> {
        self.load_with_report(directory).map(|report| report.collection)
    }

    /// Loads a collection directory and reports every skipped note.
    ///
    /// # Errors
    /// - `NotFound` when `<directory>/collection.json` does not exist.
    /// - `Parse` / `Io` when the index itself cannot be read.
    pub fn load_with_report(&self, directory: impl AsRef<Path>) -> StoreResult<LoadReport> {
        let started_at = Instant::now();
        let directory = directory.as_ref();
        let index_path = directory.join(INDEX_FILE_NAME);
        info!(
            "event=collection_load module=store status=start dir={}",
            directory.display()
        );

        let index: IndexFile = match read_json(&index_path) {
            Ok(index) => index,
            Err(err) => {
                error!(
                    "event=collection_load module=store status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        let mut notes = Vec::with_capacity(index.notes.len());
        let mut skipped = Vec::new();
        for entry in &index.notes {
            match load_note(directory, entry) {
                Ok(note) => notes.push(note),
                Err(reason) => {
                    warn!(
                        "event=note_skipped module=store status=warn filename={} reason={}",
                        entry.filename, reason
                    );
                    skipped.push(SkippedNote {
                        filename: entry.filename.clone(),
                        reason,
                    });
                }
            }
        }

        let now = Utc::now();
        let collection = NotesCollection {
            name: index.collection_name,
            notes,
            categories: index.categories,
            tags: index.tags,
            modules: index.modules,
            templates: index.templates,
            meetings: index.meetings,
            locations: index.locations,
            created_at: index.created_at.unwrap_or(now),
            updated_at: index.updated_at.unwrap_or(now),
            status: CollectionStatus::Loaded,
        };

        info!(
            "event=collection_load module=store status=ok notes={} skipped={} duration_ms={}",
            collection.notes.len(),
            skipped.len(),
            started_at.elapsed().as_millis()
        );
        Ok(LoadReport {
            collection,
            skipped,
        })
    }

    /// Rewrites the whole collection directory.
    ///
    /// The existing directory is copied to `<dir>.bak_<timestamp>` first. If
    /// any note or the index fails to commit, the directory is restored from
    /// that copy (or removed, if it did not exist before) and the original
    /// error is returned. The backup is deleted once the call is over.
    ///
    /// Notes without a title are not written.
    pub fn save_all(&self, collection: &mut NotesCollection) -> StoreResult<SaveSummary> {
        let started_at = Instant::now();
        if collection.name.trim().is_empty() {
            return Err(StoreError::InvalidCollection(
                "collection name is required".to_string(),
            ));
        }

        let slug = slugify(&collection.name);
        let directory = self.data_root.join(&slug);
        info!(
            "event=collection_save_all module=store status=start dir={} notes={}",
            directory.display(),
            collection.notes.len()
        );

        fs::create_dir_all(&self.data_root)
            .map_err(StoreError::io("create directory", &self.data_root))?;
        let backup = if directory.exists() {
            Some(backup_directory(&directory)?)
        } else {
            None
        };

        match write_full_collection(collection, &directory, &slug) {
            Ok(assigned) => {
                if let Some(backup) = &backup {
                    if let Err(err) = remove_dir_if_exists(backup) {
                        warn!(
                            "event=backup_cleanup module=store status=error path={} error={}",
                            backup.display(),
                            err
                        );
                    }
                }

                let mut written = Vec::with_capacity(assigned.len());
                for (index, filename) in assigned {
                    let note = &mut collection.notes[index];
                    note.filename = Some(filename);
                    note.dirty = false;
                    written.push(note.title.clone());
                }
                collection.updated_at = Utc::now();
                collection.status = CollectionStatus::Saved;

                info!(
                    "event=collection_save_all module=store status=ok notes={} duration_ms={}",
                    written.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(SaveSummary { directory, written })
            }
            Err(err) => {
                error!(
                    "event=collection_save_all module=store status=error error_code={} error={}",
                    err.code(),
                    err
                );
                match restore_directory(&directory, backup.as_deref()) {
                    Ok(()) => {
                        info!(
                            "event=collection_save_all module=store status=rolled_back dir={} duration_ms={}",
                            directory.display(),
                            started_at.elapsed().as_millis()
                        );
                        Err(err)
                    }
                    Err(rollback) => {
                        error!(
                            "event=collection_save_all module=store status=rollback_failed error={}",
                            rollback
                        );
                        Err(StoreError::RollbackFailed {
                            original: Box::new(err),
                            rollback: Box::new(rollback),
                            backup,
                        })
                    }
                }
            }
        }
    }

    /// Writes only notes flagged `dirty`, then rewrites the index.
    ///
    /// Clean notes whose file is absent from the target directory (the
    /// collection was renamed or loaded from elsewhere) are written as well.
    /// Each overwritten file is first copied to `<file>.bak` (single slot, so
    /// only the immediately previous version survives). A note that fails to
    /// commit keeps its previous file and stops the batch; notes committed
    /// before it stay committed and the index is still rewritten so they are
    /// reachable. The error lists what was saved.
    pub fn save_dirty(
        &self,
        collection: &mut NotesCollection,
    ) -> Result<SaveSummary, DirtySaveError> {
        let started_at = Instant::now();
        let fail = |failed_title: Option<String>, saved_titles: Vec<String>, source: StoreError| {
            DirtySaveError {
                failed_title,
                saved_titles,
                source,
            }
        };
        if collection.name.trim().is_empty() {
            return Err(fail(
                None,
                Vec::new(),
                StoreError::InvalidCollection("collection name is required".to_string()),
            ));
        }

        let slug = slugify(&collection.name);
        let directory = self.data_root.join(&slug);
        if let Err(err) = fs::create_dir_all(&directory) {
            return Err(fail(
                None,
                Vec::new(),
                StoreError::io("create directory", &directory)(err),
            ));
        }

        let mut saved = Vec::new();
        let mut failure: Option<(String, StoreError)> = None;
        for index in 0..collection.notes.len() {
            let note = &collection.notes[index];
            if !note.is_persistable() || !(note.dirty || file_missing(&directory, note)) {
                continue;
            }

            let filename = match &note.filename {
                Some(filename) => filename.clone(),
                None => allocate_filename(collection, index, &directory),
            };
            match write_note_with_backup(&directory, &filename, &collection.notes[index]) {
                Ok(()) => {
                    let note = &mut collection.notes[index];
                    note.filename = Some(filename.clone());
                    note.dirty = false;
                    info!(
                        "event=note_save_dirty module=store status=ok filename={}",
                        filename
                    );
                    saved.push(note.title.clone());
                }
                Err(err) => {
                    error!(
                        "event=note_save_dirty module=store status=error filename={} error_code={} error={}",
                        filename,
                        err.code(),
                        err
                    );
                    failure = Some((collection.notes[index].title.clone(), err));
                    break;
                }
            }
        }

        let index_result = write_index(collection, &directory, &slug);
        if let Some((title, err)) = failure {
            if let Err(index_err) = index_result {
                error!(
                    "event=index_write module=store status=error error_code={} error={}",
                    index_err.code(),
                    index_err
                );
            }
            return Err(fail(Some(title), saved, err));
        }
        if let Err(err) = index_result {
            return Err(fail(None, saved, err));
        }

        collection.updated_at = Utc::now();
        collection.status = CollectionStatus::Saved;
        info!(
            "event=collection_save_dirty module=store status=ok notes={} duration_ms={}",
            saved.len(),
            started_at.elapsed().as_millis()
        );
        Ok(SaveSummary {
            directory,
            written: saved,
        })
    }

    /// Renames a note file after its title changed.
    ///
    /// The source is the note's current file (or `<slug(old_title)>.json` when
    /// the note was never written), the destination is
    /// `<slug(new_title)>.json`. Existing files are never overwritten. On
    /// success the in-memory note takes the new title and file, is marked
    /// dirty so its body is rewritten by the next incremental save, and the
    /// index is rewritten to point at the new file.
    ///
    /// # Errors
    /// - `NotFound` when the source file does not exist.
    /// - `AlreadyExists` when the destination file exists.
    pub fn rename_note_file(
        &self,
        collection: &mut NotesCollection,
        old_title: &str,
        new_title: &str,
    ) -> StoreResult<PathBuf> {
        let slug = slugify(&collection.name);
        let directory = self.data_root.join(&slug);
        let note_index = collection
            .notes
            .iter()
            .position(|note| note.title == old_title);
        let source_name = note_index
            .and_then(|index| collection.notes[index].filename.clone())
            .unwrap_or_else(|| note_filename(old_title));
        let target_name = note_filename(new_title);
        let source = directory.join(&source_name);
        let target = directory.join(&target_name);

        if !source.is_file() {
            return Err(StoreError::NotFound(source));
        }
        if target.exists() {
            return Err(StoreError::AlreadyExists(target));
        }
        fs::rename(&source, &target).map_err(StoreError::io("rename", &source))?;
        info!(
            "event=note_rename module=store status=ok from={} to={}",
            source_name, target_name
        );

        if let Some(index) = note_index {
            let note = &mut collection.notes[index];
            note.title = new_title.to_string();
            note.filename = Some(target_name);
            note.mark_dirty();
            collection.touch();
        }
        write_index(collection, &directory, &slug)?;
        Ok(target)
    }
}

fn load_note(directory: &Path, entry: &IndexEntry) -> Result<MeetingNote, SkipReason> {
    if !is_plain_file_name(&entry.filename) {
        return Err(SkipReason::UnsafeFilename);
    }
    let path = directory.join(&entry.filename);
    match read_json::<NoteRecord>(&path) {
        Ok(record) => Ok(record.into_note(&entry.filename, &entry.title)),
        Err(StoreError::NotFound(_)) => Err(SkipReason::Missing),
        Err(StoreError::Parse { source, .. }) => Err(SkipReason::Malformed(source.to_string())),
        Err(other) => Err(SkipReason::Unreadable(other.to_string())),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

fn backup_directory(directory: &Path) -> StoreResult<PathBuf> {
    let suffix = format!(".bak_{}", compact_timestamp(Utc::now()));
    let backup = sibling_with_suffix(directory, &suffix);
    remove_dir_if_exists(&backup)?;
    copy_dir_all(directory, &backup)?;
    info!(
        "event=collection_backup module=store status=ok path={}",
        backup.display()
    );
    Ok(backup)
}

fn restore_directory(directory: &Path, backup: Option<&Path>) -> StoreResult<()> {
    remove_dir_if_exists(directory)?;
    if let Some(backup) = backup {
        copy_dir_all(backup, directory)?;
        remove_dir_if_exists(backup)?;
    }
    Ok(())
}

/// Writes every titled note, the index, then drops files the previous index
/// owned but the new one no longer lists. Returns `(note index, filename)`
/// for each written note.
fn write_full_collection(
    collection: &NotesCollection,
    directory: &Path,
    slug: &str,
) -> StoreResult<Vec<(usize, String)>> {
    fs::create_dir_all(directory).map_err(StoreError::io("create directory", directory))?;

    let previously_owned = previous_index_files(directory, &collection.name);
    let updated_at = utc_now_iso();
    let mut queued: HashSet<String> = HashSet::new();
    let mut entries = Vec::new();
    let mut assigned = Vec::new();

    for (index, note) in collection.notes.iter().enumerate() {
        if !note.is_persistable() {
            continue;
        }
        let filename = unique_filename(&slugify(&note.title), |candidate| {
            queued.contains(candidate)
                || (!previously_owned.contains(candidate) && directory.join(candidate).exists())
        });
        queued.insert(filename.clone());

        let record = NoteRecord::from_note(note, &updated_at);
        write_json_atomic(&directory.join(&filename), &record)?;
        entries.push(IndexEntry {
            title: note.title.clone(),
            filename: filename.clone(),
        });
        assigned.push((index, filename));
    }

    let index = IndexFile::project(collection, slug, entries, Utc::now());
    write_json_atomic(&directory.join(INDEX_FILE_NAME), &index)?;
    info!(
        "event=index_write module=store status=ok notes={}",
        index.note_count
    );

    for stale in previously_owned.difference(&queued) {
        if is_plain_file_name(stale) {
            remove_file_if_exists(&directory.join(stale))?;
        }
    }
    Ok(assigned)
}

/// File names listed by the index currently on disk.
///
/// Empty unless that index is readable and belongs to `collection_name`;
/// another collection slugging to the same directory owns nothing here.
fn previous_index_files(directory: &Path, collection_name: &str) -> HashSet<String> {
    match read_json::<IndexFile>(&directory.join(INDEX_FILE_NAME)) {
        Ok(index) if index.collection_name == collection_name => {
            index.filenames().map(str::to_string).collect()
        }
        Ok(_) => {
            info!(
                "event=index_read module=store status=foreign_index dir={}",
                directory.display()
            );
            HashSet::new()
        }
        Err(StoreError::NotFound(_)) => HashSet::new(),
        Err(err) => {
            warn!(
                "event=index_read module=store status=warn error_code={} error={}",
                err.code(),
                err
            );
            HashSet::new()
        }
    }
}

/// Picks a free file name for a note that has never been written.
fn allocate_filename(collection: &NotesCollection, index: usize, directory: &Path) -> String {
    let slug = slugify(&collection.notes[index].title);
    unique_filename(&slug, |candidate| {
        collection
            .notes
            .iter()
            .enumerate()
            .any(|(other, note)| other != index && note.filename.as_deref() == Some(candidate))
            || directory.join(candidate).exists()
    })
}

fn write_note_with_backup(
    directory: &Path,
    filename: &str,
    note: &MeetingNote,
) -> StoreResult<()> {
    let path = directory.join(filename);
    if path.is_file() {
        let backup = sibling_with_suffix(&path, NOTE_BACKUP_SUFFIX);
        fs::copy(&path, &backup).map_err(StoreError::io("copy", &path))?;
    }
    let record = NoteRecord::from_note(note, &utc_now_iso());
    write_json_atomic(&path, &record)
}

/// Whether `note` has no committed file inside `directory`.
fn file_missing(directory: &Path, note: &MeetingNote) -> bool {
    note.filename
        .as_ref()
        .map_or(true, |filename| !directory.join(filename).is_file())
}

/// Rewrites the index from notes whose file exists in `directory`.
fn write_index(collection: &NotesCollection, directory: &Path, slug: &str) -> StoreResult<()> {
    let entries = collection
        .notes
        .iter()
        .filter(|note| !file_missing(directory, note))
        .filter_map(|note| {
            note.filename.as_ref().map(|filename| IndexEntry {
                title: note.title.clone(),
                filename: filename.clone(),
            })
        })
        .collect();
    let index = IndexFile::project(collection, slug, entries, Utc::now());
    write_json_atomic(&directory.join(INDEX_FILE_NAME), &index)?;
    info!(
        "event=index_write module=store status=ok notes={}",
        index.note_count
    );
    Ok(())
}
