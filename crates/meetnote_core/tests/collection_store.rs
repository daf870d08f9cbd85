use meetnote_core::{
    CollectionStatus, CollectionStore, Meeting, MeetingNote, NotesCollection, SkipReason,
    StoreError, Top,
};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn note(title: &str, body: &str) -> MeetingNote {
    let mut note = MeetingNote::new(title);
    note.notes = body.to_string();
    note
}

fn read_index(directory: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(directory.join("collection.json")).unwrap()).unwrap()
}

fn index_filenames(directory: &Path) -> Vec<String> {
    read_index(directory)["notes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["filename"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn save_all_then_load_roundtrips_collection() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Team Meetings");
    let mut kickoff = note("Kickoff", "- scope\n- owners");
    kickoff.topic = Some("Planning".to_string());
    kickoff.participants = vec!["Ana".to_string(), "Ben".to_string()];
    kickoff.todos = vec!["send invite".to_string()];
    collection.add_note(kickoff);
    collection.add_note(note("Retro", "went well"));
    let mut meeting = Meeting::new("", "Weekly Sync", "Weekly Sync Meeting");
    meeting.tops = vec![Top::text("Intro"), Top::template("1")];
    collection.add_meeting(meeting);

    let summary = store.save_all(&mut collection).unwrap();
    assert_eq!(summary.directory, root.path().join("team_meetings"));
    assert_eq!(summary.written, vec!["Kickoff", "Retro"]);
    assert_eq!(collection.status, CollectionStatus::Saved);
    assert!(collection.notes.iter().all(|note| !note.dirty));

    let loaded = store.load(&summary.directory).unwrap();
    assert_eq!(loaded.status, CollectionStatus::Loaded);
    assert_eq!(loaded.name, collection.name);
    assert_eq!(loaded.categories, collection.categories);
    assert_eq!(loaded.tags, collection.tags);
    assert_eq!(loaded.locations, collection.locations);
    assert_eq!(loaded.modules, collection.modules);
    assert_eq!(loaded.templates, collection.templates);
    assert_eq!(loaded.meetings, collection.meetings);
    assert_eq!(loaded.notes.len(), 2);
    for (loaded, original) in loaded.notes.iter().zip(&collection.notes) {
        assert_eq!(loaded.title, original.title);
        assert_eq!(loaded.topic, original.topic);
        assert_eq!(loaded.participants, original.participants);
        assert_eq!(loaded.notes, original.notes);
        assert_eq!(loaded.todos, original.todos);
        assert_eq!(loaded.created_at, original.created_at);
        assert_eq!(loaded.filename, original.filename);
        assert!(!loaded.dirty);
    }
}

#[test]
fn index_carries_metadata_and_note_count() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Board");
    collection.add_note(note("Budget", ""));

    let summary = store.save_all(&mut collection).unwrap();
    let index = read_index(&summary.directory);
    assert_eq!(index["collection_name"], json!("Board"));
    assert_eq!(index["slug"], json!("board"));
    assert_eq!(index["note_count"], json!(1));
    assert_eq!(
        index["notes"],
        json!([{"title": "Budget", "filename": "budget.json"}])
    );
    assert!(index["created_at"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn colliding_titles_get_numbered_files() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Board");
    for body in ["one", "two", "three"] {
        collection.add_note(note("Weekly Sync", body));
    }

    let summary = store.save_all(&mut collection).unwrap();
    assert_eq!(
        index_filenames(&summary.directory),
        vec!["weekly_sync.json", "weekly_sync_2.json", "weekly_sync_3.json"]
    );

    // Re-saving the same collection keeps the same names.
    store.save_all(&mut collection).unwrap();
    assert_eq!(
        index_filenames(&summary.directory),
        vec!["weekly_sync.json", "weekly_sync_2.json", "weekly_sync_3.json"]
    );
}

#[test]
fn save_all_skips_untitled_and_removes_dropped_notes() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Board");
    collection.add_note(note("Keep", ""));
    collection.add_note(note("Drop", ""));
    collection.add_note(note("   ", "untitled"));
    let summary = store.save_all(&mut collection).unwrap();
    assert_eq!(index_filenames(&summary.directory), vec!["keep.json", "drop.json"]);

    collection.notes.retain(|note| note.title != "Drop");
    store.save_all(&mut collection).unwrap();
    assert_eq!(index_filenames(&summary.directory), vec!["keep.json"]);
    assert!(!summary.directory.join("drop.json").exists());
}

#[test]
fn load_missing_index_is_not_found() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let err = store.load(root.path().join("nope")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn load_skips_missing_and_corrupt_notes() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Board");
    for title in ["Alpha", "Beta", "Gamma"] {
        collection.add_note(note(title, "body"));
    }
    let summary = store.save_all(&mut collection).unwrap();
    fs::remove_file(summary.directory.join("alpha.json")).unwrap();
    fs::write(summary.directory.join("beta.json"), "{not json").unwrap();

    let report = store.load_with_report(&summary.directory).unwrap();
    let titles: Vec<&str> = report
        .collection
        .notes
        .iter()
        .map(|note| note.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Gamma"]);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].filename, "alpha.json");
    assert_eq!(report.skipped[0].reason, SkipReason::Missing);
    assert!(matches!(report.skipped[1].reason, SkipReason::Malformed(_)));
}

#[test]
fn load_accepts_older_index_and_line_list_bodies() {
    let root = tempfile::tempdir().unwrap();
    let directory = root.path().join("legacy");
    fs::create_dir_all(&directory).unwrap();
    fs::write(
        directory.join("collection.json"),
        json!({
            "collection_name": "Legacy",
            "notes": [
                {"title": "Old", "filename": "old.json"},
                {"title": "Escape", "filename": "../outside.json"}
            ],
            "categories": ["Standard"]
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        directory.join("old.json"),
        json!({"title": "Old", "notes": ["- a", "- b"], "todos": null}).to_string(),
    )
    .unwrap();

    let report = CollectionStore::new(root.path())
        .load_with_report(&directory)
        .unwrap();
    let collection = report.collection;
    assert_eq!(collection.name, "Legacy");
    assert!(collection.modules.is_empty());
    assert!(collection.meetings.is_empty());
    assert_eq!(collection.notes[0].notes, "- a\n- b");
    assert_eq!(report.skipped[0].reason, SkipReason::UnsafeFilename);
}

#[test]
fn save_dirty_writes_only_dirty_notes_and_keeps_backup() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Board");
    collection.add_note(note("Alpha", "v1"));
    collection.add_note(note("Beta", "v1"));
    let summary = store.save_all(&mut collection).unwrap();
    let beta_before = fs::read(summary.directory.join("beta.json")).unwrap();

    collection.notes[0].notes = "v2".to_string();
    collection.notes[0].mark_dirty();
    let saved = store.save_dirty(&mut collection).unwrap();
    assert_eq!(saved.written, vec!["Alpha"]);
    assert!(collection.dirty_notes().next().is_none());
    assert_eq!(collection.status, CollectionStatus::Saved);

    let alpha: Value =
        serde_json::from_str(&fs::read_to_string(summary.directory.join("alpha.json")).unwrap())
            .unwrap();
    assert_eq!(alpha["notes"], json!("v2"));
    let backup: Value = serde_json::from_str(
        &fs::read_to_string(summary.directory.join("alpha.json.bak")).unwrap(),
    )
    .unwrap();
    assert_eq!(backup["notes"], json!("v1"));
    assert_eq!(fs::read(summary.directory.join("beta.json")).unwrap(), beta_before);
    assert!(!summary.directory.join("beta.json.bak").exists());
}

#[test]
fn save_dirty_on_new_collection_allocates_files_and_index() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = NotesCollection::empty("Fresh");
    collection.add_note(note("Weekly Sync", "a"));
    collection.add_note(note("Weekly Sync", "b"));

    let summary = store.save_dirty(&mut collection).unwrap();
    assert_eq!(
        index_filenames(&summary.directory),
        vec!["weekly_sync.json", "weekly_sync_2.json"]
    );
    assert_eq!(
        collection.notes[1].filename.as_deref(),
        Some("weekly_sync_2.json")
    );
}

#[test]
fn save_dirty_failure_keeps_earlier_notes_saved() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Board");
    for title in ["Alpha", "Beta", "Gamma"] {
        collection.add_note(note(title, "body"));
    }
    let directory = store.collection_dir("Board");
    fs::create_dir_all(directory.join("beta.json.tmp")).unwrap();

    let err = store.save_dirty(&mut collection).unwrap_err();
    assert_eq!(err.failed_title.as_deref(), Some("Beta"));
    assert_eq!(err.saved_titles, vec!["Alpha"]);
    assert!(err.to_string().contains("1 note(s) saved before the failure remain saved"));

    assert!(!collection.notes[0].dirty);
    assert!(collection.notes[1].dirty);
    assert!(collection.notes[2].dirty);
    assert!(directory.join("alpha.json").is_file());
    assert!(!directory.join("beta.json").exists());
    assert_eq!(index_filenames(&directory), vec!["alpha.json"]);
}

#[test]
fn rename_note_file_moves_file_and_updates_index() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Board");
    collection.add_note(note("Weekly Sync", "body"));
    let summary = store.save_all(&mut collection).unwrap();

    let target = store
        .rename_note_file(&mut collection, "Weekly Sync", "Retro")
        .unwrap();
    assert_eq!(target, summary.directory.join("retro.json"));
    assert!(target.is_file());
    assert!(!summary.directory.join("weekly_sync.json").exists());
    assert_eq!(collection.notes[0].title, "Retro");
    assert_eq!(collection.notes[0].filename.as_deref(), Some("retro.json"));
    assert!(collection.notes[0].dirty);
    assert_eq!(index_filenames(&summary.directory), vec!["retro.json"]);
}

#[test]
fn rename_note_file_never_overwrites() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Board");
    collection.add_note(note("Alpha", "a"));
    collection.add_note(note("Beta", "b"));
    let summary = store.save_all(&mut collection).unwrap();

    let err = store
        .rename_note_file(&mut collection, "Alpha", "Beta")
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));
    assert!(summary.directory.join("alpha.json").is_file());

    let err = store
        .rename_note_file(&mut collection, "Missing", "Other")
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn save_dirty_after_rename_writes_clean_notes_into_new_directory() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut collection = store.create("Board");
    collection.add_note(note("Alpha", "a"));
    collection.add_note(note("Beta", "b"));
    store.save_all(&mut collection).unwrap();

    collection.name = "Board Two".to_string();
    collection.notes[1].mark_dirty();
    let summary = store.save_dirty(&mut collection).unwrap();

    assert_eq!(summary.directory, root.path().join("board_two"));
    assert_eq!(summary.written, vec!["Alpha", "Beta"]);
    for filename in index_filenames(&summary.directory) {
        assert!(
            summary.directory.join(&filename).is_file(),
            "index lists missing {filename}"
        );
    }
    let loaded = store.load_with_report(&summary.directory).unwrap();
    assert!(loaded.skipped.is_empty());
    assert_eq!(loaded.collection.notes.len(), 2);
}

#[test]
fn save_all_leaves_files_of_another_collection_alone() {
    let root = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(root.path());
    let mut first = store.create("Board!");
    first.add_note(note("Secret", "keep me"));
    let summary = store.save_all(&mut first).unwrap();
    let secret_before = fs::read(summary.directory.join("secret.json")).unwrap();

    let mut second = store.create("Board");
    second.add_note(note("Other", ""));
    second.add_note(note("Secret", "mine"));
    let second_summary = store.save_all(&mut second).unwrap();

    assert_eq!(second_summary.directory, summary.directory);
    assert_eq!(
        fs::read(summary.directory.join("secret.json")).unwrap(),
        secret_before
    );
    assert_eq!(
        index_filenames(&summary.directory),
        vec!["other.json", "secret_2.json"]
    );
}
