use meetnote_core::model::next_id;
use meetnote_core::{CollectionStatus, Meeting, MeetingNote, Module, NotesCollection, Template, Top};
use serde_json::json;

#[test]
fn tops_use_type_tagged_wire_form() {
    let tops = vec![Top::text("Intro"), Top::module("3"), Top::template("1")];
    let encoded = serde_json::to_value(&tops).unwrap();
    assert_eq!(
        encoded,
        json!([
            {"type": "text", "value": "Intro"},
            {"type": "modules", "id": "3"},
            {"type": "templates", "id": "1"}
        ])
    );

    let decoded: Vec<Top> = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, tops);
}

#[test]
fn text_top_tolerates_extra_id_field() {
    let top: Top = serde_json::from_value(json!({"type": "text", "id": "7", "value": "Intro"})).unwrap();
    assert_eq!(top, Top::text("Intro"));
}

#[test]
fn missing_optional_fields_fall_back_to_defaults() {
    let meeting: Meeting = serde_json::from_value(json!({"id": "1"})).unwrap();
    assert_eq!(meeting.name, "Unnamed");
    assert_eq!(meeting.kind, "Meeting");
    assert!(meeting.tops.is_empty());

    let module: Module = serde_json::from_value(json!({"id": "2", "name": "Risks"})).unwrap();
    assert_eq!(module.headline, "Unnamed Module");
    assert_eq!(module.content, "");
}

#[test]
fn move_helpers_reorder_and_reject_out_of_range() {
    let mut meeting = Meeting::new("1", "Sync", "Weekly");
    meeting.tops = vec![Top::text("a"), Top::text("b"), Top::text("c")];
    assert!(meeting.move_top(2, 0));
    assert_eq!(
        meeting.tops,
        vec![Top::text("c"), Top::text("a"), Top::text("b")]
    );
    assert!(!meeting.move_top(0, 3));

    let mut template = Template::new("1", "Quick");
    template.modules = vec!["1".into(), "2".into(), "3".into()];
    assert!(template.move_module(0, 2));
    assert_eq!(template.modules, vec!["2", "3", "1"]);
    assert!(!template.move_module(5, 0));
    assert_eq!(template.modules, vec!["2", "3", "1"]);
}

#[test]
fn next_id_is_monotonic_over_gaps() {
    assert_eq!(next_id(["1", "2", "5"]), "6");
    assert_eq!(next_id(Vec::<&str>::new()), "1");
}

#[test]
fn mutation_helpers_move_status_to_changed() {
    let mut collection = NotesCollection::with_defaults("Board");
    assert_eq!(collection.status, CollectionStatus::New);

    let template_id = collection.add_template("Short", vec!["1".into(), "6".into()]);
    assert_eq!(template_id, "2");
    assert_eq!(collection.status, CollectionStatus::Changed);

    collection.add_note(MeetingNote::new("Kickoff"));
    assert_eq!(collection.dirty_notes().count(), 1);
    assert!(collection.note_by_title("Kickoff").is_some());
}

#[test]
fn mark_dirty_refreshes_updated_at() {
    let mut note = MeetingNote {
        title: "Loaded".to_string(),
        updated_at: Some("2020-01-01T00:00:00Z".to_string()),
        ..MeetingNote::default()
    };
    note.mark_dirty();
    assert!(note.dirty);
    assert_ne!(note.updated_at.as_deref(), Some("2020-01-01T00:00:00Z"));
}
