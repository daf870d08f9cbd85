use meetnote_core::{render_meeting, ItemKind, Meeting, Module, NotesCollection, RenderError, Top};

fn weekly_sync(tops: Vec<Top>) -> NotesCollection {
    let mut collection = NotesCollection::empty("Board");
    collection
        .modules
        .push(Module::new("1", "status", "Status", "All green"));
    let mut meeting = Meeting::new("1", "Weekly Sync", "Weekly Sync Meeting");
    meeting.tops = tops;
    collection.meetings.push(meeting);
    collection
}

#[test]
fn renders_text_and_module_tops_in_order() {
    let collection = weekly_sync(vec![Top::text("Intro"), Top::module("1")]);
    assert_eq!(
        render_meeting(&collection, "1").unwrap(),
        "# Weekly Sync Meeting - Weekly Sync\n\n# Intro\n\n# Status\n\nAll green"
    );
}

#[test]
fn dangling_module_names_the_meeting() {
    let collection = weekly_sync(vec![Top::text("Intro"), Top::module("99")]);
    let err = render_meeting(&collection, "1").unwrap_err();
    assert_eq!(
        err,
        RenderError::ItemNotFound {
            item_type: ItemKind::Module,
            name: "99".to_string(),
            referenced_in: Some("meeting 'Weekly Sync'".to_string()),
        }
    );
}

#[test]
fn unknown_meeting_is_item_not_found() {
    let collection = weekly_sync(Vec::new());
    let err = render_meeting(&collection, "42").unwrap_err();
    assert!(matches!(
        err,
        RenderError::ItemNotFound { item_type: ItemKind::Meeting, ref name, referenced_in: None } if name == "42"
    ));
}

#[test]
fn templates_expand_their_modules_in_template_order() {
    let mut collection = NotesCollection::with_defaults("Board");
    for module in &mut collection.modules {
        module.content = format!("{} body", module.name);
    }
    let mut meeting = Meeting::new("", "Kickoff", "Planning");
    meeting.tops = vec![Top::template("1"), Top::text("Wrap-up")];
    let id = collection.add_meeting(meeting);

    let rendered = render_meeting(&collection, &id).unwrap();
    let headings: Vec<&str> = rendered
        .lines()
        .filter(|line| line.starts_with("# "))
        .collect();
    assert_eq!(
        headings,
        vec![
            "# Planning - Kickoff",
            "# Topic",
            "# Date",
            "# Time",
            "# Participants",
            "# Location",
            "# Notes",
            "# Wrap-up",
        ]
    );
    assert!(!rendered.contains("Quick"));
    assert!(rendered.ends_with("# Wrap-up"));
}

#[test]
fn dangling_module_inside_template_names_template_and_meeting() {
    let mut collection = weekly_sync(vec![Top::template("1")]);
    collection
        .add_template("Broken", vec!["1".to_string(), "7".to_string()]);

    let err = render_meeting(&collection, "1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Module '7' not found (referenced in template 'Broken' in meeting 'Weekly Sync')"
    );
}

#[test]
fn missing_template_is_reported_with_kind_template() {
    let collection = weekly_sync(vec![Top::template("5")]);
    let err = render_meeting(&collection, "1").unwrap_err();
    assert!(matches!(
        err,
        RenderError::ItemNotFound { item_type: ItemKind::Template, .. }
    ));
}

#[test]
fn rendering_is_deterministic_and_trims_trailing_whitespace() {
    let mut collection = weekly_sync(vec![Top::module("1"), Top::module("2")]);
    collection
        .modules
        .push(Module::new("2", "empty", "Empty", "  \n\n"));
    let first = render_meeting(&collection, "1").unwrap();
    assert_eq!(first, render_meeting(&collection, "1").unwrap());
    assert!(first.ends_with("# Empty"));
}
