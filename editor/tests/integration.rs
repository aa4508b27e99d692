use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use editor::collapse::COLLAPSED;
use editor::{
    CollapseStore, Editor, Extensions, Host, JsonFileStore, KeyValueStore, MemoryStore, Selection,
    StoreError, ToastType,
};
use proptest::prelude::*;
use richdoc::nodes::Heading;
use richdoc::{Attrs, Document, Element, NodeType};

const SCENARIO: &str = "# Getting Started\n\n## Setup\n\n## Setup";

/// A memory store the test can still inspect after handing it to the editor.
#[derive(Clone, Default)]
struct SharedStore(Arc<Mutex<MemoryStore>>);

impl SharedStore {
    fn keys(&self) -> Vec<String> {
        self.0.lock().unwrap().keys().map(str::to_string).collect()
    }
}

impl KeyValueStore for SharedStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.lock().unwrap().get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.lock().unwrap().set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.0.lock().unwrap().remove_item(key)
    }
}

struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove_item(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

#[derive(Default)]
struct RecordingHost {
    clipboard: Option<String>,
    toasts: Vec<(String, ToastType)>,
}

impl Host for RecordingHost {
    fn location(&self) -> String {
        "https://notes.test/doc/42#old-anchor".to_string()
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        self.clipboard = Some(text.to_string());
    }

    fn show_toast(&mut self, message: &str, kind: ToastType) {
        self.toasts.push((message.to_string(), kind));
    }
}

fn open(source: &str) -> Editor {
    Editor::from_markup(Extensions::standard(), source, 0, CollapseStore::detached("doc")).unwrap()
}

fn open_with_store(source: &str, store: &SharedStore) -> Editor {
    let collapse = CollapseStore::new("doc", Box::new(store.clone()));
    Editor::from_markup(Extensions::standard(), source, 0, collapse).unwrap()
}

fn blank() -> Editor {
    Editor::new(
        Extensions::standard(),
        Document::new(vec![Element::paragraph("")]),
        CollapseStore::detached("doc"),
    )
    .unwrap()
}

fn type_text(editor: &mut Editor, text: &str) {
    for ch in text.chars() {
        editor.handle_text_input(&ch.to_string()).unwrap();
    }
}

fn anchor_keys(editor: &Editor) -> Vec<(usize, String)> {
    editor
        .decorations()
        .widgets()
        .iter()
        .map(|w| (w.pos, w.key.clone()))
        .collect()
}

fn kinds(editor: &Editor) -> Vec<NodeType> {
    editor.doc().content.iter().map(|e| e.kind).collect()
}

// ---------------------------------------------------------------------------
// Anchors and decorations
// ---------------------------------------------------------------------------

#[test]
fn scenario_anchors() {
    let editor = open(SCENARIO);
    assert_eq!(
        anchor_keys(&editor),
        vec![
            (0, "getting-started".to_string()),
            (17, "setup".to_string()),
            (24, "setup-1".to_string()),
        ]
    );
    assert!(editor.decorations().widgets().iter().all(|w| w.side == -1));
}

#[test]
fn anchors_follow_edits_but_not_selection() {
    let mut editor = open(SCENARIO);
    let before = editor.decorations();

    editor.set_selection(Selection::cursor(20));
    assert_eq!(editor.decorations(), before);
    assert_eq!(editor.state().version(), 0);

    // Rename the first "Setup" so the second one loses its suffix.
    editor.set_selection(Selection::cursor(23));
    type_text(&mut editor, " A");
    assert_eq!(editor.state().version(), 2);
    assert_eq!(
        anchor_keys(&editor),
        vec![
            (0, "getting-started".to_string()),
            (17, "setup-a".to_string()),
            (26, "setup".to_string()),
        ]
    );
}

#[test]
fn html_carries_anchor_widgets() {
    let editor = open(SCENARIO);
    let html = editor.render_html();
    assert!(html.contains(
        "<a id=\"setup-1\" class=\"heading-name\" data-fold=\"expanded\"></a><h2>"
    ));
    assert!(html.contains("<span class=\"heading-content\">Setup</span>"));
}

#[test]
fn copy_link_replaces_fragment() {
    let editor = open(SCENARIO);
    let mut host = RecordingHost::default();
    let link = editor.copy_link(&mut host, 24).unwrap();
    assert_eq!(link, "https://notes.test/doc/42#setup-1");
    assert_eq!(host.clipboard.as_deref(), Some(link.as_str()));
    assert_eq!(
        host.toasts,
        vec![("Link copied to clipboard".to_string(), ToastType::Info)]
    );

    assert!(editor.copy_link(&mut host, 3).is_err());
}

// ---------------------------------------------------------------------------
// Collapse state
// ---------------------------------------------------------------------------

#[test]
fn fold_toggle_writes_document_and_store() {
    let store = SharedStore::default();
    let mut editor = open_with_store(SCENARIO, &store);

    assert!(editor.toggle_fold(24));
    let heading = editor.doc().node_at(24).unwrap();
    assert!(Heading::is_collapsed(heading));
    // The anchor is setup-1, the record key stays on the base slug.
    assert_eq!(store.keys(), vec!["heading-fold:doc:setup".to_string()]);
    assert!(editor.decorations().find("setup-1").unwrap().collapsed);

    assert!(editor.toggle_fold(24));
    assert!(!Heading::is_collapsed(editor.doc().node_at(24).unwrap()));
    assert!(store.keys().is_empty());
}

#[test]
fn fold_toggle_twice_restores_markup() {
    let mut editor = open(SCENARIO);
    let markup = editor.to_markup();
    editor.toggle_fold(0);
    editor.toggle_fold(0);
    assert_eq!(editor.to_markup(), markup);
    assert_eq!(editor.to_markup(), SCENARIO);
}

#[test]
fn fold_toggle_off_heading_is_noop() {
    let store = SharedStore::default();
    let mut editor = open_with_store("Intro text\n\n# Heading", &store);
    let doc = editor.doc().clone();

    assert!(!editor.toggle_fold(0));
    assert!(!editor.toggle_fold(3));
    assert!(!editor.toggle_fold(500));
    assert_eq!(editor.doc(), &doc);
    assert_eq!(editor.state().version(), 0);
    assert!(store.keys().is_empty());
}

#[test]
fn restore_folds_recorded_headings_on_load() {
    let store = SharedStore::default();
    store
        .0
        .lock()
        .unwrap()
        .set_item("heading-fold:doc:setup", COLLAPSED)
        .unwrap();
    let editor = open_with_store(SCENARIO, &store);

    let collapsed: Vec<bool> = editor
        .doc()
        .content
        .iter()
        .map(Heading::is_collapsed)
        .collect();
    assert_eq!(collapsed, vec![false, true, true]);
}

#[test]
fn records_are_scoped_per_document() {
    let store = SharedStore::default();
    let mut first = open_with_store(SCENARIO, &store);
    first.toggle_fold(0);

    let other = CollapseStore::new("other-doc", Box::new(store.clone()));
    let second = Editor::from_markup(Extensions::standard(), SCENARIO, 0, other).unwrap();
    assert!(!Heading::is_collapsed(&second.doc().content[0]));
}

#[test]
fn failing_store_reads_expanded_and_still_toggles() {
    let collapse = CollapseStore::new("doc", Box::new(FailingStore));
    let mut editor = Editor::from_markup(Extensions::standard(), SCENARIO, 0, collapse).unwrap();
    assert!(!Heading::is_collapsed(&editor.doc().content[0]));

    assert!(editor.toggle_fold(0));
    assert!(Heading::is_collapsed(&editor.doc().content[0]));
    assert!(!editor.collapse_store().is_collapsed("Getting Started"));
}

#[test]
fn detached_store_still_toggles_document() {
    let mut editor = open(SCENARIO);
    assert!(!editor.collapse_store().is_available());
    assert!(editor.toggle_fold(17));
    assert!(Heading::is_collapsed(editor.doc().node_at(17).unwrap()));
}

#[test]
fn json_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folds.json");

    let collapse = CollapseStore::new("doc", Box::new(JsonFileStore::open(&path).unwrap()));
    let mut editor = Editor::from_markup(Extensions::standard(), SCENARIO, 0, collapse).unwrap();
    editor.toggle_fold(0);
    drop(editor);

    let collapse = CollapseStore::new("doc", Box::new(JsonFileStore::open(&path).unwrap()));
    let reopened = Editor::from_markup(Extensions::standard(), SCENARIO, 0, collapse).unwrap();
    assert!(Heading::is_collapsed(&reopened.doc().content[0]));

    let on_disk: BTreeMap<String, String> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.get("heading-fold:doc:getting-started").map(String::as_str), Some(COLLAPSED));
}

// ---------------------------------------------------------------------------
// Keys and commands
// ---------------------------------------------------------------------------

#[test]
fn heading_level_shortcuts_and_backspace() {
    let mut editor = open("Title");
    editor.set_selection(Selection::cursor(3));

    assert!(editor.handle_key("Shift-Ctrl-3").unwrap());
    assert_eq!(editor.doc().content[0].attrs, Heading::attrs(3));
    assert_eq!(editor.to_markup(), "### Title");

    // Backspace in the middle of the heading is left to the host.
    assert!(!editor.handle_key("Backspace").unwrap());

    editor.set_selection(Selection::cursor(1));
    assert!(editor.handle_key("Backspace").unwrap());
    assert_eq!(editor.doc().content[0], Element::paragraph("Title"));
}

#[test]
fn disabled_levels_have_no_shortcut() {
    let mut editor = open("Title");
    assert!(!editor.handle_key("Shift-Ctrl-5").unwrap());
    assert_eq!(kinds(&editor), vec![NodeType::Paragraph]);
}

#[test]
fn heading_command_toggles() {
    let mut editor = open("Title");
    let attrs = Attrs::new().with("level", 2u8);
    assert!(editor.run_command("heading", &attrs));
    assert_eq!(editor.to_markup(), "## Title");
    assert!(editor.run_command("heading", &attrs));
    assert_eq!(editor.to_markup(), "Title");
    assert!(!editor.run_command("nope", &attrs));
}

#[test]
fn indentation_keys_are_swallowed_only_inside_options() {
    let mut editor = open("* one\n* two\n\nafter");
    // options 0, item 1, paragraph 2, text from 3
    editor.set_selection(Selection::cursor(4));
    let version = editor.state().version();
    for chord in ["Tab", "Shift-Tab", "Mod-]", "Mod-["] {
        assert!(editor.handle_key(chord).unwrap(), "{} not consumed", chord);
    }
    assert_eq!(editor.state().version(), version);

    let after = editor.doc().content[0].size() + 1;
    editor.set_selection(Selection::cursor(after));
    assert!(!editor.handle_key("Tab").unwrap());
}

#[test]
fn option_list_toggle() {
    let mut editor = open("one\n\ntwo");
    editor.set_selection(Selection::cursor(8));
    assert!(editor.handle_key("Shift-ctrl-o").unwrap());
    assert_eq!(editor.to_markup(), "one\n\n* two");

    // The cursor moved into the new list item, so the same chord lifts it out.
    assert!(editor.handle_key("Shift-Ctrl-O").unwrap());
    assert_eq!(editor.to_markup(), "one\n\ntwo");
}

#[test]
fn lifting_a_middle_item_splits_the_list() {
    let mut editor = open("- a\n- b\n- c");
    // options 0, item "a" 1..6, item "b" 6..11, paragraph 7, text 8
    editor.set_selection(Selection::cursor(8));
    assert!(editor.run_command("options", &Attrs::new()));
    assert_eq!(
        kinds(&editor),
        vec![NodeType::Options, NodeType::Paragraph, NodeType::Options]
    );
    assert_eq!(editor.doc().content[2].attrs.get_str("bullet"), Some("-"));
}

#[test]
fn question_wrap_and_split() {
    let mut editor = open("First.Second.");
    // after "First."
    editor.set_selection(Selection::cursor(7));
    assert!(editor.handle_key("Shift-Ctrl-q").unwrap());
    assert_eq!(editor.to_markup(), "> First.Second.");
    assert_eq!(editor.state().selection(), Selection::cursor(8));

    assert!(editor.handle_key("Shift-Enter").unwrap());
    assert_eq!(editor.to_markup(), "> First.\n>\n> Second.");

    assert!(editor.run_command("question", &Attrs::new()));
    assert_eq!(kinds(&editor), vec![NodeType::Question, NodeType::Paragraph]);
    assert_eq!(editor.to_markup(), "> First.\n\nSecond.");
}

#[test]
fn shift_enter_outside_question_passes() {
    let mut editor = open("plain");
    editor.set_selection(Selection::cursor(2));
    assert!(!editor.handle_key("Shift-Enter").unwrap());
    assert_eq!(editor.to_markup(), "plain");
}

#[test]
fn headings_cannot_be_created_inside_questions() {
    let mut editor = open("> inside");
    editor.set_selection(Selection::cursor(3));
    assert!(!editor.handle_key("Shift-Ctrl-1").unwrap());
    assert_eq!(editor.to_markup(), "> inside");
}

#[test]
fn malformed_chords_are_errors() {
    let mut editor = open("x");
    assert!(editor.handle_key("Hyper-x").is_err());
}

// ---------------------------------------------------------------------------
// Input rules
// ---------------------------------------------------------------------------

#[test]
fn typing_hashes_makes_a_heading() {
    let mut editor = blank();
    type_text(&mut editor, "## Setup");
    assert_eq!(editor.to_markup(), "## Setup");
    assert_eq!(anchor_keys(&editor), vec![(0, "setup".to_string())]);
}

#[test]
fn typing_too_many_hashes_stays_text() {
    let mut editor = blank();
    type_text(&mut editor, "##### x");
    assert_eq!(kinds(&editor), vec![NodeType::Paragraph]);
}

#[test]
fn typing_oo_starts_an_option_list() {
    let mut editor = blank();
    type_text(&mut editor, "oo first");
    assert_eq!(editor.to_markup(), "* first");
}

#[test]
fn typing_qq_starts_a_question() {
    let mut editor = blank();
    type_text(&mut editor, "  qq what?");
    assert_eq!(editor.to_markup(), "> what?");
}

#[test]
fn documents_saved_right_after_a_trigger_reopen() {
    for trigger in ["qq ", "oo "] {
        let mut editor = blank();
        type_text(&mut editor, trigger);
        let markup = editor.to_markup();
        let reopened = Editor::from_markup(Extensions::standard(), &markup, 0, CollapseStore::detached("doc"))
            .unwrap_or_else(|err| panic!("{:?} did not reopen: {:?}", markup, err));
        assert_eq!(reopened.doc(), editor.doc());
    }
}

#[test]
fn plain_typing_replaces_selection() {
    let mut editor = open("hello world");
    editor.set_selection(Selection::new(7, 12));
    assert!(!editor.handle_text_input("there").unwrap());
    assert_eq!(editor.to_markup(), "hello there");
    assert_eq!(editor.state().selection(), Selection::cursor(12));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn toggles_track_parity(toggles in prop::collection::vec(0usize..3, 0..16)) {
        let store = SharedStore::default();
        let mut editor = open_with_store(SCENARIO, &store);
        let positions = [0usize, 17, 24];
        let mut flips = [0usize; 3];
        let mut last_setup = false;

        for &i in &toggles {
            prop_assert!(editor.toggle_fold(positions[i]));
            flips[i] += 1;
            if i > 0 {
                last_setup = flips[i] % 2 == 1;
            }
        }

        for (i, &pos) in positions.iter().enumerate() {
            let heading = editor.doc().node_at(pos).unwrap();
            prop_assert_eq!(Heading::is_collapsed(heading), flips[i] % 2 == 1);
        }
        // Both "Setup" headings share one record; the last write wins.
        let keys = store.keys();
        prop_assert_eq!(keys.contains(&"heading-fold:doc:setup".to_string()), last_setup);
        prop_assert_eq!(
            keys.contains(&"heading-fold:doc:getting-started".to_string()),
            flips[0] % 2 == 1
        );
    }

    #[test]
    fn anchors_survive_unrelated_edits(text in "[a-z ]{1,10}") {
        let mut editor = open(&format!("{}\n\nbody", SCENARIO));
        let before: Vec<String> = anchor_keys(&editor).into_iter().map(|(_, k)| k).collect();
        let body = editor.doc().content_size() - 1;
        editor.set_selection(Selection::cursor(body));
        editor.handle_text_input(&text).unwrap();
        let after: Vec<String> = anchor_keys(&editor).into_iter().map(|(_, k)| k).collect();
        prop_assert_eq!(before, after);
    }
}
