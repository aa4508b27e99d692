use richdoc::dom::render_html;
use richdoc::nodes::ANCHOR_CLASS;
use richdoc::{Attrs, Document, Parser, serialize};

use crate::collapse::CollapseStore;
use crate::commands::Outcome;
use crate::decoration::DecorationSet;
use crate::error::{EditorError, KeymapError, TransformError};
use crate::host::{Dictionary, Host, ToastType, anchor_link};
use crate::input_rules::{InputRule, run_input_rules};
use crate::keymap::{KeyChord, Keymap};
use crate::nodes::Extensions;
use crate::plugins::Plugin;
use crate::state::{EditorState, Selection, Transaction};

/// One open document with its registered extensions.
pub struct Editor {
    state: EditorState,
    extensions: Extensions,
    keymap: Keymap,
    input_rules: Vec<InputRule>,
    plugins: Vec<Box<dyn Plugin>>,
    collapse: CollapseStore,
    dictionary: Dictionary,
}

impl Editor {
    /// Open `doc`. Headings with a fold record in `collapse` start folded.
    pub fn new(extensions: Extensions, doc: Document, collapse: CollapseStore) -> Result<Self, EditorError> {
        let schema = extensions.schema();
        schema.check(&doc)?;
        let state = EditorState::new(doc, schema);
        let keymap = extensions.keymap()?;
        let input_rules = extensions.input_rules()?;
        let mut plugins = extensions.plugins();
        for plugin in &mut plugins {
            plugin.init(&state);
        }

        let mut editor = Editor {
            state,
            extensions,
            keymap,
            input_rules,
            plugins,
            collapse,
            dictionary: Dictionary::default(),
        };
        if let Some(tr) = editor.collapse.restore(&editor.state) {
            editor.dispatch(tr);
        }
        Ok(editor)
    }

    pub fn from_markup(
        extensions: Extensions,
        source: &str,
        file_id: usize,
        collapse: CollapseStore,
    ) -> Result<Self, EditorError> {
        let schema = extensions.schema();
        let doc = Parser::new(source.to_string(), file_id, &schema).parse()?;
        Editor::new(extensions, doc, collapse)
    }

    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Document {
        self.state.doc()
    }

    pub fn collapse_store(&self) -> &CollapseStore {
        &self.collapse
    }

    pub fn dispatch(&mut self, tr: Transaction) {
        self.state = self.state.apply(tr);
        for plugin in &mut self.plugins {
            plugin.apply(&self.state);
        }
    }

    pub fn set_selection(&mut self, selection: Selection) {
        let mut tr = self.state.tr();
        tr.set_selection(selection);
        self.dispatch(tr);
    }

    fn apply_outcome(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Apply(tr) => {
                self.dispatch(tr);
                true
            }
            Outcome::Consumed => true,
            Outcome::Pass => false,
        }
    }

    /// Offer a key press to the plugins, then to the keymap. Returns whether it was handled.
    pub fn handle_key(&mut self, chord: &str) -> Result<bool, KeymapError> {
        let chord: KeyChord = chord.parse()?;
        if self
            .plugins
            .iter()
            .any(|p| p.handle_key_down(&self.state, &chord))
        {
            return Ok(true);
        }
        let outcome = self.keymap.dispatch(&chord, &self.state);
        Ok(self.apply_outcome(outcome))
    }

    /// Type `text` over the selection. Returns `true` when an input rule fired instead.
    pub fn handle_text_input(&mut self, text: &str) -> Result<bool, TransformError> {
        if let Some(tr) = run_input_rules(&self.input_rules, &self.state, text) {
            self.dispatch(tr);
            return Ok(true);
        }
        let selection = self.state.selection();
        let mut tr = self.state.tr();
        tr.delete(selection.from(), selection.to())?;
        tr.insert_text(selection.from(), text)?;
        self.dispatch(tr);
        Ok(false)
    }

    /// Run a named descriptor command. Returns whether it applied.
    pub fn run_command(&mut self, name: &str, attrs: &Attrs) -> bool {
        let Some(command) = self.extensions.command(name, attrs) else {
            tracing::warn!(name, "unknown command");
            return false;
        };
        let outcome = command(&self.state);
        self.apply_outcome(outcome)
    }

    /// Fold or unfold the heading starting at `pos`. No-op elsewhere.
    pub fn toggle_fold(&mut self, pos: usize) -> bool {
        match self.collapse.toggle_fold(&self.state, pos) {
            Some(tr) => {
                self.dispatch(tr);
                true
            }
            None => false,
        }
    }

    /// Merged decorations of every plugin.
    pub fn decorations(&self) -> DecorationSet {
        let mut set = DecorationSet::default();
        for plugin in &self.plugins {
            if let Some(decorations) = plugin.decorations() {
                set.extend(decorations);
            }
        }
        set
    }

    /// Position of the heading whose anchor id is `id`.
    pub fn anchor_position(&self, id: &str) -> Option<usize> {
        self.decorations()
            .widgets()
            .iter()
            .find(|w| w.class_name == ANCHOR_CLASS && w.key == id)
            .map(|w| w.pos)
    }

    /// Copy a link to the heading at `pos` and tell the user.
    pub fn copy_link(&self, host: &mut dyn Host, pos: usize) -> Result<String, EditorError> {
        let decorations = self.decorations();
        let anchor = decorations
            .at(pos)
            .find(|w| w.class_name == ANCHOR_CLASS)
            .ok_or(EditorError::NoAnchorAt(pos))?;
        let link = anchor_link(&host.location(), &anchor.key);
        host.copy_to_clipboard(&link);
        host.show_toast(&self.dictionary.link_copied, ToastType::Info);
        Ok(link)
    }

    pub fn to_markup(&self) -> String {
        serialize(self.state.doc(), self.state.schema())
    }

    pub fn render_html(&self) -> String {
        render_html(
            self.state.doc(),
            self.state.schema(),
            &self.decorations().to_dom_map(),
        )
    }
}
