use richdoc::compute_anchors;

use super::Plugin;
use crate::decoration::DecorationSet;
use crate::state::EditorState;

/// Publishes one anchor widget per heading.
///
/// The overlay is rebuilt from scratch whenever the document version moves
/// and reused as is otherwise. If anchors cannot be computed the previous
/// overlay stays in place.
#[derive(Debug, Default)]
pub struct HeadingAnchors {
    version: Option<u64>,
    decorations: DecorationSet,
    rebuilds: usize,
}

impl HeadingAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the overlay has been rebuilt.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    fn rebuild(&mut self, state: &EditorState) {
        self.version = Some(state.version());
        match compute_anchors(state.doc()) {
            Ok(anchors) => {
                self.decorations = DecorationSet::from_anchors(&anchors);
                self.rebuilds += 1;
                tracing::debug!(
                    version = state.version(),
                    anchors = anchors.len(),
                    "rebuilt heading anchors"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "anchor tracking failed, keeping previous anchors");
            }
        }
    }
}

impl Plugin for HeadingAnchors {
    fn name(&self) -> &'static str {
        "heading-anchors"
    }

    fn init(&mut self, state: &EditorState) {
        self.rebuild(state);
    }

    fn apply(&mut self, state: &EditorState) {
        if self.version != Some(state.version()) {
            self.rebuild(state);
        }
    }

    fn decorations(&self) -> Option<&DecorationSet> {
        Some(&self.decorations)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use richdoc::nodes::Heading;
    use richdoc::{Document, Element, NodeType, Schema};

    use super::*;
    use crate::state::Selection;

    fn heading(text: &str) -> Element {
        Element::textblock(NodeType::Heading, Heading::attrs(1), text)
    }

    #[test]
    fn selection_changes_keep_overlay() {
        let state = EditorState::new(
            Document::new(vec![heading("Intro"), heading("Intro")]),
            Arc::new(Schema::standard()),
        );
        let mut plugin = HeadingAnchors::new();
        plugin.init(&state);
        assert_eq!(plugin.rebuilds(), 1);

        let mut tr = state.tr();
        tr.set_selection(Selection::cursor(3));
        let moved = state.apply(tr);
        plugin.apply(&moved);
        assert_eq!(plugin.rebuilds(), 1);

        let mut tr = moved.tr();
        tr.insert_text(6, "s").unwrap();
        let edited = moved.apply(tr);
        plugin.apply(&edited);
        assert_eq!(plugin.rebuilds(), 2);

        let keys: Vec<&str> = plugin
            .decorations()
            .unwrap()
            .widgets()
            .iter()
            .map(|w| w.key.as_str())
            .collect();
        assert_eq!(keys, vec!["intros", "intro"]);
    }

    #[test]
    fn widgets_sit_before_headings() {
        let state = EditorState::new(
            Document::new(vec![Element::paragraph("p"), heading("Title")]),
            Arc::new(Schema::standard()),
        );
        let mut plugin = HeadingAnchors::new();
        plugin.init(&state);
        let widget = &plugin.decorations().unwrap().widgets()[0];
        assert_eq!((widget.pos, widget.side), (3, -1));
        assert_eq!(widget.class_name, "heading-name");
        assert!(!widget.collapsed);
    }
}
