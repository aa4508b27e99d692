use richdoc::markup::serialize_element;
use richdoc::NodeType;

use super::Plugin;
use crate::keymap::KeyChord;
use crate::state::EditorState;

/// Logs the markup of every top-level question on each key press.
#[derive(Debug, Default)]
pub struct QuestionTrace;

impl Plugin for QuestionTrace {
    fn name(&self) -> &'static str {
        "question-trace"
    }

    fn handle_key_down(&self, state: &EditorState, chord: &KeyChord) -> bool {
        for (index, element) in state.doc().content.iter().enumerate() {
            if element.kind == NodeType::Question {
                let markup = serialize_element(element, state.schema());
                tracing::debug!(%chord, index, %markup, "question");
            }
        }
        false
    }
}
