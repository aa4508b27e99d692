//! Stateful extensions that observe every state change.

mod anchors;
mod question_trace;

pub use anchors::HeadingAnchors;
pub use question_trace::QuestionTrace;

use crate::decoration::DecorationSet;
use crate::keymap::KeyChord;
use crate::state::EditorState;

pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Called once with the editor's first state.
    fn init(&mut self, _state: &EditorState) {}

    /// Called with the new state after every dispatched transaction.
    fn apply(&mut self, _state: &EditorState) {}

    fn decorations(&self) -> Option<&DecorationSet> {
        None
    }

    /// Runs before the keymap. Returning `true` stops key handling.
    fn handle_key_down(&self, _state: &EditorState, _chord: &KeyChord) -> bool {
        false
    }
}
