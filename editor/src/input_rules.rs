//! Text-pattern triggers that fire while typing.
//!
//! When text is typed into a textblock, the text before the cursor plus the
//! typed text is matched against each rule in order. Patterns are anchored at
//! the end with `$`; the matched text is removed and the rule's change applied.

use regex_lite::Regex;
use richdoc::{Attrs, NodeType};

use crate::commands::wrap_textblock;
use crate::error::TransformError;
use crate::state::{EditorState, Transaction};

/// How much text before the cursor is considered.
const MAX_MATCH: usize = 500;

#[derive(Debug, Clone)]
enum RuleAction {
    TextblockType { kind: NodeType, attrs: Attrs },
    Wrapping { kind: NodeType, attrs: Attrs },
}

#[derive(Debug, Clone)]
pub struct InputRule {
    pattern: Regex,
    action: RuleAction,
}

impl InputRule {
    /// Change the textblock's type when `pattern` matches at its start.
    pub fn textblock_type(pattern: &str, kind: NodeType, attrs: Attrs) -> Result<Self, regex_lite::Error> {
        Ok(InputRule {
            pattern: Regex::new(pattern)?,
            action: RuleAction::TextblockType { kind, attrs },
        })
    }

    /// Wrap the textblock in `kind` when `pattern` matches.
    pub fn wrapping(pattern: &str, kind: NodeType, attrs: Attrs) -> Result<Self, regex_lite::Error> {
        Ok(InputRule {
            pattern: Regex::new(pattern)?,
            action: RuleAction::Wrapping { kind, attrs },
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn apply(
        &self,
        state: &EditorState,
        path: &[usize],
        start: usize,
        cursor: usize,
    ) -> Result<Option<Transaction>, TransformError> {
        let mut tr = state.tr();
        match &self.action {
            RuleAction::TextblockType { kind, attrs } => {
                let parent = &path[..path.len() - 1];
                let schema = state.schema();
                let allowed = schema
                    .content_at(state.doc(), parent)
                    .is_some_and(|expr| schema.allows(expr, *kind));
                if !allowed {
                    return Ok(None);
                }
                let block_pos = state.doc().position_of(path).unwrap_or(0);
                tr.delete(start, cursor)?;
                tr.set_node_markup(block_pos, Some(*kind), attrs.clone())?;
                Ok(Some(tr))
            }
            RuleAction::Wrapping { kind, attrs } => {
                tr.delete(start, cursor)?;
                let wrapped = wrap_textblock(state, &mut tr, path, *kind, attrs)?;
                Ok(wrapped.then_some(tr))
            }
        }
    }
}

/// Run `rules` for `text` typed at an empty selection. Returns the first rule's
/// transaction; the typed text itself is not inserted when a rule fires.
pub fn run_input_rules(rules: &[InputRule], state: &EditorState, text: &str) -> Option<Transaction> {
    let selection = state.selection();
    if !selection.is_empty() {
        return None;
    }
    let cursor = selection.head;
    let doc = state.doc();
    let rp = doc.resolve(cursor)?;
    let parent = rp.parent(doc).filter(|p| p.is_textblock())?;

    let offset = rp.parent_offset();
    let skip = offset.saturating_sub(MAX_MATCH);
    let mut before: String = parent
        .text_content()
        .chars()
        .skip(skip)
        .take(offset - skip)
        .collect();
    before.push_str(text);

    for rule in rules {
        let Some(m) = rule.pattern.find(&before) else {
            continue;
        };
        if m.end() != before.len() {
            continue;
        }
        let start = rp.start + skip + before[..m.start()].chars().count();
        match rule.apply(state, &rp.path, start, cursor) {
            Ok(Some(tr)) => {
                tracing::debug!(pattern = rule.pattern(), "input rule fired");
                return Some(tr);
            }
            Ok(None) => {}
            Err(err) => tracing::debug!(pattern = rule.pattern(), error = %err, "input rule failed"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::Selection;
    use richdoc::nodes::Heading;
    use richdoc::{Document, Element, Schema};

    fn typed(text_before: &str) -> EditorState {
        let state = EditorState::new(
            Document::new(vec![Element::paragraph(text_before)]),
            Arc::new(Schema::standard()),
        );
        let mut tr = state.tr();
        tr.set_selection(Selection::cursor(1 + text_before.chars().count()));
        state.apply(tr)
    }

    #[test]
    fn textblock_rule_removes_trigger() {
        let rules = vec![
            InputRule::textblock_type(r"^(#{1,1})\s$", NodeType::Heading, Heading::attrs(1)).unwrap(),
            InputRule::textblock_type(r"^(#{1,2})\s$", NodeType::Heading, Heading::attrs(2)).unwrap(),
        ];
        let tr = run_input_rules(&rules, &typed("##"), " ").unwrap();
        let heading = &tr.doc().content[0];
        assert_eq!(heading.attrs, Heading::attrs(2));
        assert_eq!(heading.text_content(), "");
        assert_eq!(tr.selection(), Selection::cursor(1));
    }

    #[test]
    fn wrapping_rule_wraps_paragraph() {
        let rules = vec![InputRule::wrapping(r"^\s*qq\s$", NodeType::Question, Attrs::new()).unwrap()];
        let tr = run_input_rules(&rules, &typed("qq"), " ").unwrap();
        let question = &tr.doc().content[0];
        assert_eq!(question.kind, NodeType::Question);
        assert_eq!(question.children()[0], Element::paragraph(""));
        assert_eq!(tr.selection(), Selection::cursor(2));
    }

    #[test]
    fn no_match_without_trigger_at_start() {
        let rules = vec![InputRule::wrapping(r"^\s*qq\s$", NodeType::Question, Attrs::new()).unwrap()];
        assert!(run_input_rules(&rules, &typed("say qq"), " ").is_none());
    }
}
