//! Editing commands shared by the node descriptors.
//!
//! A command inspects the state and either produces a transaction, consumes
//! the event without changing anything, or passes so the next handler can try.

use std::sync::Arc;

use richdoc::schema::ContentExpr;
use richdoc::{Attrs, NodeType, Schema};

use crate::error::TransformError;
use crate::state::{EditorState, Selection, Transaction};

pub enum Outcome {
    Apply(Transaction),
    Consumed,
    Pass,
}

impl Outcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Outcome::Pass)
    }
}

pub type Command = Arc<dyn Fn(&EditorState) -> Outcome + Send + Sync>;

/// Adapt a fallible transaction builder. `Ok(None)` and errors both pass.
pub fn command<F>(f: F) -> Command
where
    F: Fn(&EditorState) -> Result<Option<Transaction>, TransformError> + Send + Sync + 'static,
{
    Arc::new(move |state| match f(state) {
        Ok(Some(tr)) => Outcome::Apply(tr),
        Ok(None) => Outcome::Pass,
        Err(err) => {
            tracing::debug!(error = %err, "command not applicable");
            Outcome::Pass
        }
    })
}

/// Swallow the event when the selection is inside a `kind` element.
pub fn consume_inside(kind: NodeType) -> Command {
    Arc::new(move |state| {
        if is_node_active(state, kind, &Attrs::new()) {
            Outcome::Consumed
        } else {
            Outcome::Pass
        }
    })
}

/// Whether the selection head's ancestors include a `kind` element carrying `attrs`.
pub fn is_node_active(state: &EditorState, kind: NodeType, attrs: &Attrs) -> bool {
    let doc = state.doc();
    let Some(rp) = doc.resolve(state.selection().from()) else {
        return false;
    };
    (1..=rp.depth()).rev().any(|depth| {
        rp.node(doc, depth)
            .is_some_and(|el| el.kind == kind && el.attrs.contains_all(attrs))
    })
}

/// Start positions of the textblocks touched by the selection.
fn selected_textblocks(state: &EditorState) -> Vec<(usize, Vec<usize>)> {
    let doc = state.doc();
    let (from, to) = (state.selection().from(), state.selection().to());
    let mut found = Vec::new();
    doc.descendants(|element, pos| {
        if element.is_textblock() && from < pos + element.size() && to > pos {
            found.push(pos);
        }
    });
    found
        .into_iter()
        .filter_map(|pos| doc.path_at(pos).map(|path| (pos, path)))
        .collect()
}

fn parent_allows(state: &EditorState, path: &[usize], kind: NodeType) -> bool {
    let schema = state.schema();
    let parent = &path[..path.len().saturating_sub(1)];
    schema
        .content_at(state.doc(), parent)
        .is_some_and(|expr| schema.allows(expr, kind))
}

/// Turn the selected textblocks into `kind` with `attrs`, where their parent allows it.
pub fn set_block_type(kind: NodeType, attrs: Attrs) -> Command {
    command(move |state| {
        let mut tr = state.tr();
        let mut changed = false;
        for (pos, path) in selected_textblocks(state) {
            let Some(element) = state.doc().element(&path) else {
                continue;
            };
            if element.kind == kind && element.attrs.contains_all(&attrs) {
                continue;
            }
            if !parent_allows(state, &path, kind) {
                continue;
            }
            tr.set_node_markup(pos, Some(kind), attrs.clone())?;
            changed = true;
        }
        Ok(changed.then_some(tr))
    })
}

/// `kind` with `attrs` when not already active, otherwise back to `toggle_kind`.
pub fn toggle_block_type(kind: NodeType, toggle_kind: NodeType, attrs: Attrs) -> Command {
    let set = set_block_type(kind, attrs.clone());
    let reset = set_block_type(toggle_kind, Attrs::new());
    Arc::new(move |state| {
        if is_node_active(state, kind, &attrs) {
            reset(state)
        } else {
            set(state)
        }
    })
}

/// With an empty selection at the very start of a `kind` textblock, turn it into a paragraph.
pub fn backspace_to_paragraph(kind: NodeType) -> Command {
    command(move |state| {
        let selection = state.selection();
        if !selection.is_empty() {
            return Ok(None);
        }
        let doc = state.doc();
        let Some(rp) = doc.resolve(selection.head) else {
            return Ok(None);
        };
        let at_start = rp
            .parent(doc)
            .is_some_and(|parent| parent.kind == kind && rp.parent_offset() == 0);
        if !at_start {
            return Ok(None);
        }
        let mut tr = state.tr();
        tr.set_node_markup(rp.start - 1, Some(NodeType::Paragraph), Attrs::new())?;
        Ok(Some(tr))
    })
}

/// Wrapper types needed to hold a `child` inside `kind`: `[kind]` or `[kind, inner]`.
pub fn find_wrapping(schema: &Schema, kind: NodeType, child: NodeType) -> Option<Vec<NodeType>> {
    let content = schema.node(kind)?.spec().content;
    if schema.allows(content, child) {
        return Some(vec![kind]);
    }
    if let ContentExpr::OneOrMore(inner) = content {
        let inner_content = schema.node(inner)?.spec().content;
        if schema.allows(inner_content, child) {
            return Some(vec![kind, inner]);
        }
    }
    None
}

/// Wrap the textblock at `path` in `kind`, adding intermediate wrappers as needed.
pub(crate) fn wrap_textblock(
    state: &EditorState,
    tr: &mut Transaction,
    path: &[usize],
    kind: NodeType,
    attrs: &Attrs,
) -> Result<bool, TransformError> {
    let Some(element) = tr.doc().element(path) else {
        return Ok(false);
    };
    if !parent_allows(state, path, kind) {
        return Ok(false);
    }
    let Some(wrappers) = find_wrapping(state.schema(), kind, element.kind) else {
        return Ok(false);
    };
    tr.wrap(path, &wrappers, attrs)?;
    Ok(true)
}

/// Wrap the textblock holding the selection in `kind`.
pub fn wrap_in(kind: NodeType, attrs: Attrs) -> Command {
    command(move |state| {
        let doc = state.doc();
        let Some(rp) = doc.resolve(state.selection().from()) else {
            return Ok(None);
        };
        if !rp.in_textblock(doc) {
            return Ok(None);
        }
        let mut tr = state.tr();
        let wrapped = wrap_textblock(state, &mut tr, &rp.path, kind, &attrs)?;
        Ok(wrapped.then_some(tr))
    })
}

/// Lift the child of the innermost `kind` ancestor that holds the selection out of it.
pub fn lift_out_of(kind: NodeType) -> Command {
    command(move |state| {
        let doc = state.doc();
        let Some(rp) = doc.resolve(state.selection().from()) else {
            return Ok(None);
        };
        let Some(depth) = (1..rp.depth())
            .rev()
            .find(|&d| rp.node(doc, d).is_some_and(|el| el.kind == kind))
        else {
            return Ok(None);
        };
        let mut tr = state.tr();
        tr.lift(&rp.path[..depth], rp.path[depth])?;
        Ok(Some(tr))
    })
}

/// Lift the current item out of an enclosing `list_kind` list, or wrap the
/// current textblock in a new list of `item_kind` items.
pub fn toggle_list(list_kind: NodeType, item_kind: NodeType) -> Command {
    let lift = lift_out_of(list_kind);
    command(move |state| {
        if is_node_active(state, list_kind, &Attrs::new()) {
            return Ok(match lift(state) {
                Outcome::Apply(tr) => Some(tr),
                _ => None,
            });
        }

        let doc = state.doc();
        let schema = state.schema();
        let Some(rp) = doc.resolve(state.selection().from()) else {
            return Ok(None);
        };
        let Some(element) = rp.parent(doc).filter(|el| el.is_textblock()) else {
            return Ok(None);
        };
        if find_wrapping(schema, list_kind, element.kind) != Some(vec![list_kind, item_kind]) {
            return Ok(None);
        }
        let mut tr = state.tr();
        let wrapped = wrap_textblock(state, &mut tr, &rp.path, list_kind, &Attrs::new())?;
        Ok(wrapped.then_some(tr))
    })
}

/// Lift out of an enclosing `kind`, or wrap the current textblock in one.
pub fn toggle_wrap(kind: NodeType) -> Command {
    let lift = lift_out_of(kind);
    let wrap = wrap_in(kind, Attrs::new());
    Arc::new(move |state| {
        if is_node_active(state, kind, &Attrs::new()) {
            lift(state)
        } else {
            wrap(state)
        }
    })
}

/// Split the textblock at the selection end, but only inside a `kind` element.
pub fn split_block_inside(kind: NodeType) -> Command {
    command(move |state| {
        if !is_node_active(state, kind, &Attrs::new()) {
            return Ok(None);
        }
        let to = state.selection().to();
        let mut tr = state.tr();
        tr.split(to, 1)?;
        tr.set_selection(Selection::cursor(to + 2));
        Ok(Some(tr))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use richdoc::nodes::Heading;
    use richdoc::{Document, Element};

    fn state_at(content: Vec<Element>, cursor: usize) -> EditorState {
        let state = EditorState::new(Document::new(content), Arc::new(Schema::standard()));
        let mut tr = state.tr();
        tr.set_selection(Selection::cursor(cursor));
        state.apply(tr)
    }

    fn run(cmd: &Command, state: &EditorState) -> Option<EditorState> {
        match cmd(state) {
            Outcome::Apply(tr) => Some(state.apply(tr)),
            _ => None,
        }
    }

    #[test]
    fn toggle_block_type_round_trips() {
        let state = state_at(vec![Element::paragraph("Title")], 1);
        let cmd = toggle_block_type(NodeType::Heading, NodeType::Paragraph, Heading::attrs(2));
        let heading = run(&cmd, &state).unwrap();
        assert_eq!(heading.doc().content[0].attrs, Heading::attrs(2));
        let back = run(&cmd, &heading).unwrap();
        assert_eq!(back.doc(), state.doc());
    }

    #[test]
    fn set_block_type_passes_where_not_allowed() {
        let question = Element::container(
            NodeType::Question,
            Attrs::new(),
            vec![Element::paragraph("q")],
        );
        let state = state_at(vec![question], 2);
        let cmd = set_block_type(NodeType::Heading, Heading::attrs(1));
        assert!(matches!(cmd(&state), Outcome::Pass));
    }

    #[test]
    fn backspace_only_at_heading_start() {
        let heading = Element::textblock(NodeType::Heading, Heading::attrs(3), "Title");
        let cmd = backspace_to_paragraph(NodeType::Heading);

        let mid = state_at(vec![heading.clone()], 3);
        assert!(matches!(cmd(&mid), Outcome::Pass));

        let start = state_at(vec![heading], 1);
        let after = run(&cmd, &start).unwrap();
        assert_eq!(after.doc().content[0], Element::paragraph("Title"));
    }

    #[test]
    fn find_wrapping_adds_list_items() {
        let schema = Schema::standard();
        assert_eq!(
            find_wrapping(&schema, NodeType::Options, NodeType::Paragraph),
            Some(vec![NodeType::Options, NodeType::ListItem])
        );
        assert_eq!(
            find_wrapping(&schema, NodeType::Question, NodeType::Paragraph),
            Some(vec![NodeType::Question])
        );
        assert_eq!(find_wrapping(&schema, NodeType::Question, NodeType::Heading), None);
    }
}
