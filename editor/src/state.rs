//! Editor state and transactions.
//!
//! A [`Transaction`] works on its own copy of the document. Every step is
//! validated against the schema before it is committed, so a failed step leaves
//! the transaction exactly as it was.

use std::sync::Arc;

use richdoc::document::inline::{normalize_inlines, split_inlines};
use richdoc::{Attrs, Content, Document, Element, InlineNode, NodeType, Schema};

use crate::error::TransformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Selection { anchor, head }
    }

    pub fn cursor(pos: usize) -> Self {
        Selection {
            anchor: pos,
            head: pos,
        }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    fn map(self, f: impl Fn(usize) -> usize) -> Self {
        Selection {
            anchor: f(self.anchor),
            head: f(self.head),
        }
    }
}

/// Immutable snapshot of the editor. `version` counts document-changing transactions.
#[derive(Clone)]
pub struct EditorState {
    doc: Document,
    selection: Selection,
    version: u64,
    schema: Arc<Schema>,
}

impl EditorState {
    /// Start with the cursor at the beginning of the first textblock.
    pub fn new(doc: Document, schema: Arc<Schema>) -> Self {
        let mut cursor = None;
        doc.descendants(|element, pos| {
            if cursor.is_none() && element.is_textblock() {
                cursor = Some(pos + 1);
            }
        });
        EditorState {
            doc,
            selection: Selection::cursor(cursor.unwrap_or(0)),
            version: 0,
            schema,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn tr(&self) -> Transaction {
        Transaction {
            schema: Arc::clone(&self.schema),
            doc: self.doc.clone(),
            selection: self.selection,
            doc_changed: false,
            steps: 0,
        }
    }

    /// The state after `tr`. The version moves only when the document changed.
    pub fn apply(&self, tr: Transaction) -> EditorState {
        let size = tr.doc.content_size();
        EditorState {
            version: if tr.doc_changed {
                self.version + 1
            } else {
                self.version
            },
            selection: tr.selection.map(|p| p.min(size)),
            doc: tr.doc,
            schema: tr.schema,
        }
    }
}

/// A sequence of steps building the next document and selection.
pub struct Transaction {
    schema: Arc<Schema>,
    doc: Document,
    selection: Selection,
    doc_changed: bool,
    steps: usize,
}

impl Transaction {
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn doc_changed(&self) -> bool {
        self.doc_changed
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = selection;
        self
    }

    /// Validate `doc` and make it the transaction's document.
    fn commit(&mut self, doc: Document) -> Result<(), TransformError> {
        self.schema.check(&doc)?;
        self.doc = doc;
        self.doc_changed = true;
        self.steps += 1;
        Ok(())
    }

    /// Change the type and attributes of the element starting at `pos`.
    /// Attributes left out of `attrs` take the new type's defaults.
    pub fn set_node_markup(
        &mut self,
        pos: usize,
        kind: Option<NodeType>,
        attrs: Attrs,
    ) -> Result<&mut Self, TransformError> {
        let path = self
            .doc
            .path_at(pos)
            .ok_or(TransformError::NoElementAt(pos))?;
        let mut doc = self.doc.clone();
        let element = doc
            .element_mut(&path)
            .ok_or(TransformError::NoElementAt(pos))?;
        let kind = kind.unwrap_or(element.kind);
        let created = self.schema.create(kind, &attrs, Content::Inline(Vec::new()))?;
        element.kind = kind;
        element.attrs = created.attrs;
        self.commit(doc)?;
        Ok(self)
    }

    /// Replace the children `range` of the element at `parent` (the root when empty).
    pub fn replace_children(
        &mut self,
        parent: &[usize],
        range: std::ops::Range<usize>,
        with: Vec<Element>,
    ) -> Result<&mut Self, TransformError> {
        let pos = self.doc.position_of(parent).unwrap_or(0);
        let mut doc = self.doc.clone();
        let children = doc
            .children_mut(parent)
            .ok_or(TransformError::NoElementAt(pos))?;
        if range.start > range.end || range.end > children.len() {
            return Err(TransformError::OutOfRange(pos));
        }
        children.splice(range, with);
        self.commit(doc)?;
        Ok(self)
    }

    /// Insert plain text at `pos`, which must sit inside a textblock.
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<&mut Self, TransformError> {
        if text.is_empty() {
            return Ok(self);
        }
        let rp = self.doc.resolve(pos).ok_or(TransformError::OutOfRange(pos))?;
        let offset = rp.parent_offset();
        let mut doc = self.doc.clone();
        let inlines = textblock_inlines(&mut doc, &rp.path, pos)?;
        let (mut left, right) = split_inlines(std::mem::take(inlines), offset);
        left.push(InlineNode::text(text));
        left.extend(right);
        *inlines = normalize_inlines(left);
        self.commit(doc)?;

        let len = text.chars().count();
        self.selection = self.selection.map(|p| if p >= pos { p + len } else { p });
        Ok(self)
    }

    /// Delete the inline content between `from` and `to` inside one textblock.
    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, TransformError> {
        if from >= to {
            return Ok(self);
        }
        let start = self.doc.resolve(from).ok_or(TransformError::OutOfRange(from))?;
        let end = self.doc.resolve(to).ok_or(TransformError::OutOfRange(to))?;
        if start.path != end.path {
            return Err(TransformError::SpansBlocks { from, to });
        }
        let mut doc = self.doc.clone();
        let inlines = textblock_inlines(&mut doc, &start.path, from)?;
        let (mut left, rest) = split_inlines(std::mem::take(inlines), start.parent_offset());
        let (_, right) = split_inlines(rest, to - from);
        left.extend(right);
        *inlines = normalize_inlines(left);
        self.commit(doc)?;

        let len = to - from;
        self.selection = self.selection.map(|p| {
            if p >= to {
                p - len
            } else if p > from {
                from
            } else {
                p
            }
        });
        Ok(self)
    }

    /// Split the textblock at `pos`, along with `depth - 1` of its ancestors.
    /// Both halves keep the type and attributes of the element they came from.
    pub fn split(&mut self, pos: usize, depth: usize) -> Result<&mut Self, TransformError> {
        let rp = self.doc.resolve(pos).ok_or(TransformError::OutOfRange(pos))?;
        if !rp.in_textblock(&self.doc) {
            return Err(TransformError::NotInTextblock(pos));
        }
        if depth == 0 || depth > rp.depth() {
            return Err(TransformError::InvalidDepth { pos, depth });
        }

        let path = rp.path;
        let textblock = self
            .doc
            .element(&path)
            .ok_or(TransformError::NotInTextblock(pos))?;
        let (l, r) = split_inlines(textblock.inlines().to_vec(), pos - rp.start);
        let mut left = Element::new(textblock.kind, textblock.attrs.clone(), Content::Inline(l));
        let mut right = Element::new(textblock.kind, textblock.attrs.clone(), Content::Inline(r));

        for d in 1..depth {
            let index = path[path.len() - d];
            let ancestor = self
                .doc
                .element(&path[..path.len() - d])
                .ok_or(TransformError::InvalidDepth { pos, depth })?;
            let children = ancestor.children();
            let mut before = children[..index].to_vec();
            before.push(left);
            let mut after = vec![right];
            after.extend_from_slice(&children[index + 1..]);
            left = Element::container(ancestor.kind, ancestor.attrs.clone(), before);
            right = Element::container(ancestor.kind, ancestor.attrs.clone(), after);
        }

        let top = path.len() - depth;
        let index = path[top];
        let mut doc = self.doc.clone();
        let siblings = doc
            .children_mut(&path[..top])
            .ok_or(TransformError::InvalidDepth { pos, depth })?;
        siblings.splice(index..index + 1, [left, right]);
        self.commit(doc)?;

        let shift = 2 * depth;
        self.selection = self.selection.map(|p| if p >= pos { p + shift } else { p });
        Ok(self)
    }

    /// Wrap the element at `path` in `kinds`, outermost first. The outermost
    /// wrapper takes `attrs`; inner wrappers take their defaults.
    pub fn wrap(
        &mut self,
        path: &[usize],
        kinds: &[NodeType],
        attrs: &Attrs,
    ) -> Result<&mut Self, TransformError> {
        let pos = self.doc.position_of(path).ok_or(TransformError::OutOfRange(0))?;
        let (&index, parent) = path.split_last().ok_or(TransformError::NoElementAt(pos))?;
        let target = self
            .doc
            .element(path)
            .ok_or(TransformError::NoElementAt(pos))?;
        let end = pos + target.size();

        let mut wrapped = target.clone();
        for (i, kind) in kinds.iter().enumerate().rev() {
            let wrapper_attrs = if i == 0 { attrs.clone() } else { Attrs::new() };
            wrapped = self
                .schema
                .create(*kind, &wrapper_attrs, Content::Blocks(vec![wrapped]))?;
        }

        let mut doc = self.doc.clone();
        let siblings = doc
            .children_mut(parent)
            .ok_or(TransformError::NoElementAt(pos))?;
        siblings[index] = wrapped;
        self.commit(doc)?;

        let n = kinds.len();
        self.selection = self.selection.map(|p| {
            if p >= end {
                p + 2 * n
            } else if p > pos {
                p + n
            } else {
                p
            }
        });
        Ok(self)
    }

    /// Move child `index` of the container at `container` out of it, splitting
    /// the container around it. A textblock child is moved as is; a container
    /// child is unwrapped and its children moved.
    pub fn lift(&mut self, container: &[usize], index: usize) -> Result<&mut Self, TransformError> {
        let container_pos = self
            .doc
            .position_of(container)
            .ok_or(TransformError::OutOfRange(0))?;
        let (&container_index, parent) = container
            .split_last()
            .ok_or(TransformError::NoElementAt(container_pos))?;
        let element = self
            .doc
            .element(container)
            .ok_or(TransformError::NoElementAt(container_pos))?;
        let children = element.children();
        let child = children
            .get(index)
            .ok_or(TransformError::NoElementAt(container_pos))?;

        let before = &children[..index];
        let after = &children[index + 1..];
        let unwrap = !child.is_textblock();
        let lifted: Vec<Element> = if unwrap {
            child.children().to_vec()
        } else {
            vec![child.clone()]
        };

        let mut replacement = Vec::new();
        if !before.is_empty() {
            replacement.push(Element::container(element.kind, element.attrs.clone(), before.to_vec()));
        }
        replacement.extend(lifted);
        if !after.is_empty() {
            replacement.push(Element::container(element.kind, element.attrs.clone(), after.to_vec()));
        }

        let before_size: usize = before.iter().map(Element::size).sum();
        let child_start = container_pos + 1 + before_size;
        let child_end = child_start + child.size();
        let container_end = container_pos + element.size();
        let old_inner = (child_start + usize::from(unwrap)) as i64;
        let new_inner = if before.is_empty() {
            container_pos
        } else {
            container_pos + 2 + before_size
        } as i64;
        let inner_delta = new_inner - old_inner;
        let total_delta = replacement.iter().map(Element::size).sum::<usize>() as i64
            - element.size() as i64;

        let mut doc = self.doc.clone();
        let siblings = doc
            .children_mut(parent)
            .ok_or(TransformError::NoElementAt(container_pos))?;
        siblings.splice(container_index..container_index + 1, replacement);
        self.commit(doc)?;

        self.selection = self.selection.map(|p| {
            if p >= container_end {
                (p as i64 + total_delta) as usize
            } else if p > child_start && p < child_end {
                (p as i64 + inner_delta) as usize
            } else {
                p
            }
        });
        Ok(self)
    }
}

fn textblock_inlines<'d>(
    doc: &'d mut Document,
    path: &[usize],
    pos: usize,
) -> Result<&'d mut Vec<InlineNode>, TransformError> {
    match doc.element_mut(path).map(|e| &mut e.content) {
        Some(Content::Inline(inlines)) => Ok(inlines),
        _ => Err(TransformError::NotInTextblock(pos)),
    }
}
