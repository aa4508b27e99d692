pub mod attrs;
pub mod inline;
mod position;

use std::fmt;

pub use attrs::{AttrValue, Attrs};
pub use inline::InlineNode;
pub use position::ResolvedPos;

/// Tag identifying which descriptor governs an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Paragraph,
    Heading,
    Options,
    ListItem,
    Question,
}

impl NodeType {
    pub const ALL: [NodeType; 5] = [
        NodeType::Paragraph,
        NodeType::Heading,
        NodeType::Options,
        NodeType::ListItem,
        NodeType::Question,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Options => "options",
            NodeType::ListItem => "list_item",
            NodeType::Question => "question",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        NodeType::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised when the tree does not have the shape its schema requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("{kind} at position {pos} has invalid content: expected {expected}")]
    MalformedElement {
        kind: NodeType,
        pos: usize,
        expected: String,
    },
    #[error("no element starts at position {0}")]
    NoElementAt(usize),
    #[error("node type `{0}` is not registered in the schema")]
    UnknownNodeType(NodeType),
}

/// Children of an element: either nested blocks or inline content.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Blocks(Vec<Element>),
    Inline(Vec<InlineNode>),
}

impl Content {
    pub fn size(&self) -> usize {
        match self {
            Content::Blocks(children) => children.iter().map(Element::size).sum(),
            Content::Inline(inlines) => inline::inline_size(inlines),
        }
    }
}

/// One structural unit of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: NodeType,
    pub attrs: Attrs,
    pub content: Content,
}

impl Element {
    pub fn new(kind: NodeType, attrs: Attrs, content: Content) -> Self {
        Element {
            kind,
            attrs,
            content,
        }
    }

    /// A textblock holding a single run of plain text.
    pub fn textblock(kind: NodeType, attrs: Attrs, text: &str) -> Self {
        let inlines = if text.is_empty() {
            Vec::new()
        } else {
            vec![InlineNode::text(text)]
        };
        Element::new(kind, attrs, Content::Inline(inlines))
    }

    pub fn paragraph(text: &str) -> Self {
        Element::textblock(NodeType::Paragraph, Attrs::new(), text)
    }

    pub fn container(kind: NodeType, attrs: Attrs, children: Vec<Element>) -> Self {
        Element::new(kind, attrs, Content::Blocks(children))
    }

    pub fn is_textblock(&self) -> bool {
        matches!(self.content, Content::Inline(_))
    }

    /// Positions occupied by this element, including its open and close boundary.
    pub fn size(&self) -> usize {
        2 + self.content.size()
    }

    pub fn children(&self) -> &[Element] {
        match &self.content {
            Content::Blocks(children) => children,
            Content::Inline(_) => &[],
        }
    }

    pub fn inlines(&self) -> &[InlineNode] {
        match &self.content {
            Content::Inline(inlines) => inlines,
            Content::Blocks(_) => &[],
        }
    }

    /// Concatenated text of every inline descendant.
    pub fn text_content(&self) -> String {
        match &self.content {
            Content::Inline(inlines) => inline::inline_text(inlines),
            Content::Blocks(children) => children.iter().map(Element::text_content).collect(),
        }
    }
}

/// A Document is the root of the element tree. Top-level content starts at position 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub content: Vec<Element>,
}

impl Document {
    pub fn new(content: Vec<Element>) -> Self {
        Document { content }
    }

    pub fn empty() -> Self {
        Document {
            content: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn content_size(&self) -> usize {
        self.content.iter().map(Element::size).sum()
    }

    /// Visit every element depth-first in document order with its start position.
    pub fn descendants<'a>(&'a self, mut f: impl FnMut(&'a Element, usize)) {
        walk(&self.content, 0, &mut f);
    }

    /// The outermost element starting exactly at `pos`.
    pub fn node_at(&self, pos: usize) -> Option<&Element> {
        let path = self.path_at(pos)?;
        self.element(&path)
    }

    /// Child-index path of the outermost element starting exactly at `pos`.
    pub fn path_at(&self, pos: usize) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut children = self.content.as_slice();
        let mut offset = pos;
        loop {
            let mut start = 0;
            let mut next = None;
            for (i, child) in children.iter().enumerate() {
                let end = start + child.size();
                if offset < end {
                    next = Some((i, start, child));
                    break;
                }
                start = end;
            }
            let (index, start, child) = next?;
            path.push(index);
            if offset == start {
                return Some(path);
            }
            match &child.content {
                Content::Blocks(inner) => {
                    children = inner;
                    offset -= start + 1;
                }
                Content::Inline(_) => return None,
            }
        }
    }

    pub fn element(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut element = self.content.get(*first)?;
        for index in rest {
            element = element.children().get(*index)?;
        }
        Some(element)
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        let mut element = self.content.get_mut(*first)?;
        for index in rest {
            element = match &mut element.content {
                Content::Blocks(children) => children.get_mut(*index)?,
                Content::Inline(_) => return None,
            };
        }
        Some(element)
    }

    /// Mutable block children of the element at `parent` (the root for an empty path).
    pub fn children_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<Element>> {
        if parent.is_empty() {
            return Some(&mut self.content);
        }
        match &mut self.element_mut(parent)?.content {
            Content::Blocks(children) => Some(children),
            Content::Inline(_) => None,
        }
    }

    /// Start position of the element at `path`.
    pub fn position_of(&self, path: &[usize]) -> Option<usize> {
        let mut pos = 0;
        let mut children = self.content.as_slice();
        for (depth, &index) in path.iter().enumerate() {
            let child = children.get(index)?;
            pos += children[..index].iter().map(Element::size).sum::<usize>();
            if depth + 1 < path.len() {
                pos += 1;
                children = match &child.content {
                    Content::Blocks(inner) => inner,
                    Content::Inline(_) => return None,
                };
            }
        }
        Some(pos)
    }
}

fn walk<'a>(children: &'a [Element], start: usize, f: &mut impl FnMut(&'a Element, usize)) {
    let mut pos = start;
    for child in children {
        f(child, pos);
        if let Content::Blocks(inner) = &child.content {
            walk(inner, pos + 1, f);
        }
        pos += child.size();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(vec![
            Element::textblock(NodeType::Heading, Attrs::new().with("level", 1u8), "Title"),
            Element::container(
                NodeType::Question,
                Attrs::new(),
                vec![Element::paragraph("ab"), Element::paragraph("cd")],
            ),
        ])
    }

    #[test]
    fn positions_follow_element_sizes() {
        let doc = sample();
        let mut seen = Vec::new();
        doc.descendants(|el, pos| seen.push((el.kind, pos)));
        assert_eq!(
            seen,
            vec![
                (NodeType::Heading, 0),
                (NodeType::Question, 7),
                (NodeType::Paragraph, 8),
                (NodeType::Paragraph, 12),
            ]
        );
        assert_eq!(doc.content_size(), 17);
    }

    #[test]
    fn node_at_returns_outermost_element() {
        let doc = sample();
        assert_eq!(doc.node_at(7).map(|e| e.kind), Some(NodeType::Question));
        assert_eq!(doc.node_at(12).map(|e| e.kind), Some(NodeType::Paragraph));
        assert!(doc.node_at(3).is_none());
        assert!(doc.node_at(40).is_none());
    }

    #[test]
    fn position_of_inverts_path_at() {
        let doc = sample();
        for pos in [0, 7, 8, 12] {
            let path = doc.path_at(pos).unwrap();
            assert_eq!(doc.position_of(&path), Some(pos));
        }
    }
}
