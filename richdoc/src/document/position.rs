use super::{Content, Document, Element};

/// A position resolved against a document: the chain of elements it sits inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPos {
    pub pos: usize,
    /// Child indices from the root to the innermost containing element.
    /// Empty when the position sits directly in the document's top-level content.
    pub path: Vec<usize>,
    /// Position where the innermost container's content begins.
    pub start: usize,
}

impl ResolvedPos {
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn parent_offset(&self) -> usize {
        self.pos - self.start
    }

    /// The innermost containing element, or `None` at the document root.
    pub fn parent<'d>(&self, doc: &'d Document) -> Option<&'d Element> {
        doc.element(&self.path)
    }

    /// The ancestor at `depth` (1 = top-level block).
    pub fn node<'d>(&self, doc: &'d Document, depth: usize) -> Option<&'d Element> {
        if depth == 0 || depth > self.path.len() {
            return None;
        }
        doc.element(&self.path[..depth])
    }

    /// Start position of the ancestor at `depth`.
    pub fn before(&self, doc: &Document, depth: usize) -> Option<usize> {
        if depth == 0 || depth > self.path.len() {
            return None;
        }
        doc.position_of(&self.path[..depth])
    }

    /// True when the innermost container holds inline content.
    pub fn in_textblock(&self, doc: &Document) -> bool {
        self.parent(doc).is_some_and(Element::is_textblock)
    }
}

impl Document {
    /// Resolve `pos` to its containing elements. `None` when out of range.
    pub fn resolve(&self, pos: usize) -> Option<ResolvedPos> {
        if pos > self.content_size() {
            return None;
        }
        let mut path = Vec::new();
        let mut children = self.content.as_slice();
        let mut start = 0;
        loop {
            let mut child_pos = start;
            let mut descend = None;
            for (i, child) in children.iter().enumerate() {
                let end = child_pos + child.size();
                if pos > child_pos && pos < end {
                    descend = Some((i, child_pos, child));
                    break;
                }
                child_pos = end;
            }
            let Some((index, child_pos, child)) = descend else {
                return Some(ResolvedPos { pos, path, start });
            };
            path.push(index);
            start = child_pos + 1;
            match &child.content {
                Content::Blocks(inner) => children = inner,
                Content::Inline(_) => return Some(ResolvedPos { pos, path, start }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{Attrs, Document, Element, NodeType};

    #[test]
    fn resolves_into_nested_textblock() {
        let doc = Document::new(vec![
            Element::paragraph("one"),
            Element::container(NodeType::Question, Attrs::new(), vec![Element::paragraph("two")]),
        ]);
        // paragraph 0..5, question 5..12, inner paragraph 6..11
        let rp = doc.resolve(8).unwrap();
        assert_eq!(rp.path, vec![1, 0]);
        assert_eq!(rp.start, 7);
        assert_eq!(rp.parent_offset(), 1);
        assert!(rp.in_textblock(&doc));
        assert_eq!(rp.before(&doc, 1), Some(5));
        assert_eq!(rp.before(&doc, 2), Some(6));
    }

    #[test]
    fn boundary_positions_resolve_to_container() {
        let doc = Document::new(vec![Element::paragraph("one")]);
        assert!(doc.resolve(0).unwrap().path.is_empty());
        assert!(doc.resolve(5).unwrap().path.is_empty());
        assert!(doc.resolve(6).is_none());
    }
}
