use std::collections::{HashMap, HashSet};

use crate::document::{Document, DocumentError, Element, NodeType};
use crate::nodes::Heading;
use crate::slug;

/// An anchor id assigned to one heading in one tracking pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Start position of the heading.
    pub pos: usize,
    /// Pass-unique id.
    pub id: String,
    /// Unsuffixed slug of the heading text.
    pub slug: String,
    pub level: u8,
    pub collapsed: bool,
}

/// Pass-local disambiguation state. Never reused across passes.
#[derive(Debug, Default)]
struct AnchorTracker {
    /// Base slug -> occurrences so far.
    seen: HashMap<String, usize>,
    /// Ids already handed out.
    taken: HashSet<String>,
}

impl AnchorTracker {
    /// Returns `(base slug, assigned id)`.
    fn assign(&mut self, text: &str) -> (String, String) {
        let base = slug::encode(text, None);
        let mut n = self.seen.get(&base).copied().unwrap_or(0);
        let mut id = slug::encode(text, Some(n));
        // A literal heading such as "Intro 1" may already hold the suffixed form.
        while self.taken.contains(&id) {
            n += 1;
            id = slug::encode(text, Some(n));
        }
        self.seen.insert(base.clone(), n + 1);
        self.taken.insert(id.clone());
        (base, id)
    }
}

/// Assign ids to a sequence of heading texts, in order.
pub fn assign_ids<'t>(texts: impl IntoIterator<Item = &'t str>) -> Vec<String> {
    let mut tracker = AnchorTracker::default();
    texts.into_iter().map(|t| tracker.assign(t).1).collect()
}

/// Walk the document in order and assign a unique anchor id to every heading.
///
/// Fails if a heading does not hold inline content; callers keep their
/// previous anchors in that case.
pub fn compute_anchors(doc: &Document) -> Result<Vec<Anchor>, DocumentError> {
    let mut tracker = AnchorTracker::default();
    let mut anchors = Vec::new();
    let mut failure = None;

    doc.descendants(|element: &Element, pos| {
        if element.kind != NodeType::Heading || failure.is_some() {
            return;
        }
        if !element.is_textblock() {
            failure = Some(DocumentError::MalformedElement {
                kind: element.kind,
                pos,
                expected: "inline*".to_string(),
            });
            return;
        }
        let (slug, id) = tracker.assign(&element.text_content());
        anchors.push(Anchor {
            pos,
            id,
            slug,
            level: Heading::level(element),
            collapsed: Heading::is_collapsed(element),
        });
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(anchors),
    }
}
