use std::collections::HashSet;

use proptest::prelude::*;
use richdoc::anchors::assign_ids;
use richdoc::nodes::Heading;
use richdoc::slug::{encode, persistence_key};
use richdoc::{Attrs, Content, Document, DocumentError, Element, NodeType, compute_anchors};

fn heading(level: u8, text: &str) -> Element {
    Element::textblock(NodeType::Heading, Heading::attrs(level), text)
}

#[test]
fn scenario_ids_and_positions() {
    let doc = richdoc::parse("# Getting Started\n\n## Setup\n\n## Setup", 0).unwrap();
    let anchors = compute_anchors(&doc).unwrap();

    let ids: Vec<&str> = anchors.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["getting-started", "setup", "setup-1"]);
    let positions: Vec<usize> = anchors.iter().map(|a| a.pos).collect();
    assert_eq!(positions, vec![0, 17, 24]);
    assert_eq!(anchors[2].slug, "setup");
    assert_eq!(anchors[2].level, 2);
}

#[test]
fn headings_inside_containers_are_not_anchored() {
    let doc = Document::new(vec![
        heading(1, "Top"),
        Element::container(NodeType::Question, Attrs::new(), vec![Element::paragraph("Top")]),
        heading(2, "Top"),
    ]);
    let anchors = compute_anchors(&doc).unwrap();
    assert_eq!(anchors.len(), 2);
    assert_eq!(anchors[1].id, "top-1");
    assert_eq!(anchors[1].pos, 5 + 7);
}

#[test]
fn collapsed_flag_is_reported() {
    let doc = Document::new(vec![Element::textblock(
        NodeType::Heading,
        Heading::attrs(3).with("collapsed", true),
        "Folded",
    )]);
    let anchors = compute_anchors(&doc).unwrap();
    assert!(anchors[0].collapsed);
}

#[test]
fn malformed_heading_fails_closed() {
    let doc = Document::new(vec![Element::new(
        NodeType::Heading,
        Heading::attrs(1),
        Content::Blocks(vec![Element::paragraph("oops")]),
    )]);
    assert!(matches!(
        compute_anchors(&doc),
        Err(DocumentError::MalformedElement {
            kind: NodeType::Heading,
            pos: 0,
            ..
        })
    ));
}

#[test]
fn persistence_key_matches_anchor_slug() {
    let doc = richdoc::parse("## Setup\n\n## Setup", 0).unwrap();
    let anchors = compute_anchors(&doc).unwrap();
    for anchor in &anchors {
        assert_eq!(persistence_key("notes", "Setup"), format!("heading-fold:notes:{}", anchor.slug));
    }
}

proptest! {
    #[test]
    fn ids_are_unique(texts in prop::collection::vec("[ab1 -]{0,5}", 0..24)) {
        let ids = assign_ids(texts.iter().map(String::as_str));
        let unique: HashSet<&String> = ids.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn ids_ignore_surrounding_content(
        texts in prop::collection::vec("[a-d ]{1,6}", 1..12),
        filler in "[x-z]{0,8}",
    ) {
        let plain = Document::new(texts.iter().map(|t| heading(1, t)).collect());
        let padded = Document::new(
            texts
                .iter()
                .flat_map(|t| [Element::paragraph(&filler), heading(2, t)])
                .collect(),
        );
        let a: Vec<String> = compute_anchors(&plain).unwrap().into_iter().map(|a| a.id).collect();
        let b: Vec<String> = compute_anchors(&padded).unwrap().into_iter().map(|a| a.id).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn first_occurrence_keeps_bare_slug(text in "[A-Za-z ]{1,12}") {
        let ids = assign_ids([text.as_str(), text.as_str()]);
        prop_assert_eq!(&ids[0], &encode(&text, None));
        prop_assert_ne!(&ids[0], &ids[1]);
    }
}
