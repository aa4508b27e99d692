use std::collections::BTreeMap;

use richdoc::dom::DomSpec;
use richdoc::nodes::ANCHOR_CLASS;
use richdoc::Anchor;

/// A positioned view-only element. Widgets never change the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub pos: usize,
    /// `-1` places the widget before content inserted at `pos`.
    pub side: i8,
    /// Identity for view reuse across rebuilds.
    pub key: String,
    pub class_name: &'static str,
    /// Fold state of the heading when the widget was built.
    pub collapsed: bool,
}

impl Widget {
    pub fn anchor(anchor: &Anchor) -> Self {
        Widget {
            pos: anchor.pos,
            side: -1,
            key: anchor.id.clone(),
            class_name: ANCHOR_CLASS,
            collapsed: anchor.collapsed,
        }
    }

    pub fn to_dom(&self) -> DomSpec {
        let fold = if self.collapsed { "collapsed" } else { "expanded" };
        DomSpec::element("a")
            .attr("id", self.key.clone())
            .attr("class", self.class_name)
            .attr("data-fold", fold)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    widgets: Vec<Widget>,
}

impl DecorationSet {
    pub fn new(mut widgets: Vec<Widget>) -> Self {
        widgets.sort_by_key(|w| (w.pos, w.side));
        DecorationSet { widgets }
    }

    pub fn from_anchors(anchors: &[Anchor]) -> Self {
        DecorationSet::new(anchors.iter().map(Widget::anchor).collect())
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn find(&self, key: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.key == key)
    }

    pub fn at(&self, pos: usize) -> impl Iterator<Item = &Widget> {
        self.widgets.iter().filter(move |w| w.pos == pos)
    }

    pub fn extend(&mut self, other: &DecorationSet) {
        self.widgets.extend(other.widgets.iter().cloned());
        self.widgets.sort_by_key(|w| (w.pos, w.side));
    }

    /// Widget DOM grouped by position, for HTML rendering.
    pub fn to_dom_map(&self) -> BTreeMap<usize, Vec<DomSpec>> {
        let mut map: BTreeMap<usize, Vec<DomSpec>> = BTreeMap::new();
        for widget in &self.widgets {
            map.entry(widget.pos).or_default().push(widget.to_dom());
        }
        map
    }
}
