use std::collections::BTreeMap;

use crate::document::{Content, Document, Element, InlineNode};
use crate::schema::Schema;

/// Output description of an element for the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DomSpec {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<DomSpec>,
    },
    Text(String),
    /// Where the element's own content is rendered.
    Hole,
}

impl DomSpec {
    pub fn element(tag: impl Into<String>) -> Self {
        DomSpec::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let DomSpec::Element { attrs, .. } = &mut self {
            attrs.push((name.to_string(), value.into()));
        }
        self
    }

    pub fn child(mut self, child: DomSpec) -> Self {
        if let DomSpec::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Write as HTML; `fill` renders the element's content at the hole.
    pub fn write_html(&self, out: &mut String, fill: &mut dyn FnMut(&mut String)) {
        match self {
            DomSpec::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_html(value));
                    out.push('"');
                }
                out.push('>');
                for child in children {
                    child.write_html(out, fill);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            DomSpec::Text(text) => out.push_str(&escape_html(text)),
            DomSpec::Hole => fill(out),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the document as HTML. `widgets` are emitted just before the element
/// starting at their position.
pub fn render_html(doc: &Document, schema: &Schema, widgets: &BTreeMap<usize, Vec<DomSpec>>) -> String {
    let mut out = String::new();
    render_blocks(&doc.content, 0, schema, widgets, &mut out);
    out
}

fn render_blocks(
    children: &[Element],
    start: usize,
    schema: &Schema,
    widgets: &BTreeMap<usize, Vec<DomSpec>>,
    out: &mut String,
) {
    let mut pos = start;
    for child in children {
        if let Some(specs) = widgets.get(&pos) {
            for widget in specs {
                widget.write_html(out, &mut |_| {});
            }
        }
        let Some(spec) = schema.to_dom(child) else {
            tracing::warn!(kind = %child.kind, "no DOM mapping, element skipped");
            pos += child.size();
            continue;
        };
        let content_start = pos + 1;
        spec.write_html(out, &mut |out| match &child.content {
            Content::Blocks(inner) => render_blocks(inner, content_start, schema, widgets, out),
            Content::Inline(inlines) => render_inlines(inlines, out),
        });
        pos += child.size();
    }
}

fn render_inlines(inlines: &[InlineNode], out: &mut String) {
    for inline in inlines {
        match inline {
            InlineNode::Text(s) => out.push_str(&escape_html(s)),
            InlineNode::Strong(children) => wrap_inlines("strong", children, out),
            InlineNode::Emphasis(children) => wrap_inlines("em", children, out),
            InlineNode::Strikethrough(children) => wrap_inlines("s", children, out),
            InlineNode::CodeSpan(code) => {
                out.push_str("<code>");
                out.push_str(&escape_html(code));
                out.push_str("</code>");
            }
            InlineNode::Link { dest, content, .. } => {
                out.push_str(&format!("<a href=\"{}\">", escape_html(dest)));
                render_inlines(content, out);
                out.push_str("</a>");
            }
            InlineNode::Image { dest, alt, .. } => {
                let mut text = String::new();
                for node in alt {
                    node.push_text(&mut text);
                }
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    escape_html(dest),
                    escape_html(&text)
                ));
            }
            InlineNode::SoftBreak => out.push('\n'),
            InlineNode::HardBreak => out.push_str("<br>"),
        }
    }
}

fn wrap_inlines(tag: &str, children: &[InlineNode], out: &mut String) {
    out.push_str(&format!("<{}>", tag));
    render_inlines(children, out);
    out.push_str(&format!("</{}>", tag));
}
