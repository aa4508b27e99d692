use std::fmt;

/// Placeholder character used when an atomic inline is flattened to text.
pub const LEAF_TEXT: char = '\u{fffc}';

/// Inline elements that appear within a textblock.
/// Formatting variants behave like marks: they add no positions of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineNode {
    Text(String),
    Strong(Vec<InlineNode>),
    Emphasis(Vec<InlineNode>),
    Strikethrough(Vec<InlineNode>),
    CodeSpan(String),
    Link {
        dest: String,
        title: String,
        content: Vec<InlineNode>,
    },
    Image {
        dest: String,
        title: String,
        alt: Vec<InlineNode>,
    },
    SoftBreak,
    HardBreak,
}

impl InlineNode {
    pub fn text(text: impl Into<String>) -> Self {
        InlineNode::Text(text.into())
    }

    /// Number of positions this inline occupies.
    pub fn size(&self) -> usize {
        match self {
            InlineNode::Text(s) | InlineNode::CodeSpan(s) => s.chars().count(),
            InlineNode::Strong(children)
            | InlineNode::Emphasis(children)
            | InlineNode::Strikethrough(children)
            | InlineNode::Link {
                content: children, ..
            } => inline_size(children),
            InlineNode::Image { .. } | InlineNode::SoftBreak | InlineNode::HardBreak => 1,
        }
    }

    /// Plain text of this inline, as used for slugs and input rules.
    pub fn push_text(&self, out: &mut String) {
        match self {
            InlineNode::Text(s) | InlineNode::CodeSpan(s) => out.push_str(s),
            InlineNode::Strong(children)
            | InlineNode::Emphasis(children)
            | InlineNode::Strikethrough(children)
            | InlineNode::Link {
                content: children, ..
            } => {
                for child in children {
                    child.push_text(out);
                }
            }
            InlineNode::Image { .. } => out.push(LEAF_TEXT),
            InlineNode::SoftBreak | InlineNode::HardBreak => out.push('\n'),
        }
    }

    /// Split at `offset` positions. Atomic inlines never split.
    fn split_at(self, offset: usize) -> (Option<InlineNode>, Option<InlineNode>) {
        if offset == 0 {
            return (None, Some(self));
        }
        if offset >= self.size() {
            return (Some(self), None);
        }
        match self {
            InlineNode::Text(s) => {
                let (l, r) = split_string(&s, offset);
                (Some(InlineNode::Text(l)), Some(InlineNode::Text(r)))
            }
            InlineNode::CodeSpan(s) => {
                let (l, r) = split_string(&s, offset);
                (Some(InlineNode::CodeSpan(l)), Some(InlineNode::CodeSpan(r)))
            }
            InlineNode::Strong(children) => {
                let (l, r) = split_inlines(children, offset);
                (Some(InlineNode::Strong(l)), Some(InlineNode::Strong(r)))
            }
            InlineNode::Emphasis(children) => {
                let (l, r) = split_inlines(children, offset);
                (Some(InlineNode::Emphasis(l)), Some(InlineNode::Emphasis(r)))
            }
            InlineNode::Strikethrough(children) => {
                let (l, r) = split_inlines(children, offset);
                (
                    Some(InlineNode::Strikethrough(l)),
                    Some(InlineNode::Strikethrough(r)),
                )
            }
            InlineNode::Link {
                dest,
                title,
                content,
            } => {
                let (l, r) = split_inlines(content, offset);
                (
                    Some(InlineNode::Link {
                        dest: dest.clone(),
                        title: title.clone(),
                        content: l,
                    }),
                    Some(InlineNode::Link {
                        dest,
                        title,
                        content: r,
                    }),
                )
            }
            atomic => (Some(atomic), None),
        }
    }
}

fn split_string(s: &str, offset: usize) -> (String, String) {
    let byte = s
        .char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    (s[..byte].to_string(), s[byte..].to_string())
}

pub fn inline_size(nodes: &[InlineNode]) -> usize {
    nodes.iter().map(InlineNode::size).sum()
}

pub fn inline_text(nodes: &[InlineNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.push_text(&mut out);
    }
    out
}

/// Split an inline sequence at `offset`, dividing any node that straddles it.
pub fn split_inlines(nodes: Vec<InlineNode>, mut offset: usize) -> (Vec<InlineNode>, Vec<InlineNode>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for node in nodes {
        if !right.is_empty() {
            right.push(node);
            continue;
        }
        let size = node.size();
        if offset >= size && size > 0 {
            offset -= size;
            left.push(node);
            continue;
        }
        let (l, r) = node.split_at(offset);
        offset = 0;
        left.extend(l);
        right.extend(r);
    }
    (normalize_inlines(left), normalize_inlines(right))
}

/// Merge adjacent text runs and drop empty ones.
pub fn normalize_inlines(nodes: Vec<InlineNode>) -> Vec<InlineNode> {
    let mut out: Vec<InlineNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            InlineNode::Text(s) if s.is_empty() => {}
            InlineNode::Text(s) => {
                if let Some(InlineNode::Text(prev)) = out.last_mut() {
                    prev.push_str(&s);
                } else {
                    out.push(InlineNode::Text(s));
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Backslash-escape characters that would otherwise be read as inline markup.
fn escape_text(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for (i, ch) in text.char_indices() {
        let escape = match ch {
            '\\' | '*' | '_' | '`' | '[' | ']' | '~' | '<' => true,
            '&' => starts_entity(&text[i + 1..]),
            _ => false,
        };
        if escape {
            write!(f, "\\")?;
        }
        write!(f, "{}", ch)?;
    }
    Ok(())
}

/// Whether `rest`, following an `&`, reads as a character reference.
fn starts_entity(rest: &str) -> bool {
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
        .unwrap_or(rest.len());
    name_len > 0 && rest[name_len..].starts_with(';')
}

/// A code span fenced by one more backtick than the longest run inside it.
fn write_code_span(f: &mut fmt::Formatter<'_>, code: &str) -> fmt::Result {
    let mut longest = 0;
    let mut run = 0;
    for ch in code.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let fence = "`".repeat(longest + 1);
    // One space on each side is stripped when reading, so pad when the
    // content touches a backtick or already has that padding.
    let padded = code.starts_with('`')
        || code.ends_with('`')
        || (code.len() > 1 && code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
    if padded {
        write!(f, "{} {} {}", fence, code, fence)
    } else {
        write!(f, "{}{}{}", fence, code, fence)
    }
}

/// `(dest "title")`, bracketing destinations that contain spaces or parentheses.
fn write_destination(f: &mut fmt::Formatter<'_>, dest: &str, title: &str) -> fmt::Result {
    write!(f, "(")?;
    if dest.contains([' ', '(', ')']) {
        write!(f, "<{}>", dest.replace('<', "\\<").replace('>', "\\>"))?;
    } else {
        write!(f, "{}", dest)?;
    }
    if !title.is_empty() {
        write!(f, " \"{}\"", title.replace('\\', "\\\\").replace('"', "\\\""))?;
    }
    write!(f, ")")
}

/// Renders the inline in the markup dialect.
impl fmt::Display for InlineNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InlineNode::Text(s) => escape_text(f, s),
            InlineNode::Strong(children) => {
                write!(f, "**")?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                write!(f, "**")
            }
            InlineNode::Emphasis(children) => {
                write!(f, "*")?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                write!(f, "*")
            }
            InlineNode::Strikethrough(children) => {
                write!(f, "~~")?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                write!(f, "~~")
            }
            InlineNode::CodeSpan(code) => write_code_span(f, code),
            InlineNode::Link {
                dest,
                title,
                content,
            } => {
                write!(f, "[")?;
                for child in content {
                    write!(f, "{}", child)?;
                }
                write!(f, "]")?;
                write_destination(f, dest, title)
            }
            InlineNode::Image { dest, title, alt } => {
                write!(f, "![")?;
                for child in alt {
                    write!(f, "{}", child)?;
                }
                write!(f, "]")?;
                write_destination(f, dest, title)
            }
            InlineNode::SoftBreak => writeln!(f),
            InlineNode::HardBreak => writeln!(f, "\\"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_inside_marked_text() {
        let nodes = vec![
            InlineNode::text("ab"),
            InlineNode::Strong(vec![InlineNode::text("cd")]),
        ];
        let (left, right) = split_inlines(nodes, 3);
        assert_eq!(
            left,
            vec![
                InlineNode::text("ab"),
                InlineNode::Strong(vec![InlineNode::text("c")])
            ]
        );
        assert_eq!(right, vec![InlineNode::Strong(vec![InlineNode::text("d")])]);
    }

    #[test]
    fn split_counts_chars_not_bytes() {
        let (left, right) = split_inlines(vec![InlineNode::text("héllo")], 2);
        assert_eq!(inline_text(&left), "hé");
        assert_eq!(inline_text(&right), "llo");
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(InlineNode::text("a*b_c").to_string(), "a\\*b\\_c");
    }

    #[test]
    fn escapes_only_entity_like_ampersands() {
        assert_eq!(InlineNode::text("&amp; &#35; & a&b").to_string(), "\\&amp; \\&#35; & a&b");
    }

    #[test]
    fn code_span_fence_outgrows_backtick_runs() {
        assert_eq!(InlineNode::CodeSpan("a`b".into()).to_string(), "``a`b``");
        assert_eq!(InlineNode::CodeSpan("``x".into()).to_string(), "``` ``x ```");
        assert_eq!(InlineNode::CodeSpan(" x ".into()).to_string(), "`  x  `");
        assert_eq!(InlineNode::CodeSpan("plain".into()).to_string(), "`plain`");
    }

    #[test]
    fn links_keep_titles() {
        let link = InlineNode::Link {
            dest: "https://x.test".into(),
            title: "Say \"hi\"".into(),
            content: vec![InlineNode::text("x")],
        };
        assert_eq!(link.to_string(), "[x](https://x.test \"Say \\\"hi\\\"\")");
        let image = InlineNode::Image {
            dest: "a b.png".into(),
            title: String::new(),
            alt: vec![InlineNode::text("pic")],
        };
        assert_eq!(image.to_string(), "![pic](<a b.png>)");
    }
}
