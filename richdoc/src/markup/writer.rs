use crate::document::{Element, NodeType};
use crate::schema::Schema;

/// Written between two adjacent lists of the same kind, which would otherwise
/// continue each other.
pub const LIST_SEPARATOR: &str = "<!-- -->";

/// Serializer state for the markup dialect.
///
/// Blocks are separated lazily: closing a block only records that a separator
/// is owed, and the next write flushes it. `delim` is the prefix repeated at
/// the start of every line inside wrapped blocks (`> ` for questions, two
/// spaces for list item continuations).
pub struct MarkupWriter<'s> {
    schema: &'s Schema,
    out: String,
    delim: String,
    closed: Option<NodeType>,
    in_tight_list: bool,
}

impl<'s> MarkupWriter<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        MarkupWriter {
            schema,
            out: String::new(),
            delim: String::new(),
            closed: None,
            in_tight_list: false,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn at_blank(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    /// Emit the separator owed by the last closed block: `size` line breaks.
    fn flush_close(&mut self, size: usize) {
        if self.closed.is_none() {
            return;
        }
        if !self.at_blank() {
            self.out.push('\n');
        }
        let trimmed = self.delim.trim_end().to_string();
        for _ in 1..size {
            self.out.push_str(&trimmed);
            self.out.push('\n');
        }
        self.closed = None;
    }

    /// Write raw markup, prefixed by the current delimiter at line starts.
    pub fn write(&mut self, content: &str) {
        self.flush_close(2);
        if !self.delim.is_empty() && self.at_blank() {
            self.out.push_str(&self.delim);
        }
        self.out.push_str(content);
    }

    /// Write already-rendered inline markup, one line at a time.
    pub fn text(&mut self, text: &str) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.write("");
            let line = escape_line_end(line);
            if self.at_line_start() {
                self.out.push_str(&escape_line_start(&line));
            } else {
                self.out.push_str(&line);
            }
        }
    }

    /// True when the current line holds only delimiters and list markers.
    fn at_line_start(&self) -> bool {
        let line = self.out.rsplit('\n').next().unwrap_or("");
        line.chars().all(|c| matches!(c, ' ' | '>' | '*' | '-' | '+'))
    }

    pub fn close_block(&mut self, kind: NodeType) {
        self.closed = Some(kind);
    }

    /// Render `element` through the node registered for its type.
    pub fn render(&mut self, element: &Element) {
        let schema = self.schema;
        match schema.node(element.kind) {
            Some(node) => node.to_markup(self, element),
            None => tracing::warn!(kind = %element.kind, "no markup serializer, element skipped"),
        }
    }

    pub fn render_content(&mut self, element: &Element) {
        for child in element.children() {
            self.render(child);
        }
    }

    pub fn render_inline(&mut self, element: &Element) {
        let rendered: String = element.inlines().iter().map(|n| n.to_string()).collect();
        self.text(&rendered);
    }

    /// Render `f`'s output with `delim` prefixed to every line; `first_delim`
    /// replaces it on the first line.
    pub fn wrap_block(
        &mut self,
        delim: &str,
        first_delim: Option<&str>,
        kind: NodeType,
        f: impl FnOnce(&mut Self),
    ) {
        let old = self.delim.clone();
        self.write(first_delim.unwrap_or(delim));
        self.delim.push_str(delim);
        f(self);
        self.delim = old;
        self.close_block(kind);
    }

    /// Render the items of a list element. Lists are always written tight.
    pub fn render_list(
        &mut self,
        element: &Element,
        delim: &str,
        first_delim: impl Fn(usize) -> String,
    ) {
        if self.closed == Some(element.kind) {
            self.flush_close(2);
            self.write(LIST_SEPARATOR);
            self.closed = Some(element.kind);
        } else if self.in_tight_list {
            self.flush_close(1);
        }

        let prev_tight = self.in_tight_list;
        self.in_tight_list = true;
        for (i, child) in element.children().iter().enumerate() {
            if i > 0 {
                self.flush_close(1);
            }
            let first = first_delim(i);
            self.wrap_block(delim, Some(&first), element.kind, |w| w.render(child));
        }
        self.in_tight_list = prev_tight;
    }
}

/// Escape what would start a block construct, or be stripped, at the
/// beginning of a line.
fn escape_line_start(line: &str) -> String {
    let trimmed = line.trim_start_matches([' ', '\t']);
    let indent = encode_whitespace(&line[..line.len() - trimmed.len()]);

    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    let after_hashes = &trimmed[hashes..];
    if hashes > 0 && hashes <= 6 && (after_hashes.is_empty() || after_hashes.starts_with(' ')) {
        return format!("{}\\{}", indent, trimmed);
    }
    if trimmed.starts_with('>') || is_bullet_marker(trimmed) {
        return format!("{}\\{}", indent, trimmed);
    }
    // Thematic breaks and setext underlines.
    if !trimmed.is_empty()
        && (trimmed.chars().all(|c| matches!(c, '-' | ' '))
            || trimmed.chars().all(|c| matches!(c, '=' | ' ')))
    {
        return format!("{}\\{}", indent, trimmed);
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(after) = rest.strip_prefix(['.', ')']) {
            if after.is_empty() || after.starts_with(' ') {
                return format!("{}{}\\{}", indent, &trimmed[..digits], rest);
            }
        }
    }
    format!("{}{}", indent, trimmed)
}

/// `-` or `+` followed by a space or the end of the line.
fn is_bullet_marker(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(chars.next(), Some('-' | '+')) && matches!(chars.next(), None | Some(' '))
}

/// Trailing whitespace is dropped by the parser, and two spaces make a hard break.
fn escape_line_end(line: &str) -> String {
    let trimmed = line.trim_end_matches([' ', '\t']);
    format!("{}{}", trimmed, encode_whitespace(&line[trimmed.len()..]))
}

fn encode_whitespace(ws: &str) -> String {
    ws.chars()
        .map(|c| if c == '\t' { "&#9;" } else { "&#32;" })
        .collect()
}
