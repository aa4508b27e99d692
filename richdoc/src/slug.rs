//! URL-safe identifiers derived from heading text.
//!
//! The same normalization backs both anchor ids and collapse-state keys, so the
//! two never drift apart. Keys use the unsuffixed slug; only anchor ids carry a
//! disambiguator.

/// Prefix of every collapse-state persistence key.
pub const PERSISTENCE_PREFIX: &str = "heading-fold";

/// Normalize `text` to a slug, optionally suffixed with a disambiguator.
///
/// Letters are lowercased, every run of other characters becomes one `-`, and
/// leading or trailing separators are dropped. Non-ASCII alphanumerics are kept
/// percent-encoded. `Some(0)` is the same as `None`.
pub fn encode(text: &str, disambiguator: Option<usize>) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if !ch.is_alphanumeric() {
            pending_separator = true;
            continue;
        }
        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;
        if ch.is_ascii() {
            slug.push(ch);
        } else {
            let mut buf = [0u8; 4];
            slug.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }

    match disambiguator {
        None | Some(0) => slug,
        Some(n) if slug.is_empty() => n.to_string(),
        Some(n) => format!("{}-{}", slug, n),
    }
}

/// Persistence key for a heading's collapse record within one document.
pub fn persistence_key(document_id: &str, heading_text: &str) -> String {
    format!(
        "{}:{}:{}",
        PERSISTENCE_PREFIX,
        document_id,
        encode(heading_text, None)
    )
}
