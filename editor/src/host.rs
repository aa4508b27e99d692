//! Services the embedding application provides.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Info,
    Error,
}

/// User-facing strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Dictionary {
    pub link_copied: String,
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary {
            link_copied: "Link copied to clipboard".to_string(),
        }
    }
}

pub trait Host {
    /// Address of the page showing the document.
    fn location(&self) -> String;

    fn copy_to_clipboard(&mut self, text: &str);

    fn show_toast(&mut self, message: &str, kind: ToastType);
}

/// `url` with its fragment replaced by `#id`.
pub fn anchor_link(url: &str, id: &str) -> String {
    let base = url.split('#').next().unwrap_or(url);
    format!("{}#{}", base, id)
}
