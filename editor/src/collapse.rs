//! Per-document heading fold state.
//!
//! A folded heading has its `collapsed` attribute set in the document and a
//! record under its persistence key in a key-value store. The two are written
//! one after the other with no rollback: if the store write fails the
//! document still changes and the failure is only logged.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use richdoc::nodes::Heading;
use richdoc::slug::persistence_key;
use richdoc::NodeType;

use crate::error::StoreError;
use crate::state::{EditorState, Transaction};

/// Value stored for a folded heading.
pub const COLLAPSED: &str = "collapsed";

/// String key-value storage in the style of browser local storage.
pub trait KeyValueStore: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Iteration order is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }
}

/// A JSON object on disk. Every write rewrites the whole file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(JsonFileStore { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        if self.items.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Fold records for one document.
pub struct CollapseStore {
    document_id: String,
    backend: Option<Box<dyn KeyValueStore>>,
}

impl CollapseStore {
    pub fn new(document_id: impl Into<String>, backend: Box<dyn KeyValueStore>) -> Self {
        CollapseStore {
            document_id: document_id.into(),
            backend: Some(backend),
        }
    }

    /// A store with no backend: every heading reads as expanded and writes are dropped.
    pub fn detached(document_id: impl Into<String>) -> Self {
        CollapseStore {
            document_id: document_id.into(),
            backend: None,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn key(&self, heading_text: &str) -> String {
        persistence_key(&self.document_id, heading_text)
    }

    /// Whether a fold record exists for the heading. Store failures read as expanded.
    pub fn is_collapsed(&self, heading_text: &str) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };
        let key = self.key(heading_text);
        match backend.get_item(&key) {
            Ok(value) => value.is_some(),
            Err(err) => {
                tracing::warn!(%key, error = %err, "fold store read failed");
                false
            }
        }
    }

    /// Write or clear the heading's record. Failures are logged, not returned.
    pub fn set_collapsed(&mut self, heading_text: &str, collapsed: bool) {
        let key = self.key(heading_text);
        let Some(backend) = self.backend.as_mut() else {
            tracing::debug!(%key, "no fold store, record dropped");
            return;
        };
        let result = if collapsed {
            backend.set_item(&key, COLLAPSED)
        } else {
            backend.remove_item(&key)
        };
        if let Err(err) = result {
            tracing::warn!(%key, collapsed, error = %err, "fold store write failed");
        }
    }

    /// A transaction folding every heading that has a record but is not yet
    /// marked collapsed. `None` when nothing needs to change.
    pub fn restore(&self, state: &EditorState) -> Option<Transaction> {
        let mut folded = Vec::new();
        state.doc().descendants(|element, pos| {
            if element.kind == NodeType::Heading
                && !Heading::is_collapsed(element)
                && self.is_collapsed(&element.text_content())
            {
                folded.push((pos, element.attrs.clone()));
            }
        });
        if folded.is_empty() {
            return None;
        }

        let mut tr = state.tr();
        for (pos, attrs) in folded {
            if let Err(err) = tr.set_node_markup(pos, None, attrs.with("collapsed", true)) {
                tracing::warn!(pos, error = %err, "could not restore fold state");
            }
        }
        tr.doc_changed().then_some(tr)
    }

    /// Flip the fold state of the heading starting at `pos`.
    ///
    /// Returns `None` without touching the store when `pos` is not the start
    /// of a heading.
    pub fn toggle_fold(&mut self, state: &EditorState, pos: usize) -> Option<Transaction> {
        let element = state
            .doc()
            .node_at(pos)
            .filter(|el| el.kind == NodeType::Heading)?;
        let collapsed = !Heading::is_collapsed(element);
        let text = element.text_content();

        let mut tr = state.tr();
        if let Err(err) = tr.set_node_markup(pos, None, element.attrs.clone().with("collapsed", collapsed)) {
            tracing::warn!(pos, error = %err, "fold toggle rejected");
            return None;
        }
        self.set_collapsed(&text, collapsed);
        Some(tr)
    }
}
