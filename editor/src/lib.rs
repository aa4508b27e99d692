pub mod collapse;
pub mod commands;
pub mod decoration;
mod editor;
pub mod error;
pub mod host;
pub mod input_rules;
pub mod keymap;
pub mod nodes;
pub mod plugins;
pub mod state;

pub use collapse::{CollapseStore, JsonFileStore, KeyValueStore, MemoryStore};
pub use commands::{Command, Outcome};
pub use decoration::{DecorationSet, Widget};
pub use editor::Editor;
pub use error::{EditorError, KeymapError, StoreError, TransformError};
pub use host::{Dictionary, Host, ToastType};
pub use keymap::{KeyChord, Keymap};
pub use nodes::{Extensions, NodeDescriptor};
pub use state::{EditorState, Selection, Transaction};
