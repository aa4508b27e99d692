use std::sync::Arc;

use richdoc::nodes::Heading;
use richdoc::{Attrs, NodeType};

use super::{CommandFactory, NodeDescriptor};
use crate::commands::{Command, backspace_to_paragraph, set_block_type, toggle_block_type};
use crate::input_rules::InputRule;
use crate::plugins::{HeadingAnchors, Plugin};

impl NodeDescriptor for Heading {
    fn commands(&self) -> Vec<(&'static str, CommandFactory)> {
        let toggle: CommandFactory = Arc::new(|attrs: &Attrs| {
            toggle_block_type(NodeType::Heading, NodeType::Paragraph, attrs.clone())
        });
        vec![("heading", toggle)]
    }

    fn keys(&self) -> Vec<(String, Command)> {
        let mut keys: Vec<(String, Command)> = self
            .levels
            .iter()
            .map(|&level| {
                (
                    format!("Shift-Ctrl-{}", level),
                    set_block_type(NodeType::Heading, Heading::attrs(level)),
                )
            })
            .collect();
        keys.push(("Backspace".to_string(), backspace_to_paragraph(NodeType::Heading)));
        keys
    }

    /// One rule per level; lower levels are tried first so `## ` is level 2.
    fn input_rules(&self) -> Result<Vec<InputRule>, regex_lite::Error> {
        let mut levels = self.levels.clone();
        levels.sort_unstable();
        levels
            .into_iter()
            .map(|level| {
                InputRule::textblock_type(
                    &format!(r"^(#{{1,{}}})\s$", level),
                    NodeType::Heading,
                    Heading::attrs(level),
                )
            })
            .collect()
    }

    fn plugins(&self) -> Vec<Box<dyn Plugin>> {
        vec![Box::new(HeadingAnchors::new())]
    }
}
