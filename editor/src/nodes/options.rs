use std::sync::Arc;

use richdoc::nodes::Options;
use richdoc::{Attrs, NodeType};

use super::{CommandFactory, NodeDescriptor};
use crate::commands::{Command, consume_inside, toggle_list};
use crate::input_rules::InputRule;

/// Indentation chords swallowed inside option lists, which have a single level.
const INDENT_KEYS: [&str; 4] = ["Tab", "Shift-Tab", "Mod-]", "Mod-["];

impl NodeDescriptor for Options {
    fn commands(&self) -> Vec<(&'static str, CommandFactory)> {
        let toggle: CommandFactory =
            Arc::new(|_: &Attrs| toggle_list(NodeType::Options, NodeType::ListItem));
        vec![("options", toggle)]
    }

    fn keys(&self) -> Vec<(String, Command)> {
        let mut keys: Vec<(String, Command)> = INDENT_KEYS
            .iter()
            .map(|chord| (chord.to_string(), consume_inside(NodeType::Options)))
            .collect();
        keys.push((
            "Shift-ctrl-o".to_string(),
            toggle_list(NodeType::Options, NodeType::ListItem),
        ));
        keys
    }

    fn input_rules(&self) -> Result<Vec<InputRule>, regex_lite::Error> {
        Ok(vec![InputRule::wrapping(r"^\s*oo\s$", NodeType::Options, Attrs::new())?])
    }
}
