use std::sync::Arc;

use richdoc::nodes::Question;
use richdoc::{Attrs, NodeType};

use super::{CommandFactory, NodeDescriptor};
use crate::commands::{Command, split_block_inside, toggle_wrap};
use crate::input_rules::InputRule;

impl NodeDescriptor for Question {
    fn commands(&self) -> Vec<(&'static str, CommandFactory)> {
        let toggle: CommandFactory = Arc::new(|_: &Attrs| toggle_wrap(NodeType::Question));
        vec![("question", toggle)]
    }

    fn keys(&self) -> Vec<(String, Command)> {
        vec![
            ("Shift-Ctrl-q".to_string(), toggle_wrap(NodeType::Question)),
            ("Shift-Enter".to_string(), split_block_inside(NodeType::Question)),
        ]
    }

    fn input_rules(&self) -> Result<Vec<InputRule>, regex_lite::Error> {
        Ok(vec![InputRule::wrapping(r"^\s*qq\s$", NodeType::Question, Attrs::new())?])
    }
}
