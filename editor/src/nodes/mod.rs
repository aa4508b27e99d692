//! Editing halves of the node descriptors, and the registry that assembles
//! descriptors into a schema, a keymap, input rules and plugins.

mod heading;
mod options;
mod question;

use std::sync::Arc;

use richdoc::nodes::{Heading, ListItem, Options, Paragraph, Question};
use richdoc::schema::SchemaBuilder;
use richdoc::{Attrs, MarkupNode, Schema};

use crate::commands::Command;
use crate::error::KeymapError;
use crate::input_rules::InputRule;
use crate::keymap::Keymap;
use crate::plugins::{Plugin, QuestionTrace};

/// Builds a command from caller-supplied attributes.
pub type CommandFactory = Arc<dyn Fn(&Attrs) -> Command + Send + Sync>;

type PluginFactory = Arc<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

/// Everything a node type contributes to the editor beyond its schema and markup.
pub trait NodeDescriptor: MarkupNode {
    /// Named commands, looked up by name from the host.
    fn commands(&self) -> Vec<(&'static str, CommandFactory)> {
        Vec::new()
    }

    /// Chord bindings, in priority order.
    fn keys(&self) -> Vec<(String, Command)> {
        Vec::new()
    }

    fn input_rules(&self) -> Result<Vec<InputRule>, regex_lite::Error> {
        Ok(Vec::new())
    }

    /// Fresh plugin instances for one editor.
    fn plugins(&self) -> Vec<Box<dyn Plugin>> {
        Vec::new()
    }
}

impl NodeDescriptor for Paragraph {}

impl NodeDescriptor for ListItem {}

/// Registered descriptors plus standalone plugins, with the schema they form.
#[derive(Clone)]
pub struct Extensions {
    schema: Arc<Schema>,
    nodes: Vec<Arc<dyn NodeDescriptor>>,
    plugins: Vec<PluginFactory>,
}

pub struct ExtensionsBuilder {
    schema: SchemaBuilder,
    nodes: Vec<Arc<dyn NodeDescriptor>>,
    plugins: Vec<PluginFactory>,
}

impl ExtensionsBuilder {
    /// Register a descriptor. A later one of the same node type replaces the earlier.
    pub fn node<N: NodeDescriptor + 'static>(mut self, node: N) -> Self {
        let node = Arc::new(node);
        let kind = node.node_type();
        self.nodes.retain(|n| n.node_type() != kind);
        self.schema = self.schema.node(node.clone());
        self.nodes.push(node);
        self
    }

    pub fn plugin(mut self, factory: impl Fn() -> Box<dyn Plugin> + Send + Sync + 'static) -> Self {
        self.plugins.push(Arc::new(factory));
        self
    }

    pub fn build(self) -> Extensions {
        Extensions {
            schema: Arc::new(self.schema.build()),
            nodes: self.nodes,
            plugins: self.plugins,
        }
    }
}

impl Extensions {
    pub fn builder() -> ExtensionsBuilder {
        ExtensionsBuilder {
            schema: Schema::builder(),
            nodes: Vec::new(),
            plugins: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Extensions::with_heading(Heading::default())
    }

    /// The standard set with a configured heading descriptor.
    pub fn with_heading(heading: Heading) -> Self {
        Extensions::builder()
            .node(Paragraph)
            .node(heading)
            .node(Options)
            .node(ListItem)
            .node(Question)
            .plugin(|| Box::new(QuestionTrace))
            .build()
    }

    pub fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Bindings of every descriptor, in registration order.
    pub fn keymap(&self) -> Result<Keymap, KeymapError> {
        let mut keymap = Keymap::new();
        for node in &self.nodes {
            for (chord, command) in node.keys() {
                keymap.bind(&chord, command)?;
            }
        }
        Ok(keymap)
    }

    pub fn input_rules(&self) -> Result<Vec<InputRule>, regex_lite::Error> {
        let mut rules = Vec::new();
        for node in &self.nodes {
            rules.extend(node.input_rules()?);
        }
        Ok(rules)
    }

    pub fn plugins(&self) -> Vec<Box<dyn Plugin>> {
        let mut plugins: Vec<Box<dyn Plugin>> = self.nodes.iter().flat_map(|n| n.plugins()).collect();
        plugins.extend(self.plugins.iter().map(|factory| factory()));
        plugins
    }

    pub fn command(&self, name: &str, attrs: &Attrs) -> Option<Command> {
        self.nodes
            .iter()
            .flat_map(|n| n.commands())
            .find(|(n, _)| *n == name)
            .map(|(_, factory)| factory(attrs))
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.nodes
            .iter()
            .flat_map(|n| n.commands())
            .map(|(name, _)| name)
            .collect()
    }
}
