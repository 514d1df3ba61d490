//! Editable syntax tree for listfiles
//!
//! A parsed listfile is a [Document](crate::cmake::document::Document): an ordered run of
//! [Node]s. Raw nodes hold the whitespace and comments between invocations, command nodes
//! hold one invocation each, and group nodes hold a bracketed construct (`if` … `endif`)
//! whose body is a nested document.
//!
//! Commands remember the exact text they were parsed from until the first edit. From then on
//! they are rendered from their sections and styles.

pub mod command;
pub mod group;
pub mod section;

pub use command::{Command, Source};
pub use group::CommandGroup;
pub use section::{Section, SectionStyle};

use std::fmt;

/// One entry of a document's node sequence
#[derive(Debug, Clone)]
pub enum Node {
    /// Inter-command whitespace and comments, kept verbatim
    Raw(String),
    Command(Command),
    Group(CommandGroup),
}

impl Node {
    pub fn is_raw(&self) -> bool {
        matches!(self, Node::Raw(_))
    }

    pub fn as_command(&self) -> Option<&Command> {
        match self {
            Node::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&CommandGroup> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Short label used by tree views and trace output
    pub fn label(&self) -> String {
        match self {
            Node::Raw(text) => format!("raw {:?}", text),
            Node::Command(command) => command.name().to_string(),
            Node::Group(group) => format!("group {}", group.open.name()),
        }
    }
}

impl From<Command> for Node {
    fn from(command: Command) -> Self {
        Node::Command(command)
    }
}

impl From<CommandGroup> for Node {
    fn from(group: CommandGroup) -> Self {
        Node::Group(group)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Raw(text) => f.write_str(text),
            Node::Command(command) => command.fmt(f),
            Node::Group(group) => group.fmt(f),
        }
    }
}
