//! Bracketed constructs: `if(...)` … `endif()` and friends

use crate::cmake::ast::command::Command;
use crate::cmake::document::Document;
use std::fmt;

/// An opening command, a nested body, and the command that closes it.
///
/// The body is an independent document one level deeper than its parent, so commands
/// inserted into it are indented one more step.
#[derive(Debug, Clone)]
pub struct CommandGroup {
    pub open: Command,
    pub sub: Document,
    pub close: Command,
}

impl CommandGroup {
    pub fn new(open: Command, sub: Document, close: Command) -> Self {
        CommandGroup { open, sub, close }
    }

    /// First section name of the opening command, e.g. `CATKIN_ENABLE_TESTING` for
    /// `if(CATKIN_ENABLE_TESTING)`
    pub fn guard(&self) -> Option<&str> {
        self.open.sections().first().map(|s| s.name.as_str())
    }
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.open, self.sub, self.close)
    }
}
