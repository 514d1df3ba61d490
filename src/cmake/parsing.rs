//! Parsing listfiles into documents
//!
//! Parsing is two-level. The document parser walks the token stream, collecting runs of
//! trivia as raw nodes and handing each invocation to the command parser. Commands that open
//! a group (`if`, `foreach`, `while`, `function`, `macro`, `block`) recurse into a nested
//! document that ends at the matching closer. The command parser splits the body into
//! sections and recovers a style for each, so edits can be rendered in the source's layout.
//!
//! The document always renders back to the exact input until something is edited.

mod command;
mod document;

use crate::cmake::ast::{Command, Node};
use crate::cmake::document::Document;
use crate::cmake::lexing::{line_column, LexError};
use crate::cmake::profile::Profile;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Lex(LexError),
    /// A token that cannot appear at this point of the body
    UnexpectedToken {
        token: String,
        offset: usize,
        line: usize,
        column: usize,
    },
    /// A group opener without its closer
    UnterminatedGroup {
        opener: String,
        offset: usize,
        line: usize,
        column: usize,
    },
    /// A closer that does not match the innermost open group (or closes nothing)
    UnexpectedGroupClose {
        name: String,
        expected: Option<String>,
        offset: usize,
        line: usize,
        column: usize,
    },
    /// A snippet meant to hold one command held some other number
    ExpectedSingleCommand { found: usize },
}

impl ParseError {
    pub(crate) fn unexpected_token(source: &str, token: String, offset: usize) -> Self {
        let (line, column) = line_column(source, offset);
        ParseError::UnexpectedToken {
            token,
            offset,
            line,
            column,
        }
    }

    pub(crate) fn unterminated_group(source: &str, opener: String, offset: usize) -> Self {
        let (line, column) = line_column(source, offset);
        ParseError::UnterminatedGroup {
            opener,
            offset,
            line,
            column,
        }
    }

    pub(crate) fn unexpected_close(
        source: &str,
        name: String,
        expected: Option<String>,
        offset: usize,
    ) -> Self {
        let (line, column) = line_column(source, offset);
        ParseError::UnexpectedGroupClose {
            name,
            expected,
            offset,
            line,
            column,
        }
    }

    /// Byte offset the error refers to, if it refers to one
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Lex(err) => Some(err.offset()),
            ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnterminatedGroup { offset, .. }
            | ParseError::UnexpectedGroupClose { offset, .. } => Some(*offset),
            ParseError::ExpectedSingleCommand { .. } => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(err) => err.fmt(f),
            ParseError::UnexpectedToken {
                token,
                line,
                column,
                ..
            } => write!(f, "unexpected {} at {}:{}", token, line, column),
            ParseError::UnterminatedGroup {
                opener,
                line,
                column,
                ..
            } => write!(f, "{}() at {}:{} is never closed", opener, line, column),
            ParseError::UnexpectedGroupClose {
                name,
                expected: Some(expected),
                line,
                column,
                ..
            } => write!(
                f,
                "{}() at {}:{} does not match the open group, expected {}()",
                name, line, column, expected
            ),
            ParseError::UnexpectedGroupClose {
                name,
                expected: None,
                line,
                column,
                ..
            } => write!(f, "{}() at {}:{} closes no group", name, line, column),
            ParseError::ExpectedSingleCommand { found } => {
                write!(f, "expected exactly one command, found {}", found)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}

/// Closer expected for a group-opening command, matched case-insensitively
pub fn group_closer(command_name: &str) -> Option<&'static str> {
    const GROUPS: [(&str, &str); 6] = [
        ("if", "endif"),
        ("foreach", "endforeach"),
        ("while", "endwhile"),
        ("function", "endfunction"),
        ("macro", "endmacro"),
        ("block", "endblock"),
    ];
    GROUPS
        .iter()
        .find(|(open, _)| command_name.eq_ignore_ascii_case(open))
        .map(|(_, close)| *close)
}

pub fn is_group_closer(command_name: &str) -> bool {
    matches!(
        command_name.to_ascii_lowercase().as_str(),
        "endif" | "endforeach" | "endwhile" | "endfunction" | "endmacro" | "endblock"
    )
}

/// Parse a listfile with the default profile
pub fn parse(source: &str) -> Result<Document, ParseError> {
    parse_with(source, Arc::new(Profile::default()))
}

/// Parse a listfile; the profile is shared by the document and every nested body
pub fn parse_with(source: &str, profile: Arc<Profile>) -> Result<Document, ParseError> {
    document::parse_document(source, profile)
}

/// Parse a snippet holding a single command, e.g. `"find_package(roscpp REQUIRED)"`.
/// Surrounding whitespace is allowed and dropped.
impl FromStr for Command {
    type Err = ParseError;

    fn from_str(snippet: &str) -> Result<Self, Self::Err> {
        let document = parse(snippet.trim())?;
        let mut found: Vec<Command> = Vec::new();
        let mut others = 0;
        for (_, node) in document.nodes() {
            match node {
                Node::Raw(_) => {}
                Node::Command(command) => found.push(command.clone()),
                Node::Group(_) => others += 1,
            }
        }
        match found.pop() {
            Some(command) if found.is_empty() && others == 0 => Ok(command),
            popped => Err(ParseError::ExpectedSingleCommand {
                found: found.len() + usize::from(popped.is_some()) + others,
            }),
        }
    }
}
