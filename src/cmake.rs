//! CMake listfile handling
//!
//! [lexing] turns text into tokens, [parsing] turns tokens into a [Document] of
//! [ast] nodes, [ordering] decides where new commands go, [queries] answers questions about
//! targets and test sections, and [formats] writes documents out again.
//!
//! ```text
//! let mut doc = cmake::parse(&text)?;
//! doc.section_check(&["roscpp"], "find_package", "COMPONENTS", false);
//! std::fs::write(path, cmake::serialize(&doc))?;
//! ```

pub mod ast;
pub mod document;
pub mod formats;
pub mod lexing;
pub mod ordering;
pub mod parsing;
pub mod profile;
pub mod queries;
pub mod token;

pub use ast::{Command, CommandGroup, Node, Section, SectionStyle, Source};
pub use document::{Document, DocumentError, IndexKey, NodeId};
pub use parsing::{parse, parse_with, ParseError};
pub use profile::Profile;

/// The document's current text
pub fn serialize(document: &Document) -> String {
    document.to_string()
}
