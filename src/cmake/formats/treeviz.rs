//! Treeviz formatter for documents
//!
//! One line per node, nesting drawn with connectors, 2 columns per level:
//!
//!     <prefix><connector> <node type>: <label> (label truncated to 30 characters)
//!
//! Raw text is shown escaped. Commands list their sections as children, groups list the
//! nodes of their body. Commands that were edited since parsing are marked `*`.
//!
//! Example:
//!
//!     ├─ command: cmake_minimum_required
//!     │ └─ section: VERSION 2.8.3
//!     ├─ raw: "\n"
//!     ├─ group: if CATKIN_ENABLE_TESTING
//!     │ ├─ raw: "\n  "
//!     │ ├─ command: catkin_add_gtest *
//!     │ │ └─ section: t test/t.cpp
//!     │ └─ raw: "\n"
//!     └─ raw: "\n"

use crate::cmake::ast::{Command, Node};
use crate::cmake::document::Document;
use crate::cmake::formats::registry::{FormatError, Formatter};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(doc: &Document) -> String {
    let mut result = String::new();
    append_nodes(&mut result, doc, "");
    result
}

fn append_nodes(result: &mut String, doc: &Document, prefix: &str) {
    let nodes: Vec<&Node> = doc.nodes().map(|(_, node)| node).collect();
    for (i, node) in nodes.iter().enumerate() {
        append_node(result, node, prefix, i == nodes.len() - 1);
    }
}

fn append_node(result: &mut String, node: &Node, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });

    match node {
        Node::Raw(text) => {
            let label = truncate(&format!("{:?}", text), 30);
            result.push_str(&format!("{}{} raw: {}\n", prefix, connector, label));
        }
        Node::Command(command) => {
            let marker = if command.is_modified() { " *" } else { "" };
            result.push_str(&format!(
                "{}{} command: {}{}\n",
                prefix,
                connector,
                truncate(command.name(), 30),
                marker
            ));
            append_sections(result, command, &new_prefix);
        }
        Node::Group(group) => {
            result.push_str(&format!(
                "{}{} group: {}\n",
                prefix,
                connector,
                truncate(&flatten(&group.open), 30)
            ));
            append_nodes(result, &group.sub, &new_prefix);
        }
    }
}

fn append_sections(result: &mut String, command: &Command, prefix: &str) {
    let sections = command.sections();
    for (i, section) in sections.iter().enumerate() {
        let connector = if i == sections.len() - 1 { "└─" } else { "├─" };
        let words: Vec<&str> = std::iter::once(section.name.as_str())
            .filter(|name| !name.is_empty())
            .chain(section.values.iter().map(String::as_str))
            .collect();
        result.push_str(&format!(
            "{}{} section: {}\n",
            prefix,
            connector,
            truncate(&words.join(" "), 30)
        ));
    }
}

/// `name` followed by every section name and value, space separated
fn flatten(command: &Command) -> String {
    let mut words = vec![command.name()];
    for section in command.sections() {
        if !section.name.is_empty() {
            words.push(&section.name);
        }
        words.extend(section.values.iter().map(String::as_str));
    }
    words.join(" ")
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(to_treeviz_str(doc))
    }

    fn description(&self) -> &str {
        "One line per node, nesting drawn with connectors"
    }
}
