//! Text, JSON and YAML formatters, and the token dump

use crate::cmake::ast::{Command, Node};
use crate::cmake::document::Document;
use crate::cmake::formats::registry::{FormatError, Formatter};
use crate::cmake::token::Token;
use serde::Serialize;
use std::ops::Range;

/// Serializable mirror of a document
#[derive(Serialize)]
struct DocumentView<'a> {
    depth: usize,
    nodes: Vec<NodeView<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum NodeView<'a> {
    Raw {
        text: &'a str,
    },
    Command {
        #[serde(flatten)]
        command: &'a Command,
    },
    Group {
        open: &'a Command,
        body: DocumentView<'a>,
        close: &'a Command,
    },
}

impl<'a> DocumentView<'a> {
    fn of(doc: &'a Document) -> Self {
        DocumentView {
            depth: doc.depth(),
            nodes: doc.nodes().map(|(_, node)| NodeView::of(node)).collect(),
        }
    }
}

impl<'a> NodeView<'a> {
    fn of(node: &'a Node) -> Self {
        match node {
            Node::Raw(text) => NodeView::Raw { text },
            Node::Command(command) => NodeView::Command { command },
            Node::Group(group) => NodeView::Group {
                open: &group.open,
                body: DocumentView::of(&group.sub),
                close: &group.close,
            },
        }
    }
}

/// The listfile text
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(doc.to_string())
    }

    fn description(&self) -> &str {
        "The listfile itself"
    }
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serde_json::to_string_pretty(&DocumentView::of(doc))
            .map_err(|err| FormatError::SerializationError(err.to_string()))
    }

    fn description(&self) -> &str {
        "Node tree as JSON"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serde_yaml::to_string(&DocumentView::of(doc))
            .map_err(|err| FormatError::SerializationError(err.to_string()))
    }

    fn description(&self) -> &str {
        "Node tree as YAML"
    }
}

#[derive(Serialize)]
struct TokenView<'a> {
    token: &'a Token,
    start: usize,
    end: usize,
    text: &'a str,
}

/// Token stream as a JSON array of `{token, start, end, text}`
pub fn tokens_to_json(source: &str, tokens: &[(Token, Range<usize>)]) -> Result<String, FormatError> {
    let views: Vec<TokenView> = tokens
        .iter()
        .map(|(token, span)| TokenView {
            token,
            start: span.start,
            end: span.end,
            text: source.get(span.clone()).unwrap_or_default(),
        })
        .collect();
    serde_json::to_string_pretty(&views).map_err(|err| FormatError::SerializationError(err.to_string()))
}
