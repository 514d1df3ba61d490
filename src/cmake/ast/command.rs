//! A single command invocation
//!
//! Commands are rendered from their original text while [Source::Pristine]. Every edit goes
//! through a method that moves the command to [Source::Modified]; there is no way back, so a
//! touched command is always rendered structurally afterwards.

use crate::cmake::ast::section::Section;
use crate::cmake::document::DocumentError;
use serde::Serialize;
use std::fmt;

/// Where a command's text comes from when it is serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "kebab-case")]
pub enum Source {
    /// Untouched since parsing; holds the exact source text of the invocation
    Pristine(String),
    /// Edited or synthesized; rendered from sections
    Modified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    name: String,
    pre_paren: String,
    sections: Vec<Section>,
    /// Whitespace before `)`; `None` for commands built in code
    closing: Option<String>,
    source: Source,
}

impl Command {
    /// A new, empty command. It has no original text and is always rendered.
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            pre_paren: String::new(),
            sections: Vec::new(),
            closing: None,
            source: Source::Modified,
        }
    }

    pub(crate) fn parsed(
        name: String,
        pre_paren: String,
        sections: Vec<Section>,
        closing: String,
        original: String,
    ) -> Self {
        Command {
            name,
            pre_paren,
            sections,
            closing: Some(closing),
            source: Source::Pristine(original),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pre_paren(&self) -> &str {
        &self.pre_paren
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn is_modified(&self) -> bool {
        self.source == Source::Modified
    }

    /// The parsed text, while the command is still pristine
    pub fn original_text(&self) -> Option<&str> {
        match &self.source {
            Source::Pristine(text) => Some(text),
            Source::Modified => None,
        }
    }

    fn touch(&mut self) {
        self.source = Source::Modified;
    }

    /// Renaming is reserved for the document, which owns the name index
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// First section with the given name (`""` is the unnamed section)
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    pub fn sections_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections.iter().filter(move |s| s.name == name)
    }

    /// Like [section](Self::section), for callers that rely on the section being there
    pub fn require_section(&self, name: &str) -> Result<&Section, DocumentError> {
        self.section(name)
            .ok_or_else(|| DocumentError::MissingSection {
                command: self.name.clone(),
                section: name.to_string(),
            })
    }

    /// Mutable access to the first section with the given name. Marks the command modified.
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        let index = self.section_index(name)?;
        self.section_at_mut(index)
    }

    /// Mutable access to a section by position. Marks the command modified.
    pub fn section_at_mut(&mut self, index: usize) -> Option<&mut Section> {
        if index >= self.sections.len() {
            return None;
        }
        self.touch();
        self.sections.get_mut(index)
    }

    /// Append a section with default style
    pub fn add_section<N, I, V>(&mut self, name: N, values: I)
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.add(Section::new(name, values));
    }

    /// Append a section. Invalid sections (no name, no values) are ignored.
    pub fn add(&mut self, section: Section) {
        if section.is_valid() {
            self.sections.push(section);
            self.touch();
        }
    }

    /// Drop every section with the given name, returning how many went away
    pub fn remove_sections(&mut self, name: &str) -> usize {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        let removed = before - self.sections.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// All values in section order, keywords excluded
    pub fn tokens(&self) -> Vec<&str> {
        self.sections
            .iter()
            .flat_map(|s| s.values.iter().map(String::as_str))
            .collect()
    }

    /// The first value, e.g. the target of `add_library`
    pub fn first_token(&self) -> Option<&str> {
        self.sections
            .iter()
            .flat_map(|s| s.values.iter())
            .next()
            .map(String::as_str)
    }

    /// Append a value to the last section, creating the unnamed section if there is none
    pub fn add_token(&mut self, value: impl Into<String>) {
        match self.sections.last_mut() {
            Some(last) => last.add(value),
            None => self.sections.push(Section::new("", [value.into()])),
        }
        self.touch();
    }

    fn render(&self) -> String {
        let mut out = format!("{}{}(", self.name, self.pre_paren);
        for section in &self.sections {
            if !section.is_valid() {
                continue;
            }
            let rendered = section.to_string();
            let needs_space = !out.ends_with(['(', ' ', '\n'])
                && !rendered.starts_with([' ', '\n']);
            if needs_space {
                out.push(' ');
            }
            out.push_str(&rendered);
        }
        match &self.closing {
            Some(closing) => out.push_str(closing),
            None => {
                if out.contains('\n') && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
        out.push(')');
        out
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Pristine(text) => f.write_str(text),
            Source::Modified => f.write_str(&self.render()),
        }
    }
}
