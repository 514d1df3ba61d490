//! Sections: the argument groups of a command
//!
//! `install(TARGETS foo DESTINATION lib)` has two sections, `TARGETS [foo]` and
//! `DESTINATION [lib]`. Arguments before the first keyword form the unnamed section
//! (empty name). Names may repeat within one command.

use serde::Serialize;
use std::fmt;

/// How a section was laid out in the source, replayed when it is re-rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStyle {
    /// Whitespace/comments before the keyword (or before the first value if unnamed)
    pub prefix: String,
    /// Between the keyword and the first value
    pub name_value_sep: String,
    /// Between successive values
    pub value_sep: String,
}

impl SectionStyle {
    /// Style that puts every value on its own line at the given indentation
    pub fn multiline(indent: &str) -> Self {
        SectionStyle {
            value_sep: format!("\n{}", indent),
            ..Default::default()
        }
    }
}

impl Default for SectionStyle {
    fn default() -> Self {
        SectionStyle {
            prefix: String::new(),
            name_value_sep: " ".to_string(),
            value_sep: " ".to_string(),
        }
    }
}

/// A named (or unnamed) run of values within a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub values: Vec<String>,
    pub style: SectionStyle,
}

impl Section {
    pub fn new<N, I, V>(name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Section {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            style: SectionStyle::default(),
        }
    }

    pub fn with_style(mut self, style: SectionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn add(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// A section needs a name or at least one value
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() || !self.values.is_empty()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.style.prefix)?;
        if !self.name.is_empty() {
            f.write_str(&self.name)?;
            if !self.values.is_empty() {
                f.write_str(&self.style.name_value_sep)?;
            }
        }
        f.write_str(&self.values.join(&self.style.value_sep))
    }
}
