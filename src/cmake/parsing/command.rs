//! Splitting one invocation into sections
//!
//! The body between the parens is: optional unnamed values, then any number of
//! `KEYWORD value*` sections. Each section's style is recovered from the trivia around it:
//!
//!   - prefix: everything between the previous section (or `(`) and the section start
//!   - name/value separator: the run between the keyword and its first value
//!   - value separator: the run before the second value; for a section with a single
//!     value, the run before that value if it breaks the line
//!
//! Runs that break the line are reduced to a newline plus the last line's indentation, so a
//! comment in the middle of a value list is not repeated for every new value.

use crate::cmake::ast::{Command, Section, SectionStyle};
use crate::cmake::parsing::ParseError;
use crate::cmake::token::Token;
use std::ops::Range;

/// Parse one invocation. `tokens` runs from the command start to the balancing `)`.
pub(crate) fn parse_command(
    source: &str,
    tokens: &[(Token, Range<usize>)],
) -> Result<Command, ParseError> {
    let (name, head_span) = match tokens.first() {
        Some((Token::CommandStart(name), span)) => (name.clone(), span.clone()),
        Some((token, span)) => {
            return Err(ParseError::unexpected_token(
                source,
                token.to_string(),
                span.start,
            ))
        }
        None => return Err(ParseError::ExpectedSingleCommand { found: 0 }),
    };
    let close_span = match tokens.last() {
        Some((Token::CloseParen, span)) if tokens.len() > 1 => span.clone(),
        _ => {
            return Err(ParseError::unexpected_token(
                source,
                "end of command".to_string(),
                head_span.end,
            ))
        }
    };

    let head = &source[head_span.clone()];
    // head is `name`, blanks, `(`
    let pre_paren = head
        .get(name.len()..head.len() - 1)
        .unwrap_or_default()
        .to_string();

    let mut cursor = BodyCursor {
        source,
        tokens: &tokens[1..tokens.len() - 1],
        pos: 0,
    };
    let mut sections = Vec::new();

    let mut prefix = cursor.take_trivia();
    if cursor.at_value() {
        let (values, seps) = cursor.values();
        let value_sep = match seps.first() {
            Some(run) => separator(run),
            None if prefix.contains('\n') => separator(&prefix),
            None => " ".to_string(),
        };
        let style = SectionStyle {
            prefix,
            name_value_sep: " ".to_string(),
            value_sep,
        };
        sections.push(Section::new("", values).with_style(style));
        prefix = cursor.take_trivia();
    }

    while let Some(Token::Keyword) = cursor.peek() {
        let keyword = cursor.advance_text().to_string();
        let save = cursor.pos;
        let lead = cursor.take_trivia();
        let (values, name_value_sep, value_sep) = if cursor.at_value() {
            let (values, seps) = cursor.values();
            let value_sep = match seps.first() {
                Some(run) => separator(run),
                None if lead.contains('\n') => separator(&lead),
                None => " ".to_string(),
            };
            (values, separator(&lead), value_sep)
        } else {
            cursor.pos = save;
            (Vec::new(), " ".to_string(), " ".to_string())
        };
        let style = SectionStyle {
            prefix,
            name_value_sep,
            value_sep,
        };
        sections.push(Section::new(keyword, values).with_style(style));
        prefix = cursor.take_trivia();
    }

    if let Some((token, span)) = cursor.tokens.get(cursor.pos) {
        return Err(ParseError::unexpected_token(
            source,
            token.to_string(),
            span.start,
        ));
    }

    let original = source[head_span.start..close_span.end].to_string();
    Ok(Command::parsed(name, pre_paren, sections, prefix, original))
}

/// Reduce a trivia run to the separator it implies
fn separator(run: &str) -> String {
    match run.rfind('\n') {
        Some(last) => format!("\n{}", &run[last + 1..]),
        None => run.to_string(),
    }
}

struct BodyCursor<'a> {
    source: &'a str,
    tokens: &'a [(Token, Range<usize>)],
    pos: usize,
}

impl<'a> BodyCursor<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn at_value(&self) -> bool {
        self.peek().map_or(false, Token::is_value)
    }

    fn advance_text(&mut self) -> &'a str {
        let text = self
            .tokens
            .get(self.pos)
            .map_or("", |(_, span)| &self.source[span.clone()]);
        self.pos += 1;
        text
    }

    /// Consume consecutive trivia and return its text
    fn take_trivia(&mut self) -> String {
        let mut run = String::new();
        while let Some((token, span)) = self.tokens.get(self.pos) {
            if !token.is_trivia() {
                break;
            }
            run.push_str(&self.source[span.clone()]);
            self.pos += 1;
        }
        run
    }

    /// Consume a value list starting at a value token. Returns the values and the trivia
    /// run before each value after the first.
    fn values(&mut self) -> (Vec<String>, Vec<String>) {
        let mut values = vec![self.advance_text().to_string()];
        let mut seps = Vec::new();
        loop {
            let save = self.pos;
            let run = self.take_trivia();
            if self.at_value() {
                seps.push(run);
                values.push(self.advance_text().to_string());
            } else {
                self.pos = save;
                break;
            }
        }
        (values, seps)
    }
}
