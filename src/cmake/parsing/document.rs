//! Document-level parsing: raw runs, commands, and nested groups

use crate::cmake::ast::{Command, CommandGroup, Node};
use crate::cmake::document::Document;
use crate::cmake::lexing::{line_column, tokenize, LexError};
use crate::cmake::parsing::command::parse_command;
use crate::cmake::parsing::{group_closer, is_group_closer, ParseError};
use crate::cmake::profile::Profile;
use crate::cmake::token::Token;
use std::ops::Range;
use std::sync::Arc;

pub(crate) fn parse_document(source: &str, profile: Arc<Profile>) -> Result<Document, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = DocumentParser {
        source,
        tokens: &tokens,
        pos: 0,
        profile,
    };
    let (document, _) = parser.document(0, None)?;
    Ok(document)
}

/// The group a nested document belongs to
struct OpenGroup {
    opener: String,
    closer: &'static str,
    offset: usize,
}

struct DocumentParser<'a> {
    source: &'a str,
    tokens: &'a [(Token, Range<usize>)],
    pos: usize,
    profile: Arc<Profile>,
}

impl<'a> DocumentParser<'a> {
    /// Parse nodes until the end of input, or until the closer of `open` if given. Returns
    /// the document and the closing command.
    fn document(
        &mut self,
        depth: usize,
        open: Option<&OpenGroup>,
    ) -> Result<(Document, Option<Command>), ParseError> {
        let mut document = Document::nested(depth, self.profile.clone(), "");
        loop {
            if let Some(raw) = self.trivia_run() {
                document.push(Node::Raw(raw));
            }

            let Some((token, span)) = self.tokens.get(self.pos) else {
                return match open {
                    Some(group) => Err(ParseError::unterminated_group(
                        self.source,
                        group.opener.clone(),
                        group.offset,
                    )),
                    None => Ok((document, None)),
                };
            };
            if !matches!(token, Token::CommandStart(_)) {
                return Err(ParseError::unexpected_token(
                    self.source,
                    token.to_string(),
                    span.start,
                ));
            }

            let offset = span.start;
            let end = self.command_end(self.pos)?;
            let command = parse_command(self.source, &self.tokens[self.pos..=end])?;
            self.pos = end + 1;

            if is_group_closer(command.name()) {
                return match open {
                    Some(group) if command.name().eq_ignore_ascii_case(group.closer) => {
                        Ok((document, Some(command)))
                    }
                    _ => Err(ParseError::unexpected_close(
                        self.source,
                        command.name().to_string(),
                        open.map(|group| group.closer.to_string()),
                        offset,
                    )),
                };
            }

            match group_closer(command.name()) {
                Some(closer) => {
                    let group = OpenGroup {
                        opener: command.name().to_string(),
                        closer,
                        offset,
                    };
                    let (sub, close) = self.document(depth + 1, Some(&group))?;
                    let close = close.ok_or_else(|| {
                        ParseError::unterminated_group(self.source, group.opener.clone(), offset)
                    })?;
                    document.push(Node::Group(CommandGroup::new(command, sub, close)));
                }
                None => {
                    document.push(Node::Command(command));
                }
            }
        }
    }

    /// Source text of consecutive trivia tokens
    fn trivia_run(&mut self) -> Option<String> {
        let start = self.pos;
        while self
            .tokens
            .get(self.pos)
            .map_or(false, |(token, _)| token.is_trivia())
        {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        let from = self.tokens[start].1.start;
        let to = self.tokens[self.pos - 1].1.end;
        Some(self.source[from..to].to_string())
    }

    /// Index of the `)` balancing the command start at `start`
    fn command_end(&self, start: usize) -> Result<usize, ParseError> {
        let mut depth = 0usize;
        for (index, (token, _)) in self.tokens.iter().enumerate().skip(start + 1) {
            match token {
                Token::OpenParen => depth += 1,
                Token::CloseParen if depth == 0 => return Ok(index),
                Token::CloseParen => depth -= 1,
                _ => {}
            }
        }
        let (name, span) = match &self.tokens[start] {
            (Token::CommandStart(name), span) => (name.clone(), span.clone()),
            (token, span) => (token.to_string(), span.clone()),
        };
        let (line, column) = line_column(self.source, span.start);
        Err(ParseError::Lex(LexError::UnterminatedCommand {
            name,
            offset: span.start,
            line,
            column,
        }))
    }
}
