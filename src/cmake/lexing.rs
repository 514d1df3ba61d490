//! Lexing for CMake listfiles
//!
//! Tokenization runs the outer lexer until it sees a command start, then morphs into the
//! body lexer until the balancing `)` and morphs back. Longest match wins inside each mode
//! and there is no backtracking across modes. Every byte of the input ends up in exactly one
//! token, so [detokenize] of the result reproduces the source.

use crate::cmake::token::{BodyToken, OuterToken, Token};
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Errors that can occur during lexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// No token rule matches the text at this position
    Unrecognized {
        offset: usize,
        line: usize,
        column: usize,
        fragment: String,
    },
    /// The input ended before the command's closing paren
    UnterminatedCommand {
        name: String,
        offset: usize,
        line: usize,
        column: usize,
    },
}

impl LexError {
    /// Byte offset the error refers to
    pub fn offset(&self) -> usize {
        match self {
            LexError::Unrecognized { offset, .. } | LexError::UnterminatedCommand { offset, .. } => {
                *offset
            }
        }
    }

    fn unrecognized(source: &str, span: Range<usize>) -> Self {
        let (line, column) = line_column(source, span.start);
        let fragment = source[span.start..]
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(40)
            .collect();
        LexError::Unrecognized {
            offset: span.start,
            line,
            column,
            fragment,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::Unrecognized {
                line,
                column,
                fragment,
                ..
            } => write!(
                f,
                "Unrecognized input at {}:{}: {:?}",
                line, column, fragment
            ),
            LexError::UnterminatedCommand {
                name, line, column, ..
            } => write!(
                f,
                "Command '{}' opened at {}:{} is never closed",
                name, line, column
            ),
        }
    }
}

impl std::error::Error for LexError {}

/// 1-based line and column (in chars) of a byte offset
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(newline) => before[newline + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

/// Tokenize a whole listfile, keeping every whitespace, newline and comment run
pub fn tokenize(source: &str) -> Result<Vec<(Token, Range<usize>)>, LexError> {
    let mut tokens = Vec::new();
    let mut outer = OuterToken::lexer(source);

    loop {
        let next = outer.next();
        match next {
            None => break,
            Some(Err(())) => return Err(LexError::unrecognized(source, outer.span())),
            Some(Ok(OuterToken::CommandStart(name))) => {
                let start = outer.span();
                tokens.push((Token::CommandStart(name.clone()), start.clone()));

                let mut body = outer.morph::<BodyToken>();
                let mut depth = 0usize;
                loop {
                    let next = body.next();
                    match next {
                        None => {
                            let (line, column) = line_column(source, start.start);
                            return Err(LexError::UnterminatedCommand {
                                name,
                                offset: start.start,
                                line,
                                column,
                            });
                        }
                        Some(Err(())) => return Err(LexError::unrecognized(source, body.span())),
                        Some(Ok(BodyToken::OpenParen)) => {
                            depth += 1;
                            tokens.push((Token::OpenParen, body.span()));
                        }
                        Some(Ok(BodyToken::CloseParen)) => {
                            tokens.push((Token::CloseParen, body.span()));
                            if depth == 0 {
                                break;
                            }
                            depth -= 1;
                        }
                        Some(Ok(token)) => tokens.push((token.into(), body.span())),
                    }
                }
                outer = body.morph();
            }
            Some(Ok(token)) => tokens.push((token.into(), outer.span())),
        }
    }

    Ok(tokens)
}

/// Reassemble the text covered by a token stream
pub fn detokenize(source: &str, tokens: &[(Token, Range<usize>)]) -> String {
    tokens
        .iter()
        .map(|(_, span)| &source[span.clone()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .expect("source should tokenize")
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![]);
    }

    #[test]
    fn test_single_command() {
        assert_eq!(
            kinds("project(foo)\n"),
            vec![
                Token::CommandStart("project".to_string()),
                Token::Value,
                Token::CloseParen,
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_keywords_inside_body_only() {
        // VERSION is a keyword inside the body; outside it would be an error
        assert_eq!(
            kinds("cmake_minimum_required(VERSION 2.8.3)"),
            vec![
                Token::CommandStart("cmake_minimum_required".to_string()),
                Token::Keyword,
                Token::Whitespace,
                Token::Value,
                Token::CloseParen,
            ]
        );
    }

    #[test]
    fn test_nested_parens_are_balanced() {
        assert_eq!(
            kinds("if(NOT (A))\n"),
            vec![
                Token::CommandStart("if".to_string()),
                Token::Keyword,
                Token::Whitespace,
                Token::OpenParen,
                Token::Keyword,
                Token::CloseParen,
                Token::CloseParen,
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_detokenize_reproduces_source() {
        let source = "# header\ncmake_minimum_required(VERSION 2.8.3)\nproject (foo)\n\nfind_package(catkin REQUIRED COMPONENTS\n  roscpp # core\n  std_msgs\n)\n";
        let tokens = tokenize(source).unwrap();
        assert_eq!(detokenize(source, &tokens), source);
    }

    #[test]
    fn test_unrecognized_reports_position() {
        let err = tokenize("project(foo)\n  stray\n").unwrap_err();
        match err {
            LexError::Unrecognized {
                offset,
                line,
                column,
                ref fragment,
            } => {
                assert_eq!(offset, 15);
                assert_eq!((line, column), (2, 3));
                assert_eq!(fragment, "stray");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_command() {
        let err = tokenize("\nadd_library(foo src/a.cpp\n").unwrap_err();
        assert_eq!(
            err,
            LexError::UnterminatedCommand {
                name: "add_library".to_string(),
                offset: 1,
                line: 2,
                column: 1,
            }
        );
        assert!(err.to_string().contains("never closed"));
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("ab\ncd", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
    }
}
