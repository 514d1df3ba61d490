//! Token definitions for CMake listfiles
//!
//! Tokens are produced by two logos lexers that share one cursor:
//!
//!     Outer tokens:
//!         Everything between command invocations. Only whitespace, newlines, comments and
//!         the start of a command (`name(` with optional blanks before the paren) are legal
//!         here. Any other text is a lexing error.
//!
//!     Body tokens:
//!         Everything between a command's `(` and its balancing `)`. Arguments split into
//!         keywords (all uppercase letters and underscores) and values (anything else,
//!         including quoted strings that may contain `;`, spaces or newlines). A `#` only
//!         starts a comment at the start of an argument; inside one it is a plain character.
//!
//! The [tokenize](crate::cmake::lexing::tokenize) function switches between the two with
//! `Lexer::morph` and flattens both into the unified [Token] enum. Whitespace, newlines and
//! comments are never dropped, so the token stream covers every byte of the source.

use logos::{Lexer, Logos};
use serde::Serialize;
use std::fmt;

/// Tokens recognised between command invocations
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum OuterToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*[ \t]*\(", command_name)]
    CommandStart(String),

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    #[regex(r"#\[\[([^\]]|\][^\]])*\]\]")]
    Comment,
}

/// Tokens recognised inside a command body
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum BodyToken {
    #[regex(r"[A-Z_]+", priority = 4)]
    Keyword,

    #[regex(
        r#"(?:[^\s()#"\\]|\\.|"(?:[^"\\]|\\.)*")(?:[^\s()"\\]|\\.|"(?:[^"\\]|\\.)*")*"#,
        priority = 2
    )]
    Value,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    Comment,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,
}

fn command_name(lex: &mut Lexer<OuterToken>) -> String {
    lex.slice()
        .trim_end_matches('(')
        .trim_end_matches([' ', '\t'])
        .to_string()
}

/// A classified lexeme of a listfile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Token {
    /// `name(`, carrying the command name without blanks or paren
    CommandStart(String),
    /// An all-uppercase word that opens a named section
    Keyword,
    /// Any other argument
    Value,
    Newline,
    Whitespace,
    Comment,
    /// A nested `(` inside a command body
    OpenParen,
    /// A `)`; the last one of a command closes it
    CloseParen,
}

impl Token {
    /// Whitespace, newlines and comments carry formatting only
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Newline | Token::Whitespace | Token::Comment)
    }

    /// Check if this token is an argument value (nested parens count as values)
    pub fn is_value(&self) -> bool {
        matches!(self, Token::Value | Token::OpenParen | Token::CloseParen)
    }
}

impl From<OuterToken> for Token {
    fn from(token: OuterToken) -> Self {
        match token {
            OuterToken::CommandStart(name) => Token::CommandStart(name),
            OuterToken::Newline => Token::Newline,
            OuterToken::Whitespace => Token::Whitespace,
            OuterToken::Comment => Token::Comment,
        }
    }
}

impl From<BodyToken> for Token {
    fn from(token: BodyToken) -> Self {
        match token {
            BodyToken::Keyword => Token::Keyword,
            BodyToken::Value => Token::Value,
            BodyToken::Newline => Token::Newline,
            BodyToken::Whitespace => Token::Whitespace,
            BodyToken::Comment => Token::Comment,
            BodyToken::OpenParen => Token::OpenParen,
            BodyToken::CloseParen => Token::CloseParen,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::CommandStart(name) => write!(f, "<command:{}>", name),
            Token::Keyword => write!(f, "<keyword>"),
            Token::Value => write!(f, "<value>"),
            Token::Newline => write!(f, "<newline>"),
            Token::Whitespace => write!(f, "<whitespace>"),
            Token::Comment => write!(f, "<comment>"),
            Token::OpenParen => write!(f, "<open-paren>"),
            Token::CloseParen => write!(f, "<close-paren>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_start_strips_blanks_and_paren() {
        let mut lexer = OuterToken::lexer("find_package (");
        assert_eq!(
            lexer.next(),
            Some(Ok(OuterToken::CommandStart("find_package".to_string())))
        );
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_outer_trivia() {
        let mut lexer = OuterToken::lexer("# license\n  \n");
        assert_eq!(lexer.next(), Some(Ok(OuterToken::Comment)));
        assert_eq!(lexer.next(), Some(Ok(OuterToken::Newline)));
        assert_eq!(lexer.next(), Some(Ok(OuterToken::Whitespace)));
        assert_eq!(lexer.next(), Some(Ok(OuterToken::Newline)));
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_bracket_comment_spans_lines() {
        let mut lexer = OuterToken::lexer("#[[ first\nsecond ]]");
        assert_eq!(lexer.next(), Some(Ok(OuterToken::Comment)));
        assert_eq!(lexer.slice(), "#[[ first\nsecond ]]");
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_outer_rejects_bare_words() {
        let mut lexer = OuterToken::lexer("oops");
        assert_eq!(lexer.next(), Some(Err(())));
    }

    #[test]
    fn test_keyword_versus_value() {
        let mut lexer = BodyToken::lexer("VERSION 2.8.3 CATKIN_DEPENDS roscpp");
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Keyword)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Whitespace)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Value)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Whitespace)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Keyword)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Whitespace)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Value)));
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_uppercase_with_digits_is_a_value() {
        let mut lexer = BodyToken::lexer("C99");
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Value)));
        assert_eq!(lexer.slice(), "C99");
    }

    #[test]
    fn test_quoted_value_is_one_token() {
        let mut lexer = BodyToken::lexer(r#""a;b c" ${PROJECT_NAME}/src"#);
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Value)));
        assert_eq!(lexer.slice(), r#""a;b c""#);
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Whitespace)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Value)));
        assert_eq!(lexer.slice(), "${PROJECT_NAME}/src");
    }

    #[test]
    fn test_mixed_quoted_value() {
        let mut lexer = BodyToken::lexer(r#"-DNAME="x y""#);
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Value)));
        assert_eq!(lexer.slice(), r#"-DNAME="x y""#);
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_hash_inside_value() {
        let mut lexer = BodyToken::lexer("-DCOLOR=#FFF #note");
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Value)));
        assert_eq!(lexer.slice(), "-DCOLOR=#FFF");
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Whitespace)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Comment)));
        assert_eq!(lexer.slice(), "#note");
    }

    #[test]
    fn test_body_parens() {
        let mut lexer = BodyToken::lexer("(A)");
        assert_eq!(lexer.next(), Some(Ok(BodyToken::OpenParen)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::Keyword)));
        assert_eq!(lexer.next(), Some(Ok(BodyToken::CloseParen)));
    }

    #[test]
    fn test_trivia_classification() {
        assert!(Token::Comment.is_trivia());
        assert!(!Token::Keyword.is_trivia());
        assert!(Token::OpenParen.is_value());
        assert!(!Token::Keyword.is_value());
    }
}
