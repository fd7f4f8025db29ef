//! Lexical analysis for Prodigy XY exports
//!
//! The format is line oriented: `#` comment lines carry headers, every other
//! non-blank line is a row of whitespace separated numbers.

use logos::Logos;
use xps_ast::Span;

/// XY tokens
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
pub enum Token {
    /// Header or comment line, from `#` up to the end of the line
    #[regex(r"#[^\r\n]*")]
    Comment,

    /// Decimal or scientific floating point number
    #[regex(r"[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?")]
    #[regex(r"[+-]?(nan|NaN|NAN|inf|Inf|INF|infinity|Infinity)")]
    Number,

    /// Newline
    #[regex(r"\r?\n")]
    Newline,

    /// Whitespace (ignored)
    #[regex(r"[ \t\f]+", logos::skip)]
    Whitespace,

    /// Byte order mark written by some Windows exports (ignored)
    #[token("\u{feff}", logos::skip)]
    ByteOrderMark,

    /// End of input
    Eof,

    /// Lexer error
    Error,
}

/// Token with location information
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub text: String,
}

/// Lexer that produces tokens with spans
pub struct Lexer<'input> {
    lexer: logos::Lexer<'input, Token>,
    input: &'input str,
}

impl<'input> Lexer<'input> {
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self {
            lexer: Token::lexer(input),
            input,
        }
    }

    /// Get the next token with span information
    pub fn next_token(&mut self) -> SpannedToken {
        match self.lexer.next() {
            Some(Ok(token)) => {
                let span = self.lexer.span();
                let text = self.input[span.clone()].to_string();
                SpannedToken {
                    token,
                    span: Span::new(span.start, span.end),
                    text,
                }
            }
            Some(Err(())) => {
                let span = self.lexer.span();
                let text = self.input[span.clone()].to_string();
                SpannedToken {
                    token: Token::Error,
                    span: Span::new(span.start, span.end),
                    text,
                }
            }
            None => SpannedToken {
                token: Token::Eof,
                span: Span::new(self.input.len(), self.input.len()),
                text: String::new(),
            },
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.token == Token::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
