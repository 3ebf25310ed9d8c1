/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Fault-tolerant lexer.
//!
//! Produces a token stream terminated by [`TokenKind::Eof`]. An unrecognized
//! character is reported as a [`DiagnosticKind::LexError`], exactly that one
//! character is dropped, and lexing continues.

mod scan;

use crate::ast::{SourceSpan, Span};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use nom::InputTake;
use tracing::{debug, warn};

/// Token kinds recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `timeline`
    Timeline,
    /// `converge`
    Converge,
    /// Identifier.
    Ident,
    /// Unsigned numeric literal.
    Number,
    /// `<~`
    Retro,
    /// `=`
    Assign,
    /// `+`
    Plus,
    /// `-` or `MINUS`
    Minus,
    /// `*`
    Star,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// End of input marker.
    Eof,
}

/// Coarse token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    Identifier,
    Number,
    Operator,
    Punctuation,
    End,
}

impl TokenKind {
    /// Returns the coarse class of this kind.
    pub fn class(self) -> TokenClass {
        match self {
            TokenKind::Timeline | TokenKind::Converge => TokenClass::Keyword,
            TokenKind::Ident => TokenClass::Identifier,
            TokenKind::Number => TokenClass::Number,
            TokenKind::Retro
            | TokenKind::Assign
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star => TokenClass::Operator,
            TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::LBracket
            | TokenKind::RBracket
            | TokenKind::Comma
            | TokenKind::Semicolon => TokenClass::Punctuation,
            TokenKind::Eof => TokenClass::End,
        }
    }

    /// Human-readable name used in "expected ..." lists.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Timeline => "'timeline'",
            TokenKind::Converge => "'converge'",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Retro => "'<~'",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Eof => "end of input",
        }
    }

    fn keyword(word: &str) -> Option<Self> {
        match word {
            "timeline" => Some(TokenKind::Timeline),
            "converge" => Some(TokenKind::Converge),
            "MINUS" => Some(TokenKind::Minus),
            _ => None,
        }
    }
}

/// One lexed token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Exact source text (empty for [`TokenKind::Eof`]).
    pub lexeme: String,
    /// Parsed value for [`TokenKind::Number`] tokens.
    pub value: Option<f64>,
    /// Source location.
    pub span: SourceSpan,
}

/// Tokens plus the diagnostics emitted while producing them.
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    /// Token stream, always terminated by an `Eof` token.
    pub tokens: Vec<Token>,
    /// Recoverable lexer diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

/// Lexes `source` into tokens. Never fails.
pub fn lex(source: &str, source_name: &str) -> LexOutput {
    let mut out = LexOutput::default();
    let mut input = Span::new(source);

    loop {
        // Trivia is `many0` over consuming parsers and cannot fail.
        if let Ok((rest, ())) = scan::trivia(input) {
            input = rest;
        }
        if input.fragment().is_empty() {
            out.tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                value: None,
                span: SourceSpan::from_bounds(input, input),
            });
            break;
        }

        match scan::token(input) {
            Ok((rest, kind)) => {
                let width = rest.location_offset() - input.location_offset();
                let lexeme = &input.fragment()[..width];
                let span = SourceSpan::from_bounds(input, rest);
                let token = match kind {
                    TokenKind::Ident => Token {
                        kind: TokenKind::keyword(lexeme).unwrap_or(TokenKind::Ident),
                        lexeme: lexeme.to_string(),
                        value: None,
                        span,
                    },
                    TokenKind::Number => {
                        let value = match lexeme.parse::<f64>() {
                            Ok(value) => value,
                            Err(_) => {
                                let diag = Diagnostic::from_span_in_source(
                                    DiagnosticKind::LexError,
                                    format!("Number format error '{lexeme}'"),
                                    source_name,
                                    source,
                                    &span,
                                );
                                warn!(line = span.line, column = span.column, "{}", diag.message);
                                out.diagnostics.push(diag);
                                0.0
                            }
                        };
                        Token {
                            kind,
                            lexeme: lexeme.to_string(),
                            value: Some(value),
                            span,
                        }
                    }
                    _ => Token {
                        kind,
                        lexeme: lexeme.to_string(),
                        value: None,
                        span,
                    },
                };
                out.tokens.push(token);
                input = rest;
            }
            Err(_) => {
                // Drop exactly one character and keep going.
                let Some(bad) = input.fragment().chars().next() else {
                    continue;
                };
                let (rest, skipped) = input.take_split(bad.len_utf8());
                let span = SourceSpan::from_bounds(skipped, rest);
                let diag = Diagnostic::from_span_in_source(
                    DiagnosticKind::LexError,
                    format!("Illegal character '{bad}'"),
                    source_name,
                    source,
                    &span,
                );
                warn!(line = span.line, column = span.column, "{}", diag.message);
                out.diagnostics.push(diag);
                input = rest;
            }
        }
    }

    debug!(
        tokens = out.tokens.len(),
        errors = out.diagnostics.len(),
        "lexed source"
    );
    out
}
