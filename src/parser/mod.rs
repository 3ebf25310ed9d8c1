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

//! Recursive-descent parser over the lexer's token stream.
//!
//! The grammar supports:
//! - `timeline name = expr;`
//! - `name <~ expr;` (deferred constraint)
//! - `name = expr;`
//! - `converge(name);`
//!
//! Expressions are a strict left fold of `+ - *` over terms (numbers, signed
//! numbers, identifiers, list literals and `converge(name)`). There is no
//! precedence between the three operators.
//!
//! # Recovery
//!
//! A wrong token directly followed by the expected one is discarded in place.
//! Any other error abandons the statement, discards the offending token and
//! resumes at statement level. Reaching end of input before a statement parses
//! cleanly again makes the parse fatal.

mod expr;
mod statements;

use crate::ast::Program;
use crate::diagnostics::{CompileError, Diagnostic, DiagnosticKind};
use crate::lexer::{lex, Token, TokenKind};
use tracing::{debug, error, warn};

/// Index of the token a production failed on.
#[derive(Debug, Clone, Copy)]
pub(super) struct Unexpected {
    at: usize,
}

type PResult<T> = Result<T, Unexpected>;

/// Successful parse result.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// Parsed program.
    pub program: Program,
    /// Lexer and recovered syntax diagnostics, in source order of discovery.
    pub diagnostics: Vec<Diagnostic>,
}

/// Lexes and parses source text.
///
/// Returns [`CompileError`] only when the parser could not recover before the
/// end of input.
pub fn parse_program(source: &str) -> Result<ParseOutput, CompileError> {
    parse_program_in_source(source, "<inline>")
}

/// Lexes and parses while tagging diagnostics with a source name/path.
pub fn parse_program_in_source(
    source: &str,
    source_name: &str,
) -> Result<ParseOutput, CompileError> {
    let lexed = lex(source, source_name);
    let mut parser = Parser::new(&lexed.tokens, source, source_name);
    parser.diagnostics = lexed.diagnostics;
    parser.parse()
}

/// Token cursor plus diagnostic sink.
pub(super) struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    source: &'t str,
    source_name: &'t str,
    diagnostics: Vec<Diagnostic>,
    // Set while resynchronizing so one mistake is reported once.
    quiet: bool,
}

impl<'t> Parser<'t> {
    pub(super) fn new(tokens: &'t [Token], source: &'t str, source_name: &'t str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            source_name,
            diagnostics: Vec::new(),
            quiet: false,
        }
    }

    fn parse(mut self) -> Result<ParseOutput, CompileError> {
        let mut statements = Vec::new();
        let mut trigger: Option<Diagnostic> = None;

        while self.peek_kind() != TokenKind::Eof {
            match self.statement() {
                Ok(stmt) => {
                    statements.push(stmt);
                    if trigger.take().is_some() {
                        debug!(statement = statements.len(), "parser resynchronized");
                    }
                    self.quiet = false;
                }
                Err(fault) => {
                    if trigger.is_none() {
                        trigger = self.diagnostics.last().cloned();
                    }
                    self.quiet = true;
                    // Discard the offender; failing on end of input is final.
                    if self.kind_at(fault.at) == TokenKind::Eof {
                        self.pos = fault.at;
                        break;
                    }
                    self.pos = fault.at + 1;
                }
            }
        }

        if let Some(trigger) = trigger {
            error!(
                line = trigger.line,
                column = trigger.column,
                "parse failed: {}",
                trigger.message
            );
            return Err(CompileError::from_diagnostic(&trigger, self.diagnostics));
        }

        debug!(statements = statements.len(), "parsed program");
        Ok(ParseOutput {
            program: Program { statements },
            diagnostics: self.diagnostics,
        })
    }

    fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens
            .get(index)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(super) fn peek_kind(&self) -> TokenKind {
        self.kind_at(self.pos)
    }

    pub(super) fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.kind_at(self.pos + offset)
    }

    pub(super) fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    /// Consumes and returns the current token.
    pub(super) fn bump(&mut self) -> PResult<&'t Token> {
        let Some(token) = self.tokens.get(self.pos) else {
            return Err(Unexpected { at: self.pos });
        };
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        Ok(token)
    }

    /// Consumes a token of `kind`, deleting one stray token in front of it if
    /// that is enough to continue.
    ///
    /// `alternatives` are other kinds that would also have been valid here;
    /// they only appear in the error message.
    pub(super) fn expect(
        &mut self,
        kind: TokenKind,
        alternatives: &[TokenKind],
    ) -> PResult<&'t Token> {
        if self.peek_kind() == kind {
            return self.bump();
        }
        if self.peek_kind() != TokenKind::Eof && self.peek_kind_at(1) == kind {
            self.report_unexpected(&expected_list(kind, alternatives), " (discarded)");
            self.pos += 1;
            return self.bump();
        }
        Err(self.unexpected(&expected_list(kind, alternatives)))
    }

    /// Records a syntax error at the current token.
    pub(super) fn unexpected(&mut self, expected: &[TokenKind]) -> Unexpected {
        if !self.quiet {
            self.report_unexpected(expected, "");
        }
        Unexpected { at: self.pos }
    }

    fn report_unexpected(&mut self, expected: &[TokenKind], suffix: &str) {
        let Some(token) = self.current() else {
            return;
        };
        let message = format!(
            "unexpected {} at line {}, column {}, expected {}{suffix}",
            describe_token(token),
            token.span.line,
            token.span.column,
            join_expected(expected),
        );
        let diag = Diagnostic::from_span_in_source(
            DiagnosticKind::SyntaxError,
            message,
            self.source_name,
            self.source,
            &token.span,
        );
        warn!(
            line = token.span.line,
            column = token.span.column,
            "{}",
            diag.message
        );
        self.diagnostics.push(diag);
    }
}

fn expected_list(kind: TokenKind, alternatives: &[TokenKind]) -> Vec<TokenKind> {
    let mut all = Vec::with_capacity(alternatives.len() + 1);
    all.push(kind);
    all.extend(alternatives.iter().copied().filter(|k| *k != kind));
    all
}

fn describe_token(token: &Token) -> String {
    match token.kind {
        TokenKind::Ident => format!("identifier '{}'", token.lexeme),
        TokenKind::Number => format!("number '{}'", token.lexeme),
        TokenKind::Eof => "end of input".to_string(),
        other => other.describe().to_string(),
    }
}

fn join_expected(expected: &[TokenKind]) -> String {
    let names: Vec<&str> = expected.iter().map(|k| k.describe()).collect();
    match names.as_slice() {
        [] => "nothing".to_string(),
        [one] => (*one).to_string(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Builtin, ExprKind, StmtKind};

    fn parse_ok(source: &str) -> ParseOutput {
        parse_program(source).expect("parse should succeed")
    }

    #[test]
    fn parses_four_statement_forms() {
        let out = parse_ok("timeline x = [1, -2, MINUS 3]; x <~ 2; y = x; converge(x);");
        assert!(out.diagnostics.is_empty());
        let kinds: Vec<_> = out.program.statements.iter().map(|s| &s.kind).collect();
        match kinds[0] {
            StmtKind::TimelineDecl { name, init } => {
                assert_eq!(name, "x");
                assert_eq!(init.kind, ExprKind::List(vec![1.0, -2.0, -3.0]));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(kinds[1], StmtKind::Constraint { name, .. } if name == "x"));
        assert!(matches!(kinds[2], StmtKind::Assign { name, .. } if name == "y"));
        assert!(matches!(kinds[3], StmtKind::Converge { name } if name == "x"));
    }

    #[test]
    fn binary_operators_fold_left_without_precedence() {
        let out = parse_ok("r = 1 + 2 * 3;");
        let StmtKind::Assign { value, .. } = &out.program.statements[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { op, left, right } = &value.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinOp::Mul);
        assert_eq!(right.kind, ExprKind::Number(3.0));
        assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn converge_is_a_term() {
        let out = parse_ok("r = converge(x) - 1;");
        let StmtKind::Assign { value, .. } = &out.program.statements[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { left, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert_eq!(
            left.kind,
            ExprKind::Call {
                function: Builtin::Converge,
                target: "x".to_string()
            }
        );
    }

    #[test]
    fn empty_list_and_empty_program_parse() {
        let out = parse_ok("timeline e = [];");
        assert_eq!(out.program.statements.len(), 1);
        let out = parse_ok("  // only a comment\n");
        assert!(out.program.statements.is_empty());
    }

    #[test]
    fn missing_final_semicolon_is_fatal() {
        let err = parse_program("timeline x = [1, 2, 3]").expect_err("parse should fail");
        assert!(err.message.starts_with("Syntax error"));
        assert!(err.message.contains("end of input"));
        assert!(err.message.contains("';'"));
        assert_eq!(err.line, 1);
        assert_eq!(err.diagnostics.len(), 1);
    }

    #[test]
    fn stray_token_before_expected_one_is_discarded() {
        let out = parse_ok("x = 1 2;\ny = 3;");
        assert_eq!(out.program.statements.len(), 2);
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("discarded"));
        assert_eq!(out.diagnostics[0].line, 1);
    }

    #[test]
    fn broken_statement_is_dropped_and_parsing_resumes() {
        let out = parse_ok("x = ;\ny = 3;");
        assert_eq!(out.program.statements.len(), 1);
        assert_eq!(out.program.statements[0].kind.subject(), "y");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("expected number"));
    }

    #[test]
    fn recovery_that_never_resynchronizes_is_fatal() {
        let err = parse_program("x = 1 y = 2;").expect_err("parse should fail");
        assert_eq!(err.column, 7);
        assert!(err.message.contains("identifier 'y'"));
        // Follow-up failures while resynchronizing stay silent.
        assert_eq!(err.diagnostics_of(DiagnosticKind::SyntaxError).count(), 1);
    }

    #[test]
    fn lexer_diagnostics_are_carried_through() {
        let out = parse_ok("x = 1 @;");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::LexError);
    }

    #[test]
    fn join_expected_formats_lists() {
        assert_eq!(join_expected(&[TokenKind::Semicolon]), "';'");
        assert_eq!(
            join_expected(&[TokenKind::Semicolon, TokenKind::Plus, TokenKind::Star]),
            "';', '+' or '*'"
        );
    }
}
