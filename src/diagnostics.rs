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

//! Compile-time diagnostics with source snippets and caret pointers.
//!
//! Two shapes share one rendering path:
//! - [`Diagnostic`] for recoverable conditions that substitute a default and
//!   let the pipeline continue.
//! - [`CompileError`] for the single fatal condition (no AST produced).

use crate::ast::SourceSpan;
use std::fmt;

/// Recoverable condition classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Illegal character skipped by the lexer.
    LexError,
    /// Unexpected token or end of input.
    SyntaxError,
    /// Identifier resolved to neither scope nor timeline store.
    UndefinedVariable,
    /// Value with an unusable shape (empty timeline, mismatched lengths).
    InvalidValue,
    /// Solver did not produce a usable solution.
    SolverFailure,
}

impl DiagnosticKind {
    /// Short label used as message prefix.
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticKind::LexError => "Lex error",
            DiagnosticKind::SyntaxError => "Syntax error",
            DiagnosticKind::UndefinedVariable => "Undefined variable",
            DiagnosticKind::InvalidValue => "Invalid value",
            DiagnosticKind::SolverFailure => "Solver failure",
        }
    }
}

/// Source location rendered for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Excerpt {
    line: usize,
    column: usize,
    snippet: String,
    pointer: String,
}

impl Excerpt {
    fn from_span(source: &str, span: &SourceSpan) -> Self {
        // Pull the exact source line the span starts on.
        let snippet = source
            .lines()
            .nth(span.line.saturating_sub(1))
            .unwrap_or("")
            .to_string();
        // Compute a safe caret range even when spans extend past line boundaries.
        let line_len = snippet.chars().count();
        let pointer_column = span.column.saturating_sub(1).min(line_len);
        let requested_len = span.len().max(1);
        let max_len = line_len.saturating_sub(pointer_column).max(1);
        let pointer_len = requested_len.min(max_len);
        let pointer = format!("{}{}", " ".repeat(pointer_column), "^".repeat(pointer_len));

        Self {
            line: span.line,
            column: span.column,
            snippet,
            pointer,
        }
    }
}

fn render(
    f: &mut fmt::Formatter<'_>,
    message: &str,
    file: &str,
    line: usize,
    column: usize,
    snippet: &str,
    pointer: &str,
) -> fmt::Result {
    if line == 0 || column == 0 {
        if file.is_empty() {
            return write!(f, "{message}");
        }
        return write!(f, "{message} ({file})");
    }

    let location = if file.is_empty() {
        format!("line {line}, column {column}")
    } else {
        format!("{file}:{line}:{column}")
    };

    write!(
        f,
        "{message}\n --> {location}\n  |\n{line:>3} | {snippet}\n  | {pointer}"
    )
}

/// One recoverable condition reported during lexing, parsing, execution or
/// solving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Condition class.
    pub kind: DiagnosticKind,
    /// Human-readable message (already prefixed with the kind label).
    pub message: String,
    /// Source label (`""` when unavailable).
    pub file: String,
    /// 1-based line number (`0` when unavailable).
    pub line: usize,
    /// 1-based column number (`0` when unavailable).
    pub column: usize,
    /// Source line snippet.
    pub snippet: String,
    /// Caret pointer aligned to `snippet`.
    pub pointer: String,
}

impl Diagnostic {
    /// Creates a diagnostic without location information.
    pub fn message_only(kind: DiagnosticKind, message: impl AsRef<str>) -> Self {
        Self {
            kind,
            message: format!("{}: {}", kind.label(), message.as_ref()),
            file: String::new(),
            line: 0,
            column: 0,
            snippet: String::new(),
            pointer: String::new(),
        }
    }

    /// Creates a source-mapped diagnostic.
    pub fn from_span_in_source(
        kind: DiagnosticKind,
        message: impl AsRef<str>,
        file: impl Into<String>,
        source: &str,
        span: &SourceSpan,
    ) -> Self {
        let excerpt = Excerpt::from_span(source, span);
        Self {
            kind,
            message: format!("{}: {}", kind.label(), message.as_ref()),
            file: file.into(),
            line: excerpt.line,
            column: excerpt.column,
            snippet: excerpt.snippet,
            pointer: excerpt.pointer,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(
            f,
            &self.message,
            &self.file,
            self.line,
            self.column,
            &self.snippet,
            &self.pointer,
        )
    }
}

/// Fatal compile error: the parser could not produce an AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Human-readable error message.
    pub message: String,
    /// Source file/path label (`""` when unavailable).
    pub file: String,
    /// 1-based line number (`0` when unavailable).
    pub line: usize,
    /// 1-based column number (`0` when unavailable).
    pub column: usize,
    /// Source line snippet where the error occurred.
    pub snippet: String,
    /// Caret pointer aligned to `snippet`.
    pub pointer: String,
    /// Every diagnostic collected before the parse was abandoned.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    /// Promotes the diagnostic that made the parse unrecoverable.
    pub fn from_diagnostic(trigger: &Diagnostic, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            message: trigger.message.clone(),
            file: trigger.file.clone(),
            line: trigger.line,
            column: trigger.column,
            snippet: trigger.snippet.clone(),
            pointer: trigger.pointer.clone(),
            diagnostics,
        }
    }

    /// Returns collected diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(
            f,
            &self.message,
            &self.file,
            self.line,
            self.column,
            &self.snippet,
            &self.pointer,
        )
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, line: usize, column: usize) -> SourceSpan {
        SourceSpan {
            start,
            end,
            line,
            column,
        }
    }

    #[test]
    fn caret_is_clamped_to_line_end() {
        let source = "x = 1;\ny = @;";
        let diag = Diagnostic::from_span_in_source(
            DiagnosticKind::LexError,
            "Illegal character '@'",
            "",
            source,
            &span(11, 40, 2, 5),
        );
        assert_eq!(diag.snippet, "y = @;");
        assert_eq!(diag.pointer, "    ^^");
        assert!(diag.message.starts_with("Lex error:"));
    }

    #[test]
    fn end_of_input_span_gets_single_caret() {
        let source = "x = 1";
        let diag = Diagnostic::from_span_in_source(
            DiagnosticKind::SyntaxError,
            "unexpected end of input",
            "main.chr",
            source,
            &span(5, 5, 1, 6),
        );
        assert_eq!(diag.pointer, "     ^");
        let rendered = diag.to_string();
        assert!(rendered.contains("main.chr:1:6"));
        assert!(rendered.contains("  1 | x = 1"));
    }

    #[test]
    fn message_only_renders_without_location() {
        let diag =
            Diagnostic::message_only(DiagnosticKind::UndefinedVariable, "variable 'q' not found");
        assert_eq!(diag.to_string(), "Undefined variable: variable 'q' not found");
        let err = CompileError::from_diagnostic(&diag, vec![diag.clone()]);
        assert_eq!(err.to_string(), diag.to_string());
        assert_eq!(err.diagnostics_of(DiagnosticKind::UndefinedVariable).count(), 1);
    }
}
