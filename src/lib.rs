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

//! Chronos: a small timeline DSL with deferred constraints.
//!
//! Programs declare *timelines* (ordered candidate values), read them through
//! a Gaussian-weighted convergence operator and record retrocausal
//! constraints (`name <~ target;`) that are reconciled in one least-squares
//! batch after the whole program has run.
//!
//! # Pipeline
//!
//! 1. Lex and parse source into a spanned AST. Recoverable errors become
//!    diagnostics; a parse that cannot recover is the only fatal error.
//! 2. Execute statements once, in order, inside a fresh [`Session`].
//! 3. Solve every recorded constraint jointly and collapse the constrained
//!    timelines to their solved values.
//! 4. Settle: replay the program with solved values pinned so reads made
//!    before the solve reflect it.
//! 5. Freeze the session into a [`FinalStateReport`].
//!
//! ```text
//! timeline values = [1, 2, 3, 4, 5];
//! values <~ 3.2;
//! result = converge(values);
//! ```
//!
//! yields `values = [3.2]` and `result = 3.2`.

mod ast;
mod compiler;
mod diagnostics;
mod lexer;
mod model;
mod options;
mod parser;

#[cfg(test)]
mod property_tests;

pub use ast::{BinOp, Builtin, Expr, ExprKind, Program, SourceSpan, Stmt, StmtKind};
pub use compiler::Session;
pub use diagnostics::{CompileError, Diagnostic, DiagnosticKind};
pub use lexer::{lex, LexOutput, Token, TokenClass, TokenKind};
pub use model::{
    gaussian_weights, Constraint, ConstraintIssue, ConstraintOrigin, FailureKind,
    FinalStateReport, SolveError, SolveFailureReport, SolveMethod, SolveOutcome, SolveSummary,
    Timeline,
};
pub use options::CompileOptions;
pub use parser::{parse_program, parse_program_in_source, ParseOutput};

use tracing::{error, info};

/// Compiles and runs Chronos source with default options.
///
/// # Errors
///
/// Returns [`CompileError`] with source line/column and caret highlight only
/// when parsing could not recover. Every other problem is reported through
/// [`FinalStateReport::diagnostics`].
pub fn compile(source: &str) -> Result<FinalStateReport, CompileError> {
    compile_with_options(source, &CompileOptions::default())
}

/// Compiles and runs Chronos source.
pub fn compile_with_options(
    source: &str,
    options: &CompileOptions,
) -> Result<FinalStateReport, CompileError> {
    info!(source = %options.name(), bytes = source.len(), "compile started");
    let parsed = parse_program_in_source(source, options.name()).map_err(|err| {
        error!(
            source = %options.name(),
            line = err.line,
            column = err.column,
            "compile aborted"
        );
        err
    })?;

    let mut session = Session::with_options(source, options.clone());
    session.record_diagnostics(parsed.diagnostics);
    session.execute(&parsed.program);
    session.solve();
    if options.settle {
        session = session.settle(&parsed.program);
    }

    let report = session.into_report();
    info!(
        source = %options.name(),
        variables = report.scope().len(),
        timelines = report.timelines().len(),
        constraints = report.constraints().len(),
        diagnostics = report.diagnostics().len(),
        "compile finished"
    );
    Ok(report)
}

/// Parses source into a spanned AST without executing it.
pub fn parse(source: &str) -> Result<Program, CompileError> {
    parse_program(source).map(|parsed| parsed.program)
}
