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

//! Session state and core bookkeeping.

use crate::ast::{Program, SourceSpan};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::model::{
    Constraint, ConstraintOrigin, FinalStateReport, SolveOutcome, Timeline,
};
use crate::options::CompileOptions;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Compiler context for one run.
///
/// Holds the timeline store, the scope, accumulated constraints and
/// diagnostics. Created per compilation and dropped with it.
pub struct Session<'src> {
    pub(super) source: &'src str,
    pub(super) options: CompileOptions,
    pub(super) timelines: IndexMap<String, Timeline>,
    pub(super) scope: IndexMap<String, f64>,
    pub(super) constraints: Vec<Constraint>,
    pub(super) diagnostics: Vec<Diagnostic>,
    // Solved values held fixed while settling.
    pub(super) pinned: IndexMap<String, f64>,
    pub(super) settling: bool,
    pub(super) outcome: SolveOutcome,
    pub(super) solved: bool,
}

impl<'src> Session<'src> {
    /// Creates a fresh session over `source` with default options.
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, CompileOptions::default())
    }

    /// Creates a fresh session over `source`.
    pub fn with_options(source: &'src str, options: CompileOptions) -> Self {
        Self {
            source,
            options,
            timelines: IndexMap::new(),
            scope: IndexMap::new(),
            constraints: Vec::new(),
            diagnostics: Vec::new(),
            pinned: IndexMap::new(),
            settling: false,
            outcome: SolveOutcome::Skipped,
            solved: false,
        }
    }

    /// Executes every statement once, in source order.
    pub fn execute(&mut self, program: &Program) {
        for stmt in &program.statements {
            self.execute_stmt(stmt);
        }
        debug!(
            statements = program.statements.len(),
            timelines = self.timelines.len(),
            scope = self.scope.len(),
            constraints = self.constraints.len(),
            settling = self.settling,
            "executed program"
        );
    }

    /// Collapses `name` to one scalar: the weighted mean of its timeline, else
    /// its scope value, else `0` with an undefined-variable diagnostic.
    pub fn convergence(&mut self, name: &str) -> f64 {
        self.converge_named(name, None)
    }

    /// Timeline store.
    pub fn timelines(&self) -> &IndexMap<String, Timeline> {
        &self.timelines
    }

    /// Scope / convergence field.
    pub fn scope(&self) -> &IndexMap<String, f64> {
        &self.scope
    }

    /// Constraint records accumulated so far.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Outcome of the solve step ([`SolveOutcome::Skipped`] before it runs).
    pub fn outcome(&self) -> &SolveOutcome {
        &self.outcome
    }

    /// Appends diagnostics produced before execution (lexer, parser).
    pub fn record_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Re-executes `program` in a fresh session with every solved variable
    /// pinned to its solved value.
    ///
    /// Returns `self` unchanged when the solve produced no values.
    pub fn settle(self, program: &Program) -> Session<'src> {
        let pinned = match self.outcome.solved_values() {
            Some(values) => values.clone(),
            None => return self,
        };

        let mut replay = Session::with_options(self.source, self.options.clone());
        replay.pinned = pinned;
        replay.settling = true;
        replay.execute(program);

        // Names never declared in the program still receive their solved value.
        for (name, value) in &replay.pinned {
            if let Some(timeline) = replay.timelines.get_mut(name) {
                *timeline = Timeline::collapse(*value);
            }
            replay.scope.insert(name.clone(), *value);
        }

        replay.constraints = self.constraints;
        replay.diagnostics = self.diagnostics;
        replay.outcome = self.outcome;
        replay.solved = true;
        replay.settling = false;
        replay
    }

    /// Freezes the session into a report.
    pub fn into_report(self) -> FinalStateReport {
        FinalStateReport {
            scope: self.scope,
            timelines: self
                .timelines
                .into_iter()
                .map(|(name, timeline)| (name, timeline.spectrum().to_vec()))
                .collect(),
            constraints: self.constraints,
            diagnostics: self.diagnostics,
            outcome: self.outcome,
        }
    }

    /// Records a recoverable diagnostic. Silent while settling: the first pass
    /// already reported everything the replay can run into.
    pub(super) fn report(
        &mut self,
        kind: DiagnosticKind,
        message: impl AsRef<str>,
        span: Option<&SourceSpan>,
    ) {
        if self.settling {
            debug!(kind = ?kind, "{}", message.as_ref());
            return;
        }
        let diag = match span {
            Some(span) => Diagnostic::from_span_in_source(
                kind,
                message,
                self.options.name(),
                self.source,
                span,
            ),
            None => Diagnostic::message_only(kind, message),
        };
        warn!(line = diag.line, column = diag.column, "{}", diag.message);
        self.diagnostics.push(diag);
    }

    /// Builds the source origin stored with a constraint record.
    pub(super) fn constraint_origin(&self, span: &SourceSpan) -> ConstraintOrigin {
        let marker = Diagnostic::from_span_in_source(
            DiagnosticKind::SolverFailure,
            "constraint",
            self.options.name(),
            self.source,
            span,
        );
        ConstraintOrigin {
            file: marker.file,
            line: marker.line,
            column: marker.column,
            snippet: marker.snippet,
            pointer: marker.pointer,
        }
    }

    /// Convergence with an optional source anchor for the diagnostic.
    pub(super) fn converge_named(&mut self, name: &str, span: Option<&SourceSpan>) -> f64 {
        if let Some(value) = self.pinned.get(name) {
            return *value;
        }
        if let Some(timeline) = self.timelines.get(name) {
            return timeline.converge();
        }
        if let Some(value) = self.scope.get(name) {
            return *value;
        }
        self.report(
            DiagnosticKind::UndefinedVariable,
            format!("variable '{name}' not found"),
            span,
        );
        0.0
    }
}
