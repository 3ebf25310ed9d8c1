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

//! Post-execution constraint reconciliation.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::model::{
    self, ConstraintOrigin, ConstraintSystem, SolveOutcome, SolveSummary, Timeline,
};
use indexmap::IndexMap;
use tracing::{error, info, warn};

use super::Session;

impl<'src> Session<'src> {
    /// Reconciles every recorded constraint in one batch and writes the
    /// solved values back.
    ///
    /// Runs at most once per session. With no constraints the outcome is
    /// [`SolveOutcome::Skipped`]. On failure the outcome carries the report,
    /// a solver diagnostic is recorded and no value is touched.
    pub fn solve(&mut self) -> &SolveOutcome {
        if self.solved {
            return &self.outcome;
        }
        self.solved = true;

        if self.constraints.is_empty() {
            self.outcome = SolveOutcome::Skipped;
            return &self.outcome;
        }

        let system = ConstraintSystem::from_constraints(&self.constraints);
        let initial = self.initial_guesses(&system);

        match model::solve(&system, &initial, self.options.solver_settings()) {
            Ok(solution) => {
                let values: IndexMap<String, f64> = system
                    .variables()
                    .iter()
                    .cloned()
                    .zip(solution.values.iter().copied())
                    .collect();
                for (name, value) in &values {
                    if let Some(timeline) = self.timelines.get_mut(name) {
                        *timeline = Timeline::collapse(*value);
                    }
                    self.scope.insert(name.clone(), *value);
                }
                info!(
                    method = ?solution.method,
                    variables = values.len(),
                    records = system.record_count(),
                    iterations = solution.iterations,
                    objective = solution.objective,
                    "constraints reconciled"
                );
                self.outcome = SolveOutcome::Solved(SolveSummary {
                    method: solution.method,
                    iterations: solution.iterations,
                    objective: solution.objective,
                    values,
                });
            }
            Err(err) => {
                let report = model::failure_report(&system, &self.constraints, &initial, &err);
                error!(
                    kind = ?report.kind,
                    iterations = report.iterations,
                    objective = report.objective,
                    "constraint solve failed: {err}"
                );
                let message = format!("constraint solve failed: {err}");
                let diag = match report.issues.first() {
                    Some(issue) => located(DiagnosticKind::SolverFailure, &message, &issue.origin),
                    None => Diagnostic::message_only(DiagnosticKind::SolverFailure, &message),
                };
                self.diagnostics.push(diag);
                self.outcome = SolveOutcome::Failed(Box::new(report));
            }
        }
        &self.outcome
    }

    /// Starting point per variable: its current scope value, else the mean of
    /// its timeline, else `0`.
    fn initial_guesses(&mut self, system: &ConstraintSystem) -> Vec<f64> {
        let mut initial = Vec::with_capacity(system.variables().len());
        for name in system.variables() {
            if let Some(value) = self.scope.get(name) {
                initial.push(*value);
                continue;
            }
            if let Some(timeline) = self.timelines.get(name) {
                initial.push(timeline.mean());
                continue;
            }
            let origin = self
                .constraints
                .iter()
                .find(|c| &c.variable == name)
                .map(|c| c.origin.clone());
            let message = format!("variable '{name}' not found; solving from 0");
            let diag = match origin {
                Some(origin) => located(DiagnosticKind::UndefinedVariable, &message, &origin),
                None => Diagnostic::message_only(DiagnosticKind::UndefinedVariable, &message),
            };
            warn!(line = diag.line, column = diag.column, "{}", diag.message);
            self.diagnostics.push(diag);
            initial.push(0.0);
        }
        initial
    }
}

fn located(kind: DiagnosticKind, message: &str, origin: &ConstraintOrigin) -> Diagnostic {
    Diagnostic {
        file: origin.file.clone(),
        line: origin.line,
        column: origin.column,
        snippet: origin.snippet.clone(),
        pointer: origin.pointer.clone(),
        ..Diagnostic::message_only(kind, message)
    }
}
