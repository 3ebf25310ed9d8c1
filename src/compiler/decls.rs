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

//! Statement execution.

use crate::ast::{Expr, SourceSpan, Stmt, StmtKind};
use crate::diagnostics::DiagnosticKind;
use crate::model::{Constraint, Timeline};
use tracing::debug;

use super::Session;

impl<'src> Session<'src> {
    /// Executes one statement.
    pub(super) fn execute_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::TimelineDecl { name, init } => self.declare_timeline(name, init),
            StmtKind::Constraint { name, target } => self.add_constraint(name, target, &stmt.span),
            StmtKind::Assign { name, value } => {
                let value = self.eval_scalar(value);
                self.store(name, value);
            }
            StmtKind::Converge { name } => {
                let value = self.converge_named(name, Some(&stmt.span));
                debug!(name = %name, value, "converged");
                self.store(name, value);
            }
        }
    }

    /// Registers a timeline and seeds its scope estimate.
    fn declare_timeline(&mut self, name: &str, init: &Expr) {
        if let Some(&solved) = self.pinned.get(name) {
            self.timelines.insert(name.to_string(), Timeline::collapse(solved));
            self.scope.insert(name.to_string(), solved);
            debug!(name = %name, value = solved, "timeline pinned to solved value");
            return;
        }

        let values = self.eval_sequence(init);
        let Some(timeline) = Timeline::new(values) else {
            self.report(
                DiagnosticKind::InvalidValue,
                format!("timeline '{name}' needs at least one value; declaration skipped"),
                Some(&init.span),
            );
            return;
        };
        let estimate = timeline.converge();
        debug!(
            name = %name,
            len = timeline.spectrum().len(),
            estimate,
            "timeline declared"
        );
        // Re-declaration replaces spectrum and weights together.
        self.timelines.insert(name.to_string(), timeline);
        self.scope.insert(name.to_string(), estimate);
    }

    /// Appends a deferred constraint. The variable itself is left untouched.
    fn add_constraint(&mut self, name: &str, target: &Expr, span: &SourceSpan) {
        if self.settling {
            return;
        }
        let target = self.eval_scalar(target);
        debug!(name = %name, target, "constraint recorded");
        let origin = self.constraint_origin(span);
        self.constraints.push(Constraint {
            variable: name.to_string(),
            target,
            origin,
        });
    }

    /// Writes a scope scalar; pinned names keep their solved value.
    fn store(&mut self, name: &str, value: f64) {
        if let Some(&solved) = self.pinned.get(name) {
            debug!(name = %name, ignored = value, solved, "write to pinned variable ignored");
            self.scope.insert(name.to_string(), solved);
            return;
        }
        self.scope.insert(name.to_string(), value);
    }
}
