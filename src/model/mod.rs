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

//! Runtime state types, the solver, and failure reporting.

mod errors;
mod result;
mod solve;
mod timeline;
mod trace;

use indexmap::IndexMap;

pub use errors::SolveError;
pub use result::FinalStateReport;
pub use solve::{failure_report, solve, ConstraintSystem, SolveMethod, SolverSettings};
pub use timeline::{gaussian_weights, weighted_collapse, Timeline};
pub use trace::{ConstraintIssue, ConstraintOrigin, FailureKind, SolveFailureReport};

/// One deferred `name <~ target` record.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Constrained variable.
    pub variable: String,
    /// Target evaluated when the statement ran.
    pub target: f64,
    /// Statement location, for failure reports.
    pub origin: ConstraintOrigin,
}

/// Result of the solve step.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SolveOutcome {
    /// Not run yet, or there were no constraints.
    #[default]
    Skipped,
    /// Values were reconciled and written back.
    Solved(SolveSummary),
    /// The solver failed; values were left unchanged.
    Failed(Box<SolveFailureReport>),
}

impl SolveOutcome {
    /// Solved values, when the solve succeeded.
    pub fn solved_values(&self) -> Option<&IndexMap<String, f64>> {
        match self {
            SolveOutcome::Solved(summary) => Some(&summary.values),
            _ => None,
        }
    }

    /// Failure report, when the solve failed.
    pub fn failure_report(&self) -> Option<&SolveFailureReport> {
        match self {
            SolveOutcome::Failed(report) => Some(report),
            _ => None,
        }
    }
}

/// Summary of a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveSummary {
    /// Closed form or iterative.
    pub method: SolveMethod,
    /// Backend iterations (`0` for closed form).
    pub iterations: usize,
    /// Final objective (the least-squares residual floor).
    pub objective: f64,
    /// Solved value per constrained variable, first-appearance order.
    pub values: IndexMap<String, f64>,
}
