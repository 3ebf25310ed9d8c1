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

//! Constraint origins and failure-report structures.

use indexmap::IndexMap;

/// Classification for solver failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A target or initial value was NaN/infinite.
    NonFiniteInput,
    /// The backend stopped before reaching the least-squares optimum.
    NonConvergence,
    /// The backend Jacobian was singular.
    SingularMatrix,
    /// Equation compilation or another backend error.
    Backend,
}

/// Source location of one `name <~ expr;` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintOrigin {
    /// Source file/path label.
    pub file: String,
    /// 1-based source line.
    pub line: usize,
    /// 1-based source column.
    pub column: usize,
    /// Source line snippet.
    pub snippet: String,
    /// Caret pointer for `snippet`.
    pub pointer: String,
}

/// One high-residual constraint mapped back to source.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintIssue {
    /// Index in the recorded constraint list.
    pub constraint_index: usize,
    /// Constrained variable.
    pub variable: String,
    /// Requested target.
    pub target: f64,
    /// Signed residual `value − target` at failure time.
    pub residual: f64,
    /// Absolute residual magnitude.
    pub magnitude: f64,
    /// Where the constraint was written.
    pub origin: ConstraintOrigin,
}

/// Structured report attached to a failed solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveFailureReport {
    /// High-level failure classification.
    pub kind: FailureKind,
    /// Solver failure message.
    pub message: String,
    /// Iteration count reached before failure.
    pub iterations: usize,
    /// Objective at failure time (`NaN` when it could not be evaluated).
    pub objective: f64,
    /// Number of constraint records.
    pub constraint_count: usize,
    /// Number of distinct constrained variables.
    pub unknown_count: usize,
    /// Variable values at failure time (the seeds when no iterate exists).
    pub values: IndexMap<String, f64>,
    /// Per-constraint residuals aligned with the constraint list.
    pub residuals: Vec<f64>,
    /// Largest-residual constraints, worst first.
    pub issues: Vec<ConstraintIssue>,
}
