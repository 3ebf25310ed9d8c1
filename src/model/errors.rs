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

//! Error types surfaced by the solve step.

use constraint_solver::{
    CompileError as SolverCompileError, SolverError as RawSolverError,
    SolverRunDiagnostic as RawSolverRunDiagnostic,
};
use std::collections::HashMap;
use thiserror::Error;

/// Failures of the solve step.
///
/// Every variant is recoverable: the caller keeps its previous values and
/// records a diagnostic.
#[derive(Debug, Error)]
pub enum SolveError {
    /// A seed or target was NaN or infinite before solving.
    #[error("non-finite {role} for '{name}'")]
    NonFiniteInput {
        /// `"target"` or `"initial value"`.
        role: &'static str,
        /// Variable the value belongs to.
        name: String,
    },
    /// Lowered constraint equations were rejected by `constraint-solver`.
    #[error("failed to compile constraint equations: {0}")]
    InternalCompile(SolverCompileError),
    /// The backend stopped away from the least-squares optimum.
    #[error("{message} (residual {error:.3e}, iterations {iterations})")]
    NonConvergence {
        /// Backend or stationarity message.
        message: String,
        /// Iterations completed.
        iterations: usize,
        /// Residual error at `values`.
        error: f64,
        /// Last iterate by variable name.
        values: HashMap<String, f64>,
    },
    /// The backend Jacobian could not be factored.
    #[error("{message} (singular Jacobian, iterations {iterations})")]
    SingularMatrix {
        /// Backend message.
        message: String,
        /// Iterations completed.
        iterations: usize,
        /// Residual error at `values`.
        error: f64,
        /// Last iterate by variable name.
        values: HashMap<String, f64>,
    },
    /// Any other backend failure.
    #[error("solver backend error: {0:?}")]
    Backend(RawSolverError),
}

impl From<RawSolverError> for SolveError {
    fn from(value: RawSolverError) -> Self {
        match value {
            RawSolverError::NoConvergence(diag) => {
                let RawSolverRunDiagnostic {
                    message,
                    iterations,
                    error,
                    values,
                    ..
                } = diag;
                SolveError::NonConvergence {
                    message,
                    iterations,
                    error,
                    values,
                }
            }
            RawSolverError::SingularMatrix(diag) => {
                let RawSolverRunDiagnostic {
                    message,
                    iterations,
                    error,
                    values,
                    ..
                } = diag;
                SolveError::SingularMatrix {
                    message,
                    iterations,
                    error,
                    values,
                }
            }
            other => SolveError::Backend(other),
        }
    }
}

impl SolveError {
    /// Iterations completed before failing.
    pub fn iterations(&self) -> usize {
        match self {
            SolveError::NonConvergence { iterations, .. }
            | SolveError::SingularMatrix { iterations, .. } => *iterations,
            _ => 0,
        }
    }

    /// Last iterate, when the backend got far enough to have one.
    pub fn values(&self) -> Option<&HashMap<String, f64>> {
        match self {
            SolveError::NonConvergence { values, .. }
            | SolveError::SingularMatrix { values, .. } => Some(values),
            _ => None,
        }
    }
}
