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

//! Batch least-squares reconciliation of deferred constraints.
//!
//! Every `name <~ target` record lowers to one `constraint-solver` equation
//! `name - target = 0`. A variable with conflicting records has no exact
//! root, so the backend settles on the least-squares fit; the result is
//! accepted once each variable's mean residual vanishes relative to the
//! magnitudes involved.

use constraint_solver::{
    Compiler as SolverCompiler, Exp, NewtonRaphsonSolver, SolverError as RawSolverError,
};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, info};

use super::{Constraint, ConstraintIssue, FailureKind, SolveError, SolveFailureReport};

const MAX_REPORTED_ISSUES: usize = 8;

/// Default relative stationarity threshold.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// How a solution was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMethod {
    /// Each variable had one constraint; its target is the minimum.
    ClosedForm,
    /// Newton-Raphson with line search over the lowered equations.
    NewtonRaphson,
}

/// Solver knobs derived from compile options.
#[derive(Debug, Clone, Copy)]
pub struct SolverSettings {
    /// Largest accepted mean residual per variable, relative to
    /// `max(1, |x|, max |target|)`.
    pub tolerance: f64,
    /// Allow the single-constraint fast path.
    pub closed_form: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            closed_form: true,
        }
    }
}

/// Successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Values aligned with [`ConstraintSystem::variables`].
    pub values: Vec<f64>,
    /// Method used.
    pub method: SolveMethod,
    /// Backend iterations (`0` for closed form).
    pub iterations: usize,
    /// `Σ (x − target)²` at `values`.
    pub objective: f64,
}

/// Constraint records indexed by distinct variable.
#[derive(Debug, Clone)]
pub struct ConstraintSystem {
    variables: Vec<String>,
    // (variable index, target) per constraint record, in record order.
    records: Vec<(usize, f64)>,
    counts: Vec<usize>,
}

impl ConstraintSystem {
    /// Indexes constraint records by distinct variable, first appearance first.
    pub fn from_constraints(constraints: &[Constraint]) -> Self {
        let mut index: IndexMap<&str, usize> = IndexMap::new();
        let mut records = Vec::with_capacity(constraints.len());
        let mut counts = Vec::new();
        for constraint in constraints {
            let next = index.len();
            let slot = *index.entry(constraint.variable.as_str()).or_insert(next);
            if slot == counts.len() {
                counts.push(0);
            }
            counts[slot] += 1;
            records.push((slot, constraint.target));
        }
        Self {
            variables: index.keys().map(|name| name.to_string()).collect(),
            records,
            counts,
        }
    }

    /// Distinct constrained variable names.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Number of constraint records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Whether every variable carries exactly one record.
    pub fn is_single_constraint(&self) -> bool {
        self.counts.iter().all(|&count| count == 1)
    }

    /// More records than variables: an exact root generally does not exist.
    pub fn is_overconstrained(&self) -> bool {
        self.records.len() > self.variables.len()
    }

    /// One `name - target` equation per record.
    pub fn equations(&self) -> Vec<Exp> {
        self.records
            .iter()
            .map(|&(slot, target)| {
                Exp::sub(Exp::var(self.variables[slot].as_str()), Exp::val(target))
            })
            .collect()
    }

    /// Signed residual `x[var] − target` per record.
    pub fn residuals(&self, x: &[f64]) -> Vec<f64> {
        self.records
            .iter()
            .map(|&(slot, target)| x[slot] - target)
            .collect()
    }

    /// Least-squares objective `Σ (x[var] − target)²`.
    pub fn objective(&self, x: &[f64]) -> f64 {
        self.residuals(x).iter().map(|r| r * r).sum()
    }

    /// Largest per-variable mean residual, scaled by `max(1, |x|, max |target|)`.
    ///
    /// Zero exactly at the least-squares optimum; infinite for a non-finite
    /// iterate.
    pub fn stationarity(&self, x: &[f64]) -> f64 {
        if x.iter().any(|v| !v.is_finite()) {
            return f64::INFINITY;
        }
        let mut sums = vec![0.0; self.variables.len()];
        let mut scales: Vec<f64> = x.iter().map(|v| v.abs().max(1.0)).collect();
        for &(slot, target) in &self.records {
            sums[slot] += x[slot] - target;
            scales[slot] = scales[slot].max(target.abs());
        }
        sums.iter()
            .zip(&self.counts)
            .zip(&scales)
            .map(|((sum, &count), scale)| (sum / count as f64).abs() / scale)
            .fold(0.0, f64::max)
    }

    /// Reads backend values in variable order, keeping `fallback` for names
    /// the backend did not report.
    fn align(&self, values: &HashMap<String, f64>, fallback: &[f64]) -> Vec<f64> {
        self.variables
            .iter()
            .zip(fallback)
            .map(|(name, seed)| values.get(name).copied().unwrap_or(*seed))
            .collect()
    }

    fn named(&self, x: &[f64]) -> HashMap<String, f64> {
        self.variables
            .iter()
            .cloned()
            .zip(x.iter().copied())
            .collect()
    }
}

/// Solves the constraint system from `initial` (aligned with
/// [`ConstraintSystem::variables`]).
pub fn solve(
    system: &ConstraintSystem,
    initial: &[f64],
    settings: SolverSettings,
) -> Result<Solution, SolveError> {
    for (name, value) in system.variables.iter().zip(initial) {
        if !value.is_finite() {
            return Err(SolveError::NonFiniteInput {
                role: "initial value",
                name: name.clone(),
            });
        }
    }
    for &(slot, target) in &system.records {
        if !target.is_finite() {
            return Err(SolveError::NonFiniteInput {
                role: "target",
                name: system.variables[slot].clone(),
            });
        }
    }

    if settings.closed_form && system.is_single_constraint() {
        let mut values = initial.to_vec();
        for &(slot, target) in &system.records {
            values[slot] = target;
        }
        debug!(variables = values.len(), "closed-form solve");
        return Ok(Solution {
            values,
            method: SolveMethod::ClosedForm,
            iterations: 0,
            objective: 0.0,
        });
    }

    let equations = system.equations();
    let compiled = SolverCompiler::compile(&equations).map_err(SolveError::InternalCompile)?;
    let solver = NewtonRaphsonSolver::new(compiled);
    let seed = system.named(initial);

    let (values, iterations) = match solver.solve_with_line_search(seed) {
        Ok(raw) => (system.align(&raw.values, initial), raw.iterations),
        // Conflicting records leave a non-zero residual floor; the stalled
        // iterate is still the answer when it is stationary.
        Err(RawSolverError::NoConvergence(diag)) if system.is_overconstrained() => {
            debug!(
                iterations = diag.iterations,
                error = diag.error,
                "backend stalled on least-squares floor"
            );
            (system.align(&diag.values, initial), diag.iterations)
        }
        Err(err) => return Err(err.into()),
    };

    let objective = system.objective(&values);
    let stationarity = system.stationarity(&values);
    if !(stationarity <= settings.tolerance) {
        return Err(SolveError::NonConvergence {
            message: format!(
                "least-squares optimum not reached (relative mean residual {stationarity:.3e})"
            ),
            iterations,
            error: objective,
            values: system.named(&values),
        });
    }

    info!(
        variables = system.variables.len(),
        records = system.records.len(),
        iterations,
        objective,
        stationarity,
        "iterative solve converged"
    );
    Ok(Solution {
        values,
        method: SolveMethod::NewtonRaphson,
        iterations,
        objective,
    })
}

/// Builds a structured report for a failed solve.
pub fn failure_report(
    system: &ConstraintSystem,
    constraints: &[Constraint],
    initial: &[f64],
    err: &SolveError,
) -> SolveFailureReport {
    let kind = match err {
        SolveError::NonFiniteInput { .. } => FailureKind::NonFiniteInput,
        SolveError::NonConvergence { .. } => FailureKind::NonConvergence,
        SolveError::SingularMatrix { .. } => FailureKind::SingularMatrix,
        SolveError::InternalCompile(_) | SolveError::Backend(_) => FailureKind::Backend,
    };
    let point = match err.values() {
        Some(values) => system.align(values, initial),
        None => initial.to_vec(),
    };
    let residuals = system.residuals(&point);
    let objective = system.objective(&point);

    let mut ranked: Vec<(usize, f64)> = residuals
        .iter()
        .enumerate()
        .map(|(idx, value)| (idx, value.abs()))
        .collect();
    // NaN residuals sort first: they are the most suspicious.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let issues = ranked
        .into_iter()
        .take(MAX_REPORTED_ISSUES)
        .filter_map(|(idx, magnitude)| {
            let constraint = constraints.get(idx)?;
            Some(ConstraintIssue {
                constraint_index: idx,
                variable: constraint.variable.clone(),
                target: constraint.target,
                residual: residuals[idx],
                magnitude,
                origin: constraint.origin.clone(),
            })
        })
        .collect();

    SolveFailureReport {
        kind,
        message: err.to_string(),
        iterations: err.iterations(),
        objective,
        constraint_count: system.records.len(),
        unknown_count: system.variables.len(),
        values: system
            .variables
            .iter()
            .cloned()
            .zip(point.iter().copied())
            .collect(),
        residuals,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConstraintOrigin;

    fn constraint(variable: &str, target: f64) -> Constraint {
        Constraint {
            variable: variable.to_string(),
            target,
            origin: ConstraintOrigin {
                file: String::new(),
                line: 1,
                column: 1,
                snippet: String::new(),
                pointer: String::new(),
            },
        }
    }

    #[test]
    fn indexes_variables_in_first_appearance_order() {
        let cs = vec![constraint("b", 1.0), constraint("a", 2.0), constraint("b", 3.0)];
        let system = ConstraintSystem::from_constraints(&cs);
        assert_eq!(system.variables(), &["b".to_string(), "a".to_string()]);
        assert_eq!(system.record_count(), 3);
        assert!(!system.is_single_constraint());
        assert!(system.is_overconstrained());
        assert_eq!(system.residuals(&[2.0, 2.0]), vec![1.0, 0.0, -1.0]);
        assert_eq!(system.equations().len(), 3);
    }

    #[test]
    fn closed_form_assigns_targets() {
        let cs = vec![constraint("x", 3.5), constraint("y", -1.0)];
        let system = ConstraintSystem::from_constraints(&cs);
        let solution = solve(&system, &[2.0, 0.0], SolverSettings::default()).expect("solves");
        assert_eq!(solution.method, SolveMethod::ClosedForm);
        assert_eq!(solution.values, vec![3.5, -1.0]);
    }

    #[test]
    fn iterative_path_agrees_with_closed_form() {
        let cs = vec![constraint("x", 3.5), constraint("y", -1.0)];
        let system = ConstraintSystem::from_constraints(&cs);
        let settings = SolverSettings {
            closed_form: false,
            ..SolverSettings::default()
        };
        let solution = solve(&system, &[2.0, 0.0], settings).expect("solves");
        assert_eq!(solution.method, SolveMethod::NewtonRaphson);
        assert!((solution.values[0] - 3.5).abs() < 1e-8);
        assert!((solution.values[1] + 1.0).abs() < 1e-8);
    }

    #[test]
    fn conflicting_constraints_average() {
        let cs = vec![constraint("x", 1.0), constraint("x", 2.0), constraint("x", 6.0)];
        let system = ConstraintSystem::from_constraints(&cs);
        let solution = solve(&system, &[0.0], SolverSettings::default()).expect("solves");
        assert_eq!(solution.method, SolveMethod::NewtonRaphson);
        assert!((solution.values[0] - 3.0).abs() < 1e-8);
        // Residual floor: (3-1)² + (3-2)² + (3-6)² = 14.
        assert!((solution.objective - 14.0).abs() < 1e-6);
    }

    #[test]
    fn stationarity_is_relative_to_target_magnitude() {
        let cs = vec![constraint("x", 100000000.3), constraint("x", -100000000.0)];
        let system = ConstraintSystem::from_constraints(&cs);
        // One ulp of 1e8 left over in the mean residual must still count as
        // converged.
        assert!(system.stationarity(&[0.15 + 1.5e-8]) <= DEFAULT_TOLERANCE);
        assert!(system.stationarity(&[5.0]) > DEFAULT_TOLERANCE);
        assert_eq!(system.stationarity(&[f64::NAN]), f64::INFINITY);

        let huge = vec![constraint("y", 1e12 + 1.0), constraint("y", -1e12)];
        let system = ConstraintSystem::from_constraints(&huge);
        assert!(system.stationarity(&[0.5 + 1e-3]) <= DEFAULT_TOLERANCE);
    }

    #[test]
    fn large_conflicting_targets_average() {
        let cs = vec![constraint("x", 100000000.3), constraint("x", -100000000.0)];
        let system = ConstraintSystem::from_constraints(&cs);
        let solution = solve(&system, &[5.0], SolverSettings::default()).expect("solves");
        assert!((solution.values[0] - 0.15).abs() < 1e-6, "{:?}", solution.values);

        let cs = vec![constraint("y", 1e12 + 1.0), constraint("y", -1e12)];
        let system = ConstraintSystem::from_constraints(&cs);
        let solution = solve(&system, &[0.0], SolverSettings::default()).expect("solves");
        assert!((solution.values[0] - 0.5).abs() < 1e-2, "{:?}", solution.values);
    }

    #[test]
    fn non_finite_target_is_rejected_with_report() {
        let cs = vec![constraint("x", f64::INFINITY), constraint("y", 1.0)];
        let system = ConstraintSystem::from_constraints(&cs);
        let err = solve(&system, &[0.0, 0.0], SolverSettings::default()).expect_err("inf target");
        assert!(matches!(
            &err,
            SolveError::NonFiniteInput { role: "target", name } if name == "x"
        ));
        let report = failure_report(&system, &cs, &[0.0, 0.0], &err);
        assert_eq!(report.kind, FailureKind::NonFiniteInput);
        assert_eq!(report.values.get("x"), Some(&0.0));
        assert_eq!(report.issues[0].variable, "x");
        assert_eq!(report.constraint_count, 2);
        assert_eq!(report.unknown_count, 2);
    }

    #[test]
    fn non_convergence_report_uses_backend_iterate() {
        let cs = vec![constraint("x", 1.0), constraint("x", 3.0)];
        let system = ConstraintSystem::from_constraints(&cs);
        let err = SolveError::NonConvergence {
            message: "stalled".to_string(),
            iterations: 7,
            error: 3.0,
            values: HashMap::from([("x".to_string(), 10.0)]),
        };
        let report = failure_report(&system, &cs, &[0.0], &err);
        assert_eq!(report.kind, FailureKind::NonConvergence);
        assert_eq!(report.iterations, 7);
        assert_eq!(report.values.get("x"), Some(&10.0));
        assert_eq!(report.residuals, vec![9.0, 7.0]);
        assert_eq!(report.issues[0].constraint_index, 0);
        assert!((report.objective - 130.0).abs() < 1e-12);
    }
}
