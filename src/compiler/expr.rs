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

//! Expression evaluation.

use crate::ast::{BinOp, Builtin, Expr, ExprKind, SourceSpan};
use crate::diagnostics::DiagnosticKind;
use crate::model::weighted_collapse;

use super::{Session, Value};

impl<'src> Session<'src> {
    /// Recursively evaluates an expression. Never fails: problems become
    /// diagnostics and neutral values.
    pub(super) fn eval(&mut self, expr: &Expr) -> Value {
        match &expr.kind {
            ExprKind::Number(v) => Value::Scalar(*v),
            ExprKind::List(items) => Value::Sequence(items.clone()),
            ExprKind::Ident(name) => Value::Scalar(self.resolve_ident(name, &expr.span)),
            ExprKind::Call {
                function: Builtin::Converge,
                target,
            } => Value::Scalar(self.converge_named(target, Some(&expr.span))),
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left);
                let right = self.eval(right);
                self.eval_binary(*op, left, right, &expr.span)
            }
        }
    }

    /// Evaluates where a scalar is required; sequences collapse with the
    /// timeline weighting.
    pub(super) fn eval_scalar(&mut self, expr: &Expr) -> f64 {
        match self.eval(expr) {
            Value::Scalar(v) => v,
            Value::Sequence(values) => match weighted_collapse(&values) {
                Some(v) => v,
                None => {
                    self.report(
                        DiagnosticKind::InvalidValue,
                        "empty list has no scalar value; using 0",
                        Some(&expr.span),
                    );
                    0.0
                }
            },
        }
    }

    /// Evaluates where a sequence is required; a scalar is a one-element
    /// sequence.
    pub(super) fn eval_sequence(&mut self, expr: &Expr) -> Vec<f64> {
        match self.eval(expr) {
            Value::Scalar(v) => vec![v],
            Value::Sequence(values) => values,
        }
    }

    /// Identifier lookup: scope first, then the timeline's weighted mean.
    fn resolve_ident(&mut self, name: &str, span: &SourceSpan) -> f64 {
        if let Some(value) = self.pinned.get(name) {
            return *value;
        }
        if let Some(value) = self.scope.get(name) {
            return *value;
        }
        if let Some(timeline) = self.timelines.get(name) {
            return timeline.converge();
        }
        self.report(
            DiagnosticKind::UndefinedVariable,
            format!("variable '{name}' not found"),
            Some(span),
        );
        0.0
    }

    /// Applies `+ - *`, broadcasting scalars over sequences.
    fn eval_binary(&mut self, op: BinOp, left: Value, right: Value, span: &SourceSpan) -> Value {
        match (left, right) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(op.apply(a, b)),
            (Value::Sequence(xs), Value::Scalar(b)) => {
                Value::Sequence(xs.into_iter().map(|x| op.apply(x, b)).collect())
            }
            (Value::Scalar(a), Value::Sequence(ys)) => {
                Value::Sequence(ys.into_iter().map(|y| op.apply(a, y)).collect())
            }
            (Value::Sequence(xs), Value::Sequence(ys)) if xs.len() == ys.len() => Value::Sequence(
                xs.into_iter()
                    .zip(ys)
                    .map(|(x, y)| op.apply(x, y))
                    .collect(),
            ),
            (Value::Sequence(xs), Value::Sequence(ys)) => {
                self.report(
                    DiagnosticKind::InvalidValue,
                    format!(
                        "cannot apply '{}' to sequences of length {} and {}; using 0",
                        op.symbol(),
                        xs.len(),
                        ys.len()
                    ),
                    Some(span),
                );
                Value::Scalar(0.0)
            }
        }
    }
}
