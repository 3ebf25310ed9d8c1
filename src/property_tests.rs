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

//! Property-based tests for convergence, solving and front-end robustness.

#[cfg(test)]
mod tests {
    use crate::*;
    use proptest::prelude::*;

    /// Quarter steps keep generated literals exact and free of exponents.
    fn quarter() -> impl Strategy<Value = f64> {
        (-4_000_000i32..4_000_000).prop_map(|q| f64::from(q) / 4.0)
    }

    /// Magnitudes up to 10¹², still exactly representable.
    fn wide() -> impl Strategy<Value = f64> {
        (-4_000_000_000_000i64..4_000_000_000_000).prop_map(|q| q as f64 / 4.0)
    }

    fn list_literal(values: &[f64]) -> String {
        let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        format!("[{}]", items.join(", "))
    }

    proptest! {
        /// Weights are positive, symmetric and sum to one.
        #[test]
        fn prop_weights_normalized(n in 1usize..40) {
            let w = gaussian_weights(n);
            prop_assert_eq!(w.len(), n);
            prop_assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            for i in 0..n {
                prop_assert!(w[i] > 0.0);
                prop_assert!((w[i] - w[n - 1 - i]).abs() < 1e-15);
            }
        }

        /// Convergence of a declared timeline is `Σ W_i · V_i`.
        #[test]
        fn prop_convergence_is_weighted_sum(
            values in prop::collection::vec(quarter(), 1..16),
        ) {
            let source = format!("timeline t = {};", list_literal(&values));
            let parsed = parse_program(&source).expect("parse");
            let mut session = Session::new(&source);
            session.execute(&parsed.program);

            let expected: f64 = values
                .iter()
                .zip(gaussian_weights(values.len()))
                .map(|(v, w)| v * w)
                .sum();
            prop_assert!((session.convergence("t") - expected).abs() < 1e-9);
            prop_assert!(session.diagnostics().is_empty());
        }

        /// A lone constraint collapses its timeline onto the target.
        #[test]
        fn prop_single_constraint_collapses(
            values in prop::collection::vec(quarter(), 1..10),
            target in quarter(),
        ) {
            let source = format!(
                "timeline t = {};\nt <~ {target};\nr = converge(t);\n",
                list_literal(&values)
            );
            let report = compile(&source).expect("compile");
            prop_assert_eq!(report.spectrum("t"), Some(&[target][..]));
            prop_assert_eq!(report.scalar("r"), Some(target));
        }

        /// Repeated constraints on one variable settle on the mean target.
        #[test]
        fn prop_conflicting_constraints_average(
            targets in prop::collection::vec(prop_oneof![quarter(), wide()], 2..6),
        ) {
            let mut source = String::from("timeline x = [0, 1];\n");
            for target in &targets {
                source.push_str(&format!("x <~ {target};\n"));
            }
            let report = compile(&source).expect("compile");
            let mean = targets.iter().sum::<f64>() / targets.len() as f64;
            let scale = targets.iter().fold(1.0f64, |m, t| m.max(t.abs()));
            let x = report.scalar("x").expect("x");
            prop_assert!(report.solve_outcome().failure_report().is_none());
            prop_assert!((x - mean).abs() <= 1e-9 * scale, "x = {x}, mean = {mean}");
        }

        /// Fresh runs over the same source agree exactly.
        #[test]
        fn prop_compile_deterministic(
            values in prop::collection::vec(quarter(), 1..8),
            scale in quarter(),
            target in quarter(),
        ) {
            let source = format!(
                "timeline a = {};\nb = converge(a) * {scale};\na <~ {target};\nc = b + a;\n",
                list_literal(&values)
            );
            let first = compile(&source).expect("compile");
            let second = compile(&source).expect("compile");
            prop_assert_eq!(first.fingerprint(), second.fingerprint());
            prop_assert_eq!(first, second);
        }

        /// The front end never panics and always terminates the token stream.
        #[test]
        fn prop_arbitrary_input_never_panics(source in "\\PC{0,64}") {
            let lexed = lex(&source, "<prop>");
            prop_assert_eq!(lexed.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
            let _ = compile(&source);
        }
    }
}
