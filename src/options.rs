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

//! Compile options builder.

use crate::model::SolverSettings;

/// Per-run settings.
///
/// ```text
/// let options = CompileOptions::new()
///     .source_name("orbit.chr")
///     .closed_form(false);
/// ```
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub(crate) source_name: String,
    pub(crate) tolerance: f64,
    pub(crate) closed_form: bool,
    pub(crate) settle: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        let solver = SolverSettings::default();
        Self {
            source_name: "<inline>".to_string(),
            tolerance: solver.tolerance,
            closed_form: solver.closed_form,
            settle: true,
        }
    }
}

impl CompileOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label used for the source in diagnostics.
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Sets the relative mean-residual threshold a solve must reach.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enables or disables the single-constraint closed-form solve.
    pub fn closed_form(mut self, enabled: bool) -> Self {
        self.closed_form = enabled;
        self
    }

    /// Enables or disables re-running the program with solved values pinned.
    pub fn settle(mut self, enabled: bool) -> Self {
        self.settle = enabled;
        self
    }

    /// Source label used in diagnostics.
    pub fn name(&self) -> &str {
        &self.source_name
    }

    pub(crate) fn solver_settings(&self) -> SolverSettings {
        SolverSettings {
            tolerance: self.tolerance,
            closed_form: self.closed_form,
        }
    }
}
