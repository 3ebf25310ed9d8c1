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

//! Final-state view returned by `compile`.

use indexmap::IndexMap;
use sha2::digest::Output;
use sha2::{Digest, Sha256};

use super::{Constraint, SolveOutcome};
use crate::diagnostics::{Diagnostic, DiagnosticKind};

const RESONANCE_BASE_HZ: f64 = 587_000.0;
const RESONANCE_SPAN_HZ: f64 = 100_000.0;
const RESONANCE_BUCKETS: u64 = 1_000_000;

/// Read-only snapshot of a finished compilation run.
///
/// Both maps keep insertion order, so two runs over the same source report
/// the same entries in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalStateReport {
    pub(crate) scope: IndexMap<String, f64>,
    pub(crate) timelines: IndexMap<String, Vec<f64>>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) outcome: SolveOutcome,
}

impl FinalStateReport {
    /// Variable name → resolved scalar.
    pub fn scope(&self) -> &IndexMap<String, f64> {
        &self.scope
    }

    /// Variable name → spectrum of every timeline still in the store.
    ///
    /// Solved timelines appear collapsed to a single value.
    pub fn timelines(&self) -> &IndexMap<String, Vec<f64>> {
        &self.timelines
    }

    /// Returns a scope scalar by name.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.scope.get(name).copied()
    }

    /// Returns a timeline spectrum by name.
    pub fn spectrum(&self, name: &str) -> Option<&[f64]> {
        self.timelines.get(name).map(Vec::as_slice)
    }

    /// Constraint records accumulated during execution.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Every recoverable diagnostic, in discovery order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// What the solve step did.
    pub fn solve_outcome(&self) -> &SolveOutcome {
        &self.outcome
    }

    /// SHA-256 hex digest of the scope, entries sorted by name and rendered as
    /// `name:value` with twelve decimals.
    pub fn fingerprint(&self) -> String {
        format!("{:x}", self.digest())
    }

    /// Resonance frequency in Hz derived from the fingerprint: the first eight
    /// digest bytes, taken modulo 10⁶, spread `±50 kHz` around `587 kHz`.
    pub fn resonance(&self) -> f64 {
        let digest = self.digest();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let normalized = (u64::from_be_bytes(head) % RESONANCE_BUCKETS) as f64
            / RESONANCE_BUCKETS as f64;
        RESONANCE_BASE_HZ + RESONANCE_SPAN_HZ * (normalized - 0.5)
    }

    fn digest(&self) -> Output<Sha256> {
        let mut entries: Vec<(&String, &f64)> = self.scope.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut hasher = Sha256::new();
        for (name, value) in entries {
            hasher.update(format!("{name}:{value:.12}").as_bytes());
        }
        hasher.finalize()
    }

    /// Absolute mean of the scope values; `0` for an empty scope.
    pub fn coherence(&self) -> f64 {
        if self.scope.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.scope.values().sum();
        (sum / self.scope.len() as f64).abs()
    }
}
