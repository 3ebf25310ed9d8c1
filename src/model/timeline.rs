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

//! Timelines, Gaussian weighting and the convergence reduction.

/// A named variable's candidate values plus their derived weights.
///
/// The spectrum is never empty and `weights` always matches it: both are only
/// set together through [`Timeline::new`] or [`Timeline::collapse`].
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    spectrum: Vec<f64>,
    weights: Vec<f64>,
}

impl Timeline {
    /// Builds a timeline, returning `None` for an empty spectrum.
    pub fn new(spectrum: Vec<f64>) -> Option<Self> {
        if spectrum.is_empty() {
            return None;
        }
        let weights = gaussian_weights(spectrum.len());
        Some(Self { spectrum, weights })
    }

    /// Builds the single-value timeline a solved variable collapses to.
    pub fn collapse(value: f64) -> Self {
        Self {
            spectrum: vec![value],
            weights: vec![1.0],
        }
    }

    /// Candidate values in declaration order.
    pub fn spectrum(&self) -> &[f64] {
        &self.spectrum
    }

    /// Weights aligned with [`Timeline::spectrum`]; they sum to 1.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Whether the timeline holds a single value.
    pub fn is_collapsed(&self) -> bool {
        self.spectrum.len() == 1
    }

    /// Weighted expectation `Σ W_i · V_i`.
    pub fn converge(&self) -> f64 {
        self.spectrum
            .iter()
            .zip(&self.weights)
            .map(|(value, weight)| value * weight)
            .sum()
    }

    /// Unweighted arithmetic mean; the solver's seed for timeline-only names.
    pub fn mean(&self) -> f64 {
        self.spectrum.iter().sum::<f64>() / self.spectrum.len() as f64
    }
}

/// Normalized Gaussian weights over `n` indices.
///
/// Offsets are measured from the midpoint and scaled so the ends sit at
/// `ξ = ±1`; each index gets `exp(-ξ²)` before normalization.
pub fn gaussian_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let mid = (n - 1) as f64 / 2.0;
    let scale = mid.max(1.0);
    let raw: Vec<f64> = (0..n)
        .map(|i| {
            let xi = (i as f64 - mid) / scale;
            (-xi * xi).exp()
        })
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|c| c / total).collect()
}

/// Collapses an anonymous sequence with the timeline weighting.
pub fn weighted_collapse(values: &[f64]) -> Option<f64> {
    Timeline::new(values.to_vec()).map(|t| t.converge())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one_and_are_symmetric() {
        for n in 1..12 {
            let w = gaussian_weights(n);
            assert_eq!(w.len(), n);
            assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            for i in 0..n {
                assert!((w[i] - w[n - 1 - i]).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn weights_peak_at_midpoint() {
        let w = gaussian_weights(5);
        assert!(w[2] > w[1] && w[1] > w[0]);
        let w = gaussian_weights(4);
        assert_eq!(w[1], w[2]);
        assert!(w[1] > w[0]);
    }

    #[test]
    fn single_value_has_unit_weight() {
        assert_eq!(gaussian_weights(1), vec![1.0]);
        let t = Timeline::new(vec![7.5]).expect("non-empty");
        assert_eq!(t.converge(), 7.5);
        assert!(t.is_collapsed());
    }

    #[test]
    fn converge_is_weighted_sum() {
        let t = Timeline::new(vec![1.0, 4.0, 2.0, 8.0]).expect("non-empty");
        let expected: f64 = t
            .spectrum()
            .iter()
            .zip(t.weights())
            .map(|(v, w)| v * w)
            .sum();
        assert!((t.converge() - expected).abs() < 1e-12);
        assert!((t.mean() - 3.75).abs() < 1e-12);
    }

    #[test]
    fn symmetric_spectrum_converges_to_centre() {
        let t = Timeline::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]).expect("non-empty");
        assert!((t.converge() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_spectrum_is_rejected() {
        assert!(Timeline::new(Vec::new()).is_none());
        assert!(weighted_collapse(&[]).is_none());
    }

    #[test]
    fn collapse_resets_weights() {
        let t = Timeline::collapse(3.2);
        assert_eq!(t.spectrum(), &[3.2]);
        assert_eq!(t.weights(), &[1.0]);
    }
}
