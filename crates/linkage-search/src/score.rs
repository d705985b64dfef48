//! Curve dissimilarity scoring.

use linkage_assembly::MotionCurve;

/// Scores how far apart two motion curves are. Larger means more
/// dissimilar.
///
/// The explorer accepts a candidate only when its score against every
/// accepted curve reaches the configured threshold, so a scorer defines
/// what "distinct behavior" means for a search.
pub trait CurveScorer {
    /// Dissimilarity between a candidate curve and one accepted curve.
    fn score(&self, candidate: &MotionCurve, existing: &MotionCurve) -> f64;
}

/// Placeholder scorer reporting a fixed value for every pair.
///
/// A real curve-shape distance (normalized for rotation and reflection)
/// is still an open design question. Until one lands, the constant
/// keeps the acceptance pipeline exercised: the default value of 1.5
/// clears the default threshold of 1.0, so every candidate passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantScorer {
    /// The score reported for every pair.
    pub value: f64,
}

impl ConstantScorer {
    /// Create a constant scorer.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Default for ConstantScorer {
    fn default() -> Self {
        Self { value: 1.5 }
    }
}

impl CurveScorer for ConstantScorer {
    fn score(&self, _candidate: &MotionCurve, _existing: &MotionCurve) -> f64 {
        self.value
    }
}

/// Mean Euclidean distance between index-paired points.
///
/// Pairs points by step index up to the shorter curve's length, with no
/// alignment or resampling. Crude, but a working non-degenerate
/// baseline for experiments. An empty curve scores infinitely far from
/// everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanPointDistance;

impl CurveScorer for MeanPointDistance {
    fn score(&self, candidate: &MotionCurve, existing: &MotionCurve) -> f64 {
        let n = candidate.len().min(existing.len());
        if n == 0 {
            return f64::INFINITY;
        }
        let total: f64 = candidate.points()[..n]
            .iter()
            .zip(existing.points()[..n].iter())
            .map(|(a, b)| (a - b).norm())
            .sum();
        total / n as f64
    }
}
