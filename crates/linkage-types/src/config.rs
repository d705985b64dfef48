//! Configuration types for solving, tracing, perturbation, and search.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the equilibrium solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveConfig {
    /// Iteration cap for one minimizer attempt.
    pub max_iterations: usize,
    /// Declared convergence tolerance on the residual objective.
    ///
    /// Authoritative for the residual-descent strategy. The downhill
    /// simplex strategy derives its internal spread thresholds from this
    /// value but succeeds on its own convergence signal, so a solve can
    /// report success at a slightly different residual scale.
    pub tolerance: f64,
    /// Initial edge length of the simplex around the seed state.
    pub simplex_step: f64,
    /// Number of times the simplex is rebuilt around the best point
    /// (with a reduced step) after it collapses short of the tolerance.
    pub restarts: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5_000,
            tolerance: 1e-4,
            simplex_step: 0.1,
            restarts: 2,
        }
    }
}

impl SolveConfig {
    /// Fast preset: fewer iterations, looser tolerance.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            max_iterations: 1_000,
            tolerance: 1e-3,
            restarts: 1,
            ..Default::default()
        }
    }

    /// High-accuracy preset: more iterations, tighter tolerance.
    #[must_use]
    pub fn high_accuracy() -> Self {
        Self {
            max_iterations: 20_000,
            tolerance: 1e-6,
            restarts: 3,
            ..Default::default()
        }
    }

    /// Set the iteration cap.
    #[must_use]
    pub const fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the convergence tolerance.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the initial simplex step.
    #[must_use]
    pub const fn simplex_step(mut self, step: f64) -> Self {
        self.simplex_step = step;
        self
    }

    /// Set the restart count.
    #[must_use]
    pub const fn restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_iterations == 0 {
            return Err(crate::LinkageError::invalid_config(
                "max_iterations must be at least 1",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(crate::LinkageError::invalid_config(
                "tolerance must be positive and finite",
            ));
        }
        if !self.simplex_step.is_finite() || self.simplex_step <= 0.0 {
            return Err(crate::LinkageError::invalid_config(
                "simplex_step must be positive and finite",
            ));
        }
        Ok(())
    }
}

/// Configuration for tracing one actuation revolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceConfig {
    /// Number of solve-and-record steps per full revolution.
    pub steps_per_revolution: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: 360,
        }
    }
}

impl TraceConfig {
    /// Set the number of steps per revolution.
    #[must_use]
    pub const fn steps(mut self, steps: usize) -> Self {
        self.steps_per_revolution = steps;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.steps_per_revolution == 0 {
            return Err(crate::LinkageError::invalid_config(
                "steps_per_revolution must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Configuration for sampling neighbor configurations.
///
/// Each numeric field class of a declarative configuration is jittered
/// independently within a bounded uniform range around its current value.
/// Radii and lengths never drop below their floors, whatever the draw.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerturbConfig {
    /// Jitter half-range for gear radii.
    pub radius_delta: f64,
    /// Jitter half-range for link lengths.
    pub length_delta: f64,
    /// Jitter half-range for local joint attachment coordinates.
    pub joint_delta: f64,
    /// Jitter half-range for fixed anchor coordinates.
    pub anchor_delta: f64,
    /// Smallest radius a draw may produce.
    pub min_radius: f64,
    /// Smallest length a draw may produce.
    pub min_length: f64,
    /// Optional seed for reproducible sampling.
    pub seed: Option<u64>,
}

impl Default for PerturbConfig {
    fn default() -> Self {
        Self {
            radius_delta: 0.5,
            length_delta: 0.5,
            joint_delta: 0.5,
            anchor_delta: 0.5,
            min_radius: 0.1,
            min_length: 0.1,
            seed: None,
        }
    }
}

impl PerturbConfig {
    /// Set a random seed for reproducibility.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the jitter half-ranges for radii and lengths.
    #[must_use]
    pub const fn extent_deltas(mut self, radius: f64, length: f64) -> Self {
        self.radius_delta = radius;
        self.length_delta = length;
        self
    }

    /// Set the jitter half-ranges for joint and anchor coordinates.
    #[must_use]
    pub const fn position_deltas(mut self, joint: f64, anchor: f64) -> Self {
        self.joint_delta = joint;
        self.anchor_delta = anchor;
        self
    }

    /// Set the radius and length floors.
    #[must_use]
    pub const fn floors(mut self, min_radius: f64, min_length: f64) -> Self {
        self.min_radius = min_radius;
        self.min_length = min_length;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        for (value, name) in [
            (self.radius_delta, "radius_delta"),
            (self.length_delta, "length_delta"),
            (self.joint_delta, "joint_delta"),
            (self.anchor_delta, "anchor_delta"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(crate::LinkageError::invalid_config(format!(
                    "{name} must be non-negative and finite"
                )));
            }
        }
        if !self.min_radius.is_finite() || self.min_radius <= 0.0 {
            return Err(crate::LinkageError::invalid_config(
                "min_radius must be positive and finite",
            ));
        }
        if !self.min_length.is_finite() || self.min_length <= 0.0 {
            return Err(crate::LinkageError::invalid_config(
                "min_length must be positive and finite",
            ));
        }
        Ok(())
    }
}

/// Policy for the design-space search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExplorerConfig {
    /// Stop once the database holds this many accepted mechanisms.
    pub target_size: usize,
    /// Neighbor candidates sampled from each frontier origin.
    pub neighbors_per_expansion: usize,
    /// Dissimilarity threshold: a candidate curve is accepted only if it
    /// scores at least this far from every curve already accepted.
    pub gamma: f64,
    /// Attempt cap for seeding one fresh origin mechanism.
    pub max_origin_attempts: usize,
    /// Attempt cap for producing one acceptable neighbor candidate.
    pub max_candidate_attempts: usize,
    /// Equilibrium solve settings used when building candidates.
    pub solve: SolveConfig,
    /// Trace settings used for candidate curves.
    pub trace: TraceConfig,
    /// Perturbation settings for neighbor sampling.
    pub perturb: PerturbConfig,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            target_size: 3,
            neighbors_per_expansion: 2,
            gamma: 1.0,
            max_origin_attempts: 64,
            max_candidate_attempts: 16,
            solve: SolveConfig::default(),
            trace: TraceConfig::default(),
            perturb: PerturbConfig::default(),
        }
    }
}

impl ExplorerConfig {
    /// Set the target database size.
    #[must_use]
    pub const fn target_size(mut self, size: usize) -> Self {
        self.target_size = size;
        self
    }

    /// Set the neighbors sampled per expansion.
    #[must_use]
    pub const fn neighbors_per_expansion(mut self, neighbors: usize) -> Self {
        self.neighbors_per_expansion = neighbors;
        self
    }

    /// Set the dissimilarity threshold.
    #[must_use]
    pub const fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the attempt caps for origin seeding and neighbor sampling.
    #[must_use]
    pub const fn attempt_caps(mut self, origin: usize, candidate: usize) -> Self {
        self.max_origin_attempts = origin;
        self.max_candidate_attempts = candidate;
        self
    }

    /// Set the solve settings.
    #[must_use]
    pub fn solve(mut self, solve: SolveConfig) -> Self {
        self.solve = solve;
        self
    }

    /// Set the trace settings.
    #[must_use]
    pub const fn trace(mut self, trace: TraceConfig) -> Self {
        self.trace = trace;
        self
    }

    /// Set the perturbation settings.
    #[must_use]
    pub fn perturb(mut self, perturb: PerturbConfig) -> Self {
        self.perturb = perturb;
        self
    }

    /// Validate the configuration, including the embedded settings.
    pub fn validate(&self) -> crate::Result<()> {
        if self.target_size == 0 {
            return Err(crate::LinkageError::invalid_config(
                "target_size must be at least 1",
            ));
        }
        if self.neighbors_per_expansion == 0 {
            return Err(crate::LinkageError::invalid_config(
                "neighbors_per_expansion must be at least 1",
            ));
        }
        if !self.gamma.is_finite() {
            return Err(crate::LinkageError::invalid_config("gamma must be finite"));
        }
        if self.max_origin_attempts == 0 || self.max_candidate_attempts == 0 {
            return Err(crate::LinkageError::invalid_config(
                "attempt caps must be at least 1",
            ));
        }
        self.solve.validate()?;
        self.trace.validate()?;
        self.perturb.validate()?;
        Ok(())
    }
}
