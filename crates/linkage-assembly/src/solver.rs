//! Equilibrium solver strategies.
//!
//! Two interchangeable strategies minimize the aggregated residual
//! objective of an assembly:
//!
//! - [`NelderMead`] - the default: a derivative-free downhill simplex
//!   seeded at the current state, with restarts around the best point
//! - [`ResidualDescent`] - the alternate: a normalized descent step
//!   driven by the aggregated analytic gradient
//!
//! The two strategies report success differently. The simplex strategy
//! succeeds on its own convergence signal (the simplex collapsing), and
//! the declared tolerance only gates whether a restart is worth
//! attempting. The descent strategy treats the tolerance as
//! authoritative and succeeds exactly when the objective drops below it.

use linkage_types::SolveConfig;
use nalgebra::DVector;

/// The minimization problem a solver strategy sees.
pub trait EquilibriumProblem {
    /// Scalar residual objective at `state`. Zero means every constraint
    /// is satisfied.
    fn objective(&self, state: &DVector<f64>) -> f64;

    /// Write the aggregated analytic gradient at `state` into `grad`.
    fn gradient_into(&self, state: &DVector<f64>, grad: &mut DVector<f64>);
}

/// Result of one minimization run.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Whether the strategy's convergence signal fired.
    pub converged: bool,
    /// The best state found.
    pub state: DVector<f64>,
    /// Objective value at the best state.
    pub objective: f64,
    /// Iterations spent across all attempts.
    pub iterations: usize,
}

/// A strategy for minimizing an assembly's residual objective.
pub trait EquilibriumSolver {
    /// Minimize `problem` starting from `seed`.
    fn minimize(&self, problem: &dyn EquilibriumProblem, seed: DVector<f64>) -> SolveOutcome;
}

/// Derivative-free downhill simplex minimizer.
///
/// Standard Nelder-Mead moves (reflection, expansion, contraction,
/// shrink) over an initial simplex of edge `simplex_step` around the
/// seed. When the simplex collapses (vertex spread and objective spread
/// both below thresholds derived from the tolerance) short of the
/// declared tolerance, it is rebuilt around the best point with half the
/// step, up to `restarts` times.
#[derive(Debug, Clone)]
pub struct NelderMead {
    config: SolveConfig,
}

impl NelderMead {
    /// Create a simplex solver with the given settings.
    #[must_use]
    pub const fn new(config: SolveConfig) -> Self {
        Self { config }
    }

    /// Run one simplex descent. Returns the best vertex, its objective,
    /// iterations spent, and whether the simplex collapsed before the
    /// iteration cap.
    fn run_simplex(
        &self,
        problem: &dyn EquilibriumProblem,
        seed: &DVector<f64>,
        step: f64,
    ) -> (DVector<f64>, f64, usize, bool) {
        let dim = seed.len();
        let xatol = self.config.tolerance * 0.1;
        let fatol = self.config.tolerance * 0.1;

        let mut simplex: Vec<(DVector<f64>, f64)> = Vec::with_capacity(dim + 1);
        simplex.push((seed.clone(), problem.objective(seed)));
        for i in 0..dim {
            let mut vertex = seed.clone();
            vertex[i] += step;
            let value = problem.objective(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        let mut collapsed = false;
        while iterations < self.config.max_iterations {
            iterations += 1;
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let spread_f = simplex[dim].1 - simplex[0].1;
            let spread_x = simplex
                .iter()
                .skip(1)
                .map(|(v, _)| (v - &simplex[0].0).amax())
                .fold(0.0_f64, f64::max);
            if spread_f <= fatol && spread_x <= xatol {
                collapsed = true;
                break;
            }

            let mut centroid = DVector::zeros(dim);
            for (vertex, _) in &simplex[..dim] {
                centroid += vertex;
            }
            centroid /= dim as f64;

            let worst = simplex[dim].0.clone();
            let f_best = simplex[0].1;
            let f_second = simplex[dim - 1].1;
            let f_worst = simplex[dim].1;

            let reflected = &centroid + (&centroid - &worst);
            let f_reflected = problem.objective(&reflected);

            if f_reflected < f_best {
                let expanded = &centroid + (&reflected - &centroid) * 2.0;
                let f_expanded = problem.objective(&expanded);
                simplex[dim] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
            } else if f_reflected < f_second {
                simplex[dim] = (reflected, f_reflected);
            } else {
                let (candidate, f_candidate) = if f_reflected < f_worst {
                    let outside = &centroid + (&reflected - &centroid) * 0.5;
                    let value = problem.objective(&outside);
                    (outside, value)
                } else {
                    let inside = &centroid + (&worst - &centroid) * 0.5;
                    let value = problem.objective(&inside);
                    (inside, value)
                };
                if f_candidate < f_worst.min(f_reflected) {
                    simplex[dim] = (candidate, f_candidate);
                } else {
                    let best = simplex[0].0.clone();
                    for (vertex, value) in simplex.iter_mut().skip(1) {
                        *vertex = &best + (&*vertex - &best) * 0.5;
                        *value = problem.objective(vertex);
                    }
                }
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (state, objective) = simplex.swap_remove(0);
        (state, objective, iterations, collapsed)
    }
}

impl EquilibriumSolver for NelderMead {
    fn minimize(&self, problem: &dyn EquilibriumProblem, seed: DVector<f64>) -> SolveOutcome {
        if seed.is_empty() {
            let objective = problem.objective(&seed);
            return SolveOutcome {
                converged: true,
                state: seed,
                objective,
                iterations: 0,
            };
        }

        let mut step = self.config.simplex_step;
        let mut best = seed;
        let mut best_f = f64::INFINITY;
        let mut iterations = 0;
        let mut converged = false;

        for _ in 0..=self.config.restarts {
            let (state, objective, spent, collapsed) = self.run_simplex(problem, &best, step);
            iterations += spent;
            best = state;
            best_f = objective;
            converged = collapsed;
            if !collapsed || best_f <= self.config.tolerance {
                break;
            }
            step *= 0.5;
        }

        SolveOutcome {
            converged,
            state: best,
            objective: best_f,
            iterations,
        }
    }
}

/// Gradient-driven alternate strategy.
///
/// Takes normalized root-finding steps `x -= grad * f / |grad|^2` using
/// the aggregated analytic gradient, until the objective drops below the
/// tolerance (success) or the iteration cap or a flat gradient stops it
/// (failure).
#[derive(Debug, Clone)]
pub struct ResidualDescent {
    config: SolveConfig,
}

impl ResidualDescent {
    /// Create a descent solver with the given settings.
    #[must_use]
    pub const fn new(config: SolveConfig) -> Self {
        Self { config }
    }
}

impl EquilibriumSolver for ResidualDescent {
    fn minimize(&self, problem: &dyn EquilibriumProblem, seed: DVector<f64>) -> SolveOutcome {
        let mut state = seed;
        let mut grad = DVector::zeros(state.len());
        let mut objective = problem.objective(&state);
        let mut iterations = 0;

        while iterations < self.config.max_iterations && objective > self.config.tolerance {
            iterations += 1;
            problem.gradient_into(&state, &mut grad);
            let norm_sq = grad.norm_squared();
            if norm_sq <= f64::EPSILON {
                // Flat gradient short of the tolerance: no direction left.
                break;
            }
            state -= &grad * (objective / norm_sq);
            objective = problem.objective(&state);
        }

        SolveOutcome {
            converged: objective <= self.config.tolerance,
            state,
            objective,
            iterations,
        }
    }
}
