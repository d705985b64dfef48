//! Error types for assembly construction, solving, and tracing.

use linkage_types::LinkageError;
use thiserror::Error;

/// Errors from constraint assembly and equilibrium solving.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssemblyError {
    /// The equilibrium solve did not converge.
    ///
    /// Fatal when raised during mechanism construction; retryable when
    /// raised by a re-solve after advancing the actuator.
    #[error("constraints unsatisfiable: objective {objective:.6} after {iterations} iterations")]
    ConstraintUnsatisfiable {
        /// Best objective value reached before giving up.
        objective: f64,
        /// Iterations spent.
        iterations: usize,
    },

    /// A link is shorter than the offset along it to its coupler joint.
    #[error("link {link} too short: length {length} < coupler offset {offset}")]
    LinkShorterThanCoupler {
        /// Which link (1 or 2).
        link: usize,
        /// The link's length.
        length: f64,
        /// The coupler attachment offset along the link.
        offset: f64,
    },

    /// A joint attachment point lies outside its gear's radius.
    #[error("joint on gear {gear} outside radius: |joint| {distance:.4} > radius {radius}")]
    JointOutsideGear {
        /// Which gear (1 or 2).
        gear: usize,
        /// The gear's radius.
        radius: f64,
        /// Distance from the gear center to the attachment point.
        distance: f64,
    },

    /// The links cannot span the gear separation (mechanism cannot close).
    #[error("links too short: worst-case separation {separation:.4} >= reach {reach:.4}")]
    LinksTooShort {
        /// Anchor distance plus both gear radii.
        separation: f64,
        /// Combined reachable length of the two links.
        reach: f64,
    },

    /// The links overextend the gear separation (mechanism jams).
    #[error("links too long: available span {available:.4} < link2 length {required:.4}")]
    LinksTooLong {
        /// Anchor distance minus gear1 radius plus link1's coupler offset.
        available: f64,
        /// Link2's length.
        required: f64,
    },

    /// A step within a trace revolution failed to solve.
    #[error("trace aborted at step {step} (phase {phase:.4} rad, objective {objective:.6})")]
    TraceAborted {
        /// Step at which the solve failed, counting from 1.
        step: usize,
        /// Actuator phase at the failed step, radians.
        phase: f64,
        /// Best objective value the failed solve reached.
        objective: f64,
    },

    /// Error from the core data model.
    #[error(transparent)]
    Types(#[from] LinkageError),
}

impl AssemblyError {
    /// True for any geometric-admissibility rejection from the validator.
    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            Self::LinkShorterThanCoupler { .. }
                | Self::JointOutsideGear { .. }
                | Self::LinksTooShort { .. }
                | Self::LinksTooLong { .. }
        )
    }

    /// True if the equilibrium solve failed to converge.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Self::ConstraintUnsatisfiable { .. })
    }

    /// True if a trace was aborted mid-revolution.
    #[must_use]
    pub fn is_trace_aborted(&self) -> bool {
        matches!(self, Self::TraceAborted { .. })
    }
}
