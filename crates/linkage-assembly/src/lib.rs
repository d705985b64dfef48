//! Constraint assemblies and equilibrium solving for planar linkages.
//!
//! An [`Assembly`] mounts rigid parts and wires them together with
//! [`Connection`] constraints: pin joints, fixed anchors, and phase
//! couplings driven by the actuator. Each constraint contributes signed
//! residual terms; solving minimizes the summed term magnitudes over
//! the free pose parameters and commits the solved poses atomically.
//! A failed solve leaves the previous equilibrium untouched.
//!
//! The centerpiece mechanism is the gear-driven crank
//! ([`CrankMechanism`]): two phase-locked gears closing a four-bar loop
//! through a pair of links, with a marked point on the first link whose
//! one-revolution path [`trace`] records as a [`MotionCurve`].
//!
//! # Solvers
//!
//! Minimization is pluggable through [`EquilibriumSolver`]:
//!
//! - [`NelderMead`] - the default derivative-free downhill simplex;
//!   success is its own collapse signal, not a residual threshold
//! - [`ResidualDescent`] - a gradient-driven alternate that treats the
//!   configured tolerance as authoritative
//!
//! # Example
//!
//! ```
//! use linkage_assembly::{CrankConfig, CrankMechanism};
//! use linkage_types::{SolveConfig, TraceConfig};
//!
//! let mut mech = CrankMechanism::build(CrankConfig::default(), SolveConfig::default())?;
//! let curve = mech.trace(&TraceConfig::default().steps(24))?;
//! assert_eq!(curve.len(), 24);
//! # Ok::<(), linkage_assembly::AssemblyError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/linkage-assembly/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for numeric code
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
    clippy::cast_precision_loss,   // usize to f64 is fine for counts
    clippy::missing_errors_doc     // Error docs added where non-obvious
)]

mod assembly;
mod connection;
mod crank;
mod error;
mod feasibility;
mod index;
mod solver;
mod trace;

pub use assembly::{AssembledPart, Assembly, PartSnapshot, SolveReport};
pub use connection::{Connection, PhaseRef, ResidualContext};
pub use crank::{CrankConfig, CrankMechanism};
pub use error::AssemblyError;
pub use feasibility::validate_crank;
pub use index::ParamIndex;
pub use solver::{EquilibriumProblem, EquilibriumSolver, NelderMead, ResidualDescent, SolveOutcome};
pub use trace::{trace, MotionCurve};

/// Result type for assembly operations.
pub type Result<T> = std::result::Result<T, AssemblyError>;
