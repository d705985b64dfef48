//! Core types for planar linkage mechanisms.
//!
//! This crate provides the foundational vocabulary for the linkage
//! workspace:
//!
//! - [`PartId`] / [`MechanismId`] - Newtype identifiers
//! - [`PartPose`] - Position and Euler alignment of a rigid part
//! - [`Part`] / [`Actuator`] - The closed set of rigid parts, plus the
//!   driving phase input
//! - [`FreeParam`] / [`Dof`] - Names for scalar pose degrees of freedom
//! - [`SolveConfig`] / [`TraceConfig`] / [`PerturbConfig`] /
//!   [`ExplorerConfig`] - Tuning knobs for solving, tracing, and search
//! - [`LinkageError`] - The shared error type
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They know nothing about constraint
//! residuals, equilibrium solving, or design-space search. They're the
//! common language between:
//!
//! - The constraint assembly and its solvers (linkage-assembly)
//! - The design-space explorer and curve database (linkage-search)
//! - Description and plotting code outside this workspace
//!
//! # Coordinate System
//!
//! - The mechanism plane is XY; Z is out of plane
//! - Alignment is extrinsic Euler angles (roll, pitch, yaw), radians
//! - Yaw is the in-plane spin driven by phase couplings
//! - A full actuation revolution is `TAU`
//!
//! # Example
//!
//! ```
//! use linkage_types::{Actuator, Part, PartPose};
//! use nalgebra::Point3;
//!
//! let gear = Part::gear(2.0);
//! let pose = PartPose::from_position(Point3::new(0.0, 0.0, 0.0));
//! assert_eq!(gear.extent(), 2.0);
//!
//! let mut actuator = Actuator::default();
//! actuator.turn(std::f64::consts::TAU / 360.0);
//! assert!(actuator.phase() > 0.0);
//! ```

#![doc(html_root_url = "https://docs.rs/linkage-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for type definitions
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
    clippy::cast_precision_loss,   // usize to f64 is fine for counts
    clippy::missing_errors_doc     // Error docs added where non-obvious
)]

mod config;
mod error;
mod id;
mod param;
mod part;
mod pose;

pub use config::{ExplorerConfig, PerturbConfig, SolveConfig, TraceConfig};
pub use error::LinkageError;
pub use id::{MechanismId, PartId};
pub use param::{Dof, FreeParam};
pub use part::{Actuator, Outline, Part, PartKind};
pub use pose::PartPose;

/// Result type for linkage operations.
pub type Result<T> = std::result::Result<T, LinkageError>;
