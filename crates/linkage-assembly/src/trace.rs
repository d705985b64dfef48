//! Tracing the marked point through a full actuator revolution.

use linkage_types::{LinkageError, TraceConfig};
use nalgebra::Point3;
use std::f64::consts::TAU;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Assembly, AssemblyError, Result};

/// The closed path a marked point sweeps over one actuator revolution.
///
/// Holds one recorded point per trace step, in step order. The point at
/// the starting phase is not duplicated at the end.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionCurve {
    points: Vec<Point3<f64>>,
}

impl MotionCurve {
    /// Wrap an already-recorded point sequence.
    #[must_use]
    pub fn from_points(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Number of recorded points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The recorded points in step order.
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Iterate over the recorded points.
    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.points.iter()
    }

    /// Polyline length of the open curve (consecutive segments only).
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).norm())
            .sum()
    }
}

/// Trace the marked point of `assembly` through one full revolution.
///
/// Advances the actuator by an equal fraction of a revolution,
/// re-solves, and records the marked point, once per configured step.
/// The returned curve holds exactly `steps_per_revolution` points.
///
/// A solve failure at any step aborts the whole trace with
/// [`AssemblyError::TraceAborted`]. The assembly keeps the equilibrium
/// poses of the last successful step; the actuator phase remains where
/// the failing step put it.
pub fn trace(assembly: &mut Assembly, config: &TraceConfig) -> Result<MotionCurve> {
    config.validate()?;
    if assembly.marked_point().is_none() {
        return Err(LinkageError::invalid_config("assembly has no marked point to trace").into());
    }

    let steps = config.steps_per_revolution;
    let delta = TAU / steps as f64;
    let mut points = Vec::with_capacity(steps);

    for step in 1..=steps {
        assembly.turn(delta);
        match assembly.solve() {
            Ok(_) => {}
            Err(AssemblyError::ConstraintUnsatisfiable { objective, .. }) => {
                return Err(AssemblyError::TraceAborted {
                    step,
                    phase: assembly.actuator().phase(),
                    objective,
                });
            }
            Err(other) => return Err(other),
        }
        let marked = assembly
            .marked_point()
            .ok_or_else(|| LinkageError::invalid_config("marked point lost during trace"))?;
        points.push(marked);
    }

    debug!(points = points.len(), "Trace complete");
    Ok(MotionCurve::from_points(points))
}
