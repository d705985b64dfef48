//! Rigid part variants and the actuation input.

use nalgebra::Point3;

use crate::PartPose;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rigid part of a mechanism.
///
/// The set of part kinds is closed: residual and outline logic pattern
/// matches on the variant rather than probing capabilities at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Part {
    /// Circular gear of the given radius.
    Gear {
        /// Gear radius.
        radius: f64,
    },
    /// Rigid link (bar) extending along its local X axis.
    Link {
        /// Link length from root to outer tip.
        length: f64,
    },
}

impl Part {
    /// Create a gear part.
    #[must_use]
    pub const fn gear(radius: f64) -> Self {
        Self::Gear { radius }
    }

    /// Create a link part.
    #[must_use]
    pub const fn link(length: f64) -> Self {
        Self::Link { length }
    }

    /// The part's kind tag.
    #[must_use]
    pub const fn kind(&self) -> PartKind {
        match self {
            Self::Gear { .. } => PartKind::Gear,
            Self::Link { .. } => PartKind::Link,
        }
    }

    /// The part's scalar extent: radius for a gear, length for a link.
    #[must_use]
    pub const fn extent(&self) -> f64 {
        match self {
            Self::Gear { radius } => *radius,
            Self::Link { length } => *length,
        }
    }

    /// Drawing primitive for this part at the given pose.
    ///
    /// A link renders as the segment from its root to its outer tip; a
    /// gear renders as its circle plus a heading point on the rim showing
    /// the current spin. Consumed by plotting code outside this workspace.
    #[must_use]
    pub fn outline(&self, pose: &PartPose) -> Outline {
        match self {
            Self::Gear { radius } => Outline::Circle {
                center: pose.position,
                radius: *radius,
                heading: pose.transform_point(&Point3::new(*radius, 0.0, 0.0)),
            },
            Self::Link { length } => Outline::Segment {
                start: pose.position,
                end: pose.transform_point(&Point3::new(*length, 0.0, 0.0)),
            },
        }
    }
}

/// Kind tag for a part, used in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PartKind {
    /// A circular gear.
    Gear,
    /// A rigid link.
    Link,
}

impl std::fmt::Display for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gear => write!(f, "gear"),
            Self::Link => write!(f, "link"),
        }
    }
}

/// Drawing primitive for a posed part.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Outline {
    /// A line segment (links).
    Segment {
        /// World position of the link root.
        start: Point3<f64>,
        /// World position of the link tip.
        end: Point3<f64>,
    },
    /// A circle with a spin heading (gears).
    Circle {
        /// World position of the gear center.
        center: Point3<f64>,
        /// Gear radius.
        radius: f64,
        /// World position of the rim point on the gear's local X axis.
        heading: Point3<f64>,
    },
}

/// The driving phase input of a mechanism.
///
/// The actuator is not a part: it has no pose and no extent, and its
/// phase is never a free parameter of the solve. The driver advances the
/// phase; phase-sync constraints read it as their target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Actuator {
    phase: f64,
}

impl Actuator {
    /// Create an actuator at the given phase (radians).
    #[must_use]
    pub const fn new(phase: f64) -> Self {
        Self { phase }
    }

    /// Current phase in radians. Accumulates across revolutions.
    #[must_use]
    pub const fn phase(&self) -> f64 {
        self.phase
    }

    /// Set the phase directly.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = phase;
    }

    /// Advance the phase by `delta` radians.
    pub fn turn(&mut self, delta: f64) {
        self.phase += delta;
    }
}
