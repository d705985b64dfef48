//! Names for the scalar degrees of freedom of a part's pose.

use crate::{PartId, PartPose};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One scalar degree of freedom of a part's pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dof {
    /// Position along world X.
    X,
    /// Position along world Y.
    Y,
    /// Position along world Z.
    Z,
    /// Roll angle about X.
    Roll,
    /// Pitch angle about Y.
    Pitch,
    /// Yaw angle about Z (in-plane spin).
    Yaw,
}

impl Dof {
    /// All six pose degrees of freedom, in canonical order.
    pub const POSE: [Self; 6] = [
        Self::X,
        Self::Y,
        Self::Z,
        Self::Roll,
        Self::Pitch,
        Self::Yaw,
    ];

    /// Read this degree of freedom out of a pose.
    #[must_use]
    pub fn read(self, pose: &PartPose) -> f64 {
        match self {
            Self::X => pose.position.x,
            Self::Y => pose.position.y,
            Self::Z => pose.position.z,
            Self::Roll => pose.alignment.x,
            Self::Pitch => pose.alignment.y,
            Self::Yaw => pose.alignment.z,
        }
    }

    /// Write this degree of freedom into a pose.
    pub fn write(self, pose: &mut PartPose, value: f64) {
        match self {
            Self::X => pose.position.x = value,
            Self::Y => pose.position.y = value,
            Self::Z => pose.position.z = value,
            Self::Roll => pose.alignment.x = value,
            Self::Pitch => pose.alignment.y = value,
            Self::Yaw => pose.alignment.z = value,
        }
    }
}

impl std::fmt::Display for Dof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Roll => "roll",
            Self::Pitch => "pitch",
            Self::Yaw => "yaw",
        };
        write!(f, "{name}")
    }
}

/// A free parameter: one degree of freedom of one part.
///
/// Every free parameter referenced by any constraint of a mechanism
/// occupies exactly one slot of that mechanism's flat state vector; the
/// parameter index owns the deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FreeParam {
    /// The part this degree of freedom belongs to.
    pub part: PartId,
    /// Which scalar of the part's pose.
    pub dof: Dof,
}

impl FreeParam {
    /// Create a free parameter name.
    #[must_use]
    pub const fn new(part: PartId, dof: Dof) -> Self {
        Self { part, dof }
    }
}

impl std::fmt::Display for FreeParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.part, self.dof)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_read_write_roundtrip() {
        let mut pose = PartPose::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.1, 0.2, 0.3));
        for (i, dof) in Dof::POSE.iter().enumerate() {
            let value = 10.0 + i as f64;
            dof.write(&mut pose, value);
            assert_relative_eq!(dof.read(&pose), value);
        }
        assert_relative_eq!(pose.position.x, 10.0);
        assert_relative_eq!(pose.alignment.z, 15.0);
    }

    #[test]
    fn test_display_names() {
        let p = FreeParam::new(PartId::new(2), Dof::Yaw);
        assert_eq!(p.to_string(), "Part(2).yaw");
    }
}
