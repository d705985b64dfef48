//! Pose of a rigid part: position plus Euler alignment.

use nalgebra::{Point3, Rotation3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position and orientation of a rigid part.
///
/// The mechanism plane is XY. Orientation is stored as extrinsic Euler
/// angles in radians: roll about X, pitch about Y, yaw about Z. Yaw is
/// the in-plane spin that phase couplings drive; roll and pitch level a
/// part against its mounting plane and stay zero for planar mechanisms.
///
/// The angles are kept separate rather than folded into a quaternion so
/// that constraints can pin roll and pitch while leaving yaw free.
///
/// # Example
///
/// ```
/// use linkage_types::PartPose;
/// use nalgebra::Point3;
/// use std::f64::consts::FRAC_PI_2;
///
/// let mut pose = PartPose::from_position(Point3::new(1.0, 2.0, 0.0));
/// pose.alignment.z = FRAC_PI_2;
///
/// // A local point one unit down the part's X axis lands one unit up
/// // the world Y axis after the quarter-turn spin.
/// let world = pose.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((world.x - 1.0).abs() < 1e-12);
/// assert!((world.y - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartPose {
    /// Position in world coordinates.
    pub position: Point3<f64>,
    /// Euler alignment in radians: (roll, pitch, yaw).
    pub alignment: Vector3<f64>,
}

impl Default for PartPose {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartPose {
    /// Create an identity pose (origin, zero alignment).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            alignment: Vector3::zeros(),
        }
    }

    /// Create a pose from position only (zero alignment).
    #[must_use]
    pub fn from_position(position: Point3<f64>) -> Self {
        Self {
            position,
            alignment: Vector3::zeros(),
        }
    }

    /// Create a pose from position and alignment.
    #[must_use]
    pub const fn new(position: Point3<f64>, alignment: Vector3<f64>) -> Self {
        Self {
            position,
            alignment,
        }
    }

    /// Roll angle (about X) in radians.
    #[must_use]
    pub fn roll(&self) -> f64 {
        self.alignment.x
    }

    /// Pitch angle (about Y) in radians.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.alignment.y
    }

    /// Yaw angle (about Z, the in-plane spin) in radians.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        self.alignment.z
    }

    /// Rotation matrix for this alignment (Rz(yaw) * Ry(pitch) * Rx(roll)).
    #[must_use]
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_euler_angles(self.alignment.x, self.alignment.y, self.alignment.z)
    }

    /// Transform a point from part-local to world coordinates.
    #[must_use]
    pub fn transform_point(&self, local: &Point3<f64>) -> Point3<f64> {
        self.position + self.rotation() * local.coords
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform() {
        let pose = PartPose::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(pose.transform_point(&p), p, epsilon = 1e-12);
    }

    #[test]
    fn test_translation_only() {
        let pose = PartPose::from_position(Point3::new(4.0, -1.0, 0.5));
        let world = pose.transform_point(&Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(world, Point3::new(5.0, 0.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_yaw_quarter_turn() {
        let pose = PartPose::new(Point3::origin(), Vector3::new(0.0, 0.0, FRAC_PI_2));
        let world = pose.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(world, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_pitch_moves_x_axis_down() {
        let pose = PartPose::new(Point3::origin(), Vector3::new(0.0, FRAC_PI_2, 0.0));
        let world = pose.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(world, Point3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_accessors_match_alignment() {
        let pose = PartPose::new(Point3::origin(), Vector3::new(0.1, 0.2, 0.3));
        assert_relative_eq!(pose.roll(), 0.1);
        assert_relative_eq!(pose.pitch(), 0.2);
        assert_relative_eq!(pose.yaw(), 0.3);
    }
}
