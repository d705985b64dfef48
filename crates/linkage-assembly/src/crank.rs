//! The gear-driven crank: two meshed gears closing a four-bar loop.
//!
//! [`CrankConfig`] holds the twelve numbers that define one crank;
//! [`CrankMechanism::build`] turns it into a wired assembly and runs the
//! construction solve, so a mechanism you hold in hand is always in
//! equilibrium.

use linkage_types::{LinkageError, Part, PartId, PartPose, SolveConfig, TraceConfig};
use nalgebra::{Point3, Vector2, Vector3};
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Assembly, Connection, MotionCurve, Result, SolveReport};

/// Dimensions and mounting geometry of one crank mechanism.
///
/// Both gears spin about their anchors, coupled one-to-one to the
/// actuator. Each link roots at a joint point on its gear; the two
/// links pin together at their coupler points, closing the loop. All
/// attachment points are in part-local coordinates.
///
/// The default value is the reference crank: a radius-2 and a radius-1
/// gear six units apart, bridged by links of length 8 and 6.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrankConfig {
    /// Radius of the driving gear.
    pub gear1_radius: f64,
    /// Radius of the follower gear.
    pub gear2_radius: f64,
    /// Length of the link rooted on gear 1. Its free end past the
    /// coupler carries the marked point.
    pub link1_length: f64,
    /// Length of the link rooted on gear 2.
    pub link2_length: f64,
    /// World position gear 1 is anchored at.
    pub gear1_anchor: Point3<f64>,
    /// World position gear 2 is anchored at.
    pub gear2_anchor: Point3<f64>,
    /// Anchored roll and pitch of gear 1 (x, y components; z unused).
    pub gear1_orientation: Vector3<f64>,
    /// Anchored roll and pitch of gear 2 (x, y components; z unused).
    pub gear2_orientation: Vector3<f64>,
    /// Link 1 attachment point, in gear 1 coordinates.
    pub gear1_joint: Point3<f64>,
    /// Link 2 attachment point, in gear 2 coordinates.
    pub gear2_joint: Point3<f64>,
    /// Coupler joint, in link 1 coordinates.
    pub link1_coupler: Point3<f64>,
    /// Coupler joint, in link 2 coordinates.
    pub link2_coupler: Point3<f64>,
}

impl Default for CrankConfig {
    fn default() -> Self {
        Self {
            gear1_radius: 2.0,
            gear2_radius: 1.0,
            link1_length: 8.0,
            link2_length: 6.0,
            gear1_anchor: Point3::new(0.0, 0.0, 0.0),
            gear2_anchor: Point3::new(6.0, 0.0, 0.0),
            gear1_orientation: Vector3::zeros(),
            gear2_orientation: Vector3::zeros(),
            gear1_joint: Point3::new(1.0, 1.0, 0.0),
            gear2_joint: Point3::new(-0.5, -0.5, 0.0),
            link1_coupler: Point3::new(4.0, 0.0, 0.0),
            link2_coupler: Point3::new(6.0, 0.0, 0.0),
        }
    }
}

impl CrankConfig {
    /// Validate that every dimension is finite and every extent positive.
    ///
    /// Geometric admissibility is a separate concern handled by
    /// [`crate::validate_crank`].
    pub fn validate(&self) -> linkage_types::Result<()> {
        let extents = [
            (self.gear1_radius, "gear1_radius"),
            (self.gear2_radius, "gear2_radius"),
            (self.link1_length, "link1_length"),
            (self.link2_length, "link2_length"),
        ];
        for (value, name) in extents {
            if !value.is_finite() {
                return Err(LinkageError::non_finite(name));
            }
            if value <= 0.0 {
                return Err(LinkageError::invalid_config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let vectors = [
            (self.gear1_anchor.coords, "gear1_anchor"),
            (self.gear2_anchor.coords, "gear2_anchor"),
            (self.gear1_orientation, "gear1_orientation"),
            (self.gear2_orientation, "gear2_orientation"),
            (self.gear1_joint.coords, "gear1_joint"),
            (self.gear2_joint.coords, "gear2_joint"),
            (self.link1_coupler.coords, "link1_coupler"),
            (self.link2_coupler.coords, "link2_coupler"),
        ];
        for (vector, name) in vectors {
            if !vector.iter().all(|c| c.is_finite()) {
                return Err(LinkageError::non_finite(name));
            }
        }
        Ok(())
    }
}

/// A built crank mechanism, solved into equilibrium.
///
/// # Example
///
/// ```
/// use linkage_assembly::{CrankConfig, CrankMechanism};
/// use linkage_types::SolveConfig;
///
/// let mut mech = CrankMechanism::build(CrankConfig::default(), SolveConfig::default())?;
/// mech.turn_and_solve(0.05)?;
/// assert!(mech.marked_point().is_some());
/// # Ok::<(), linkage_assembly::AssemblyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CrankMechanism {
    assembly: Assembly,
    config: CrankConfig,
    gear1: PartId,
    gear2: PartId,
    link1: PartId,
    link2: PartId,
}

impl CrankMechanism {
    /// Assemble a crank from its configuration and solve it into its
    /// initial equilibrium.
    ///
    /// Fails on a malformed or geometrically infeasible configuration,
    /// or when the construction solve does not converge. A `Ok` value
    /// is therefore always a closed, solved mechanism.
    pub fn build(config: CrankConfig, solve_config: SolveConfig) -> Result<Self> {
        config.validate()?;
        crate::validate_crank(&config)?;

        let mut assembly = Assembly::new(solve_config)?;

        let gear1_pose = PartPose::new(
            config.gear1_anchor,
            Vector3::new(config.gear1_orientation.x, config.gear1_orientation.y, 0.0),
        );
        let gear2_pose = PartPose::new(
            config.gear2_anchor,
            Vector3::new(config.gear2_orientation.x, config.gear2_orientation.y, 0.0),
        );
        let root1 = gear1_pose.transform_point(&config.gear1_joint);
        let root2 = gear2_pose.transform_point(&config.gear2_joint);
        let (yaw1, yaw2) = link_yaw_seeds(&config, &root1, &root2);

        let gear1 = assembly.add_part(Part::gear(config.gear1_radius), gear1_pose);
        let gear2 = assembly.add_part(Part::gear(config.gear2_radius), gear2_pose);
        let link1 = assembly.add_part(
            Part::link(config.link1_length),
            PartPose::new(root1, Vector3::new(0.0, 0.0, yaw1)),
        );
        let link2 = assembly.add_part(
            Part::link(config.link2_length),
            PartPose::new(root2, Vector3::new(0.0, 0.0, yaw2)),
        );

        assembly.connect(Connection::phase_to_actuator(gear1))?;
        assembly.connect(Connection::phase_to_part(gear2, gear1, 1.0))?;
        assembly.connect(Connection::fixed(
            gear1,
            config.gear1_anchor,
            config.gear1_orientation,
        ))?;
        assembly.connect(Connection::fixed(
            gear2,
            config.gear2_anchor,
            config.gear2_orientation,
        ))?;
        assembly.connect(Connection::pin(
            gear1,
            link1,
            config.gear1_joint,
            Point3::origin(),
        ))?;
        assembly.connect(Connection::pin(
            gear2,
            link2,
            config.gear2_joint,
            Point3::origin(),
        ))?;
        assembly.connect(Connection::pin(
            link1,
            link2,
            config.link1_coupler,
            config.link2_coupler,
        ))?;
        assembly.set_marked_point(link1, Point3::new(config.link1_length, 0.0, 0.0))?;

        let report = assembly.solve()?;
        info!(
            objective = report.objective,
            iterations = report.iterations,
            "Crank mechanism assembled"
        );

        Ok(Self {
            assembly,
            config,
            gear1,
            gear2,
            link1,
            link2,
        })
    }

    /// Advance the actuator and re-solve the mechanism.
    pub fn turn_and_solve(&mut self, delta: f64) -> Result<SolveReport> {
        self.assembly.turn(delta);
        self.assembly.solve()
    }

    /// Trace the marked point through one full actuator revolution.
    pub fn trace(&mut self, config: &TraceConfig) -> Result<MotionCurve> {
        crate::trace::trace(&mut self.assembly, config)
    }

    /// Current world position of the marked point on link 1.
    #[must_use]
    pub fn marked_point(&self) -> Option<Point3<f64>> {
        self.assembly.marked_point()
    }

    /// Current actuator phase in radians.
    #[must_use]
    pub fn phase(&self) -> f64 {
        self.assembly.actuator().phase()
    }

    /// The underlying assembly.
    #[must_use]
    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    /// Mutable access to the underlying assembly.
    pub fn assembly_mut(&mut self) -> &mut Assembly {
        &mut self.assembly
    }

    /// The configuration this mechanism was built from.
    #[must_use]
    pub fn config(&self) -> &CrankConfig {
        &self.config
    }

    /// Identifier of the driving gear.
    #[must_use]
    pub const fn gear1(&self) -> PartId {
        self.gear1
    }

    /// Identifier of the follower gear.
    #[must_use]
    pub const fn gear2(&self) -> PartId {
        self.gear2
    }

    /// Identifier of the link rooted on gear 1.
    #[must_use]
    pub const fn link1(&self) -> PartId {
        self.link1
    }

    /// Identifier of the link rooted on gear 2.
    #[must_use]
    pub const fn link2(&self) -> PartId {
        self.link2
    }
}

/// Yaw seeds that place both coupler points on the same spot, so the
/// construction solve starts at (or very near) equilibrium.
fn link_yaw_seeds(config: &CrankConfig, root1: &Point3<f64>, root2: &Point3<f64>) -> (f64, f64) {
    let a = Vector2::new(root1.x, root1.y);
    let b = Vector2::new(root2.x, root2.y);
    let reach1 = config.link1_coupler.coords.norm();
    let reach2 = config.link2_coupler.coords.norm();

    match circle_intersection(a, reach1, b, reach2) {
        Some(coupler) => {
            let yaw1 = (coupler.y - a.y).atan2(coupler.x - a.x)
                - config.link1_coupler.y.atan2(config.link1_coupler.x);
            let yaw2 = (coupler.y - b.y).atan2(coupler.x - b.x)
                - config.link2_coupler.y.atan2(config.link2_coupler.x);
            (yaw1, yaw2)
        }
        None => (0.0, 0.0),
    }
}

/// One intersection point of two coplanar circles, on the positive
/// perpendicular side of the center line. None when the circles are
/// separate, nested, or concentric.
fn circle_intersection(
    center_a: Vector2<f64>,
    radius_a: f64,
    center_b: Vector2<f64>,
    radius_b: f64,
) -> Option<Vector2<f64>> {
    let delta = center_b - center_a;
    let dist = delta.norm();
    if dist <= f64::EPSILON || dist > radius_a + radius_b || dist < (radius_a - radius_b).abs() {
        return None;
    }
    let along = (dist * dist + radius_a * radius_a - radius_b * radius_b) / (2.0 * dist);
    let rise = (radius_a * radius_a - along * along).max(0.0).sqrt();
    let unit = delta / dist;
    let perp = Vector2::new(-unit.y, unit.x);
    Some(center_a + unit * along + perp * rise)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::AssemblyError;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn build_reference() -> CrankMechanism {
        CrankMechanism::build(
            CrankConfig::default(),
            SolveConfig::default().max_iterations(20_000),
        )
        .unwrap()
    }

    #[test]
    fn test_reference_mechanism_assembles_in_equilibrium() {
        let mech = build_reference();
        assert_eq!(mech.assembly().parts().len(), 4);
        assert_eq!(mech.assembly().free_param_count(), 24);
        assert!(mech.assembly().objective().unwrap() < 1e-3);
    }

    #[test]
    fn test_marked_point_rides_link1_tip() {
        let mech = build_reference();
        let marked = mech.marked_point().unwrap();
        let root = mech
            .assembly()
            .global_point(mech.link1(), &Point3::origin())
            .unwrap();
        assert_relative_eq!((marked - root).norm(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_seed_starts_near_equilibrium() {
        // The yaw seeds close the loop exactly, so the state packed
        // before the construction solve is already near-zero residual.
        let config = CrankConfig::default();
        let gear1_pose = PartPose::from_position(config.gear1_anchor);
        let gear2_pose = PartPose::from_position(config.gear2_anchor);
        let root1 = gear1_pose.transform_point(&config.gear1_joint);
        let root2 = gear2_pose.transform_point(&config.gear2_joint);
        let (yaw1, yaw2) = link_yaw_seeds(&config, &root1, &root2);

        let coupler1 = PartPose::new(root1, Vector3::new(0.0, 0.0, yaw1))
            .transform_point(&config.link1_coupler);
        let coupler2 = PartPose::new(root2, Vector3::new(0.0, 0.0, yaw2))
            .transform_point(&config.link2_coupler);
        assert_relative_eq!((coupler1 - coupler2).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_turn_and_solve_tracks_phase() {
        let mut mech = build_reference();
        let before = mech.marked_point().unwrap();
        let step = TAU / 360.0;

        mech.turn_and_solve(step).unwrap();
        assert_relative_eq!(mech.phase(), step, epsilon = 1e-12);

        let gear1_yaw = mech.assembly().part(mech.gear1()).unwrap().pose.yaw();
        assert_relative_eq!(gear1_yaw, step, epsilon = 1e-3);

        let after = mech.marked_point().unwrap();
        assert!((after - before).norm() > 1e-4);
    }

    #[test]
    fn test_rejects_nonpositive_extent() {
        let config = CrankConfig {
            gear1_radius: -1.0,
            ..CrankConfig::default()
        };
        let err = CrankMechanism::build(config, SolveConfig::default()).unwrap_err();
        assert!(matches!(err, AssemblyError::Types(_)));
    }

    #[test]
    fn test_rejects_infeasible_geometry() {
        let config = CrankConfig {
            gear2_anchor: Point3::new(20.0, 0.0, 0.0),
            ..CrankConfig::default()
        };
        let err = CrankMechanism::build(config, SolveConfig::default()).unwrap_err();
        assert!(err.is_infeasible());
    }

    #[test]
    fn test_circle_intersection_classic() {
        let p = circle_intersection(
            Vector2::new(0.0, 0.0),
            5.0,
            Vector2::new(6.0, 0.0),
            5.0,
        )
        .unwrap();
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 4.0, epsilon = 1e-12);

        assert!(circle_intersection(
            Vector2::new(0.0, 0.0),
            1.0,
            Vector2::new(10.0, 0.0),
            1.0
        )
        .is_none());
    }
}
