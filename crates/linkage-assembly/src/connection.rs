//! Typed constraints between rigid parts.
//!
//! Every constraint contributes one or more signed residual terms that
//! are zero exactly when the joint is physically satisfied, a declared
//! set of free parameters, and an analytic gradient of its objective
//! contribution. The set of constraint kinds is closed; residual and
//! gradient logic pattern matches on the variant.

use linkage_types::{Dof, FreeParam, LinkageError, PartId, PartPose, Result};
use nalgebra::{DVector, Matrix3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ParamIndex;

/// Pose and phase lookup for residual evaluation.
///
/// Borrows a set of candidate poses (aligned id and pose slices) plus the
/// actuator phase, so constraints can be evaluated against trial states
/// without touching the committed poses.
#[derive(Debug)]
pub struct ResidualContext<'a> {
    ids: &'a [PartId],
    poses: &'a [PartPose],
    phase: f64,
}

impl<'a> ResidualContext<'a> {
    /// Create a context over aligned id and pose slices.
    #[must_use]
    pub fn new(ids: &'a [PartId], poses: &'a [PartPose], phase: f64) -> Self {
        debug_assert_eq!(ids.len(), poses.len());
        Self { ids, poses, phase }
    }

    /// Pose of the given part.
    pub fn pose(&self, id: PartId) -> Result<&PartPose> {
        self.ids
            .iter()
            .position(|p| *p == id)
            .map(|i| &self.poses[i])
            .ok_or(LinkageError::UnknownPart(id.raw()))
    }

    /// Actuator phase in radians.
    #[must_use]
    pub const fn phase(&self) -> f64 {
        self.phase
    }
}

/// What a phase-sync constraint couples its part to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PhaseRef {
    /// The assembly's actuator phase. Not a free parameter: the driver
    /// sets it and the solve tracks it.
    Actuator,
    /// Another part's yaw.
    Part(PartId),
}

/// A typed constraint between one or two parts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Connection {
    /// Two local attachment points must coincide in world space.
    ///
    /// Three residual terms, one per axis. Frees all six pose degrees of
    /// freedom of both parts.
    Pin {
        /// First part.
        a: PartId,
        /// Second part.
        b: PartId,
        /// Attachment point in `a`'s local frame.
        local_a: Point3<f64>,
        /// Attachment point in `b`'s local frame.
        local_b: Point3<f64>,
    },
    /// A part anchored to the frame at a fixed position and mounting
    /// alignment.
    ///
    /// Five residual terms: position (3), roll, pitch. Yaw is deliberately
    /// not pinned, so a phase coupling can still spin the part.
    Fixed {
        /// The anchored part.
        part: PartId,
        /// Target world position.
        anchor: Point3<f64>,
        /// Target alignment; only roll (x) and pitch (y) are constrained.
        orientation: Vector3<f64>,
    },
    /// Rotational coupling: the part's yaw follows a reference phase in a
    /// fixed ratio.
    ///
    /// One residual term: `yaw(part) - ratio * reference`.
    PhaseSync {
        /// The driven part.
        part: PartId,
        /// What the part's yaw follows.
        reference: PhaseRef,
        /// Coupling ratio (1 means equal angles).
        ratio: f64,
    },
}

impl Connection {
    /// Pin two parts together at local attachment points.
    #[must_use]
    pub const fn pin(a: PartId, b: PartId, local_a: Point3<f64>, local_b: Point3<f64>) -> Self {
        Self::Pin {
            a,
            b,
            local_a,
            local_b,
        }
    }

    /// Anchor a part at a fixed position and mounting alignment.
    #[must_use]
    pub const fn fixed(part: PartId, anchor: Point3<f64>, orientation: Vector3<f64>) -> Self {
        Self::Fixed {
            part,
            anchor,
            orientation,
        }
    }

    /// Couple a part's yaw directly to the actuator phase.
    #[must_use]
    pub const fn phase_to_actuator(part: PartId) -> Self {
        Self::PhaseSync {
            part,
            reference: PhaseRef::Actuator,
            ratio: 1.0,
        }
    }

    /// Couple a part's yaw to another part's yaw in a fixed ratio.
    #[must_use]
    pub const fn phase_to_part(part: PartId, reference: PartId, ratio: f64) -> Self {
        Self::PhaseSync {
            part,
            reference: PhaseRef::Part(reference),
            ratio,
        }
    }

    /// The free parameters this constraint depends on, in declaration
    /// order: all six pose dofs of each pinned part, the five anchored
    /// dofs of a fixed part, the yaw of each phase-coupled part.
    #[must_use]
    pub fn free_params(&self) -> Vec<FreeParam> {
        match self {
            Self::Pin { a, b, .. } => Dof::POSE
                .iter()
                .map(|dof| FreeParam::new(*a, *dof))
                .chain(Dof::POSE.iter().map(|dof| FreeParam::new(*b, *dof)))
                .collect(),
            Self::Fixed { part, .. } => [Dof::X, Dof::Y, Dof::Z, Dof::Roll, Dof::Pitch]
                .iter()
                .map(|dof| FreeParam::new(*part, *dof))
                .collect(),
            Self::PhaseSync {
                part, reference, ..
            } => {
                let mut params = vec![FreeParam::new(*part, Dof::Yaw)];
                if let PhaseRef::Part(r) = reference {
                    params.push(FreeParam::new(*r, Dof::Yaw));
                }
                params
            }
        }
    }

    fn for_each_term(
        &self,
        ctx: &ResidualContext<'_>,
        f: &mut dyn FnMut(f64),
    ) -> Result<()> {
        match self {
            Self::Pin {
                a,
                b,
                local_a,
                local_b,
            } => {
                let gap =
                    ctx.pose(*a)?.transform_point(local_a) - ctx.pose(*b)?.transform_point(local_b);
                f(gap.x);
                f(gap.y);
                f(gap.z);
            }
            Self::Fixed {
                part,
                anchor,
                orientation,
            } => {
                let pose = ctx.pose(*part)?;
                let dp = pose.position - anchor;
                f(dp.x);
                f(dp.y);
                f(dp.z);
                f(pose.roll() - orientation.x);
                f(pose.pitch() - orientation.y);
            }
            Self::PhaseSync {
                part,
                reference,
                ratio,
            } => {
                let target = match reference {
                    PhaseRef::Actuator => ctx.phase(),
                    PhaseRef::Part(r) => ctx.pose(*r)?.yaw(),
                };
                f(ctx.pose(*part)?.yaw() - ratio * target);
            }
        }
        Ok(())
    }

    /// Append this constraint's signed residual terms to `out`.
    pub fn residual_into(&self, ctx: &ResidualContext<'_>, out: &mut Vec<f64>) -> Result<()> {
        self.for_each_term(ctx, &mut |t| out.push(t))
    }

    /// This constraint's signed residual terms.
    pub fn residual_terms(&self, ctx: &ResidualContext<'_>) -> Result<Vec<f64>> {
        let mut terms = Vec::new();
        self.residual_into(ctx, &mut terms)?;
        Ok(terms)
    }

    /// Sum of the magnitudes of this constraint's residual terms.
    ///
    /// Magnitudes are folded unsquared. Folding the signed terms directly
    /// would let a positive violation on one axis cancel a negative one
    /// on another and report zero for an unsatisfied joint; the signed
    /// values stay available through [`Connection::residual_terms`].
    pub fn objective_contribution(&self, ctx: &ResidualContext<'_>) -> Result<f64> {
        let mut sum = 0.0;
        self.for_each_term(ctx, &mut |t| sum += t.abs())?;
        Ok(sum)
    }

    /// Accumulate the analytic gradient of this constraint's objective
    /// contribution into `grad`, one entry per indexed slot.
    ///
    /// Contributions from constraints sharing a parameter sum into the
    /// same slot; opposite-sign contributions cancel there, which is the
    /// price of aggregating per parameter.
    pub fn accumulate_gradient(
        &self,
        ctx: &ResidualContext<'_>,
        index: &ParamIndex,
        grad: &mut DVector<f64>,
    ) -> Result<()> {
        let mut add = |param: FreeParam, value: f64| {
            if let Some(slot) = index.slot(param) {
                grad[slot] += value;
            }
        };

        match self {
            Self::Pin {
                a,
                b,
                local_a,
                local_b,
            } => {
                let pose_a = ctx.pose(*a)?;
                let pose_b = ctx.pose(*b)?;
                let gap = pose_a.transform_point(local_a) - pose_b.transform_point(local_b);
                let sign = Vector3::new(term_sign(gap.x), term_sign(gap.y), term_sign(gap.z));

                add(FreeParam::new(*a, Dof::X), sign.x);
                add(FreeParam::new(*a, Dof::Y), sign.y);
                add(FreeParam::new(*a, Dof::Z), sign.z);
                add(FreeParam::new(*b, Dof::X), -sign.x);
                add(FreeParam::new(*b, Dof::Y), -sign.y);
                add(FreeParam::new(*b, Dof::Z), -sign.z);

                let partials_a = euler_partials(&pose_a.alignment);
                let partials_b = euler_partials(&pose_b.alignment);
                for (k, dof) in [Dof::Roll, Dof::Pitch, Dof::Yaw].iter().enumerate() {
                    add(
                        FreeParam::new(*a, *dof),
                        sign.dot(&(partials_a[k] * local_a.coords)),
                    );
                    add(
                        FreeParam::new(*b, *dof),
                        -sign.dot(&(partials_b[k] * local_b.coords)),
                    );
                }
            }
            Self::Fixed {
                part,
                anchor,
                orientation,
            } => {
                let pose = ctx.pose(*part)?;
                let dp = pose.position - anchor;
                add(FreeParam::new(*part, Dof::X), term_sign(dp.x));
                add(FreeParam::new(*part, Dof::Y), term_sign(dp.y));
                add(FreeParam::new(*part, Dof::Z), term_sign(dp.z));
                add(
                    FreeParam::new(*part, Dof::Roll),
                    term_sign(pose.roll() - orientation.x),
                );
                add(
                    FreeParam::new(*part, Dof::Pitch),
                    term_sign(pose.pitch() - orientation.y),
                );
            }
            Self::PhaseSync {
                part,
                reference,
                ratio,
            } => {
                let target = match reference {
                    PhaseRef::Actuator => ctx.phase(),
                    PhaseRef::Part(r) => ctx.pose(*r)?.yaw(),
                };
                let sign = term_sign(ctx.pose(*part)?.yaw() - ratio * target);
                add(FreeParam::new(*part, Dof::Yaw), sign);
                if let PhaseRef::Part(r) = reference {
                    add(FreeParam::new(*r, Dof::Yaw), -ratio * sign);
                }
            }
        }
        Ok(())
    }
}

/// Sign of a residual term for the magnitude gradient.
///
/// An exactly satisfied term sits at the kink of `|t|`; the zero
/// subgradient is the one that leaves it alone, where `f64::signum`
/// would report `1.0` and push it off the constraint.
fn term_sign(t: f64) -> f64 {
    if t == 0.0 {
        0.0
    } else {
        t.signum()
    }
}

/// Partial derivatives of the alignment rotation `Rz(yaw) Ry(pitch) Rx(roll)`
/// with respect to (roll, pitch, yaw), in that order.
fn euler_partials(alignment: &Vector3<f64>) -> [Matrix3<f64>; 3] {
    let (sr, cr) = alignment.x.sin_cos();
    let (sp, cp) = alignment.y.sin_cos();
    let (sy, cy) = alignment.z.sin_cos();

    let rx = Matrix3::new(1.0, 0.0, 0.0, 0.0, cr, -sr, 0.0, sr, cr);
    let ry = Matrix3::new(cp, 0.0, sp, 0.0, 1.0, 0.0, -sp, 0.0, cp);
    let rz = Matrix3::new(cy, -sy, 0.0, sy, cy, 0.0, 0.0, 0.0, 1.0);

    let drx = Matrix3::new(0.0, 0.0, 0.0, 0.0, -sr, -cr, 0.0, cr, -sr);
    let dry = Matrix3::new(-sp, 0.0, cp, 0.0, 0.0, 0.0, -cp, 0.0, -sp);
    let drz = Matrix3::new(-sy, -cy, 0.0, cy, -sy, 0.0, 0.0, 0.0, 0.0);

    [rz * ry * drx, rz * dry * rx, drz * ry * rx]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn two_part_context(
        pose_a: PartPose,
        pose_b: PartPose,
        phase: f64,
    ) -> (Vec<PartId>, Vec<PartPose>, f64) {
        (
            vec![PartId::new(1), PartId::new(2)],
            vec![pose_a, pose_b],
            phase,
        )
    }

    #[test]
    fn test_pin_residual_zero_when_attached() {
        let (ids, poses, phase) = two_part_context(
            PartPose::from_position(Point3::new(0.0, 0.0, 0.0)),
            PartPose::from_position(Point3::new(1.0, 1.0, 0.0)),
            0.0,
        );
        let ctx = ResidualContext::new(&ids, &poses, phase);
        let conn = Connection::pin(
            PartId::new(1),
            PartId::new(2),
            Point3::new(1.0, 1.0, 0.0),
            Point3::origin(),
        );
        let terms = conn.residual_terms(&ctx).unwrap();
        assert_eq!(terms.len(), 3);
        for t in terms {
            assert_relative_eq!(t, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_pin_residual_reports_gap() {
        let (ids, poses, phase) = two_part_context(
            PartPose::identity(),
            PartPose::from_position(Point3::new(3.0, -2.0, 1.0)),
            0.0,
        );
        let ctx = ResidualContext::new(&ids, &poses, phase);
        let conn = Connection::pin(
            PartId::new(1),
            PartId::new(2),
            Point3::origin(),
            Point3::origin(),
        );
        let terms = conn.residual_terms(&ctx).unwrap();
        assert_relative_eq!(terms[0], -3.0);
        assert_relative_eq!(terms[1], 2.0);
        assert_relative_eq!(terms[2], -1.0);
        assert_relative_eq!(conn.objective_contribution(&ctx).unwrap(), 6.0);
    }

    #[test]
    fn test_pin_residual_uses_rotation() {
        let (ids, poses, phase) = two_part_context(
            PartPose::new(Point3::origin(), Vector3::new(0.0, 0.0, FRAC_PI_2)),
            PartPose::from_position(Point3::new(0.0, 2.0, 0.0)),
            0.0,
        );
        let ctx = ResidualContext::new(&ids, &poses, phase);
        // Local (2, 0, 0) on the quarter-turned part lands at (0, 2, 0).
        let conn = Connection::pin(
            PartId::new(1),
            PartId::new(2),
            Point3::new(2.0, 0.0, 0.0),
            Point3::origin(),
        );
        assert_relative_eq!(
            conn.objective_contribution(&ctx).unwrap(),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_fixed_residual_terms() {
        let ids = vec![PartId::new(1)];
        let poses = vec![PartPose::new(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(0.1, -0.2, 0.7),
        )];
        let ctx = ResidualContext::new(&ids, &poses, 0.0);
        let conn = Connection::fixed(
            PartId::new(1),
            Point3::new(1.0, 0.0, 0.0),
            Vector3::zeros(),
        );
        let terms = conn.residual_terms(&ctx).unwrap();
        assert_eq!(terms.len(), 5);
        assert_relative_eq!(terms[0], 0.0);
        assert_relative_eq!(terms[1], 2.0);
        assert_relative_eq!(terms[2], 3.0);
        assert_relative_eq!(terms[3], 0.1);
        assert_relative_eq!(terms[4], -0.2);
        // Yaw of 0.7 contributes nothing: the spin axis stays free.
    }

    #[test]
    fn test_phase_sync_tracks_actuator() {
        let ids = vec![PartId::new(1)];
        let poses = vec![PartPose::new(
            Point3::origin(),
            Vector3::new(0.0, 0.0, 0.25),
        )];
        let ctx = ResidualContext::new(&ids, &poses, 0.25);
        let conn = Connection::phase_to_actuator(PartId::new(1));
        assert_relative_eq!(
            conn.objective_contribution(&ctx).unwrap(),
            0.0,
            epsilon = 1e-12
        );

        let ctx = ResidualContext::new(&ids, &poses, 0.75);
        assert_relative_eq!(conn.objective_contribution(&ctx).unwrap(), 0.5);
    }

    #[test]
    fn test_phase_sync_ratio_between_parts() {
        let (ids, poses, _) = two_part_context(
            PartPose::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0)),
            PartPose::new(Point3::origin(), Vector3::new(0.0, 0.0, 0.5)),
            0.0,
        );
        let ctx = ResidualContext::new(&ids, &poses, 0.0);
        let conn = Connection::phase_to_part(PartId::new(1), PartId::new(2), 2.0);
        // yaw(1) - 2 * yaw(2) = 1 - 1 = 0
        assert_relative_eq!(
            conn.objective_contribution(&ctx).unwrap(),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_free_param_declarations() {
        let pin = Connection::pin(
            PartId::new(1),
            PartId::new(2),
            Point3::origin(),
            Point3::origin(),
        );
        assert_eq!(pin.free_params().len(), 12);

        let fixed = Connection::fixed(PartId::new(1), Point3::origin(), Vector3::zeros());
        let params = fixed.free_params();
        assert_eq!(params.len(), 5);
        assert!(!params.contains(&FreeParam::new(PartId::new(1), Dof::Yaw)));

        let driven = Connection::phase_to_actuator(PartId::new(1));
        assert_eq!(
            driven.free_params(),
            vec![FreeParam::new(PartId::new(1), Dof::Yaw)]
        );

        let geared = Connection::phase_to_part(PartId::new(1), PartId::new(2), 1.0);
        assert_eq!(geared.free_params().len(), 2);
    }

    #[test]
    fn test_unknown_part_is_an_error() {
        let ids = vec![PartId::new(1)];
        let poses = vec![PartPose::identity()];
        let ctx = ResidualContext::new(&ids, &poses, 0.0);
        let conn = Connection::pin(
            PartId::new(1),
            PartId::new(9),
            Point3::origin(),
            Point3::origin(),
        );
        assert!(conn.residual_terms(&ctx).is_err());
    }

    /// Central-difference check of the analytic gradient, evaluated away
    /// from the kinks of the magnitude fold.
    fn check_gradient(conn: &Connection, ids: &[PartId], poses: &[PartPose], phase: f64) {
        let index = ParamIndex::from_params(conn.free_params());
        let ctx = ResidualContext::new(ids, poses, phase);
        let mut analytic = DVector::zeros(index.len());
        conn.accumulate_gradient(&ctx, &index, &mut analytic).unwrap();

        let h = 1e-6;
        for (slot, param) in index.params().iter().enumerate() {
            let eval = |delta: f64| {
                let mut bumped = poses.to_vec();
                let i = ids.iter().position(|id| *id == param.part).unwrap();
                let current = param.dof.read(&bumped[i]);
                param.dof.write(&mut bumped[i], current + delta);
                let ctx = ResidualContext::new(ids, &bumped, phase);
                conn.objective_contribution(&ctx).unwrap()
            };
            let numeric = (eval(h) - eval(-h)) / (2.0 * h);
            assert_relative_eq!(analytic[slot], numeric, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_pin_gradient_matches_finite_difference() {
        let ids = vec![PartId::new(1), PartId::new(2)];
        let poses = vec![
            PartPose::new(Point3::new(0.3, -0.7, 0.2), Vector3::new(0.2, -0.4, 1.1)),
            PartPose::new(Point3::new(2.1, 1.4, -0.5), Vector3::new(-0.3, 0.6, -0.8)),
        ];
        let conn = Connection::pin(
            PartId::new(1),
            PartId::new(2),
            Point3::new(1.3, 0.4, 0.2),
            Point3::new(-0.6, 0.9, 0.1),
        );
        check_gradient(&conn, &ids, &poses, 0.0);
    }

    #[test]
    fn test_fixed_gradient_matches_finite_difference() {
        let ids = vec![PartId::new(1)];
        let poses = vec![PartPose::new(
            Point3::new(1.7, -2.2, 0.9),
            Vector3::new(0.4, 0.3, -0.6),
        )];
        let conn = Connection::fixed(
            PartId::new(1),
            Point3::new(0.5, 0.5, 0.0),
            Vector3::new(-0.1, 0.1, 0.0),
        );
        check_gradient(&conn, &ids, &poses, 0.0);
    }

    #[test]
    fn test_phase_gradient_matches_finite_difference() {
        let ids = vec![PartId::new(1), PartId::new(2)];
        let poses = vec![
            PartPose::new(Point3::origin(), Vector3::new(0.0, 0.0, 0.9)),
            PartPose::new(Point3::origin(), Vector3::new(0.0, 0.0, 0.2)),
        ];
        let conn = Connection::phase_to_part(PartId::new(1), PartId::new(2), 3.0);
        check_gradient(&conn, &ids, &poses, 0.0);

        let driven = Connection::phase_to_actuator(PartId::new(1));
        check_gradient(&driven, &ids, &poses, 0.4);
    }
}
