//! Constraint assembly: parts, connections, and equilibrium state.

use linkage_types::{
    Actuator, LinkageError, Outline, Part, PartId, PartKind, PartPose, SolveConfig,
};
use nalgebra::{DVector, Point3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    AssemblyError, Connection, EquilibriumProblem, EquilibriumSolver, NelderMead, ParamIndex,
    ResidualContext, Result,
};

/// A part mounted in an assembly: identity, shape, and committed pose.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssembledPart {
    /// Identifier within the owning assembly.
    pub id: PartId,
    /// The rigid part.
    pub part: Part,
    /// Last committed pose.
    pub pose: PartPose,
}

/// Read-only view of one part for description and plotting code.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartSnapshot {
    /// Part identifier.
    pub id: PartId,
    /// Kind tag (gear or link).
    pub kind: PartKind,
    /// Scalar extent: radius or length.
    pub extent: f64,
    /// Committed world position.
    pub position: Point3<f64>,
    /// Committed alignment (roll, pitch, yaw).
    pub alignment: Vector3<f64>,
}

/// Summary of a successful equilibrium solve.
#[derive(Debug, Clone, Copy)]
pub struct SolveReport {
    /// Residual objective at the committed state.
    pub objective: f64,
    /// Minimizer iterations spent.
    pub iterations: usize,
}

/// A mechanism: rigid parts wired by constraints, an actuator, and the
/// flat equilibrium state the solver works on.
///
/// The state vector and the committed part poses are kept consistent at
/// all times. A solve either succeeds and commits the new state into
/// every pose atomically, or fails and leaves both untouched.
#[derive(Debug, Clone)]
pub struct Assembly {
    parts: Vec<AssembledPart>,
    ids: Vec<PartId>,
    connections: Vec<Connection>,
    actuator: Actuator,
    index: ParamIndex,
    state: DVector<f64>,
    marked: Option<(PartId, Point3<f64>)>,
    solve_config: SolveConfig,
    next_part_id: u64,
}

impl Assembly {
    /// Create an empty assembly with the given solve settings.
    pub fn new(solve_config: SolveConfig) -> Result<Self> {
        solve_config.validate()?;
        Ok(Self {
            parts: Vec::new(),
            ids: Vec::new(),
            connections: Vec::new(),
            actuator: Actuator::default(),
            index: ParamIndex::default(),
            state: DVector::zeros(0),
            marked: None,
            solve_config,
            next_part_id: 1,
        })
    }

    /// Mount a part at an initial pose. Returns its identifier.
    pub fn add_part(&mut self, part: Part, pose: PartPose) -> PartId {
        let id = PartId::new(self.next_part_id);
        self.next_part_id += 1;
        self.parts.push(AssembledPart { id, part, pose });
        self.ids.push(id);
        id
    }

    /// Wire a constraint between mounted parts.
    ///
    /// Rejects constraints that reference parts this assembly does not
    /// own. The global parameter index and the state vector are rebuilt
    /// from the full constraint list, deduplicating shared parameters.
    pub fn connect(&mut self, connection: Connection) -> Result<()> {
        for param in connection.free_params() {
            if !self.ids.contains(&param.part) {
                return Err(LinkageError::UnknownPart(param.part.raw()).into());
            }
        }
        self.connections.push(connection);
        self.rebuild_index();
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index =
            ParamIndex::from_params(self.connections.iter().flat_map(Connection::free_params));
        self.state = self.pack_state();
    }

    /// Pack the committed poses into a state vector in slot order.
    fn pack_state(&self) -> DVector<f64> {
        let mut state = self.index.zero_state();
        for (slot, param) in self.index.params().iter().enumerate() {
            if let Some(pose) = self.pose_of(param.part) {
                state[slot] = param.dof.read(pose);
            }
        }
        state
    }

    fn pose_of(&self, id: PartId) -> Option<&PartPose> {
        self.parts.iter().find(|p| p.id == id).map(|p| &p.pose)
    }

    fn part_slot(&self, id: PartId) -> Option<usize> {
        self.ids.iter().position(|i| *i == id)
    }

    /// Candidate poses for a trial state: committed poses with the
    /// indexed slots overwritten.
    fn trial_poses(&self, state: &DVector<f64>) -> Vec<PartPose> {
        let mut poses: Vec<PartPose> = self.parts.iter().map(|p| p.pose).collect();
        for (slot, param) in self.index.params().iter().enumerate() {
            if let Some(i) = self.part_slot(param.part) {
                param.dof.write(&mut poses[i], state[slot]);
            }
        }
        poses
    }

    /// Residual objective for an arbitrary trial state.
    ///
    /// The sum over all constraints of their unsquared residual-term
    /// magnitudes; zero exactly when every constraint is satisfied.
    pub fn objective_for(&self, state: &DVector<f64>) -> Result<f64> {
        let poses = self.trial_poses(state);
        let ctx = ResidualContext::new(&self.ids, &poses, self.actuator.phase());
        let mut total = 0.0;
        for connection in &self.connections {
            total += connection.objective_contribution(&ctx)?;
        }
        Ok(total)
    }

    /// Residual objective at the committed state.
    pub fn objective(&self) -> Result<f64> {
        self.objective_for(&self.state)
    }

    /// All signed residual terms at the committed state, in constraint
    /// declaration order.
    pub fn residuals(&self) -> Result<Vec<f64>> {
        let poses = self.trial_poses(&self.state);
        let ctx = ResidualContext::new(&self.ids, &poses, self.actuator.phase());
        let mut terms = Vec::new();
        for connection in &self.connections {
            connection.residual_into(&ctx, &mut terms)?;
        }
        Ok(terms)
    }

    /// Aggregated analytic gradient of the objective at a trial state.
    ///
    /// Contributions are summed per shared parameter slot.
    pub fn gradient_for(&self, state: &DVector<f64>, grad: &mut DVector<f64>) -> Result<()> {
        grad.fill(0.0);
        let poses = self.trial_poses(state);
        let ctx = ResidualContext::new(&self.ids, &poses, self.actuator.phase());
        for connection in &self.connections {
            connection.accumulate_gradient(&ctx, &self.index, grad)?;
        }
        Ok(())
    }

    /// Solve for equilibrium with the default downhill-simplex strategy.
    ///
    /// On success the new state is committed into every part pose; on
    /// failure the previous state and poses are retained untouched and
    /// [`AssemblyError::ConstraintUnsatisfiable`] is returned.
    pub fn solve(&mut self) -> Result<SolveReport> {
        let solver = NelderMead::new(self.solve_config.clone());
        self.solve_with(&solver)
    }

    /// Solve for equilibrium with a caller-chosen strategy.
    pub fn solve_with(&mut self, solver: &dyn EquilibriumSolver) -> Result<SolveReport> {
        let seed = self.state.clone();
        let outcome = {
            let problem = AssemblyProblem { assembly: self };
            solver.minimize(&problem, seed)
        };
        debug!(
            converged = outcome.converged,
            objective = outcome.objective,
            iterations = outcome.iterations,
            "Equilibrium solve finished"
        );
        if outcome.converged {
            self.commit_state(outcome.state);
            Ok(SolveReport {
                objective: outcome.objective,
                iterations: outcome.iterations,
            })
        } else {
            Err(AssemblyError::ConstraintUnsatisfiable {
                objective: outcome.objective,
                iterations: outcome.iterations,
            })
        }
    }

    /// Write a solved state into the part poses and store it. Only
    /// called after the solver reports success, so poses and state move
    /// together.
    fn commit_state(&mut self, state: DVector<f64>) {
        for (slot, param) in self.index.params().iter().enumerate() {
            if let Some(i) = self.ids.iter().position(|id| *id == param.part) {
                param.dof.write(&mut self.parts[i].pose, state[slot]);
            }
        }
        self.state = state;
    }

    /// Designate the marked point whose trajectory tracing records.
    pub fn set_marked_point(&mut self, part: PartId, local: Point3<f64>) -> Result<()> {
        if self.pose_of(part).is_none() {
            return Err(LinkageError::UnknownPart(part.raw()).into());
        }
        self.marked = Some((part, local));
        Ok(())
    }

    /// Current world position of the marked point, if one is designated.
    #[must_use]
    pub fn marked_point(&self) -> Option<Point3<f64>> {
        self.marked
            .and_then(|(id, local)| self.pose_of(id).map(|pose| pose.transform_point(&local)))
    }

    /// Map a part-local point to world coordinates at the committed pose.
    pub fn global_point(&self, part: PartId, local: &Point3<f64>) -> Result<Point3<f64>> {
        self.pose_of(part)
            .map(|pose| pose.transform_point(local))
            .ok_or_else(|| LinkageError::UnknownPart(part.raw()).into())
    }

    /// All mounted parts in creation order.
    #[must_use]
    pub fn parts(&self) -> &[AssembledPart] {
        &self.parts
    }

    /// One mounted part by identifier.
    #[must_use]
    pub fn part(&self, id: PartId) -> Option<&AssembledPart> {
        self.parts.iter().find(|p| p.id == id)
    }

    /// All constraints in declaration order.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The actuation input.
    #[must_use]
    pub fn actuator(&self) -> &Actuator {
        &self.actuator
    }

    /// Set the actuator phase directly.
    pub fn set_phase(&mut self, phase: f64) {
        self.actuator.set_phase(phase);
    }

    /// Advance the actuator phase by `delta` radians. The poses keep
    /// their previous equilibrium until the next solve.
    pub fn turn(&mut self, delta: f64) {
        self.actuator.turn(delta);
    }

    /// Number of slots in the global parameter index.
    #[must_use]
    pub fn free_param_count(&self) -> usize {
        self.index.len()
    }

    /// The committed state vector.
    #[must_use]
    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }

    /// The solve settings this assembly was created with.
    #[must_use]
    pub fn solve_config(&self) -> &SolveConfig {
        &self.solve_config
    }

    /// Per-part snapshots for description and plotting code.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PartSnapshot> {
        self.parts
            .iter()
            .map(|p| PartSnapshot {
                id: p.id,
                kind: p.part.kind(),
                extent: p.part.extent(),
                position: p.pose.position,
                alignment: p.pose.alignment,
            })
            .collect()
    }

    /// Drawing primitives for every part at its committed pose.
    #[must_use]
    pub fn outlines(&self) -> Vec<(PartId, Outline)> {
        self.parts
            .iter()
            .map(|p| (p.id, p.part.outline(&p.pose)))
            .collect()
    }
}

/// Adapter presenting an assembly to a solver strategy.
struct AssemblyProblem<'a> {
    assembly: &'a Assembly,
}

impl EquilibriumProblem for AssemblyProblem<'_> {
    fn objective(&self, state: &DVector<f64>) -> f64 {
        self.assembly
            .objective_for(state)
            .unwrap_or(f64::INFINITY)
    }

    fn gradient_into(&self, state: &DVector<f64>, grad: &mut DVector<f64>) {
        if self.assembly.gradient_for(state, grad).is_err() {
            grad.fill(0.0);
        }
    }
}
