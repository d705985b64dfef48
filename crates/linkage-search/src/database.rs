//! The accepted-mechanism database.

use linkage_assembly::{CrankConfig, MotionCurve};
use linkage_types::MechanismId;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::CurveScorer;

/// One accepted mechanism: its identity, the configuration that built
/// it, and the curve it traced.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatalogEntry {
    /// Identity stamped at insertion.
    pub id: MechanismId,
    /// The configuration the mechanism was built from.
    pub config: CrankConfig,
    /// The marked point's traced revolution.
    pub curve: MotionCurve,
}

/// Append-only store of accepted mechanisms and their curves.
///
/// Owns identity assignment: ids are dense, start at 1, and follow
/// insertion order, which is the only ordering guarantee. Nothing is
/// ever removed.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveDatabase {
    entries: Vec<CatalogEntry>,
    next_id: u64,
}

impl CurveDatabase {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an accepted mechanism, stamping the next identity.
    pub fn insert(&mut self, config: CrankConfig, curve: MotionCurve) -> MechanismId {
        self.next_id += 1;
        let id = MechanismId::new(self.next_id);
        debug!(%id, points = curve.len(), "Curve accepted into database");
        self.entries.push(CatalogEntry { id, config, curve });
        id
    }

    /// True when `candidate` scores at least `gamma` against every
    /// stored curve. Vacuously true for an empty database.
    pub fn is_dissimilar<S>(&self, candidate: &MotionCurve, scorer: &S, gamma: f64) -> bool
    where
        S: CurveScorer + ?Sized,
    {
        self.entries
            .iter()
            .all(|entry| scorer.score(candidate, &entry.curve) >= gamma)
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// One entry by identity.
    #[must_use]
    pub fn get(&self, id: MechanismId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// The stored curves in insertion order.
    pub fn curves(&self) -> impl Iterator<Item = &MotionCurve> {
        self.entries.iter().map(|entry| &entry.curve)
    }

    /// The stored configurations in insertion order.
    pub fn configs(&self) -> impl Iterator<Item = &CrankConfig> {
        self.entries.iter().map(|entry| &entry.config)
    }

    /// Number of accepted mechanisms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
