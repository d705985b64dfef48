//! Global free-parameter index for a mechanism.

use hashbrown::HashMap;
use linkage_types::FreeParam;
use nalgebra::DVector;

/// Maps every free parameter referenced by a mechanism's constraints to
/// exactly one slot of a flat state vector.
///
/// Slots are assigned in first-appearance order over the constraint list,
/// so two mechanisms wired identically index identically. Parameters
/// shared by several constraints are deduplicated: each occupies a single
/// slot no matter how many constraints reference it.
#[derive(Debug, Clone, Default)]
pub struct ParamIndex {
    slots: HashMap<FreeParam, usize>,
    params: Vec<FreeParam>,
}

impl ParamIndex {
    /// Build an index from the free parameters of a constraint list, in
    /// declaration order.
    #[must_use]
    pub fn from_params(params: impl IntoIterator<Item = FreeParam>) -> Self {
        let mut index = Self::default();
        for param in params {
            index.insert(param);
        }
        index
    }

    fn insert(&mut self, param: FreeParam) {
        if let hashbrown::hash_map::Entry::Vacant(entry) = self.slots.entry(param) {
            entry.insert(self.params.len());
            self.params.push(param);
        }
    }

    /// The slot assigned to a parameter, if it is indexed.
    #[must_use]
    pub fn slot(&self, param: FreeParam) -> Option<usize> {
        self.slots.get(&param).copied()
    }

    /// All indexed parameters, in slot order.
    #[must_use]
    pub fn params(&self) -> &[FreeParam] {
        &self.params
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if no parameters are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// A zero state vector of the right dimension.
    #[must_use]
    pub fn zero_state(&self) -> DVector<f64> {
        DVector::zeros(self.params.len())
    }
}
