//! Search error types.

use linkage_assembly::AssemblyError;
use linkage_types::LinkageError;
use thiserror::Error;

/// Errors from design-space exploration.
///
/// Candidate rejections (infeasible geometry, failed solves, aborted
/// traces, similar curves) are expected sampling outcomes and never
/// surface here; running out of bounded retries is the only
/// search-level failure.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A bounded retry loop ran out of attempts before producing an
    /// acceptable origin mechanism.
    #[error("search exhausted after {attempts} origin attempts (target database size {goal})")]
    SearchExhausted {
        /// Attempts spent in the failing retry loop.
        attempts: usize,
        /// Target database size the search was aiming for.
        goal: usize,
    },

    /// An assembly operation failed outside the expected rejection paths.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Invalid search configuration.
    #[error(transparent)]
    Types(#[from] LinkageError),
}

impl SearchError {
    /// True if a bounded retry loop exceeded its attempt budget.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::SearchExhausted { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::SearchExhausted {
            attempts: 64,
            goal: 5,
        };
        let text = err.to_string();
        assert!(text.contains("64"));
        assert!(text.contains('5'));
    }

    #[test]
    fn test_exhausted_predicate() {
        let err = SearchError::SearchExhausted {
            attempts: 1,
            goal: 1,
        };
        assert!(err.is_exhausted());

        let err = SearchError::Types(LinkageError::invalid_config("bad"));
        assert!(!err.is_exhausted());
    }

    #[test]
    fn test_assembly_error_converts() {
        let err: SearchError = AssemblyError::ConstraintUnsatisfiable {
            objective: 1.0,
            iterations: 10,
        }
        .into();
        assert!(matches!(err, SearchError::Assembly(_)));
    }
}
