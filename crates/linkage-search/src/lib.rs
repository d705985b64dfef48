//! Design-space exploration for crank mechanisms.
//!
//! Starting from one working [`CrankConfig`](linkage_assembly::CrankConfig),
//! the explorer perturbs dimensions ([`PerturbSampler`]), rebuilds and
//! traces every candidate, and grows an append-only [`CurveDatabase`]
//! of mechanisms whose motion curves a [`CurveScorer`] judges distinct:
//!
//! - [`DesignExplorer`] - breadth-expanding frontier search with
//!   bounded retries at every sampling loop
//! - [`PerturbSampler`] - field-class jitter with floors and sign
//!   constraints, reproducible via a seed
//! - [`CurveScorer`] / [`ConstantScorer`] / [`MeanPointDistance`] -
//!   pluggable curve dissimilarity
//! - [`CurveDatabase`] - append-only store owning identity assignment
//!
//! # Example
//!
//! ```
//! use linkage_assembly::CrankConfig;
//! use linkage_search::{ConstantScorer, DesignExplorer};
//! use linkage_types::{ExplorerConfig, PerturbConfig, SolveConfig, TraceConfig};
//!
//! let config = ExplorerConfig::default()
//!     .target_size(1)
//!     .solve(SolveConfig::default().max_iterations(20_000))
//!     .trace(TraceConfig::default().steps(12))
//!     .perturb(PerturbConfig::default().with_seed(7));
//!
//! let mut explorer = DesignExplorer::new(config, ConstantScorer::default())?;
//! let database = explorer.run(&CrankConfig::default())?;
//! assert_eq!(database.len(), 1);
//! # Ok::<(), linkage_search::SearchError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/linkage-search/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for numeric code
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
    clippy::cast_precision_loss,   // usize to f64 is fine for counts
    clippy::missing_errors_doc     // Error docs added where non-obvious
)]

mod database;
mod error;
mod explorer;
mod perturb;
mod score;

pub use database::{CatalogEntry, CurveDatabase};
pub use error::SearchError;
pub use explorer::DesignExplorer;
pub use perturb::PerturbSampler;
pub use score::{ConstantScorer, CurveScorer, MeanPointDistance};

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
