//! End-to-end search tests.
//!
//! Run the explorer against the reference crank with perturbation
//! ranges small enough that most candidates stay feasible, and check
//! the search-level guarantees:
//!
//! 1. The database grows to exactly the target size, with dense ids in
//!    insertion order, the base configuration admitted first
//! 2. Every stored mechanism rebuilds and passes the validator (only
//!    feasible, solvable candidates are ever admitted)
//! 3. A seeded search replays exactly

use linkage_assembly::{validate_crank, CrankConfig, CrankMechanism};
use linkage_search::{ConstantScorer, CurveScorer, DesignExplorer, MeanPointDistance};
use linkage_types::{ExplorerConfig, PerturbConfig, SolveConfig, TraceConfig};

fn search_config(seed: u64) -> ExplorerConfig {
    ExplorerConfig::default()
        .target_size(3)
        .solve(SolveConfig::default().max_iterations(20_000))
        .trace(TraceConfig::default().steps(12))
        .perturb(
            PerturbConfig::default()
                .with_seed(seed)
                .extent_deltas(0.3, 0.3)
                .position_deltas(0.1, 0.1),
        )
}

#[test]
fn test_search_grows_to_target_size() {
    let mut explorer =
        DesignExplorer::new(search_config(17), ConstantScorer::default()).expect("explorer");
    let database = explorer.run(&CrankConfig::default()).expect("search");

    assert_eq!(database.len(), 3);
    let ids: Vec<u64> = database.entries().iter().map(|e| e.id.raw()).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert_eq!(database.entries()[0].config, CrankConfig::default());
    assert!(database.curves().all(|curve| curve.len() == 12));
}

#[test]
fn test_stored_configs_are_all_buildable() {
    let mut explorer =
        DesignExplorer::new(search_config(29), ConstantScorer::default()).expect("explorer");
    let database = explorer.run(&CrankConfig::default()).expect("search");

    for entry in database.entries() {
        validate_crank(&entry.config).expect("stored config feasible");
        CrankMechanism::build(
            entry.config.clone(),
            SolveConfig::default().max_iterations(20_000),
        )
        .expect("stored config rebuilds");
    }
}

#[test]
fn test_seeded_search_replays_exactly() {
    let mut first =
        DesignExplorer::new(search_config(31), ConstantScorer::default()).expect("explorer");
    let mut second =
        DesignExplorer::new(search_config(31), ConstantScorer::default()).expect("explorer");

    let a = first.run(&CrankConfig::default()).expect("search");
    let b = second.run(&CrankConfig::default()).expect("search");

    let configs_a: Vec<_> = a.configs().cloned().collect();
    let configs_b: Vec<_> = b.configs().cloned().collect();
    assert_eq!(configs_a, configs_b);
}

#[test]
fn test_point_distance_scorer_admits_distinct_curves() {
    // A tiny threshold with a real scorer: accepted curves must differ
    // by a measurable margin instead of passing on a constant.
    let config = search_config(37).target_size(2).gamma(1e-6);
    let mut explorer = DesignExplorer::new(config, MeanPointDistance).expect("explorer");
    let database = explorer.run(&CrankConfig::default()).expect("search");

    assert_eq!(database.len(), 2);
    let curves: Vec<_> = database.curves().collect();
    assert!(MeanPointDistance.score(curves[1], curves[0]) >= 1e-6);
}
