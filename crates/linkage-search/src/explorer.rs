//! Breadth-expanding design-space search.

use std::collections::VecDeque;

use linkage_assembly::{CrankConfig, CrankMechanism};
use linkage_types::ExplorerConfig;
use tracing::{debug, info};

use crate::{CurveDatabase, CurveScorer, PerturbSampler, Result, SearchError};

/// Grows a database of behaviorally distinct mechanisms by perturbing
/// known-good configurations.
///
/// Every accepted candidate joins a FIFO frontier and later serves as
/// the origin for its own neighbors, widening the search ring by ring.
/// When the frontier drains before the database reaches its target
/// size, a fresh origin is re-seeded by perturbing the base
/// configuration. Candidate rejections (infeasible geometry, failed
/// construction, aborted traces, similar curves) are expected sampling
/// outcomes; only exhausting a bounded retry budget fails the search.
#[derive(Debug)]
pub struct DesignExplorer<S: CurveScorer> {
    config: ExplorerConfig,
    scorer: S,
    sampler: PerturbSampler,
}

impl<S: CurveScorer> DesignExplorer<S> {
    /// Create an explorer with the given policy and scorer.
    pub fn new(config: ExplorerConfig, scorer: S) -> Result<Self> {
        config.validate()?;
        let sampler = PerturbSampler::new(config.perturb.clone())?;
        Ok(Self {
            config,
            scorer,
            sampler,
        })
    }

    /// The search policy.
    #[must_use]
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Search outward from `base` until the database reaches the
    /// configured target size.
    ///
    /// The base configuration itself is the first admission candidate;
    /// it enters the (empty) database unopposed when it builds and
    /// traces cleanly.
    pub fn run(&mut self, base: &CrankConfig) -> Result<CurveDatabase> {
        let mut database = CurveDatabase::new();
        let mut frontier: VecDeque<CrankConfig> = VecDeque::new();

        self.seed_origin(base, true, &mut database, &mut frontier)?;

        while database.len() < self.config.target_size {
            let Some(origin) = frontier.pop_front() else {
                self.seed_origin(base, false, &mut database, &mut frontier)?;
                continue;
            };
            self.expand(&origin, &mut database, &mut frontier);
        }

        info!(mechanisms = database.len(), "Design-space search complete");
        Ok(database)
    }

    /// Admit one origin into the database and frontier, perturbing the
    /// base configuration on every retry. The unperturbed base itself
    /// is tried first only on the initial seeding.
    fn seed_origin(
        &mut self,
        base: &CrankConfig,
        try_base_first: bool,
        database: &mut CurveDatabase,
        frontier: &mut VecDeque<CrankConfig>,
    ) -> Result<()> {
        for attempt in 0..self.config.max_origin_attempts {
            let candidate = if try_base_first && attempt == 0 {
                base.clone()
            } else {
                self.sampler.neighbor(base)
            };
            if self.try_admit(candidate, database, frontier) {
                return Ok(());
            }
        }
        Err(SearchError::SearchExhausted {
            attempts: self.config.max_origin_attempts,
            goal: self.config.target_size,
        })
    }

    /// Sample neighbors from one frontier origin, admitting up to
    /// `neighbors_per_expansion` of them. Each neighbor slot retries
    /// the pipeline up to its attempt cap; a slot that never lands is
    /// simply skipped.
    fn expand(
        &mut self,
        origin: &CrankConfig,
        database: &mut CurveDatabase,
        frontier: &mut VecDeque<CrankConfig>,
    ) {
        for _ in 0..self.config.neighbors_per_expansion {
            if database.len() >= self.config.target_size {
                return;
            }
            for _ in 0..self.config.max_candidate_attempts {
                let candidate = self.sampler.neighbor(origin);
                if self.try_admit(candidate, database, frontier) {
                    break;
                }
            }
        }
    }

    /// One candidate through the full pipeline: build (which validates),
    /// trace, dissimilarity. Admitted candidates are stored and join
    /// the frontier.
    fn try_admit(
        &mut self,
        candidate: CrankConfig,
        database: &mut CurveDatabase,
        frontier: &mut VecDeque<CrankConfig>,
    ) -> bool {
        let mut mechanism = match CrankMechanism::build(candidate.clone(), self.config.solve.clone())
        {
            Ok(mechanism) => mechanism,
            Err(err) if err.is_infeasible() => {
                debug!(%err, "Candidate rejected: infeasible geometry");
                return false;
            }
            Err(err) => {
                debug!(%err, "Candidate rejected: construction failed");
                return false;
            }
        };

        let curve = match mechanism.trace(&self.config.trace) {
            Ok(curve) => curve,
            Err(err) => {
                debug!(%err, "Candidate rejected: trace failed");
                return false;
            }
        };

        if !database.is_dissimilar(&curve, &self.scorer, self.config.gamma) {
            debug!("Candidate rejected: too similar to an accepted curve");
            return false;
        }

        let id = database.insert(candidate.clone(), curve);
        frontier.push_back(candidate);
        info!(%id, size = database.len(), "Mechanism admitted");
        true
    }
}
