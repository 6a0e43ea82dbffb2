// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The orchestrator: one Phase-1 run for the opening assignment, an
//! optional destroy/repair/evaluate/accept loop, and a final placement
//! pass on the best state.
//!
//! The loop is strictly serial. Each iteration derives a fresh candidate
//! from the current state; the seeded RNG driving the destroy sampling
//! and the uphill branch is the only source of non-determinism outside
//! the solver.

pub mod accept;
pub mod destroy;
pub mod evaluate;
pub mod repair;
pub mod state;
pub mod stop;

pub use accept::{AcceptDecision, Acceptor, ScoreAcceptor};
pub use destroy::RandomRemoval;
pub use evaluate::{PlacementEvaluator, aggregate_score};
pub use repair::CpRepair;
pub use state::SearchState;
pub use stop::{StopCriteria, StopReason};

use crate::{
    err::{AssignmentInfeasibleError, SolveError, SolverInternalError},
    phase1::{self, AssignmentModel, AssignmentModelConfig},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use stow_alloc_model::{
    prelude::{LoadPlan, LoadedContainer, Phase2Settings, Problem, SolveSettings},
    validation::validate_container,
};
use tracing::{debug, info, warn};

/// Knobs that do not come from the input documents.
#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    pub seed: u64,
    pub use_alns: bool,
    pub assignment: AssignmentModelConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            use_alns: true,
            assignment: AssignmentModelConfig::default(),
        }
    }
}

/// Runs the whole pipeline for one problem.
#[derive(Debug)]
pub struct LoadPlanner<'p> {
    problem: &'p Problem,
    settings: SolveSettings,
    phase2: Phase2Settings,
    config: PlannerConfig,
}

impl<'p> LoadPlanner<'p> {
    pub fn new(problem: &'p Problem, settings: SolveSettings, phase2: Phase2Settings) -> Self {
        Self {
            problem,
            settings,
            phase2,
            config: PlannerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn without_alns(mut self) -> Self {
        self.config.use_alns = false;
        self
    }

    fn phase1_time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.settings.phase1_time_limit_seconds.max(0.0))
    }

    pub fn solve(&self) -> Result<LoadPlan, SolveError> {
        // Items that fit no orientation make the instance hopeless before
        // any search starts.
        if let Some(item) = self.problem.first_unplaceable_item() {
            return Err(AssignmentInfeasibleError::for_item(item).into());
        }

        info!(
            items = self.problem.len(),
            groups = self.problem.groups().len(),
            "Phase 1: building the opening assignment"
        );
        let model = AssignmentModel::build(
            self.problem,
            self.problem.len(),
            &std::collections::BTreeMap::new(),
            &self.config.assignment,
        )?;
        let outcome = model.solve(self.phase1_time_limit())?;
        info!(status = %outcome.status, elapsed = ?outcome.elapsed, "Phase 1 done");

        let Some(assignment) = outcome.assignment else {
            return Err(AssignmentInfeasibleError::new().into());
        };
        debug_assert!(assignment.validate(self.problem).is_ok());
        phase1::log_summary(self.problem, &assignment);

        let evaluator = PlacementEvaluator::new(self.problem, &self.phase2);
        let mut current = SearchState::from_assignment(assignment);
        let initial_score = evaluator.evaluate(&mut current)?;
        info!(score = initial_score, "Initial placement evaluated");

        let mut best = current.clone();

        if self.config.use_alns && !self.problem.is_empty() {
            self.refine(&evaluator, &mut current, &mut best)?;
        } else {
            info!("Skipping the ALNS refinement step");
        }

        // Make sure the best state carries placements (no-op when the
        // evaluation is still cached).
        evaluator.evaluate(&mut best)?;
        let plan = self.build_plan(&best)?;
        info!(
            containers = plan.containers.len(),
            score = best.score().unwrap_or_default(),
            feasible = plan.is_fully_feasible(),
            "Planning finished"
        );
        Ok(plan)
    }

    /// The ALNS loop: destroy → repair → evaluate → accept → stop-check.
    fn refine(
        &self,
        evaluator: &PlacementEvaluator<'_>,
        current: &mut SearchState,
        best: &mut SearchState,
    ) -> Result<(), SolveError> {
        let alns = &self.settings.alns;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let destroy = RandomRemoval::new(alns.num_remove(self.problem.len()));
        let repair = CpRepair::new(self.phase1_time_limit(), self.config.assignment);
        let acceptor = ScoreAcceptor::default();
        let mut stop = StopCriteria::new(
            alns.num_iterations,
            alns.max_no_improve,
            Duration::from_secs_f64(alns.time_limit.max(0.0)),
        );

        info!(
            iterations = alns.num_iterations,
            num_remove = destroy.num_remove,
            max_no_improve = alns.max_no_improve,
            time_limit = alns.time_limit,
            "ALNS refinement started"
        );

        loop {
            let destroyed = destroy.apply(current, &mut rng);
            let mut candidate = repair.apply(self.problem, &destroyed)?;

            let mut improved_best = false;
            if candidate.is_complete() {
                let score = evaluator.evaluate(&mut candidate)?;
                let decision = acceptor.decide(best, current, &candidate, &mut rng);
                debug!(
                    iteration = stop.iteration() + 1,
                    score,
                    best = best.score().unwrap_or_default(),
                    ?decision,
                    "ALNS iteration evaluated"
                );
                match decision {
                    AcceptDecision::AcceptBest => {
                        *best = candidate.clone();
                        *current = candidate;
                        improved_best = true;
                    }
                    AcceptDecision::AcceptCurrent => *current = candidate,
                    AcceptDecision::Reject => {}
                }
            } else {
                debug!("Repair left boxes unassigned; candidate discarded");
            }

            if let Some(reason) = stop.on_iteration(improved_best) {
                info!(iterations = stop.iteration(), %reason, "ALNS stopped");
                break;
            }
        }
        Ok(())
    }

    fn build_plan(&self, best: &SearchState) -> Result<LoadPlan, SolveError> {
        let evaluation = best.evaluation().ok_or_else(|| {
            SolverInternalError::new("Best state lost its evaluation before reporting")
        })?;

        let containers: Vec<LoadedContainer> = best
            .assignment()
            .instances()
            .iter()
            .zip(&evaluation.loads)
            .map(|(items, load)| LoadedContainer {
                items: items.clone(),
                load: load.clone(),
            })
            .collect();

        for (j, container) in containers.iter().enumerate() {
            if !container.load.status.has_solution() {
                continue;
            }
            let violations =
                validate_container(self.problem, &container.items, &container.load.placements);
            for violation in &violations {
                warn!(instance = j, %violation, "Solution check failed");
            }
        }

        Ok(LoadPlan { containers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stow_alloc_model::{
        common::{GroupId, ItemId},
        prelude::AlnsParams,
        problem::{ContainerSpec, Item},
    };
    use stow_alloc_core::prelude::{Extent3, RotationPolicy};

    fn fast_settings() -> SolveSettings {
        SolveSettings {
            phase1_time_limit_seconds: 20.0,
            step2_settings_file: None,
            alns: AlnsParams {
                num_iterations: 3,
                num_can_be_moved_percentage: 25,
                time_limit: 30.0,
                max_no_improve: 3,
            },
        }
    }

    fn phase2() -> Phase2Settings {
        Phase2Settings {
            time_limit_seconds: 20.0,
            ..Default::default()
        }
    }

    fn item(id: i64, dims: [i64; 3], weight: i64, group: Option<i64>) -> Item {
        Item::new(
            ItemId::new(id),
            Extent3::from(dims),
            weight,
            RotationPolicy::Free,
            group.map(GroupId::new),
        )
        .unwrap()
    }

    #[test]
    fn test_pipeline_without_alns() {
        let spec = ContainerSpec::new(Extent3::new(6, 6, 6), 10_000).unwrap();
        let items = vec![
            item(1, [2, 2, 2], 10, None),
            item(2, [2, 2, 2], 10, None),
            item(3, [2, 2, 1], 5, None),
        ];
        let problem = Problem::new(spec, items).unwrap();

        let plan = LoadPlanner::new(&problem, fast_settings(), phase2())
            .without_alns()
            .solve()
            .unwrap();

        assert!(plan.is_fully_feasible());
        let placed: usize = plan
            .containers
            .iter()
            .map(|c| c.load.placements.len())
            .sum();
        assert_eq!(placed, problem.len());
    }

    #[test]
    fn test_pipeline_with_alns_preserves_items() {
        let spec = ContainerSpec::new(Extent3::new(6, 6, 6), 10_000).unwrap();
        let items = vec![
            item(1, [2, 2, 2], 10, None),
            item(2, [2, 2, 2], 10, None),
            item(3, [2, 2, 2], 10, None),
            item(4, [2, 2, 1], 5, None),
            item(5, [1, 2, 2], 5, None),
        ];
        let problem = Problem::new(spec, items).unwrap();

        let plan = LoadPlanner::new(&problem, fast_settings(), phase2())
            .with_seed(123)
            .solve()
            .unwrap();

        assert!(plan.is_fully_feasible());
        let mut seen: Vec<usize> = plan
            .containers
            .iter()
            .flat_map(|c| c.items.iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_unplaceable_item_fails_fast() {
        let spec = ContainerSpec::new(Extent3::new(6, 6, 6), 10_000).unwrap();
        let items = vec![item(1, [7, 1, 1], 1, None)];
        let problem = Problem::new(spec, items).unwrap();

        let err = LoadPlanner::new(&problem, fast_settings(), phase2())
            .solve()
            .unwrap_err();
        match err {
            SolveError::AssignmentInfeasible(e) => {
                assert_eq!(e.unplaceable_item(), Some(0));
            }
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_problem_yields_empty_plan() {
        let spec = ContainerSpec::new(Extent3::new(6, 6, 6), 10_000).unwrap();
        let problem = Problem::new(spec, Vec::new()).unwrap();

        let plan = LoadPlanner::new(&problem, fast_settings(), phase2())
            .solve()
            .unwrap();
        assert!(plan.containers.is_empty());
        assert!(plan.is_fully_feasible());
    }

    #[test]
    fn test_grouped_items_share_a_container() {
        let spec = ContainerSpec::new(Extent3::new(5, 5, 2), 20).unwrap();
        let mut items: Vec<Item> = (0..5).map(|n| item(n, [1, 2, 1], 1, Some(1))).collect();
        items.extend((5..10).map(|n| item(n, [2, 2, 1], 1, Some(2))));
        let problem = Problem::new(spec, items).unwrap();

        let plan = LoadPlanner::new(&problem, fast_settings(), phase2())
            .without_alns()
            .solve()
            .unwrap();
        assert_eq!(plan.containers.len(), 1);
        assert!(plan.is_fully_feasible());
    }
}
