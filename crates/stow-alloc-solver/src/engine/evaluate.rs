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

use crate::{
    engine::state::SearchState,
    err::SolveError,
    phase2::PlacementModel,
};
use std::time::Duration;
use stow_alloc_model::prelude::{ContainerLoad, Phase2Settings, Problem, SolveStatus};
use tracing::debug;

/// Aggregate score over per-container statuses, minimized by the outer
/// loop: infeasible and unknown containers are penalized, solved ones
/// rewarded.
pub fn aggregate_score<I>(statuses: I) -> i64
where
    I: IntoIterator<Item = SolveStatus>,
{
    let mut score = 0i64;
    for status in statuses {
        score += match status {
            SolveStatus::Infeasible => 1000,
            SolveStatus::Unknown => 500,
            SolveStatus::Optimal => -2,
            SolveStatus::Feasible => -1,
        };
    }
    score
}

/// Runs the placement phase over every instance of a state's assignment
/// and caches the result on the state. A state with a cached score is
/// returned as-is.
#[derive(Debug, Clone, Copy)]
pub struct PlacementEvaluator<'p> {
    problem: &'p Problem,
    settings: &'p Phase2Settings,
}

impl<'p> PlacementEvaluator<'p> {
    pub fn new(problem: &'p Problem, settings: &'p Phase2Settings) -> Self {
        Self { problem, settings }
    }

    fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.settings.time_limit_seconds.max(0.0))
    }

    pub fn evaluate(&self, state: &mut SearchState) -> Result<i64, SolveError> {
        if let Some(score) = state.score() {
            return Ok(score);
        }

        let mut loads = Vec::with_capacity(state.assignment().num_instances());
        for (j, items) in state.assignment().instances().iter().enumerate() {
            if items.is_empty() {
                loads.push(ContainerLoad::empty());
                continue;
            }
            let model = PlacementModel::build(self.problem, items, self.settings)
                .map_err(crate::err::SolverInternalError::from)?;
            let outcome = model.solve(self.problem, self.time_limit())?;
            debug!(
                instance = j,
                boxes = items.len(),
                status = %outcome.load.status,
                elapsed = ?outcome.elapsed,
                "Placed one container"
            );
            loads.push(outcome.load);
        }

        let score = aggregate_score(loads.iter().map(|l| l.status));
        state.set_evaluation(loads, score);
        Ok(score)
    }
}
