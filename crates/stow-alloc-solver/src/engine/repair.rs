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
    phase1::{AssignmentModel, AssignmentModelConfig},
};
use std::collections::BTreeMap;
use std::time::Duration;
use stow_alloc_model::prelude::Problem;
use tracing::debug;

/// The repair operator: re-run the assignment phase with every surviving
/// box pinned to its current instance, leaving one fresh slot per removed
/// box so the solver may open new containers.
///
/// When the solver yields no incumbent, the partial input state is
/// returned unchanged; the engine discards such candidates.
#[derive(Debug, Clone, Copy)]
pub struct CpRepair {
    pub time_limit: Duration,
    pub config: AssignmentModelConfig,
}

impl CpRepair {
    pub fn new(time_limit: Duration, config: AssignmentModelConfig) -> Self {
        Self { time_limit, config }
    }

    pub fn apply(
        &self,
        problem: &Problem,
        state: &SearchState,
    ) -> Result<SearchState, SolveError> {
        if state.is_complete() {
            return Ok(state.clone());
        }

        let mut fixed: BTreeMap<usize, usize> = BTreeMap::new();
        for (j, items) in state.assignment().instances().iter().enumerate() {
            for &item in items {
                fixed.insert(item, j);
            }
        }

        let max_instances = state.assignment().num_instances() + state.removed().len();
        let model = AssignmentModel::build(problem, max_instances, &fixed, &self.config)?;
        let outcome = model.solve(self.time_limit)?;

        match outcome.assignment {
            Some(assignment) => {
                debug!(
                    status = %outcome.status,
                    instances = assignment.num_instances(),
                    "Repair rebuilt a full assignment"
                );
                Ok(SearchState::from_assignment(assignment))
            }
            None => {
                debug!(status = %outcome.status, "Repair found no incumbent");
                Ok(state.clone())
            }
        }
    }
}
