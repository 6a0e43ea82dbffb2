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

//! Phase 1: partition items over container instances.
//!
//! The model carries one boolean per (item, instance) pair plus one usage
//! boolean per instance, weight and volume capacity rows, soft group
//! cohesion, and a pairwise volume-imbalance penalty over used instances.
//! Interchangeable instances are ordered by a `y[j] ≥ y[j+1]` chain.

use crate::{
    err::{SolveError, SolverInternalError},
    sat::{self, BoolVar, Goal, IntVar, ModelBuildError, SatModel},
};
use std::collections::BTreeMap;
use std::time::Duration;
use stow_alloc_model::prelude::{Assignment, Problem, SolveStatus};
use tracing::debug;

/// Penalty weights of the assignment objective. A zero weight disables
/// its penalty term and the variables behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentModelConfig {
    pub group_split_weight: i64,
    pub volume_balance_weight: i64,
}

impl Default for AssignmentModelConfig {
    fn default() -> Self {
        Self {
            group_split_weight: 1,
            volume_balance_weight: 1,
        }
    }
}

/// Result of one Phase-1 run. UNKNOWN without an incumbent yields
/// `assignment: None`; FEASIBLE incumbents are accepted as assignments.
#[derive(Debug)]
pub struct AssignmentOutcome {
    pub status: SolveStatus,
    pub elapsed: Duration,
    pub assignment: Option<Assignment>,
}

pub struct AssignmentModel {
    sat: SatModel,
    objective: IntVar,
    x: Vec<Vec<BoolVar>>,
    y: Vec<BoolVar>,
}

impl std::fmt::Debug for AssignmentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssignmentModel")
            .field("items", &self.x.len())
            .field("instances", &self.y.len())
            .finish_non_exhaustive()
    }
}

impl AssignmentModel {
    /// Build the assignment model over `max_instances` container slots.
    ///
    /// `fixed` pins item indices to instance indices; every pinned index
    /// must be below `max_instances`.
    pub fn build(
        problem: &Problem,
        max_instances: usize,
        fixed: &BTreeMap<usize, usize>,
        config: &AssignmentModelConfig,
    ) -> Result<Self, ModelBuildError> {
        let n = problem.len();
        let spec = problem.spec();
        let mut sat = SatModel::new();

        debug_assert!(fixed.values().all(|&j| j < max_instances));

        let x: Vec<Vec<BoolVar>> = (0..n)
            .map(|_| {
                (0..max_instances)
                    .map(|_| sat.new_bool())
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<_, _>>()?;
        let y: Vec<BoolVar> = (0..max_instances)
            .map(|_| sat.new_bool())
            .collect::<Result<_, _>>()?;

        // Each item sits in exactly one instance; pinned items in theirs.
        for i in 0..n {
            if let Some(&j) = fixed.get(&i) {
                sat.post_clause([x[i][j].literal()]);
            }
            let row: Vec<(IntVar, i64)> =
                (0..max_instances).map(|j| (x[i][j].channel(), 1)).collect();
            sat.post_linear_eq(&row, 1)?;
        }

        // Capacity rows, gated on instance usage.
        for j in 0..max_instances {
            let mut weight_row: Vec<(IntVar, i64)> = (0..n)
                .map(|i| (x[i][j].channel(), problem.item(i).weight()))
                .collect();
            weight_row.push((y[j].channel(), -spec.max_weight()));
            sat.post_linear_le(&weight_row, 0)?;

            let mut volume_row: Vec<(IntVar, i64)> = (0..n)
                .map(|i| (x[i][j].channel(), problem.item(i).volume()))
                .collect();
            volume_row.push((y[j].channel(), -spec.volume()));
            sat.post_linear_le(&volume_row, 0)?;

            for i in 0..n {
                sat.post_clause([!x[i][j].literal(), y[j].literal()]);
            }
        }

        // Interchangeable instances: used ones come first.
        for j in 1..max_instances {
            sat.post_clause([y[j - 1].literal(), !y[j].literal()]);
        }

        let mut objective_terms: Vec<(IntVar, i64)> = Vec::new();
        let mut objective_constant: i64 = 0;
        let mut objective_ub: i64 = 0;

        for j in 0..max_instances {
            objective_terms.push((y[j].channel(), 1));
        }
        objective_ub += max_instances as i64;

        // Soft group cohesion: span of each group over the instances it
        // touches, penalized above one.
        if config.group_split_weight > 0 && !problem.groups().is_empty() && max_instances > 0 {
            for (_, members) in problem.groups() {
                let mut touches: Vec<(IntVar, i64)> = Vec::with_capacity(max_instances);
                for j in 0..max_instances {
                    let touched = sat.new_bool()?;
                    for &i in members {
                        sat.post_clause([!x[i][j].literal(), touched.literal()]);
                    }
                    touches.push((touched.channel(), 1));
                }
                let span = sat.def_int_eq_sum(1, max_instances as i64, &touches, 0)?;
                objective_terms.push((span, config.group_split_weight));
                objective_constant -= config.group_split_weight;
                objective_ub += config.group_split_weight * (max_instances as i64 - 1);
            }
        }

        // Volume bookkeeping and pairwise imbalance over used instances.
        let volume_used: Vec<IntVar> = (0..max_instances)
            .map(|j| {
                let row: Vec<(IntVar, i64)> = (0..n)
                    .map(|i| (x[i][j].channel(), problem.item(i).volume()))
                    .collect();
                sat.def_int_eq_sum(0, spec.volume(), &row, 0)
            })
            .collect::<Result<_, _>>()?;

        if config.volume_balance_weight > 0 {
            for j1 in 0..max_instances {
                for j2 in j1 + 1..max_instances {
                    let both_used = sat.new_flag();
                    sat.post_clause([!y[j1].literal(), !y[j2].literal(), both_used]);
                    sat.post_clause([!both_used, y[j1].literal()]);
                    sat.post_clause([!both_used, y[j2].literal()]);

                    let diff = sat.new_int(0, spec.volume())?;
                    sat.post_linear_le_if(
                        &[(volume_used[j1], 1), (volume_used[j2], -1), (diff, -1)],
                        0,
                        both_used,
                    )?;
                    sat.post_linear_le_if(
                        &[(volume_used[j2], 1), (volume_used[j1], -1), (diff, -1)],
                        0,
                        both_used,
                    )?;
                    sat.post_linear_eq_if(&[(diff, 1)], 0, !both_used)?;

                    objective_terms.push((diff, config.volume_balance_weight));
                    objective_ub = objective_ub
                        .checked_add(
                            config
                                .volume_balance_weight
                                .checked_mul(spec.volume())
                                .ok_or(ModelBuildError::BoundOutOfRange(i64::MAX))?,
                        )
                        .ok_or(ModelBuildError::BoundOutOfRange(i64::MAX))?;
                }
            }
        }

        let objective = sat.def_int_eq_sum(0, objective_ub, &objective_terms, objective_constant)?;

        Ok(Self {
            sat,
            objective,
            x,
            y,
        })
    }

    /// Hand the model to the solver driver and rebuild an [`Assignment`]
    /// from the incumbent, enumerating used instances in ascending model
    /// order and dropping empty ones.
    pub fn solve(self, time_limit: Duration) -> Result<AssignmentOutcome, SolveError> {
        let n = self.x.len();
        let outcome = sat::solve(self.sat, self.objective, Goal::Minimize, time_limit);
        debug!(status = %outcome.status, "Phase 1 finished");

        let assignment = if outcome.status.has_solution() {
            let valuation = outcome.valuation().map_err(SolveError::from)?;
            let mut instances: Vec<Vec<usize>> = Vec::new();
            for (j, used) in self.y.iter().enumerate() {
                if !valuation.bool(used) {
                    continue;
                }
                let items: Vec<usize> =
                    (0..n).filter(|&i| valuation.bool(&self.x[i][j])).collect();
                if !items.is_empty() {
                    instances.push(items);
                }
            }
            let assignment = Assignment::new(instances);
            if assignment.item_count() != n {
                return Err(SolverInternalError::new(
                    "Phase 1 solution does not cover every item",
                )
                .into());
            }
            Some(assignment)
        } else {
            None
        };

        Ok(AssignmentOutcome {
            status: outcome.status,
            elapsed: outcome.elapsed,
            assignment,
        })
    }
}

/// Log per-instance utilization and group placement of an assignment.
pub fn log_summary(problem: &Problem, assignment: &Assignment) {
    let spec = problem.spec();
    for (j, items) in assignment.instances().iter().enumerate() {
        let weight = assignment.weight_of(j, problem);
        let volume = assignment.volume_of(j, problem);
        debug!(
            instance = j,
            boxes = items.len(),
            weight,
            weight_cap = spec.max_weight(),
            volume,
            volume_cap = spec.volume(),
            "Instance utilization"
        );
    }
    for (group, members) in problem.groups() {
        let mut touched: Vec<usize> = members
            .iter()
            .filter_map(|&i| assignment.locate(i))
            .collect();
        touched.sort_unstable();
        touched.dedup();
        debug!(group = %group, instances = ?touched, "Group placement");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stow_alloc_model::{
        common::{GroupId, ItemId},
        problem::{ContainerSpec, Item},
    };
    use stow_alloc_core::prelude::{Extent3, RotationPolicy};

    fn limit() -> Duration {
        Duration::from_secs(20)
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

    fn solve_fresh(problem: &Problem) -> AssignmentOutcome {
        let model = AssignmentModel::build(
            problem,
            problem.len(),
            &BTreeMap::new(),
            &AssignmentModelConfig::default(),
        )
        .unwrap();
        model.solve(limit()).unwrap()
    }

    #[test]
    fn test_capacity_forces_two_instances() {
        // Container volume 100, weight cap 20. Ten items of volume 15 and
        // weight 3: both budgets force at least two instances.
        let spec = ContainerSpec::new(Extent3::new(5, 5, 4), 20).unwrap();
        let items = (0..10).map(|n| item(n, [5, 3, 1], 3, None)).collect();
        let problem = Problem::new(spec, items).unwrap();

        let outcome = solve_fresh(&problem);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        let assignment = outcome.assignment.unwrap();
        assert_eq!(assignment.num_instances(), 2);
        assert!(assignment.validate(&problem).is_ok());
    }

    #[test]
    fn test_groups_stay_together_when_they_fit() {
        // Both groups fit into one container; the optimum packs all ten
        // items into a single instance with no group split.
        let spec = ContainerSpec::new(Extent3::new(5, 5, 2), 20).unwrap();
        let mut items: Vec<Item> = (0..5).map(|n| item(n, [1, 2, 1], 1, Some(1))).collect();
        items.extend((5..10).map(|n| item(n, [2, 2, 1], 1, Some(2))));
        let problem = Problem::new(spec, items).unwrap();

        let outcome = solve_fresh(&problem);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        let assignment = outcome.assignment.unwrap();
        assert_eq!(assignment.num_instances(), 1);
        assert!(assignment.validate(&problem).is_ok());
    }

    #[test]
    fn test_fixed_assignments_are_honored() {
        let spec = ContainerSpec::new(Extent3::new(4, 4, 4), 100).unwrap();
        let items = (0..4).map(|n| item(n, [1, 1, 1], 1, None)).collect();
        let problem = Problem::new(spec, items).unwrap();

        // Pin items 0 and 1 to different instances.
        let mut fixed = BTreeMap::new();
        fixed.insert(0usize, 0usize);
        fixed.insert(1usize, 1usize);

        let model = AssignmentModel::build(
            &problem,
            problem.len(),
            &fixed,
            &AssignmentModelConfig::default(),
        )
        .unwrap();
        let outcome = model.solve(limit()).unwrap();
        assert!(outcome.status.has_solution());
        let assignment = outcome.assignment.unwrap();
        assert!(assignment.validate(&problem).is_ok());
        assert_ne!(assignment.locate(0), assignment.locate(1));
    }

    #[test]
    fn test_overweight_item_is_infeasible() {
        let spec = ContainerSpec::new(Extent3::new(4, 4, 4), 10).unwrap();
        let problem = Problem::new(spec, vec![item(1, [1, 1, 1], 11, None)]).unwrap();

        let outcome = solve_fresh(&problem);
        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert!(outcome.assignment.is_none());
    }

    #[test]
    fn test_empty_problem_yields_no_instances() {
        let spec = ContainerSpec::new(Extent3::new(4, 4, 4), 10).unwrap();
        let problem = Problem::new(spec, Vec::new()).unwrap();

        let outcome = solve_fresh(&problem);
        assert!(outcome.status.has_solution());
        assert_eq!(outcome.assignment.unwrap().num_instances(), 0);
    }

    #[test]
    fn test_zero_weight_zero_volume_edge() {
        // Weight zero is legal and occupies only its volume.
        let spec = ContainerSpec::new(Extent3::new(2, 2, 2), 5).unwrap();
        let items = vec![item(1, [1, 1, 1], 0, None), item(2, [2, 2, 2], 5, None)];
        let problem = Problem::new(spec, items).unwrap();

        let outcome = solve_fresh(&problem);
        assert!(outcome.status.has_solution());
        let assignment = outcome.assignment.unwrap();
        assert!(assignment.validate(&problem).is_ok());
        // Volumes 1 + 8 exceed the 8-volume container: two instances.
        assert_eq!(assignment.num_instances(), 2);
    }
}
