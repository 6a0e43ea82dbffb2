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

//! The solver driver: runs a finished [`SatModel`] under a wall-clock
//! budget and maps the backend's result onto [`SolveStatus`]. Downstream
//! code never sees backend statuses or solution objects directly.

use crate::{
    err::NoSolutionError,
    sat::model::{BoolVar, IntVar, SatModel},
};
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution, Solution, SolutionReference};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::DefaultBrancher;
use pumpkin_solver::Solver;
use std::time::{Duration, Instant};
use stow_alloc_model::prelude::SolveStatus;
use tracing::debug;

/// Objective sense for one solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Minimize,
    Maximize,
}

/// Extracts variable values from a completed run. Only exists for
/// outcomes whose status carries a solution.
pub struct Valuation {
    solution: Solution,
}

impl std::fmt::Debug for Valuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Valuation").finish_non_exhaustive()
    }
}

impl Valuation {
    #[inline]
    pub fn int(&self, var: IntVar) -> i64 {
        i64::from(self.solution.get_integer_value(var.domain()))
    }

    #[inline]
    pub fn bool(&self, var: &BoolVar) -> bool {
        self.solution.get_literal_value(var.literal())
    }
}

/// Status, elapsed wall-clock time, and (when available) the solution.
#[derive(Debug)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub elapsed: Duration,
    valuation: Option<Valuation>,
}

impl SolveOutcome {
    /// The value extractor; fails with [`NoSolutionError`] unless the
    /// status is OPTIMAL or FEASIBLE.
    pub fn valuation(&self) -> Result<&Valuation, NoSolutionError> {
        self.valuation.as_ref().ok_or(NoSolutionError)
    }
}

fn no_op_solution_callback(
    _solver: &Solver,
    _solution: SolutionReference,
    _brancher: &DefaultBrancher,
) {
}

/// Run the model to completion or until `time_limit` expires.
///
/// Status mapping: proven optimum → OPTIMAL; an incumbent without proof →
/// FEASIBLE; proven unsatisfiable (including a root-level conflict while
/// posting) → INFEASIBLE; budget exhausted with no incumbent → UNKNOWN.
pub fn solve(model: SatModel, objective: IntVar, goal: Goal, time_limit: Duration) -> SolveOutcome {
    let started = Instant::now();
    let (mut solver, root_conflict) = model.into_solver();

    if root_conflict {
        debug!("Model conflicts at the root; reporting INFEASIBLE without search");
        return SolveOutcome {
            status: SolveStatus::Infeasible,
            elapsed: started.elapsed(),
            valuation: None,
        };
    }

    let mut brancher = solver.default_brancher();
    let mut termination = TimeBudget::starting_now(time_limit);

    let direction = match goal {
        Goal::Minimize => OptimisationDirection::Minimise,
        Goal::Maximize => OptimisationDirection::Maximise,
    };
    let procedure = LinearSatUnsat::new(direction, objective.domain(), no_op_solution_callback);
    let result = solver.optimise(&mut brancher, &mut termination, procedure);

    let (status, valuation) = match result {
        OptimisationResult::Optimal(solution) => (
            SolveStatus::Optimal,
            Some(Valuation { solution }),
        ),
        OptimisationResult::Satisfiable(solution) => (
            SolveStatus::Feasible,
            Some(Valuation { solution }),
        ),
        OptimisationResult::Unsatisfiable => (SolveStatus::Infeasible, None),
        OptimisationResult::Unknown => (SolveStatus::Unknown, None),
    };

    let elapsed = started.elapsed();
    debug!(status = %status, ?elapsed, "Solver run finished");

    SolveOutcome {
        status,
        elapsed,
        valuation,
    }
}
