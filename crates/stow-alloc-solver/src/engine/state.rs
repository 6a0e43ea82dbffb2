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

use stow_alloc_model::prelude::{Assignment, ContainerLoad, SolveStatus};

/// Phase-2 results for every instance of an assignment plus the
/// aggregate score derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub loads: Vec<ContainerLoad>,
    pub score: i64,
}

/// The unit the ALNS loop manipulates: an assignment, the cached
/// evaluation of it (absent while dirty), and the items a destroy step
/// has taken out and a repair step still has to reinsert.
///
/// Cloning is the deep copy the operators rely on; the assignment is the
/// only component that grows with the instance.
#[derive(Debug, Clone)]
pub struct SearchState {
    assignment: Assignment,
    evaluation: Option<Evaluation>,
    removed: Vec<usize>,
}

impl SearchState {
    pub fn from_assignment(assignment: Assignment) -> Self {
        Self {
            assignment,
            evaluation: None,
            removed: Vec::new(),
        }
    }

    pub(crate) fn partial(assignment: Assignment, removed: Vec<usize>) -> Self {
        Self {
            assignment,
            evaluation: None,
            removed,
        }
    }

    #[inline]
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Items removed by destroy and not yet reinserted.
    #[inline]
    pub fn removed(&self) -> &[usize] {
        &self.removed
    }

    /// Complete states carry no pending removals.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.removed.is_empty()
    }

    #[inline]
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Cached aggregate score; `None` while dirty.
    #[inline]
    pub fn score(&self) -> Option<i64> {
        self.evaluation.as_ref().map(|e| e.score)
    }

    /// Feasible iff evaluated and no container ended INFEASIBLE.
    pub fn is_feasible(&self) -> bool {
        match &self.evaluation {
            Some(e) => e
                .loads
                .iter()
                .all(|l| l.status != SolveStatus::Infeasible),
            None => false,
        }
    }

    pub(crate) fn set_evaluation(&mut self, loads: Vec<ContainerLoad>, score: i64) {
        debug_assert_eq!(loads.len(), self.assignment.num_instances());
        self.evaluation = Some(Evaluation { loads, score });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stow_alloc_model::prelude::ContainerLoad;

    fn assignment() -> Assignment {
        Assignment::new(vec![vec![0, 1], vec![2]])
    }

    #[test]
    fn test_fresh_state_is_dirty() {
        let state = SearchState::from_assignment(assignment());
        assert!(state.score().is_none());
        assert!(!state.is_feasible());
        assert!(state.is_complete());
    }

    #[test]
    fn test_evaluation_caches_score_and_feasibility() {
        let mut state = SearchState::from_assignment(assignment());
        state.set_evaluation(vec![ContainerLoad::empty(), ContainerLoad::empty()], -4);
        assert_eq!(state.score(), Some(-4));
        assert!(state.is_feasible());
    }

    #[test]
    fn test_infeasible_load_marks_state() {
        let mut state = SearchState::from_assignment(assignment());
        state.set_evaluation(
            vec![
                ContainerLoad::empty(),
                ContainerLoad::new(SolveStatus::Infeasible, Vec::new()),
            ],
            998,
        );
        assert!(!state.is_feasible());
    }

    #[test]
    fn test_partial_state_is_incomplete() {
        let state = SearchState::partial(Assignment::new(vec![vec![0]]), vec![1, 2]);
        assert!(!state.is_complete());
        assert_eq!(state.removed(), &[1, 2]);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = SearchState::from_assignment(assignment());
        original.set_evaluation(vec![ContainerLoad::empty(), ContainerLoad::empty()], 0);
        let copy = original.clone();
        // Re-evaluating the original must not touch the copy.
        original.set_evaluation(vec![ContainerLoad::empty(), ContainerLoad::empty()], 7);
        assert_eq!(copy.score(), Some(0));
        assert_eq!(original.score(), Some(7));
    }
}
