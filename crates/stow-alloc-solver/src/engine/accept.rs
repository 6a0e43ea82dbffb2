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

use crate::engine::state::SearchState;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// What to do with a repaired candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptDecision {
    Reject,
    /// Replace the current state only.
    AcceptCurrent,
    /// Replace both the current and the best state.
    AcceptBest,
}

pub trait Acceptor {
    fn name(&self) -> &str;
    fn decide(
        &self,
        best: &SearchState,
        current: &SearchState,
        candidate: &SearchState,
        rng: &mut ChaCha8Rng,
    ) -> AcceptDecision;
}

impl std::fmt::Display for dyn Acceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Feasible candidates that strictly beat the best become the new best;
/// ones that beat only the current replace it; the rest still replace
/// the current with a small uphill probability.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAcceptor {
    pub uphill_probability: f64,
}

impl Default for ScoreAcceptor {
    fn default() -> Self {
        Self {
            uphill_probability: 0.05,
        }
    }
}

impl Acceptor for ScoreAcceptor {
    fn name(&self) -> &str {
        "ScoreAcceptor"
    }

    fn decide(
        &self,
        best: &SearchState,
        current: &SearchState,
        candidate: &SearchState,
        rng: &mut ChaCha8Rng,
    ) -> AcceptDecision {
        if !candidate.is_feasible() {
            return AcceptDecision::Reject;
        }
        let Some(candidate_score) = candidate.score() else {
            return AcceptDecision::Reject;
        };
        let best_score = best.score().unwrap_or(i64::MAX);
        let current_score = current.score().unwrap_or(i64::MAX);

        if candidate_score < best_score {
            AcceptDecision::AcceptBest
        } else if candidate_score < current_score {
            AcceptDecision::AcceptCurrent
        } else if rng.random_bool(self.uphill_probability) {
            AcceptDecision::AcceptCurrent
        } else {
            AcceptDecision::Reject
        }
    }
}

#[cfg(test)]
mod object_safety {
    use super::*;
    use static_assertions::assert_obj_safe;

    assert_obj_safe!(Acceptor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use stow_alloc_model::prelude::{Assignment, ContainerLoad, SolveStatus};

    fn evaluated(score: i64, feasible: bool) -> SearchState {
        let mut state = SearchState::from_assignment(Assignment::new(vec![vec![0]]));
        let status = if feasible {
            SolveStatus::Optimal
        } else {
            SolveStatus::Infeasible
        };
        state.set_evaluation(vec![ContainerLoad::new(status, Vec::new())], score);
        state
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_infeasible_candidate_is_rejected() {
        let acceptor = ScoreAcceptor::default();
        let decision = acceptor.decide(
            &evaluated(0, true),
            &evaluated(0, true),
            &evaluated(-100, false),
            &mut rng(),
        );
        assert_eq!(decision, AcceptDecision::Reject);
    }

    #[test]
    fn test_unevaluated_candidate_is_rejected() {
        let acceptor = ScoreAcceptor::default();
        let dirty = SearchState::from_assignment(Assignment::new(vec![vec![0]]));
        let decision =
            acceptor.decide(&evaluated(0, true), &evaluated(0, true), &dirty, &mut rng());
        assert_eq!(decision, AcceptDecision::Reject);
    }

    #[test]
    fn test_better_than_best_is_promoted() {
        let acceptor = ScoreAcceptor::default();
        let decision = acceptor.decide(
            &evaluated(-2, true),
            &evaluated(0, true),
            &evaluated(-4, true),
            &mut rng(),
        );
        assert_eq!(decision, AcceptDecision::AcceptBest);
    }

    #[test]
    fn test_better_than_current_only_moves_current() {
        let acceptor = ScoreAcceptor::default();
        let decision = acceptor.decide(
            &evaluated(-10, true),
            &evaluated(0, true),
            &evaluated(-4, true),
            &mut rng(),
        );
        assert_eq!(decision, AcceptDecision::AcceptCurrent);
    }

    #[test]
    fn test_equal_score_never_becomes_best() {
        let acceptor = ScoreAcceptor {
            uphill_probability: 1.0,
        };
        // With certain uphill, an equal candidate still only replaces
        // the current state.
        let decision = acceptor.decide(
            &evaluated(-4, true),
            &evaluated(-4, true),
            &evaluated(-4, true),
            &mut rng(),
        );
        assert_eq!(decision, AcceptDecision::AcceptCurrent);
    }

    #[test]
    fn test_no_uphill_without_luck() {
        let acceptor = ScoreAcceptor {
            uphill_probability: 0.0,
        };
        let decision = acceptor.decide(
            &evaluated(-4, true),
            &evaluated(-4, true),
            &evaluated(0, true),
            &mut rng(),
        );
        assert_eq!(decision, AcceptDecision::Reject);
    }
}
