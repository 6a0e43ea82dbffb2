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

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    IterationLimit,
    NoImproveLimit,
    Deadline,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::IterationLimit => write!(f, "maximum iterations reached"),
            StopReason::NoImproveLimit => write!(f, "no improvement for too long"),
            StopReason::Deadline => write!(f, "wall-clock deadline reached"),
        }
    }
}

/// Terminates the ALNS loop on iteration count, stagnation, or the
/// wall-clock deadline; queried exactly once per iteration, after
/// acceptance.
#[derive(Debug, Clone)]
pub struct StopCriteria {
    max_iterations: usize,
    max_no_improve: usize,
    deadline: Instant,
    iteration: usize,
    since_improvement: usize,
}

impl StopCriteria {
    pub fn new(max_iterations: usize, max_no_improve: usize, time_limit: Duration) -> Self {
        Self {
            max_iterations,
            max_no_improve,
            deadline: Instant::now() + time_limit,
            iteration: 0,
            since_improvement: 0,
        }
    }

    #[inline]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Record one finished iteration and report why to stop, if at all.
    pub fn on_iteration(&mut self, improved_best: bool) -> Option<StopReason> {
        self.iteration += 1;
        if improved_best {
            self.since_improvement = 0;
        } else {
            self.since_improvement += 1;
        }

        if self.iteration >= self.max_iterations {
            return Some(StopReason::IterationLimit);
        }
        if self.since_improvement >= self.max_no_improve {
            return Some(StopReason::NoImproveLimit);
        }
        if Instant::now() >= self.deadline {
            return Some(StopReason::Deadline);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long() -> Duration {
        Duration::from_secs(3600)
    }

    #[test]
    fn test_iteration_limit() {
        let mut stop = StopCriteria::new(3, 100, long());
        assert_eq!(stop.on_iteration(true), None);
        assert_eq!(stop.on_iteration(true), None);
        assert_eq!(stop.on_iteration(true), Some(StopReason::IterationLimit));
        assert_eq!(stop.iteration(), 3);
    }

    #[test]
    fn test_no_improve_limit_resets_on_improvement() {
        let mut stop = StopCriteria::new(100, 2, long());
        assert_eq!(stop.on_iteration(false), None);
        assert_eq!(stop.on_iteration(true), None);
        assert_eq!(stop.on_iteration(false), None);
        assert_eq!(stop.on_iteration(false), Some(StopReason::NoImproveLimit));
    }

    #[test]
    fn test_deadline() {
        let mut stop = StopCriteria::new(100, 100, Duration::from_secs(0));
        assert_eq!(stop.on_iteration(true), Some(StopReason::Deadline));
    }
}
