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

use stow_alloc_core::prelude::{Extent3, Orientation, Point3};

/// Outcome of one solver run, as reported downstream. Every consumer
/// pattern-matches on this; solver-internal codes never escape the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    /// A solution is available to extract.
    #[inline]
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One placed box: which item, which orientation, where, and the rotated
/// extent that orientation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub item: usize,
    pub orientation: Orientation,
    pub position: Point3<i64>,
    pub size: Extent3<i64>,
}

impl Placement {
    /// Exclusive upper corner.
    #[inline]
    pub fn far_corner(&self) -> Point3<i64> {
        Point3::new(
            self.position.x + self.size.length(),
            self.position.y + self.size.width(),
            self.position.z + self.size.height(),
        )
    }
}

/// Phase-2 result for a single container instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLoad {
    pub status: SolveStatus,
    pub placements: Vec<Placement>,
}

impl ContainerLoad {
    #[inline]
    pub fn new(status: SolveStatus, placements: Vec<Placement>) -> Self {
        Self { status, placements }
    }

    /// An empty container is trivially packable.
    #[inline]
    pub fn empty() -> Self {
        Self {
            status: SolveStatus::Optimal,
            placements: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_solution() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(SolveStatus::Infeasible.as_str(), "INFEASIBLE");
        assert_eq!(SolveStatus::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_far_corner() {
        let p = Placement {
            item: 0,
            orientation: Orientation::identity(),
            position: Point3::new(1, 2, 3),
            size: Extent3::new(4, 5, 6),
        };
        assert_eq!(p.far_corner(), Point3::new(5, 7, 9));
    }
}
