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

/// Phase 1 could not produce any assignment: the items do not fit the
/// weight and volume budget, or an item cannot be placed in an empty
/// container at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentInfeasibleError {
    unplaceable_item: Option<usize>,
}

impl AssignmentInfeasibleError {
    pub fn new() -> Self {
        Self {
            unplaceable_item: None,
        }
    }

    pub fn for_item(item: usize) -> Self {
        Self {
            unplaceable_item: Some(item),
        }
    }

    pub fn unplaceable_item(&self) -> Option<usize> {
        self.unplaceable_item
    }
}

impl Default for AssignmentInfeasibleError {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssignmentInfeasibleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.unplaceable_item {
            Some(i) => write!(
                f,
                "No feasible assignment: item index {i} fits no container under its rotation policy"
            ),
            None => write!(f, "No feasible assignment within the weight and volume budget"),
        }
    }
}

impl std::error::Error for AssignmentInfeasibleError {}

/// An unexpected condition inside the solving machinery: a variable bound
/// the backend cannot represent, or a missing value where the status
/// promised one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverInternalError {
    detail: String,
}

impl SolverInternalError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl std::fmt::Display for SolverInternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Solver internal error: {}", self.detail)
    }
}

impl std::error::Error for SolverInternalError {}

/// Requested a variable value from an outcome that carries no solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoSolutionError;

impl std::fmt::Display for NoSolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "No solution is available for this outcome")
    }
}

impl std::error::Error for NoSolutionError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    AssignmentInfeasible(AssignmentInfeasibleError),
    Internal(SolverInternalError),
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::AssignmentInfeasible(e) => e.fmt(f),
            SolveError::Internal(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for SolveError {}

impl From<AssignmentInfeasibleError> for SolveError {
    fn from(e: AssignmentInfeasibleError) -> Self {
        SolveError::AssignmentInfeasible(e)
    }
}

impl From<SolverInternalError> for SolveError {
    fn from(e: SolverInternalError) -> Self {
        SolveError::Internal(e)
    }
}

impl From<NoSolutionError> for SolveError {
    fn from(e: NoSolutionError) -> Self {
        SolveError::Internal(SolverInternalError::new(e.to_string()))
    }
}

impl From<crate::sat::ModelBuildError> for SolverInternalError {
    fn from(e: crate::sat::ModelBuildError) -> Self {
        SolverInternalError::new(e.to_string())
    }
}

impl From<crate::sat::ModelBuildError> for SolveError {
    fn from(e: crate::sat::ModelBuildError) -> Self {
        SolveError::Internal(SolverInternalError::from(e))
    }
}
