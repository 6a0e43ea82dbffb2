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

use crate::common::ItemId;
use stow_alloc_core::prelude::Extent3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonPositiveDimensionError {
    id: ItemId,
    dims: Extent3<i64>,
}

impl NonPositiveDimensionError {
    pub fn new(id: ItemId, dims: Extent3<i64>) -> Self {
        Self { id, dims }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn dims(&self) -> Extent3<i64> {
        self.dims
    }
}

impl std::fmt::Display for NonPositiveDimensionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Item {} has non-positive dimensions {}",
            self.id, self.dims
        )
    }
}

impl std::error::Error for NonPositiveDimensionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeWeightError {
    id: ItemId,
    weight: i64,
}

impl NegativeWeightError {
    pub fn new(id: ItemId, weight: i64) -> Self {
        Self { id, weight }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }
}

impl std::fmt::Display for NegativeWeightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Item {} has negative weight {}", self.id, self.weight)
    }
}

impl std::error::Error for NegativeWeightError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidContainerSpecError {
    dims: Extent3<i64>,
    max_weight: i64,
}

impl InvalidContainerSpecError {
    pub fn new(dims: Extent3<i64>, max_weight: i64) -> Self {
        Self { dims, max_weight }
    }

    pub fn dims(&self) -> Extent3<i64> {
        self.dims
    }

    pub fn max_weight(&self) -> i64 {
        self.max_weight
    }
}

impl std::fmt::Display for InvalidContainerSpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Container spec {} with weight capacity {} is invalid; all values must be positive",
            self.dims, self.max_weight
        )
    }
}

impl std::error::Error for InvalidContainerSpecError {}

/// A total (weight or volume) does not fit into 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuantityOverflowError;

impl std::fmt::Display for QuantityOverflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A weight or volume total overflows a 64-bit integer")
    }
}

impl std::error::Error for QuantityOverflowError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    NonPositiveDimension(NonPositiveDimensionError),
    NegativeWeight(NegativeWeightError),
    InvalidContainerSpec(InvalidContainerSpecError),
    QuantityOverflow(QuantityOverflowError),
}

impl std::fmt::Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemError::NonPositiveDimension(e) => e.fmt(f),
            ProblemError::NegativeWeight(e) => e.fmt(f),
            ProblemError::InvalidContainerSpec(e) => e.fmt(f),
            ProblemError::QuantityOverflow(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ProblemError {}

impl From<NonPositiveDimensionError> for ProblemError {
    fn from(e: NonPositiveDimensionError) -> Self {
        ProblemError::NonPositiveDimension(e)
    }
}

impl From<NegativeWeightError> for ProblemError {
    fn from(e: NegativeWeightError) -> Self {
        ProblemError::NegativeWeight(e)
    }
}

impl From<InvalidContainerSpecError> for ProblemError {
    fn from(e: InvalidContainerSpecError) -> Self {
        ProblemError::InvalidContainerSpec(e)
    }
}

impl From<QuantityOverflowError> for ProblemError {
    fn from(e: QuantityOverflowError) -> Self {
        ProblemError::QuantityOverflow(e)
    }
}
