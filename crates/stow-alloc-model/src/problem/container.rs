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

use crate::problem::err::{InvalidContainerSpecError, ProblemError, QuantityOverflowError};
use stow_alloc_core::prelude::Extent3;

/// The interior geometry and payload capacity shared by all container
/// instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerSpec {
    dims: Extent3<i64>,
    max_weight: i64,
    volume: i64,
}

impl ContainerSpec {
    pub fn new(dims: Extent3<i64>, max_weight: i64) -> Result<Self, ProblemError> {
        if !dims.all_positive() || max_weight <= 0 {
            return Err(InvalidContainerSpecError::new(dims, max_weight).into());
        }
        let volume = dims.checked_volume().ok_or(QuantityOverflowError)?;
        Ok(Self {
            dims,
            max_weight,
            volume,
        })
    }

    #[inline]
    pub fn dims(&self) -> Extent3<i64> {
        self.dims
    }

    #[inline]
    pub fn max_weight(&self) -> i64 {
        self.max_weight
    }

    #[inline]
    pub fn volume(&self) -> i64 {
        self.volume
    }
}

impl std::fmt::Display for ContainerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (payload {})", self.dims, self.max_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_spec() {
        let spec = ContainerSpec::new(Extent3::new(12, 2, 2), 1000).unwrap();
        assert_eq!(spec.volume(), 48);
        assert_eq!(spec.max_weight(), 1000);
    }

    #[test]
    fn test_rejects_zero_dimension_or_capacity() {
        assert!(ContainerSpec::new(Extent3::new(0, 2, 2), 1000).is_err());
        assert!(ContainerSpec::new(Extent3::new(1, 2, 2), 0).is_err());
    }
}
