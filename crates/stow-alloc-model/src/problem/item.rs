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
    common::{GroupId, ItemId},
    problem::err::{NegativeWeightError, NonPositiveDimensionError, ProblemError},
};
use smallvec::SmallVec;
use stow_alloc_core::prelude::{Extent3, Orientation, RotationPolicy};

/// A box to be loaded. Immutable after construction; the nominal volume is
/// computed once and cached.
///
/// Items are addressed by their position in the problem's item list
/// everywhere in the solver. The `id` is a label from the input document
/// and may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    id: ItemId,
    dims: Extent3<i64>,
    weight: i64,
    rotation: RotationPolicy,
    group: Option<GroupId>,
    volume: i64,
}

impl Item {
    pub fn new(
        id: ItemId,
        dims: Extent3<i64>,
        weight: i64,
        rotation: RotationPolicy,
        group: Option<GroupId>,
    ) -> Result<Self, ProblemError> {
        if !dims.all_positive() {
            return Err(NonPositiveDimensionError::new(id, dims).into());
        }
        if weight < 0 {
            return Err(NegativeWeightError::new(id, weight).into());
        }
        let volume = dims
            .checked_volume()
            .ok_or(crate::problem::err::QuantityOverflowError)?;
        Ok(Self {
            id,
            dims,
            weight,
            rotation,
            group,
            volume,
        })
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[inline]
    pub fn dims(&self) -> Extent3<i64> {
        self.dims
    }

    #[inline]
    pub fn weight(&self) -> i64 {
        self.weight
    }

    #[inline]
    pub fn rotation(&self) -> RotationPolicy {
        self.rotation
    }

    #[inline]
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    /// Nominal volume; rotation-invariant.
    #[inline]
    pub fn volume(&self) -> i64 {
        self.volume
    }

    #[inline]
    pub fn is_cube(&self) -> bool {
        self.dims.is_cube()
    }

    /// The rotation policy the placement model works with. Cubes collapse
    /// to a single orientation: every permutation yields the same extent.
    #[inline]
    pub fn effective_rotation(&self) -> RotationPolicy {
        if self.is_cube() {
            RotationPolicy::Fixed
        } else {
            self.rotation
        }
    }

    /// Allowed orientations after cube collapse, in canonical order.
    #[inline]
    pub fn allowed_orientations(&self) -> SmallVec<[Orientation; 6]> {
        self.effective_rotation().allowed_orientations()
    }

    /// Whether at least one allowed orientation fits `within`.
    pub fn fits_somehow(&self, within: &Extent3<i64>) -> bool {
        self.allowed_orientations()
            .iter()
            .any(|o| o.apply(&self.dims).fits_within(within))
    }
}
