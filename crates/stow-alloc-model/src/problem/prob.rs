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
    common::GroupId,
    problem::{ContainerSpec, Item, err::ProblemError, err::QuantityOverflowError},
};
use std::collections::BTreeMap;
use stow_alloc_core::prelude::checked_total;

/// An immutable container loading instance: one container specification
/// and the list of items to load. Group membership is derived once at
/// construction; the map iterates groups in stable order.
#[derive(Debug, Clone)]
pub struct Problem {
    spec: ContainerSpec,
    items: Vec<Item>,
    groups: BTreeMap<GroupId, Vec<usize>>,
    total_weight: i64,
    total_volume: i64,
}

impl Problem {
    pub fn new(spec: ContainerSpec, items: Vec<Item>) -> Result<Self, ProblemError> {
        let total_weight =
            checked_total(items.iter().map(|i| i.weight())).ok_or(QuantityOverflowError)?;
        let total_volume =
            checked_total(items.iter().map(|i| i.volume())).ok_or(QuantityOverflowError)?;

        let mut groups: BTreeMap<GroupId, Vec<usize>> = BTreeMap::new();
        for (idx, item) in items.iter().enumerate() {
            if let Some(g) = item.group() {
                groups.entry(g).or_default().push(idx);
            }
        }

        Ok(Self {
            spec,
            items,
            groups,
            total_weight,
            total_volume,
        })
    }

    #[inline]
    pub fn spec(&self) -> &ContainerSpec {
        &self.spec
    }

    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[inline]
    pub fn item(&self, index: usize) -> &Item {
        &self.items[index]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Group id → item indices, in stable group order.
    #[inline]
    pub fn groups(&self) -> &BTreeMap<GroupId, Vec<usize>> {
        &self.groups
    }

    #[inline]
    pub fn total_weight(&self) -> i64 {
        self.total_weight
    }

    #[inline]
    pub fn total_volume(&self) -> i64 {
        self.total_volume
    }

    /// The first item that cannot be placed in an empty container under
    /// any of its allowed orientations, if one exists. Such an item makes
    /// the whole instance infeasible regardless of the assignment.
    pub fn first_unplaceable_item(&self) -> Option<usize> {
        let dims = self.spec.dims();
        self.items.iter().position(|i| !i.fits_somehow(&dims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ItemId;
    use stow_alloc_core::prelude::{Extent3, RotationPolicy};

    fn spec() -> ContainerSpec {
        ContainerSpec::new(Extent3::new(10, 10, 10), 100).unwrap()
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

    #[test]
    fn test_totals_and_groups() {
        let p = Problem::new(
            spec(),
            vec![
                item(1, [1, 1, 1], 2, Some(7)),
                item(2, [2, 2, 2], 3, Some(7)),
                item(3, [1, 2, 3], 4, None),
            ],
        )
        .unwrap();
        assert_eq!(p.total_weight(), 9);
        assert_eq!(p.total_volume(), 1 + 8 + 6);
        assert_eq!(p.groups().len(), 1);
        assert_eq!(p.groups()[&GroupId::new(7)], vec![0, 1]);
    }

    #[test]
    fn test_first_unplaceable_item() {
        let p = Problem::new(
            spec(),
            vec![item(1, [1, 1, 1], 1, None), item(2, [11, 1, 1], 1, None)],
        )
        .unwrap();
        // Index 1 is too long for a 10-cube even under free rotation.
        assert_eq!(p.first_unplaceable_item(), Some(1));
    }

    #[test]
    fn test_empty_problem() {
        let p = Problem::new(spec(), Vec::new()).unwrap();
        assert!(p.is_empty());
        assert_eq!(p.total_volume(), 0);
        assert_eq!(p.first_unplaceable_item(), None);
    }
}
