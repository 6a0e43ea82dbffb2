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

use crate::{problem::Problem, solution::err::AssignmentError};

/// A partition of item indices over an ordered sequence of container
/// instances. Geometry-free: Phase 2 turns this into placements.
///
/// Assignments are value objects; operators never mutate one in place but
/// derive fresh assignments instead.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    instances: Vec<Vec<usize>>,
}

impl Assignment {
    #[inline]
    pub fn new(instances: Vec<Vec<usize>>) -> Self {
        Self { instances }
    }

    #[inline]
    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn instances(&self) -> &[Vec<usize>] {
        &self.instances
    }

    #[inline]
    pub fn instance(&self, j: usize) -> &[usize] {
        &self.instances[j]
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.instances.iter().map(Vec::len).sum()
    }

    /// Instance index holding `item`, if any.
    pub fn locate(&self, item: usize) -> Option<usize> {
        self.instances
            .iter()
            .position(|inst| inst.contains(&item))
    }

    /// All (instance, slot) coordinates, flattened in instance order.
    pub fn entries(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.item_count());
        for (j, inst) in self.instances.iter().enumerate() {
            for slot in 0..inst.len() {
                out.push((j, slot));
            }
        }
        out
    }

    pub fn weight_of(&self, j: usize, problem: &Problem) -> i64 {
        self.instances[j]
            .iter()
            .map(|&i| problem.item(i).weight())
            .sum()
    }

    pub fn volume_of(&self, j: usize, problem: &Problem) -> i64 {
        self.instances[j]
            .iter()
            .map(|&i| problem.item(i).volume())
            .sum()
    }

    /// Check the Phase-1 invariants against `problem`: every item in
    /// exactly one instance, weight and volume within capacity everywhere.
    pub fn validate(&self, problem: &Problem) -> Result<(), AssignmentError> {
        let mut seen = vec![false; problem.len()];
        for inst in &self.instances {
            for &i in inst {
                if i >= problem.len() {
                    return Err(AssignmentError::ItemOutOfRange { item: i });
                }
                if seen[i] {
                    return Err(AssignmentError::ItemDuplicated { item: i });
                }
                seen[i] = true;
            }
        }
        if let Some(item) = seen.iter().position(|&s| !s) {
            return Err(AssignmentError::ItemUnassigned { item });
        }

        let spec = problem.spec();
        for (j, _) in self.instances.iter().enumerate() {
            let weight = self.weight_of(j, problem);
            if weight > spec.max_weight() {
                return Err(AssignmentError::WeightExceeded {
                    instance: j,
                    total: weight,
                    cap: spec.max_weight(),
                });
            }
            let volume = self.volume_of(j, problem);
            if volume > spec.volume() {
                return Err(AssignmentError::VolumeExceeded {
                    instance: j,
                    total: volume,
                    cap: spec.volume(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::ItemId, problem::{ContainerSpec, Item}};
    use stow_alloc_core::prelude::{Extent3, RotationPolicy};

    fn problem(weights: &[i64]) -> Problem {
        let spec = ContainerSpec::new(Extent3::new(4, 4, 4), 10).unwrap();
        let items = weights
            .iter()
            .enumerate()
            .map(|(n, &w)| {
                Item::new(
                    ItemId::new(n as i64 + 1),
                    Extent3::new(1, 1, 1),
                    w,
                    RotationPolicy::Fixed,
                    None,
                )
                .unwrap()
            })
            .collect();
        Problem::new(spec, items).unwrap()
    }

    #[test]
    fn test_valid_assignment_passes() {
        let p = problem(&[3, 3, 3]);
        let a = Assignment::new(vec![vec![0, 2], vec![1]]);
        assert!(a.validate(&p).is_ok());
        assert_eq!(a.item_count(), 3);
        assert_eq!(a.locate(2), Some(0));
        assert_eq!(a.locate(1), Some(1));
    }

    #[test]
    fn test_missing_item_detected() {
        let p = problem(&[1, 1]);
        let a = Assignment::new(vec![vec![0]]);
        assert_eq!(
            a.validate(&p),
            Err(AssignmentError::ItemUnassigned { item: 1 })
        );
    }

    #[test]
    fn test_duplicated_item_detected() {
        let p = problem(&[1, 1]);
        let a = Assignment::new(vec![vec![0, 1], vec![0]]);
        assert_eq!(
            a.validate(&p),
            Err(AssignmentError::ItemDuplicated { item: 0 })
        );
    }

    #[test]
    fn test_weight_capacity_enforced() {
        let p = problem(&[6, 6]);
        let a = Assignment::new(vec![vec![0, 1]]);
        assert!(matches!(
            a.validate(&p),
            Err(AssignmentError::WeightExceeded { instance: 0, .. })
        ));
    }

    #[test]
    fn test_entries_are_flat_in_instance_order() {
        let a = Assignment::new(vec![vec![5, 7], vec![], vec![9]]);
        assert_eq!(a.entries(), vec![(0, 0), (0, 1), (2, 0)]);
    }
}
