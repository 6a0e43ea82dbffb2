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

//! Geometric checks over one container's placements: in-bounds,
//! pairwise non-overlap, floor-or-support, and rotation legality.
//! These are the externally observable guarantees of the placement
//! phase, expressed as plain code so tests and callers can audit any
//! solution without touching the solver.

use crate::{problem::Problem, solution::placement::Placement};
use stow_alloc_core::prelude::Axis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementViolation {
    /// The placement list does not cover exactly the given items.
    ItemSetMismatch,
    OutOfBounds { item: usize, axis: Axis },
    Overlap { first: usize, second: usize },
    Floating { item: usize },
    DisallowedOrientation { item: usize },
    WrongEffectiveSize { item: usize },
}

impl std::fmt::Display for PlacementViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementViolation::ItemSetMismatch => {
                write!(f, "Placements do not match the assigned item set")
            }
            PlacementViolation::OutOfBounds { item, axis } => {
                write!(f, "Item index {item} exceeds the container along {axis}")
            }
            PlacementViolation::Overlap { first, second } => {
                write!(f, "Item indices {first} and {second} overlap")
            }
            PlacementViolation::Floating { item } => {
                write!(f, "Item index {item} floats without support")
            }
            PlacementViolation::DisallowedOrientation { item } => {
                write!(f, "Item index {item} uses an orientation its policy forbids")
            }
            PlacementViolation::WrongEffectiveSize { item } => {
                write!(f, "Item index {item} reports a size its orientation cannot produce")
            }
        }
    }
}

impl std::error::Error for PlacementViolation {}

#[inline]
fn open_interval_overlap(a_lo: i64, a_hi: i64, b_lo: i64, b_hi: i64) -> bool {
    a_lo < b_hi && b_lo < a_hi
}

fn separated(a: &Placement, b: &Placement) -> bool {
    for axis in Axis::ALL {
        let (a_lo, b_lo) = (a.position.along(axis), b.position.along(axis));
        let (a_hi, b_hi) = (a_lo + a.size.along(axis), b_lo + b.size.along(axis));
        if !open_interval_overlap(a_lo, a_hi, b_lo, b_hi) {
            return true;
        }
    }
    false
}

fn supported(p: &Placement, others: &[Placement]) -> bool {
    if p.position.z == 0 {
        return true;
    }
    others.iter().any(|s| {
        !std::ptr::eq(s, p)
            && s.position.z + s.size.height() == p.position.z
            && open_interval_overlap(
                p.position.x,
                p.position.x + p.size.length(),
                s.position.x,
                s.position.x + s.size.length(),
            )
            && open_interval_overlap(
                p.position.y,
                p.position.y + p.size.width(),
                s.position.y,
                s.position.y + s.size.width(),
            )
    })
}

/// Validate the placements of one container against the items assigned to
/// it. Returns every violation found, empty for a sound layout.
pub fn validate_container(
    problem: &Problem,
    items: &[usize],
    placements: &[Placement],
) -> Vec<PlacementViolation> {
    let mut violations = Vec::new();

    let mut expected: Vec<usize> = items.to_vec();
    let mut got: Vec<usize> = placements.iter().map(|p| p.item).collect();
    expected.sort_unstable();
    got.sort_unstable();
    if expected != got {
        violations.push(PlacementViolation::ItemSetMismatch);
    }

    let dims = problem.spec().dims();
    for p in placements {
        let item = problem.item(p.item);

        if !item.effective_rotation().permits(p.orientation) {
            violations.push(PlacementViolation::DisallowedOrientation { item: p.item });
        }
        if p.orientation.apply(&item.dims()) != p.size {
            violations.push(PlacementViolation::WrongEffectiveSize { item: p.item });
        }

        for axis in Axis::ALL {
            let lo = p.position.along(axis);
            if lo < 0 || lo + p.size.along(axis) > dims.along(axis) {
                violations.push(PlacementViolation::OutOfBounds { item: p.item, axis });
            }
        }

        if !supported(p, placements) {
            violations.push(PlacementViolation::Floating { item: p.item });
        }
    }

    for (a_idx, a) in placements.iter().enumerate() {
        for b in &placements[a_idx + 1..] {
            if !separated(a, b) {
                violations.push(PlacementViolation::Overlap {
                    first: a.item,
                    second: b.item,
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::ItemId,
        problem::{ContainerSpec, Item},
    };
    use stow_alloc_core::prelude::{Extent3, Orientation, Point3, RotationPolicy};

    fn problem() -> Problem {
        let spec = ContainerSpec::new(Extent3::new(10, 10, 10), 1000).unwrap();
        let items = vec![
            Item::new(
                ItemId::new(1),
                Extent3::new(10, 10, 1),
                50,
                RotationPolicy::Fixed,
                None,
            )
            .unwrap(),
            Item::new(
                ItemId::new(2),
                Extent3::new(5, 5, 1),
                10,
                RotationPolicy::Fixed,
                None,
            )
            .unwrap(),
        ];
        Problem::new(spec, items).unwrap()
    }

    fn placed(item: usize, pos: [i64; 3], size: [i64; 3]) -> Placement {
        Placement {
            item,
            orientation: Orientation::identity(),
            position: Point3::new(pos[0], pos[1], pos[2]),
            size: Extent3::from(size),
        }
    }

    #[test]
    fn test_stacked_layout_is_sound() {
        let p = problem();
        let placements = vec![
            placed(0, [0, 0, 0], [10, 10, 1]),
            placed(1, [2, 3, 1], [5, 5, 1]),
        ];
        assert!(validate_container(&p, &[0, 1], &placements).is_empty());
    }

    #[test]
    fn test_floating_box_is_reported() {
        let p = problem();
        let placements = vec![
            placed(0, [0, 0, 0], [10, 10, 1]),
            // Gap between the slab top (z = 1) and this box bottom (z = 5).
            placed(1, [0, 0, 5], [5, 5, 1]),
        ];
        let violations = validate_container(&p, &[0, 1], &placements);
        assert!(violations.contains(&PlacementViolation::Floating { item: 1 }));
    }

    #[test]
    fn test_support_requires_xy_overlap() {
        let p = problem();
        // Correct z-contact but disjoint footprints: still floating.
        let placements = vec![
            placed(0, [0, 0, 0], [10, 10, 1]),
            placed(1, [20, 20, 1], [5, 5, 1]),
        ];
        let violations = validate_container(&p, &[0, 1], &placements);
        assert!(violations.contains(&PlacementViolation::Floating { item: 1 }));
    }

    #[test]
    fn test_overlap_is_reported() {
        let p = problem();
        let placements = vec![
            placed(0, [0, 0, 0], [10, 10, 1]),
            placed(1, [0, 0, 0], [5, 5, 1]),
        ];
        let violations = validate_container(&p, &[0, 1], &placements);
        assert!(violations.contains(&PlacementViolation::Overlap { first: 0, second: 1 }));
    }

    #[test]
    fn test_out_of_bounds_is_reported() {
        let p = problem();
        let placements = vec![
            placed(0, [0, 0, 0], [10, 10, 1]),
            placed(1, [6, 0, 1], [5, 5, 1]),
        ];
        let violations = validate_container(&p, &[0, 1], &placements);
        assert!(violations.contains(&PlacementViolation::OutOfBounds {
            item: 1,
            axis: Axis::X
        }));
    }

    #[test]
    fn test_touching_faces_do_not_overlap() {
        let p = problem();
        let placements = vec![
            placed(0, [0, 0, 0], [10, 10, 1]),
            placed(1, [0, 0, 1], [5, 5, 1]),
        ];
        let violations = validate_container(&p, &[0, 1], &placements);
        assert!(
            !violations
                .iter()
                .any(|v| matches!(v, PlacementViolation::Overlap { .. }))
        );
    }

    #[test]
    fn test_cube_orientation_is_restricted_to_identity() {
        // A cube's allowed-orientation set collapses to {0} whatever its
        // declared policy says.
        let spec = ContainerSpec::new(Extent3::new(10, 10, 10), 1000).unwrap();
        let items = vec![
            Item::new(
                ItemId::new(1),
                Extent3::new(3, 3, 3),
                5,
                RotationPolicy::Free,
                None,
            )
            .unwrap(),
        ];
        let p = Problem::new(spec, items).unwrap();

        let placement = Placement {
            item: 0,
            orientation: Orientation::new(3).unwrap(),
            position: Point3::new(0, 0, 0),
            size: Extent3::new(3, 3, 3),
        };
        let violations = validate_container(&p, &[0], &[placement]);
        assert!(violations.contains(&PlacementViolation::DisallowedOrientation { item: 0 }));

        let identity = Placement {
            orientation: Orientation::identity(),
            ..placement
        };
        assert!(validate_container(&p, &[0], &[identity]).is_empty());
    }

    #[test]
    fn test_item_set_mismatch() {
        let p = problem();
        let placements = vec![placed(0, [0, 0, 0], [10, 10, 1])];
        let violations = validate_container(&p, &[0, 1], &placements);
        assert!(violations.contains(&PlacementViolation::ItemSetMismatch));
    }
}
