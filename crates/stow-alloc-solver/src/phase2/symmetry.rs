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

//! Symmetry handling of the placement model: anchor selection and
//! ordering constraints among interchangeable boxes.

use crate::{
    phase2::BoxVars,
    sat::{IntVar, ModelBuildError, SatModel},
};
use stow_alloc_core::prelude::{Axis, Extent3, RotationPolicy};
use stow_alloc_model::prelude::{AnchorMode, Problem, SymmetryMode};

/// Pick the box (as a local index into `items`) to pin at the origin.
///
/// `Larger` takes the largest nominal volume; the recurring variant takes
/// the heaviest box within the most populous identical-size class. All
/// ties resolve to the earliest box in input order.
pub(crate) fn pick_anchor(
    problem: &Problem,
    items: &[usize],
    mode: AnchorMode,
) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    match mode {
        AnchorMode::Larger => {
            let mut best = 0usize;
            for (local, &global) in items.iter().enumerate().skip(1) {
                if problem.item(global).volume() > problem.item(items[best]).volume() {
                    best = local;
                }
            }
            Some(best)
        }
        AnchorMode::HeavierWithinMostRecurringSimilar => {
            // Size classes in first-occurrence order.
            let mut classes: Vec<(Extent3<i64>, Vec<usize>)> = Vec::new();
            for (local, &global) in items.iter().enumerate() {
                let dims = problem.item(global).dims();
                match classes.iter_mut().find(|(d, _)| *d == dims) {
                    Some((_, members)) => members.push(local),
                    None => classes.push((dims, vec![local])),
                }
            }
            let (_, members) = classes
                .iter()
                .max_by_key(|(_, members)| members.len())?;
            let mut best = members[0];
            for &local in &members[1..] {
                if problem.item(items[local]).weight() > problem.item(items[best]).weight() {
                    best = local;
                }
            }
            Some(best)
        }
    }
}

#[inline]
fn position_along(b: &BoxVars, axis: Axis) -> IntVar {
    match axis {
        Axis::X => b.x,
        Axis::Y => b.y,
        Axis::Z => b.z,
    }
}

/// Order boxes with identical nominal dimensions and identical effective
/// rotation policy, per consecutive pair of each class.
pub(crate) fn post_identical_box_ordering(
    sat: &mut SatModel,
    problem: &Problem,
    boxes: &[BoxVars],
    mode: SymmetryMode,
) -> Result<(), ModelBuildError> {
    if mode == SymmetryMode::None {
        return Ok(());
    }

    let mut classes: Vec<((Extent3<i64>, RotationPolicy), Vec<usize>)> = Vec::new();
    for (local, b) in boxes.iter().enumerate() {
        let item = problem.item(b.item);
        let key = (item.dims(), item.effective_rotation());
        match classes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(local),
            None => classes.push((key, vec![local])),
        }
    }

    let longest = problem.spec().dims().longest_axis();
    for (_, members) in &classes {
        for pair in members.windows(2) {
            let (a, b) = (&boxes[pair[0]], &boxes[pair[1]]);
            match mode {
                SymmetryMode::Simple => {
                    let (pa, pb) = (position_along(a, longest), position_along(b, longest));
                    sat.post_linear_le(&[(pa, 1), (pb, -1)], 0)?;
                }
                SymmetryMode::Full => post_lexicographic(sat, a, b)?,
                SymmetryMode::None => unreachable!(),
            }
        }
    }
    Ok(())
}

/// `(x_a, y_a, z_a) ≤_lex (x_b, y_b, z_b)` as a disjunction of three
/// half-reified cases: strictly left, equal-x strictly in front, or
/// equal-x-y not above.
fn post_lexicographic(
    sat: &mut SatModel,
    a: &BoxVars,
    b: &BoxVars,
) -> Result<(), ModelBuildError> {
    let x_less = sat.new_flag();
    sat.post_linear_le_if(&[(a.x, 1), (b.x, -1)], -1, x_less)?;

    let y_less = sat.new_flag();
    sat.post_linear_eq_if(&[(a.x, 1), (b.x, -1)], 0, y_less)?;
    sat.post_linear_le_if(&[(a.y, 1), (b.y, -1)], -1, y_less)?;

    let z_le = sat.new_flag();
    sat.post_linear_eq_if(&[(a.x, 1), (b.x, -1)], 0, z_le)?;
    sat.post_linear_eq_if(&[(a.y, 1), (b.y, -1)], 0, z_le)?;
    sat.post_linear_le_if(&[(a.z, 1), (b.z, -1)], 0, z_le)?;

    sat.post_clause([x_less, y_less, z_le]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stow_alloc_model::{
        common::ItemId,
        problem::{ContainerSpec, Item},
    };

    fn item(id: i64, dims: [i64; 3], weight: i64) -> Item {
        Item::new(
            ItemId::new(id),
            Extent3::from(dims),
            weight,
            RotationPolicy::Free,
            None,
        )
        .unwrap()
    }

    fn problem(items: Vec<Item>) -> Problem {
        let spec = ContainerSpec::new(Extent3::new(10, 10, 10), 1000).unwrap();
        Problem::new(spec, items).unwrap()
    }

    #[test]
    fn test_anchor_larger_picks_first_maximum() {
        let p = problem(vec![
            item(1, [2, 2, 2], 1),
            item(2, [3, 3, 3], 1),
            item(3, [3, 3, 3], 9),
        ]);
        let items: Vec<usize> = (0..3).collect();
        // Items 1 and 2 share the maximal volume; the earlier wins.
        assert_eq!(pick_anchor(&p, &items, AnchorMode::Larger), Some(1));
    }

    #[test]
    fn test_anchor_recurring_picks_heaviest_of_biggest_class() {
        let p = problem(vec![
            item(1, [2, 2, 1], 1),
            item(2, [3, 3, 3], 50),
            item(3, [2, 2, 1], 7),
            item(4, [2, 2, 1], 3),
        ]);
        let items: Vec<usize> = (0..4).collect();
        // The (2,2,1) class recurs three times; its heaviest member is
        // index 2 with weight 7.
        assert_eq!(
            pick_anchor(&p, &items, AnchorMode::HeavierWithinMostRecurringSimilar),
            Some(2)
        );
    }

    #[test]
    fn test_anchor_on_empty_selection() {
        let p = problem(vec![]);
        assert_eq!(pick_anchor(&p, &[], AnchorMode::Larger), None);
    }
}
