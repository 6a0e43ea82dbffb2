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

//! Phase 2: geometric placement of the boxes assigned to one container.
//!
//! Per box: a corner position, one orientation boolean per allowed axis
//! permutation, and effective dimensions tied to the chosen orientation.
//! Hard constraints are in-bounds, pairwise non-overlap witnessed by six
//! separation booleans, and floor-or-support. The soft objective is a
//! weighted sum of the terms in [`soft`].

pub mod soft;
pub mod symmetry;

use crate::{
    err::{SolveError, SolverInternalError},
    sat::{self, BoolVar, Goal, IntVar, Literal, ModelBuildError, SatModel},
};
use smallvec::SmallVec;
use std::time::Duration;
use stow_alloc_core::prelude::{Orientation, Point3};
use stow_alloc_model::prelude::{ContainerLoad, Phase2Settings, Placement, Problem};
use tracing::debug;

/// Decision variables of one box.
pub(crate) struct BoxVars {
    /// Global item index.
    pub item: usize,
    pub x: IntVar,
    pub y: IntVar,
    pub z: IntVar,
    pub l: IntVar,
    pub w: IntVar,
    pub h: IntVar,
    pub orientations: SmallVec<[(Orientation, BoolVar); 6]>,
    pub on_floor: BoolVar,
    /// `(supporter local index, flag)`: this box sits exactly on top of
    /// the supporter with strictly overlapping footprints.
    pub supports: Vec<(usize, Literal)>,
}

/// Outcome of one per-container placement run.
#[derive(Debug)]
pub struct PlacementOutcome {
    pub elapsed: Duration,
    pub load: ContainerLoad,
}

pub struct PlacementModel {
    sat: SatModel,
    objective: IntVar,
    boxes: Vec<BoxVars>,
}

impl std::fmt::Debug for PlacementModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementModel")
            .field("boxes", &self.boxes.len())
            .finish_non_exhaustive()
    }
}

impl PlacementModel {
    /// Build the placement model for the given item indices.
    pub fn build(
        problem: &Problem,
        items: &[usize],
        settings: &Phase2Settings,
    ) -> Result<Self, ModelBuildError> {
        let spec = problem.spec();
        let dims = spec.dims();
        let (cl, cw, ch) = (dims.length(), dims.width(), dims.height());
        let mut sat = SatModel::new();

        let mut boxes: Vec<BoxVars> = Vec::with_capacity(items.len());
        for &item_index in items {
            let item = problem.item(item_index);
            let x = sat.new_int(0, cl)?;
            let y = sat.new_int(0, cw)?;
            let z = sat.new_int(0, ch)?;
            let l = sat.new_int(0, cl)?;
            let w = sat.new_int(0, cw)?;
            let h = sat.new_int(0, ch)?;

            // One orientation per box; each choice pins the effective
            // dimensions to its permutation of the nominal extent.
            let mut orientations: SmallVec<[(Orientation, BoolVar); 6]> = SmallVec::new();
            for orientation in item.allowed_orientations() {
                let chosen = sat.new_bool()?;
                let rotated = orientation.apply(&item.dims());
                sat.post_linear_eq_if(&[(l, 1)], rotated.length(), chosen.literal())?;
                sat.post_linear_eq_if(&[(w, 1)], rotated.width(), chosen.literal())?;
                sat.post_linear_eq_if(&[(h, 1)], rotated.height(), chosen.literal())?;
                orientations.push((orientation, chosen));
            }
            let row: Vec<(IntVar, i64)> = orientations
                .iter()
                .map(|(_, b)| (b.channel(), 1))
                .collect();
            sat.post_linear_eq(&row, 1)?;

            // In-bounds along every axis.
            sat.post_linear_le(&[(x, 1), (l, 1)], cl)?;
            sat.post_linear_le(&[(y, 1), (w, 1)], cw)?;
            sat.post_linear_le(&[(z, 1), (h, 1)], ch)?;

            let on_floor = sat.new_bool()?;
            sat.post_linear_eq_if(&[(z, 1)], 0, on_floor.literal())?;

            boxes.push(BoxVars {
                item: item_index,
                x,
                y,
                z,
                l,
                w,
                h,
                orientations,
                on_floor,
                supports: Vec::new(),
            });
        }

        Self::post_non_overlap(&mut sat, &boxes)?;
        Self::post_support(&mut sat, &mut boxes)?;

        if let Some(mode) = settings.anchor {
            if let Some(anchored) = symmetry::pick_anchor(problem, items, mode) {
                let b = &boxes[anchored];
                debug!(
                    item = b.item,
                    "Anchoring box at the container origin"
                );
                sat.post_linear_eq(&[(b.x, 1)], 0)?;
                sat.post_linear_eq(&[(b.y, 1)], 0)?;
                sat.post_linear_eq(&[(b.z, 1)], 0)?;
            }
        }

        symmetry::post_identical_box_ordering(&mut sat, problem, &boxes, settings.symmetry)?;

        let objective =
            soft::post_soft_objective(&mut sat, problem, spec, &boxes, &settings.weights)?;

        Ok(Self {
            sat,
            objective,
            boxes,
        })
    }

    /// Six separation booleans per unordered pair; at least one must hold.
    fn post_non_overlap(sat: &mut SatModel, boxes: &[BoxVars]) -> Result<(), ModelBuildError> {
        for (a_idx, a) in boxes.iter().enumerate() {
            for b in &boxes[a_idx + 1..] {
                let axes = [
                    (a.x, a.l, b.x, b.l),
                    (a.y, a.w, b.y, b.w),
                    (a.z, a.h, b.z, b.h),
                ];
                let mut witnesses: Vec<Literal> = Vec::with_capacity(6);
                for (a_pos, a_len, b_pos, b_len) in axes {
                    let before = sat.new_flag();
                    sat.post_linear_le_if(&[(a_pos, 1), (a_len, 1), (b_pos, -1)], 0, before)?;
                    witnesses.push(before);

                    let after = sat.new_flag();
                    sat.post_linear_le_if(&[(b_pos, 1), (b_len, 1), (a_pos, -1)], 0, after)?;
                    witnesses.push(after);
                }
                sat.post_clause(witnesses);
            }
        }
        Ok(())
    }

    /// Every box rests on the floor or flush on top of another box with
    /// strictly overlapping X-Y footprints.
    fn post_support(sat: &mut SatModel, boxes: &mut [BoxVars]) -> Result<(), ModelBuildError> {
        let n = boxes.len();
        for i in 0..n {
            let mut witnesses: Vec<Literal> = vec![boxes[i].on_floor.literal()];
            for s in 0..n {
                if s == i {
                    continue;
                }
                let above = sat.new_flag();
                let (bi, bs) = (&boxes[i], &boxes[s]);
                // Bottom of i flush with top of s.
                sat.post_linear_eq_if(&[(bi.z, 1), (bs.z, -1), (bs.h, -1)], 0, above)?;
                // Strict overlap in X: s starts left of i's end, i starts
                // left of s's end.
                sat.post_linear_le_if(&[(bs.x, 1), (bi.x, -1), (bi.l, -1)], -1, above)?;
                sat.post_linear_le_if(&[(bi.x, 1), (bs.x, -1), (bs.l, -1)], -1, above)?;
                // Strict overlap in Y.
                sat.post_linear_le_if(&[(bs.y, 1), (bi.y, -1), (bi.w, -1)], -1, above)?;
                sat.post_linear_le_if(&[(bi.y, 1), (bs.y, -1), (bs.w, -1)], -1, above)?;

                witnesses.push(above);
                boxes[i].supports.push((s, above));
            }
            sat.post_clause(witnesses);
        }
        Ok(())
    }

    /// Run the driver and extract placements from the incumbent.
    pub fn solve(
        self,
        problem: &Problem,
        time_limit: Duration,
    ) -> Result<PlacementOutcome, SolveError> {
        let outcome = sat::solve(self.sat, self.objective, Goal::Maximize, time_limit);
        debug!(status = %outcome.status, "Phase 2 finished");

        let placements = if outcome.status.has_solution() {
            let valuation = outcome.valuation().map_err(SolveError::from)?;
            let mut placements = Vec::with_capacity(self.boxes.len());
            for b in &self.boxes {
                let orientation = b
                    .orientations
                    .iter()
                    .find(|(_, chosen)| valuation.bool(chosen))
                    .map(|(o, _)| *o)
                    .ok_or_else(|| {
                        SolverInternalError::new("No orientation chosen for a placed box")
                    })?;
                let position = Point3::new(
                    valuation.int(b.x),
                    valuation.int(b.y),
                    valuation.int(b.z),
                );
                let size = orientation.apply(&problem.item(b.item).dims());
                placements.push(Placement {
                    item: b.item,
                    orientation,
                    position,
                    size,
                });
            }
            placements
        } else {
            Vec::new()
        };

        Ok(PlacementOutcome {
            elapsed: outcome.elapsed,
            load: ContainerLoad::new(outcome.status, placements),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stow_alloc_model::{
        common::ItemId,
        prelude::SolveStatus,
        problem::{ContainerSpec, Item},
        validation::validate_container,
    };
    use stow_alloc_core::prelude::{Extent3, RotationPolicy};

    fn limit() -> Duration {
        Duration::from_secs(20)
    }

    fn item(id: i64, dims: [i64; 3], weight: i64, rotation: RotationPolicy) -> Item {
        Item::new(ItemId::new(id), Extent3::from(dims), weight, rotation, None).unwrap()
    }

    fn pack(problem: &Problem, settings: &Phase2Settings) -> PlacementOutcome {
        let items: Vec<usize> = (0..problem.len()).collect();
        let model = PlacementModel::build(problem, &items, settings).unwrap();
        model.solve(problem, limit()).unwrap()
    }

    #[test]
    fn test_two_boxes_fit_one_container() {
        // A 1x1x4 stick only fits a 4x4x2 container lying down; free
        // rotation must find such an orientation.
        let spec = ContainerSpec::new(Extent3::new(4, 4, 2), 1000).unwrap();
        let problem = Problem::new(
            spec,
            vec![
                item(1, [1, 1, 4], 10, RotationPolicy::Free),
                item(2, [2, 2, 1], 5, RotationPolicy::Free),
            ],
        )
        .unwrap();

        let outcome = pack(&problem, &Phase2Settings::default());
        assert!(outcome.load.status.has_solution());
        let items: Vec<usize> = (0..problem.len()).collect();
        assert!(validate_container(&problem, &items, &outcome.load.placements).is_empty());

        let stick = outcome
            .load
            .placements
            .iter()
            .find(|p| p.item == 0)
            .unwrap();
        // The 4-extent lies along x or y, never up.
        assert!(stick.size.height() <= 2);
    }

    #[test]
    fn test_stacking_requires_support() {
        // A full-floor slab forces the second box on top of it at z = 1.
        let spec = ContainerSpec::new(Extent3::new(10, 10, 10), 1000).unwrap();
        let problem = Problem::new(
            spec,
            vec![
                item(1, [10, 10, 1], 50, RotationPolicy::Fixed),
                item(2, [5, 5, 1], 10, RotationPolicy::Fixed),
            ],
        )
        .unwrap();

        let outcome = pack(&problem, &Phase2Settings::default());
        assert!(outcome.load.status.has_solution());
        let items: Vec<usize> = (0..problem.len()).collect();
        assert!(validate_container(&problem, &items, &outcome.load.placements).is_empty());

        let top = outcome
            .load
            .placements
            .iter()
            .find(|p| p.item == 1)
            .unwrap();
        assert_eq!(top.position.z, 1);
        assert!(top.position.x <= 5 && top.position.y <= 5);
    }

    #[test]
    fn test_z_rotation_that_does_not_fit_is_excluded() {
        // (4,2,1) with z-rotation in a 5x3x3 container: the rotated
        // variant (2,4,1) violates the width, so orientation 0 remains.
        let spec = ContainerSpec::new(Extent3::new(5, 3, 3), 1000).unwrap();
        let problem = Problem::new(
            spec,
            vec![item(1, [4, 2, 1], 1, RotationPolicy::ZAxis)],
        )
        .unwrap();

        let outcome = pack(&problem, &Phase2Settings::default());
        assert!(outcome.load.status.has_solution());
        assert_eq!(outcome.load.placements[0].orientation.index(), 0);
    }

    #[test]
    fn test_single_box_rests_on_floor() {
        let spec = ContainerSpec::new(Extent3::new(5, 5, 5), 10).unwrap();
        let problem = Problem::new(
            spec,
            vec![item(1, [2, 2, 2], 1, RotationPolicy::Free)],
        )
        .unwrap();

        let outcome = pack(&problem, &Phase2Settings::default());
        assert!(outcome.load.status.has_solution());
        assert_eq!(outcome.load.placements[0].position.z, 0);
    }

    #[test]
    fn test_oversized_box_is_infeasible() {
        let spec = ContainerSpec::new(Extent3::new(10, 10, 10), 1000).unwrap();
        let problem = Problem::new(
            spec,
            vec![item(1, [11, 1, 1], 1, RotationPolicy::Fixed)],
        )
        .unwrap();

        let outcome = pack(&problem, &Phase2Settings::default());
        assert_eq!(outcome.load.status, SolveStatus::Infeasible);
        assert!(outcome.load.placements.is_empty());
    }

    #[test]
    fn test_cube_uses_identity_orientation() {
        let spec = ContainerSpec::new(Extent3::new(4, 4, 4), 10).unwrap();
        let problem = Problem::new(
            spec,
            vec![item(1, [2, 2, 2], 1, RotationPolicy::Free)],
        )
        .unwrap();

        let outcome = pack(&problem, &Phase2Settings::default());
        assert!(outcome.load.status.has_solution());
        assert_eq!(outcome.load.placements[0].orientation.index(), 0);
    }

    #[test]
    fn test_soft_terms_and_anchor_still_yield_valid_layouts() {
        let spec = ContainerSpec::new(Extent3::new(6, 6, 4), 1000).unwrap();
        let problem = Problem::new(
            spec,
            vec![
                item(1, [6, 6, 1], 20, RotationPolicy::Fixed),
                item(2, [3, 2, 1], 5, RotationPolicy::ZAxis),
                item(3, [2, 2, 2], 5, RotationPolicy::Free),
            ],
        )
        .unwrap();

        let settings = Phase2Settings {
            anchor: Some(stow_alloc_model::prelude::AnchorMode::Larger),
            weights: stow_alloc_model::prelude::SoftWeights {
                floor_area: 1,
                large_base_lower: 1,
                surface_contact: 1,
                biggest_face_down: 1,
                ..Default::default()
            },
            ..Default::default()
        };

        let outcome = pack(&problem, &settings);
        assert!(outcome.load.status.has_solution());
        let items: Vec<usize> = (0..problem.len()).collect();
        assert!(validate_container(&problem, &items, &outcome.load.placements).is_empty());

        // The anchored slab is the largest box and sits at the origin.
        let slab = outcome
            .load
            .placements
            .iter()
            .find(|p| p.item == 0)
            .unwrap();
        assert_eq!(slab.position.as_array(), [0, 0, 0]);
    }
}
