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

//! Soft-objective terms of the placement model. Each enabled term
//! contributes bounded non-negative integer variables; the objective is
//! the weighted sum of all of them, maximized.
//!
//! Products always go through an auxiliary variable constrained by the
//! backend's integer multiplication; nothing here is a floating-point
//! expression.

use crate::{
    phase2::BoxVars,
    sat::{IntVar, ModelBuildError, SatModel},
};
use stow_alloc_model::prelude::{ContainerSpec, Problem, SoftWeights};
use stow_alloc_core::prelude::RotationPolicy;

/// Weighted objective terms plus a running upper bound, kept in checked
/// 64-bit arithmetic so an oversized objective fails loudly instead of
/// wrapping.
struct ObjectiveAccumulator {
    terms: Vec<(IntVar, i64)>,
    upper_bound: i64,
}

impl ObjectiveAccumulator {
    fn new() -> Self {
        Self {
            terms: Vec::new(),
            upper_bound: 0,
        }
    }

    fn add(&mut self, var: IntVar, weight: i64) -> Result<(), ModelBuildError> {
        let contribution = weight
            .checked_mul(var.upper_bound())
            .ok_or(ModelBuildError::BoundOutOfRange(i64::MAX))?;
        self.upper_bound = self
            .upper_bound
            .checked_add(contribution)
            .ok_or(ModelBuildError::BoundOutOfRange(i64::MAX))?;
        self.terms.push((var, weight));
        Ok(())
    }
}

/// Lazily created per-box helper variables shared between terms.
struct HelperVars {
    base_area: Vec<Option<IntVar>>,
    height_from_floor: Vec<Option<IntVar>>,
}

impl HelperVars {
    fn new(n: usize) -> Self {
        Self {
            base_area: vec![None; n],
            height_from_floor: vec![None; n],
        }
    }

    /// `l_eff · w_eff` of box `i`.
    fn base_area(
        &mut self,
        sat: &mut SatModel,
        boxes: &[BoxVars],
        i: usize,
    ) -> Result<IntVar, ModelBuildError> {
        if let Some(v) = self.base_area[i] {
            return Ok(v);
        }
        let v = sat.def_product(boxes[i].l, boxes[i].w)?;
        self.base_area[i] = Some(v);
        Ok(v)
    }

    /// `H − z` of box `i`.
    fn height_from_floor(
        &mut self,
        sat: &mut SatModel,
        boxes: &[BoxVars],
        i: usize,
        container_height: i64,
    ) -> Result<IntVar, ModelBuildError> {
        if let Some(v) = self.height_from_floor[i] {
            return Ok(v);
        }
        let v = sat.def_int_eq_sum(
            0,
            container_height,
            &[(boxes[i].z, -1)],
            container_height,
        )?;
        self.height_from_floor[i] = Some(v);
        Ok(v)
    }
}

/// Post every enabled soft term and return the objective variable.
pub(crate) fn post_soft_objective(
    sat: &mut SatModel,
    problem: &Problem,
    spec: &ContainerSpec,
    boxes: &[BoxVars],
    weights: &SoftWeights,
) -> Result<IntVar, ModelBuildError> {
    let mut acc = ObjectiveAccumulator::new();
    let mut helpers = HelperVars::new(boxes.len());
    let height = spec.dims().height();

    if weights.floor_area > 0 {
        post_floor_area(sat, boxes, &mut helpers, &mut acc, weights.floor_area as i64)?;
    }
    if weights.large_base_lower > 0 {
        post_large_base_lower(
            sat,
            boxes,
            &mut helpers,
            &mut acc,
            height,
            weights.large_base_lower as i64,
            false,
        )?;
    }
    if weights.large_base_lower_quadratic > 0 {
        post_large_base_lower(
            sat,
            boxes,
            &mut helpers,
            &mut acc,
            height,
            weights.large_base_lower_quadratic as i64,
            true,
        )?;
    }
    if weights.volume_lower > 0 {
        post_volume_lower(
            sat,
            problem,
            boxes,
            &mut helpers,
            &mut acc,
            height,
            weights.volume_lower as i64,
        )?;
    }
    if weights.surface_contact > 0 {
        post_surface_contact(sat, spec, boxes, &mut acc, weights.surface_contact as i64)?;
    }
    if weights.biggest_face_down > 0 {
        post_biggest_face_down(problem, boxes, &mut acc, weights.biggest_face_down as i64)?;
    }

    sat.def_int_eq_sum(0, acc.upper_bound, &acc.terms, 0)
}

/// Bottom-face area of every box resting on the floor.
fn post_floor_area(
    sat: &mut SatModel,
    boxes: &[BoxVars],
    helpers: &mut HelperVars,
    acc: &mut ObjectiveAccumulator,
    weight: i64,
) -> Result<(), ModelBuildError> {
    for i in 0..boxes.len() {
        let base = helpers.base_area(sat, boxes, i)?;
        let on_floor_area = sat.def_product(boxes[i].on_floor.channel(), base)?;
        acc.add(on_floor_area, weight)?;
    }
    Ok(())
}

/// `(H − z) · base_area`, optionally with the squared height factor.
fn post_large_base_lower(
    sat: &mut SatModel,
    boxes: &[BoxVars],
    helpers: &mut HelperVars,
    acc: &mut ObjectiveAccumulator,
    container_height: i64,
    weight: i64,
    quadratic: bool,
) -> Result<(), ModelBuildError> {
    for i in 0..boxes.len() {
        let base = helpers.base_area(sat, boxes, i)?;
        let lift = helpers.height_from_floor(sat, boxes, i, container_height)?;
        let factor = if quadratic {
            sat.def_product(lift, lift)?
        } else {
            lift
        };
        let weighted = sat.def_product(base, factor)?;
        acc.add(weighted, weight)?;
    }
    Ok(())
}

/// `(H − z) · nominal volume`; the volume is a constant, so this term is
/// linear in the height helper.
fn post_volume_lower(
    sat: &mut SatModel,
    problem: &Problem,
    boxes: &[BoxVars],
    helpers: &mut HelperVars,
    acc: &mut ObjectiveAccumulator,
    container_height: i64,
    weight: i64,
) -> Result<(), ModelBuildError> {
    for i in 0..boxes.len() {
        let lift = helpers.height_from_floor(sat, boxes, i, container_height)?;
        let volume = problem.item(boxes[i].item).volume();
        let coefficient = weight
            .checked_mul(volume)
            .ok_or(ModelBuildError::CoefficientOutOfRange(i64::MAX))?;
        acc.add(lift, coefficient)?;
    }
    Ok(())
}

/// True X-Y overlap area between a box and each box it rests on. The
/// overlap extents are bounded from above per axis; maximization makes
/// them tight whenever the support flag holds.
fn post_surface_contact(
    sat: &mut SatModel,
    spec: &ContainerSpec,
    boxes: &[BoxVars],
    acc: &mut ObjectiveAccumulator,
    weight: i64,
) -> Result<(), ModelBuildError> {
    let dims = spec.dims();
    for i in 0..boxes.len() {
        for &(s, resting) in &boxes[i].supports {
            let (bi, bs) = (&boxes[i], &boxes[s]);

            let overlap_x = sat.new_int(0, dims.length())?;
            sat.post_linear_le_if(
                &[(overlap_x, 1), (bi.x, -1), (bi.l, -1), (bs.x, 1)],
                0,
                resting,
            )?;
            sat.post_linear_le_if(
                &[(overlap_x, 1), (bs.x, -1), (bs.l, -1), (bi.x, 1)],
                0,
                resting,
            )?;
            sat.post_linear_le_if(&[(overlap_x, 1), (bi.l, -1)], 0, resting)?;
            sat.post_linear_le_if(&[(overlap_x, 1), (bs.l, -1)], 0, resting)?;
            sat.post_linear_eq_if(&[(overlap_x, 1)], 0, !resting)?;

            let overlap_y = sat.new_int(0, dims.width())?;
            sat.post_linear_le_if(
                &[(overlap_y, 1), (bi.y, -1), (bi.w, -1), (bs.y, 1)],
                0,
                resting,
            )?;
            sat.post_linear_le_if(
                &[(overlap_y, 1), (bs.y, -1), (bs.w, -1), (bi.y, 1)],
                0,
                resting,
            )?;
            sat.post_linear_le_if(&[(overlap_y, 1), (bi.w, -1)], 0, resting)?;
            sat.post_linear_le_if(&[(overlap_y, 1), (bs.w, -1)], 0, resting)?;
            sat.post_linear_eq_if(&[(overlap_y, 1)], 0, !resting)?;

            let area = sat.def_product(overlap_x, overlap_y)?;
            acc.add(area, weight)?;
        }
    }
    Ok(())
}

/// Reward free-rotation boxes for orientations whose bottom face is the
/// largest of their three distinct faces.
fn post_biggest_face_down(
    problem: &Problem,
    boxes: &[BoxVars],
    acc: &mut ObjectiveAccumulator,
    weight: i64,
) -> Result<(), ModelBuildError> {
    for b in boxes {
        let item = problem.item(b.item);
        if item.effective_rotation() != RotationPolicy::Free {
            continue;
        }
        let areas: Vec<i64> = b
            .orientations
            .iter()
            .map(|(o, _)| {
                let rotated = o.apply(&item.dims());
                rotated.length() * rotated.width()
            })
            .collect();
        let Some(&max_area) = areas.iter().max() else {
            continue;
        };
        for ((_, chosen), &area) in b.orientations.iter().zip(&areas) {
            if area == max_area {
                acc.add(chosen.channel(), weight)?;
            }
        }
    }
    Ok(())
}
