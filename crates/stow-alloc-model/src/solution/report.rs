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

//! The final deliverable and its serialized form.

use crate::{
    problem::Problem,
    solution::placement::{ContainerLoad, SolveStatus},
};
use serde::Serialize;

/// One container instance of the final plan: the items assigned to it and
/// the Phase-2 outcome for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedContainer {
    pub items: Vec<usize>,
    pub load: ContainerLoad,
}

/// The orchestrator's result: every used container with its placements
/// and per-container status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadPlan {
    pub containers: Vec<LoadedContainer>,
}

impl LoadPlan {
    /// `true` iff no container ended INFEASIBLE.
    pub fn is_fully_feasible(&self) -> bool {
        self.containers
            .iter()
            .all(|c| c.load.status != SolveStatus::Infeasible)
    }

    /// Render the output document described by the external interface:
    /// 1-based sequential container ids, container size, status, and one
    /// placement record per box.
    pub fn to_output(&self, problem: &Problem) -> OutputDoc {
        let size = problem.spec().dims().as_array();
        let containers = self
            .containers
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                let placements = c
                    .load
                    .placements
                    .iter()
                    .map(|p| {
                        let item = problem.item(p.item);
                        PlacementRecord {
                            id: item.id().into_inner(),
                            position: p.position.as_array(),
                            orientation: p.orientation.index(),
                            size: p.size.as_array(),
                            rotation_type: item.effective_rotation().to_string(),
                        }
                    })
                    .collect();
                ContainerRecord {
                    id: idx as i64 + 1,
                    size,
                    status: c.load.status.as_str(),
                    placements,
                }
            })
            .collect();
        OutputDoc { containers }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct OutputDoc {
    containers: Vec<ContainerRecord>,
}

#[derive(Debug, Clone, Serialize)]
struct ContainerRecord {
    id: i64,
    size: [i64; 3],
    status: &'static str,
    placements: Vec<PlacementRecord>,
}

#[derive(Debug, Clone, Serialize)]
struct PlacementRecord {
    id: i64,
    position: [i64; 3],
    orientation: usize,
    size: [i64; 3],
    rotation_type: String,
}
