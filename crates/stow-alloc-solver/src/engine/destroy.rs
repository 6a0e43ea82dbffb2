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

use crate::engine::state::SearchState;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use stow_alloc_model::prelude::Assignment;
use tracing::debug;

/// The destroy operator: unassign a uniform random subset of boxes.
///
/// The result is a partial state whose instances keep their positions
/// (possibly empty) so the repair step can pin the survivors to their
/// original instance indices.
#[derive(Debug, Clone, Copy)]
pub struct RandomRemoval {
    pub num_remove: usize,
}

impl RandomRemoval {
    pub fn new(num_remove: usize) -> Self {
        Self { num_remove }
    }

    pub fn apply(&self, state: &SearchState, rng: &mut ChaCha8Rng) -> SearchState {
        let entries = state.assignment().entries();
        if entries.is_empty() || self.num_remove == 0 {
            return state.clone();
        }

        let count = self.num_remove.min(entries.len());
        let chosen: BTreeSet<(usize, usize)> = index::sample(rng, entries.len(), count)
            .iter()
            .map(|k| entries[k])
            .collect();

        let mut removed = Vec::with_capacity(count);
        let instances = state
            .assignment()
            .instances()
            .iter()
            .enumerate()
            .map(|(j, items)| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(slot, &item)| {
                        if chosen.contains(&(j, slot)) {
                            removed.push(item);
                            None
                        } else {
                            Some(item)
                        }
                    })
                    .collect()
            })
            .collect();

        debug!(removed = removed.len(), "Destroy step unassigned boxes");
        SearchState::partial(Assignment::new(instances), removed)
    }
}
