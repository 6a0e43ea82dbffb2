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

//! Operators copy the search state once per iteration; the copy has to
//! stay cheap enough for thousands of iterations per second.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stow_alloc_model::prelude::Assignment;
use stow_alloc_solver::engine::{RandomRemoval, SearchState};

fn big_state(items: usize, instances: usize) -> SearchState {
    let per_instance = items.div_ceil(instances);
    let lists: Vec<Vec<usize>> = (0..instances)
        .map(|j| {
            (0..per_instance)
                .map(|k| j * per_instance + k)
                .filter(|&i| i < items)
                .collect()
        })
        .collect();
    SearchState::from_assignment(Assignment::new(lists))
}

fn bench_state_clone(c: &mut Criterion) {
    let state = big_state(1000, 20);
    c.bench_function("search_state_clone_1000_boxes", |b| {
        b.iter(|| black_box(state.clone()))
    });
}

fn bench_destroy(c: &mut Criterion) {
    let state = big_state(1000, 20);
    let destroy = RandomRemoval::new(100);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    c.bench_function("destroy_100_of_1000", |b| {
        b.iter(|| black_box(destroy.apply(&state, &mut rng)))
    });
}

fn bench_entries_flatten(c: &mut Criterion) {
    let state = big_state(1000, 20);
    c.bench_function("assignment_entries_1000", |b| {
        b.iter(|| black_box(state.assignment().entries()))
    });
}

criterion_group!(
    benches,
    bench_state_clone,
    bench_destroy,
    bench_entries_flatten
);
criterion_main!(benches);
