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

use crate::problem::{ContainerSpec, Item, Problem, err::ProblemError};

#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    spec: ContainerSpec,
    items: Vec<Item>,
}

impl ProblemBuilder {
    #[inline]
    pub fn new(spec: ContainerSpec) -> Self {
        Self {
            spec,
            items: Vec::new(),
        }
    }

    #[inline]
    pub fn with_capacity(spec: ContainerSpec, items: usize) -> Self {
        Self {
            spec,
            items: Vec::with_capacity(items),
        }
    }

    #[inline]
    pub fn add_item(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    #[inline]
    pub fn extend_items<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = Item>,
    {
        self.items.extend(items);
        self
    }

    #[inline]
    pub fn build(self) -> Result<Problem, ProblemError> {
        Problem::new(self.spec, self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ItemId;
    use stow_alloc_core::prelude::{Extent3, RotationPolicy};

    #[test]
    fn test_builder_preserves_item_order() {
        let spec = ContainerSpec::new(Extent3::new(5, 5, 5), 50).unwrap();
        let mut b = ProblemBuilder::new(spec);
        for n in 0..4 {
            b.add_item(
                Item::new(
                    ItemId::new(n),
                    Extent3::new(1, 1, 1),
                    1,
                    RotationPolicy::Fixed,
                    None,
                )
                .unwrap(),
            );
        }
        let p = b.build().unwrap();
        let ids: Vec<i64> = p.items().iter().map(|i| i.id().into_inner()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
