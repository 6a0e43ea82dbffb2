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

use crate::primitives::geom::Extent3;
use smallvec::SmallVec;

/// One of the six axis permutations of a box, identified by its canonical
/// index:
///
/// | index | bottom face (l, w) | vertical |
/// |-------|--------------------|----------|
/// | 0     | (l, w)             | h        |
/// | 1     | (l, h)             | w        |
/// | 2     | (w, l)             | h        |
/// | 3     | (w, h)             | l        |
/// | 4     | (h, l)             | w        |
/// | 5     | (h, w)             | l        |
///
/// The index is stable across rotation policies; a policy restricts which
/// indices are allowed but never renumbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Orientation(u8);

impl Orientation {
    pub const COUNT: usize = 6;

    /// `None` for indices outside `0..6`.
    #[inline]
    pub const fn new(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Orientation(index as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn identity() -> Self {
        Orientation(0)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The rotated extent of `nominal` under this orientation.
    #[inline]
    pub fn apply<T: Copy>(self, nominal: &Extent3<T>) -> Extent3<T> {
        let (l, w, h) = (nominal.length(), nominal.width(), nominal.height());
        match self.0 {
            0 => Extent3::new(l, w, h),
            1 => Extent3::new(l, h, w),
            2 => Extent3::new(w, l, h),
            3 => Extent3::new(w, h, l),
            4 => Extent3::new(h, l, w),
            _ => Extent3::new(h, w, l),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a box may be rotated when it is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationPolicy {
    /// The box is placed exactly as given.
    Fixed,
    /// The box may spin around the vertical axis; its height stays up.
    ZAxis,
    /// Any of the six axis permutations.
    #[default]
    Free,
}

impl RotationPolicy {
    /// Allowed orientations in canonical order. The returned indices are
    /// global orientation indices, not positions in this list.
    pub fn allowed_orientations(self) -> SmallVec<[Orientation; 6]> {
        let indices: &[usize] = match self {
            RotationPolicy::Fixed => &[0],
            RotationPolicy::ZAxis => &[0, 2],
            RotationPolicy::Free => &[0, 1, 2, 3, 4, 5],
        };
        indices
            .iter()
            .map(|&k| Orientation(k as u8))
            .collect()
    }

    #[inline]
    pub fn permits(self, orientation: Orientation) -> bool {
        self.allowed_orientations().contains(&orientation)
    }
}

impl std::fmt::Display for RotationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationPolicy::Fixed => write!(f, "none"),
            RotationPolicy::ZAxis => write!(f, "z"),
            RotationPolicy::Free => write!(f, "free"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn ext(l: i64, w: i64, h: i64) -> Extent3<i64> {
        Extent3::new(l, w, h)
    }

    #[test]
    fn test_orientation_table_matches_canonical_order() {
        let nominal = ext(1, 2, 3);
        let expected = [
            ext(1, 2, 3),
            ext(1, 3, 2),
            ext(2, 1, 3),
            ext(2, 3, 1),
            ext(3, 1, 2),
            ext(3, 2, 1),
        ];
        for (k, want) in expected.iter().enumerate() {
            let o = Orientation::new(k).unwrap();
            assert_eq!(o.apply(&nominal), *want, "orientation {k}");
        }
    }

    #[test]
    fn test_orientation_new_rejects_out_of_range() {
        assert!(Orientation::new(5).is_some());
        assert!(Orientation::new(6).is_none());
    }

    #[test]
    fn test_fixed_allows_identity_only() {
        let allowed = RotationPolicy::Fixed.allowed_orientations();
        assert_eq!(allowed.len(), 1);
        assert_eq!(allowed[0].index(), 0);
    }

    #[test]
    fn test_z_axis_keeps_height_up() {
        let allowed = RotationPolicy::ZAxis.allowed_orientations();
        let indices: Vec<usize> = allowed.iter().map(|o| o.index()).collect();
        assert_eq!(indices, vec![0, 2]);

        let nominal = ext(4, 2, 1);
        for o in &allowed {
            assert_eq!(o.apply(&nominal).height(), 1);
        }
    }

    #[test]
    fn test_free_allows_all_six() {
        let allowed = RotationPolicy::Free.allowed_orientations();
        assert_eq!(allowed.len(), 6);
        assert!(RotationPolicy::Free.permits(Orientation::new(4).unwrap()));
        assert!(!RotationPolicy::ZAxis.permits(Orientation::new(1).unwrap()));
    }
}
