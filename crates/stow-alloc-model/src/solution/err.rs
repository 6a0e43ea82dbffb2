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

/// Violations of the assignment invariants: every item in exactly one
/// instance, and per-instance weight and volume within capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentError {
    ItemUnassigned { item: usize },
    ItemDuplicated { item: usize },
    ItemOutOfRange { item: usize },
    WeightExceeded { instance: usize, total: i64, cap: i64 },
    VolumeExceeded { instance: usize, total: i64, cap: i64 },
}

impl std::fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentError::ItemUnassigned { item } => {
                write!(f, "Item index {item} is assigned to no instance")
            }
            AssignmentError::ItemDuplicated { item } => {
                write!(f, "Item index {item} is assigned to more than one instance")
            }
            AssignmentError::ItemOutOfRange { item } => {
                write!(f, "Item index {item} does not exist in the problem")
            }
            AssignmentError::WeightExceeded {
                instance,
                total,
                cap,
            } => write!(
                f,
                "Instance {instance} carries weight {total}, above capacity {cap}"
            ),
            AssignmentError::VolumeExceeded {
                instance,
                total,
                cap,
            } => write!(
                f,
                "Instance {instance} holds volume {total}, above capacity {cap}"
            ),
        }
    }
}

impl std::error::Error for AssignmentError {}
