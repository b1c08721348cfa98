//! Ap-tracking descriptors recorded by the compiler

use serde::{Deserialize, Serialize};

/// Known relation between `ap` and a program point.
///
/// Within one `group`, `offset` counts how far `ap` has advanced since the
/// start of the group. Offsets from different groups are not comparable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApTracking {
    /// Ap-tracking group
    pub group: usize,
    /// Ap advance within the group
    pub offset: usize,
}

impl ApTracking {
    /// Creates a descriptor
    pub fn new(group: usize, offset: usize) -> Self {
        ApTracking { group, offset }
    }

    /// Returns true if both descriptors belong to the same group
    pub fn same_group(&self, other: &ApTracking) -> bool {
        self.group == other.group
    }

    /// `self.offset - other.offset` as a 16-bit cell delta.
    ///
    /// Only meaningful when both descriptors share a group.
    pub(crate) fn offset_delta(&self, other: &ApTracking) -> i16 {
        (self.offset as i64).wrapping_sub(other.offset as i64) as i16
    }
}
