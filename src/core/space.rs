//! Fixed-width numeric space descriptors.
//!
//! Every numeric vector the engine produces (state observations, action
//! vectors, legal-range vectors) has a static layout described by a
//! [`NumericSpace`]: an ordered list of named slots, each a [`Space`] of
//! `width` values sharing one `[low, high]` bound. Offsets are computed once
//! at construction so encoding and decoding are plain offset arithmetic.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Bounds and width of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Space {
    /// Lowest value any element may take.
    pub low: f32,
    /// Highest value any element may take (inclusive).
    pub high: f32,
    /// Number of elements in the slot.
    pub width: usize,
}

impl Space {
    /// Create a slot descriptor.
    #[must_use]
    pub const fn new(low: f32, high: f32, width: usize) -> Self {
        Self { low, high, width }
    }

    /// A 0/1 slot of the given width.
    #[must_use]
    pub const fn binary(width: usize) -> Self {
        Self::new(0.0, 1.0, width)
    }

    /// A slot that is always zero (used for fields hidden from an observer).
    #[must_use]
    pub const fn zeros(width: usize) -> Self {
        Self::new(0.0, 0.0, width)
    }
}

/// One named slot of a [`NumericSpace`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpaceEntry {
    pub key: String,
    pub space: Space,
    pub offset: usize,
}

/// Ordered concatenation of named slots.
///
/// ```
/// use turnsim::core::{NumericSpace, Space};
///
/// let mut space = NumericSpace::new();
/// space.push("wait", Space::binary(1));
/// space.push("bet", Space::new(0.0, 20.0, 2));
///
/// assert_eq!(space.width(), 3);
/// assert_eq!(space.slot("bet"), Some(1..3));
/// assert_eq!(space.highs(), vec![1.0, 20.0, 20.0]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericSpace {
    entries: Vec<SpaceEntry>,
    width: usize,
}

impl NumericSpace {
    /// Create an empty space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slot at the end of the layout.
    pub fn push(&mut self, key: impl Into<String>, space: Space) {
        self.entries.push(SpaceEntry {
            key: key.into(),
            space,
            offset: self.width,
        });
        self.width += space.width;
    }

    /// Append every slot of `other`, prefixing its keys.
    pub fn extend_prefixed(&mut self, prefix: &str, other: &NumericSpace) {
        for entry in &other.entries {
            self.push(format!("{prefix}{}", entry.key), entry.space);
        }
    }

    /// Total number of elements.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the layout has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots in declared order.
    pub fn entries(&self) -> impl Iterator<Item = &SpaceEntry> {
        self.entries.iter()
    }

    /// Element range of a slot by key.
    #[must_use]
    pub fn slot(&self, key: &str) -> Option<Range<usize>> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.offset..e.offset + e.space.width)
    }

    /// Per-element lower bounds.
    #[must_use]
    pub fn lows(&self) -> Vec<f32> {
        self.expand(|s| s.low)
    }

    /// Per-element upper bounds.
    #[must_use]
    pub fn highs(&self) -> Vec<f32> {
        self.expand(|s| s.high)
    }

    fn expand(&self, bound: impl Fn(&Space) -> f32) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.width);
        for entry in &self.entries {
            out.extend(std::iter::repeat(bound(&entry.space)).take(entry.space.width));
        }
        out
    }
}
