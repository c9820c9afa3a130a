//! The union of every action kind of one game.
//!
//! ## Layout
//!
//! The registry fixes the numeric layout once at construction: kinds are
//! concatenated in registration order, and each kind's instance and range
//! slot offsets are precomputed. Encode and decode are then offset arithmetic
//! over one flat buffer. Registration order is part of the wire contract.
//!
//! The same order lays out a flat discrete index: each kind owns
//! `distinct_values()` consecutive integers starting where the previous
//! kind's end. [`ActionRegistry::to_index`] and [`ActionRegistry::from_index`]
//! map between actions and that index.
//!
//! ## Decode tie-break
//!
//! [`ActionRegistry::decode`] walks the slots in registration order and
//! returns the first non-null one. Later slots are not inspected.

use rustc_hash::FxHashMap;
use std::marker::PhantomData;
use std::ops::Range;

use super::kind::ActionKind;
use super::range::ActionRange;
use super::Action;
use crate::core::{DecodeError, EngineError, GameRng, NumericSpace, Result};

/// Precomputed codec for a closed action vocabulary.
#[derive(Clone, Debug)]
pub struct ActionRegistry<A> {
    kinds: Vec<ActionKind>,
    index: FxHashMap<&'static str, usize>,
    instance_space: NumericSpace,
    range_space: NumericSpace,
    instance_slots: Vec<Range<usize>>,
    range_slots: Vec<Range<usize>>,
    index_slots: Vec<Range<usize>>,
    _action: PhantomData<fn() -> A>,
}

impl<A: Action> ActionRegistry<A> {
    /// Build the layout for `kinds`, in order.
    ///
    /// Fails on an empty list or a repeated key.
    pub fn new(kinds: impl IntoIterator<Item = ActionKind>) -> Result<Self> {
        let kinds: Vec<ActionKind> = kinds.into_iter().collect();
        if kinds.is_empty() {
            return Err(EngineError::InvalidConfiguration("no action kinds registered"));
        }

        let mut index = FxHashMap::default();
        let mut instance_space = NumericSpace::new();
        let mut range_space = NumericSpace::new();
        for (i, kind) in kinds.iter().enumerate() {
            if index.insert(kind.key, i).is_some() {
                return Err(EngineError::InvalidConfiguration("duplicate action kind key"));
            }
            instance_space.push(kind.key, kind.instance_space());
            range_space.push(kind.key, kind.range_space());
        }

        let instance_slots = slots(&instance_space);
        let range_slots = slots(&range_space);
        let mut index_slots = Vec::with_capacity(kinds.len());
        let mut lower = 0;
        for kind in &kinds {
            let upper = lower + kind.payload.distinct_values();
            index_slots.push(lower..upper);
            lower = upper;
        }
        Ok(Self {
            kinds,
            index,
            instance_space,
            range_space,
            instance_slots,
            range_slots,
            index_slots,
            _action: PhantomData,
        })
    }

    /// Registered kinds in layout order.
    #[must_use]
    pub fn kinds(&self) -> &[ActionKind] {
        &self.kinds
    }

    /// A registered kind by key.
    #[must_use]
    pub fn kind(&self, key: &str) -> Option<&ActionKind> {
        self.index.get(key).map(|&i| &self.kinds[i])
    }

    /// Static layout of action vectors.
    #[must_use]
    pub fn numeric_space(&self) -> &NumericSpace {
        &self.instance_space
    }

    /// Static layout of legal-range vectors.
    #[must_use]
    pub fn range_numeric_space(&self) -> &NumericSpace {
        &self.range_space
    }

    fn position(&self, kind: &ActionKind) -> Result<usize> {
        match self.index.get(kind.key) {
            Some(&i) if self.kinds[i] == *kind => Ok(i),
            _ => Err(EngineError::UnknownActionKind(kind.key.to_string())),
        }
    }

    fn instance_slot(&self, i: usize) -> Range<usize> {
        self.instance_slots[i].clone()
    }

    fn range_slot(&self, i: usize) -> Range<usize> {
        self.range_slots[i].clone()
    }

    // === Instance vectors ===

    /// Full action vector: the chosen slot holds its encoding, every other
    /// slot its null encoding.
    pub fn encode(&self, action: &A) -> Result<Vec<f32>> {
        let kind = action.kind();
        let chosen = self.position(&kind)?;
        if kind.payload.has_payload() != action.payload().is_some() {
            return Err(EngineError::InvalidAction(format!(
                "{} payload does not match its kind",
                action.to_text()
            )));
        }

        let mut out = vec![0.0; self.instance_space.width()];
        for (i, k) in self.kinds.iter().enumerate() {
            let slot = &mut out[self.instance_slot(i)];
            if i == chosen {
                k.write_instance(action.payload(), slot);
            } else {
                k.write_null_instance(slot);
            }
        }
        Ok(out)
    }

    /// All-null action vector.
    #[must_use]
    pub fn null_vector(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.instance_space.width()];
        for (i, k) in self.kinds.iter().enumerate() {
            k.write_null_instance(&mut out[self.instance_slot(i)]);
        }
        out
    }

    /// Reconstruct an action from a full vector.
    ///
    /// The first non-null slot in registration order wins. A malformed slot
    /// before it is a [`DecodeError`]; every slot null is
    /// [`EngineError::NoActionDecoded`].
    pub fn decode(&self, vector: &[f32]) -> Result<A> {
        if vector.len() != self.instance_space.width() {
            return Err(DecodeError::Length {
                expected: self.instance_space.width(),
                got: vector.len(),
            }
            .into());
        }

        for (i, kind) in self.kinds.iter().enumerate() {
            if let Some(payload) = kind.decode_instance(&vector[self.instance_slot(i)])? {
                return A::from_parts(kind, payload)
                    .ok_or_else(|| EngineError::UnknownActionKind(kind.key.to_string()));
            }
        }
        Err(EngineError::NoActionDecoded)
    }

    // === Range vectors ===

    /// Legal-range vector: present kinds hold their dynamic encoding, absent
    /// kinds their null encoding.
    pub fn ranges_to_numeric(&self, ranges: &[ActionRange]) -> Result<Vec<f32>> {
        let mut out = self.null_ranges();
        for range in ranges {
            let i = self.position(&range.kind())?;
            range.write_numeric(&mut out[self.range_slot(i)]);
        }
        Ok(out)
    }

    /// Range vector with every kind not actionable.
    #[must_use]
    pub fn null_ranges(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.range_space.width()];
        for (i, k) in self.kinds.iter().enumerate() {
            k.write_null_range(&mut out[self.range_slot(i)]);
        }
        out
    }

    /// Legal iff some range has the action's kind and admits it.
    ///
    /// An empty range list makes every action illegal.
    #[must_use]
    pub fn is_legal(&self, action: &A, ranges: &[ActionRange]) -> bool {
        ranges.iter().any(|range| range.is_valid(action))
    }

    // === Discrete index ===

    /// Size of the flat discrete action index.
    #[must_use]
    pub fn number_of_actions(&self) -> usize {
        self.index_slots.last().map_or(0, |slot| slot.end)
    }

    /// Index span `lower..upper` owned by a kind.
    #[must_use]
    pub fn index_range(&self, key: &str) -> Option<Range<usize>> {
        self.index.get(key).map(|&i| self.index_slots[i].clone())
    }

    /// Flat discrete index of `action`.
    ///
    /// Payloads outside the kind's static bounds have no index.
    pub fn to_index(&self, action: &A) -> Result<usize> {
        let kind = action.kind();
        let i = self.position(&kind)?;
        let offset = kind.payload.to_offset(action.payload()).ok_or_else(|| {
            EngineError::InvalidAction(format!("{} has no discrete index", action.to_text()))
        })?;
        Ok(self.index_slots[i].start + offset)
    }

    /// Action at a flat discrete index.
    pub fn from_index(&self, index: usize) -> Result<A> {
        let i = self
            .index_slots
            .iter()
            .position(|slot| slot.contains(&index))
            .ok_or_else(|| {
                EngineError::InvalidAction(format!(
                    "index {index} outside 0..{}",
                    self.number_of_actions()
                ))
            })?;
        let kind = &self.kinds[i];
        let payload = kind.payload.from_offset(index - self.index_slots[i].start);
        A::from_parts(kind, payload).ok_or_else(|| EngineError::UnknownActionKind(kind.key.to_string()))
    }

    // === Text ===

    /// Parse the canonical text form, trying every kind in order.
    pub fn from_text(&self, text: &str) -> Result<A> {
        let kind = self
            .kinds
            .iter()
            .find(|kind| kind.claims(text))
            .ok_or_else(|| EngineError::InvalidAction(format!("`{text}` matches no action kind")))?;
        let payload = kind.parse(text)?;
        A::from_parts(kind, payload).ok_or_else(|| EngineError::UnknownActionKind(kind.key.to_string()))
    }

    /// Canonical text form.
    #[must_use]
    pub fn to_text(&self, action: &A) -> String {
        action.to_text()
    }

    /// Pick a random actionable range, then a random instance inside it.
    pub fn pick_random(&self, ranges: &[ActionRange], rng: &mut GameRng) -> Option<A> {
        let actionable: Vec<&ActionRange> = ranges.iter().filter(|r| r.is_actionable()).collect();
        let range = *rng.choose(&actionable)?;
        let payload = range.pick_random(rng)?;
        A::from_parts(&range.kind(), payload)
    }
}

fn slots(space: &NumericSpace) -> Vec<Range<usize>> {
    space
        .entries()
        .map(|e| e.offset..e.offset + e.space.width)
        .collect()
}
