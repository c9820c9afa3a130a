//! Named, visibility-tagged field containers.
//!
//! ## SubState
//!
//! Runtime values for one [`Schema`]. Every declared field is always present:
//! [`SubState::new`] starts from the declared initial values and
//! [`SubState::from_values`] rejects a missing field. Field storage is an
//! `im::Vector`, so cloning a SubState for a snapshot is O(1).
//!
//! ## Projections
//!
//! - [`SubState::project`]: structured, omits fields below the level.
//! - [`SubState::to_numeric`]: flat `f32`, zero-fills fields below the level
//!   so the width never depends on the observer.

use im::Vector;
use std::sync::Arc;

use super::schema::{FieldKind, Schema, Values};
use super::snapshot::{Snapshot, SnapshotValue};
use super::visibility::Visibility;
use crate::core::{NumericSpace, StateError};

type StateResult<T> = std::result::Result<T, StateError>;

/// Runtime value of one field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Leaf(Values),
    Nested(SubState),
}

impl FieldValue {
    /// A leaf value from a plain vector.
    #[must_use]
    pub fn leaf(values: Vec<i64>) -> Self {
        FieldValue::Leaf(Values::from_vec(values))
    }
}

/// Field values for one schema.
#[derive(Clone, Debug, PartialEq)]
pub struct SubState {
    schema: Arc<Schema>,
    values: Vector<FieldValue>,
}

impl SubState {
    /// Create a SubState holding every field's initial value.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = Self::initial_values(&schema);
        Self { schema, values }
    }

    /// Create a SubState from explicit values.
    ///
    /// Every declared field must be supplied; leaves must match the declared
    /// width and nested values must use the declared sub-schema.
    pub fn from_values(
        schema: Arc<Schema>,
        supplied: impl IntoIterator<Item = (String, FieldValue)>,
    ) -> StateResult<Self> {
        let mut slots: Vec<Option<FieldValue>> = vec![None; schema.len()];
        for (name, value) in supplied {
            let position = schema.position(&name)?;
            check_shape(&schema, position, &value)?;
            slots[position] = Some(value);
        }

        let mut values = Vector::new();
        for (spec, slot) in schema.fields().iter().zip(slots) {
            match slot {
                Some(value) => values.push_back(value),
                None => return Err(StateError::MissingField(spec.name.clone())),
            }
        }
        Ok(Self { schema, values })
    }

    fn initial_values(schema: &Arc<Schema>) -> Vector<FieldValue> {
        schema
            .fields()
            .iter()
            .map(|spec| match &spec.kind {
                FieldKind::Leaf(field) => FieldValue::Leaf(field.initial.clone()),
                FieldKind::Nested(inner) => FieldValue::Nested(SubState::new(Arc::clone(inner))),
            })
            .collect()
    }

    /// The declared schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Restore every field to its initial value, recursively.
    ///
    /// The schema is untouched.
    pub fn reset(&mut self) {
        for (position, spec) in self.schema.fields().iter().enumerate() {
            match (&spec.kind, &mut self.values[position]) {
                (FieldKind::Leaf(field), FieldValue::Leaf(values)) => {
                    *values = field.initial.clone();
                }
                (FieldKind::Nested(_), FieldValue::Nested(inner)) => inner.reset(),
                (_, slot) => *slot = Self::initial_values(&self.schema)[position].clone(),
            }
        }
    }

    // === Leaf access ===

    /// Values of a leaf field.
    pub fn get(&self, name: &str) -> StateResult<&[i64]> {
        match &self.values[self.schema.position(name)?] {
            FieldValue::Leaf(values) => Ok(values),
            FieldValue::Nested(_) => Err(StateError::NotALeaf(name.to_string())),
        }
    }

    /// First value of a leaf field.
    pub fn get_scalar(&self, name: &str) -> StateResult<i64> {
        self.get(name)?
            .first()
            .copied()
            .ok_or_else(|| StateError::ShapeMismatch {
                field: name.to_string(),
                expected: 1,
                got: 0,
            })
    }

    fn leaf_mut(&mut self, name: &str) -> StateResult<&mut Values> {
        let position = self.schema.position(name)?;
        match &mut self.values[position] {
            FieldValue::Leaf(values) => Ok(values),
            FieldValue::Nested(_) => Err(StateError::NotALeaf(name.to_string())),
        }
    }

    /// Replace a leaf field's values. The width must match.
    pub fn set(&mut self, name: &str, values: &[i64]) -> StateResult<()> {
        let slot = self.leaf_mut(name)?;
        if slot.len() != values.len() {
            return Err(StateError::ShapeMismatch {
                field: name.to_string(),
                expected: slot.len(),
                got: values.len(),
            });
        }
        slot.copy_from_slice(values);
        Ok(())
    }

    /// Set one element of a leaf field.
    pub fn set_at(&mut self, name: &str, index: usize, value: i64) -> StateResult<()> {
        let slot = self.leaf_mut(name)?;
        let width = slot.len();
        match slot.get_mut(index) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => Err(StateError::ShapeMismatch {
                field: name.to_string(),
                expected: width,
                got: index + 1,
            }),
        }
    }

    /// Set the first value of a leaf field.
    pub fn set_scalar(&mut self, name: &str, value: i64) -> StateResult<()> {
        self.set_at(name, 0, value)
    }

    /// Add `delta` to the first value of a leaf field; returns the new value.
    pub fn modify_scalar(&mut self, name: &str, delta: i64) -> StateResult<i64> {
        let updated = self
            .get_scalar(name)?
            .checked_add(delta)
            .ok_or_else(|| StateError::Overflow(name.to_string()))?;
        self.set_scalar(name, updated)?;
        Ok(updated)
    }

    // === Nested access ===

    /// A nested SubState.
    pub fn nested(&self, name: &str) -> StateResult<&SubState> {
        match &self.values[self.schema.position(name)?] {
            FieldValue::Nested(inner) => Ok(inner),
            FieldValue::Leaf(_) => Err(StateError::NotNested(name.to_string())),
        }
    }

    /// A nested SubState, mutably.
    pub fn nested_mut(&mut self, name: &str) -> StateResult<&mut SubState> {
        let position = self.schema.position(name)?;
        match &mut self.values[position] {
            FieldValue::Nested(inner) => Ok(inner),
            FieldValue::Leaf(_) => Err(StateError::NotNested(name.to_string())),
        }
    }

    // === Projections ===

    /// Structured copy of every field whose visibility is `>= min`.
    #[must_use]
    pub fn project(&self, min: Visibility) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (spec, value) in self.schema.fields().iter().zip(self.values.iter()) {
            if !spec.visibility.visible_at(min) {
                continue;
            }
            let projected = match value {
                FieldValue::Leaf(values) => SnapshotValue::Values(values.to_vec()),
                FieldValue::Nested(inner) => SnapshotValue::Nested(inner.project(min)),
            };
            snapshot.push(spec.name.clone(), projected);
        }
        snapshot
    }

    /// Flat numeric export at `min` visibility.
    ///
    /// Always `schema().numeric_width()` long; hidden fields are zero-filled
    /// and visible values are clamped to their declared bounds.
    #[must_use]
    pub fn to_numeric(&self, min: Visibility) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.schema.numeric_width());
        self.write_numeric(min, &mut out);
        out
    }

    /// Append the numeric export to `out`.
    pub fn write_numeric(&self, min: Visibility, out: &mut Vec<f32>) {
        for (spec, value) in self.schema.fields().iter().zip(self.values.iter()) {
            let visible = spec.visibility.visible_at(min);
            match (&spec.kind, value) {
                (FieldKind::Leaf(field), FieldValue::Leaf(values)) if visible => {
                    out.extend(
                        values
                            .iter()
                            .map(|&v| v.clamp(field.low, field.high) as f32),
                    );
                }
                (FieldKind::Nested(_), FieldValue::Nested(inner)) if visible => {
                    inner.write_numeric(min, out);
                }
                _ => out.extend(std::iter::repeat(0.0).take(spec.width())),
            }
        }
    }

    /// Static shape matching [`to_numeric`](Self::to_numeric) at `min`.
    #[must_use]
    pub fn describe_shape(&self, min: Visibility) -> NumericSpace {
        self.schema.describe_shape(min)
    }
}

fn check_shape(schema: &Schema, position: usize, value: &FieldValue) -> StateResult<()> {
    let spec = &schema.fields()[position];
    match (&spec.kind, value) {
        (FieldKind::Leaf(field), FieldValue::Leaf(values)) => {
            if values.len() == field.width() {
                Ok(())
            } else {
                Err(StateError::ShapeMismatch {
                    field: spec.name.clone(),
                    expected: field.width(),
                    got: values.len(),
                })
            }
        }
        (FieldKind::Nested(expected), FieldValue::Nested(inner)) => {
            if inner.schema() == expected {
                Ok(())
            } else {
                Err(StateError::ShapeMismatch {
                    field: spec.name.clone(),
                    expected: expected.numeric_width(),
                    got: inner.schema().numeric_width(),
                })
            }
        }
        (FieldKind::Leaf(_), FieldValue::Nested(_)) => Err(StateError::NotALeaf(spec.name.clone())),
        (FieldKind::Nested(_), FieldValue::Leaf(_)) => Err(StateError::NotNested(spec.name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Field;

    fn chip_schema() -> Arc<Schema> {
        Schema::builder()
            .public("count", Field::scalar(3).bounds(0, 10))
            .hidden("serial", Field::scalar(77))
            .build()
            .unwrap()
    }

    fn seat_schema() -> Arc<Schema> {
        Schema::builder()
            .public("bank", Field::scalar(100).bounds(0, 1000))
            .self_only("hand", Field::vector(vec![0, 0, 0]).bounds(0, 9))
            .hidden("luck", Field::scalar(5).bounds(0, 10))
            .nested("chips", Visibility::Public, chip_schema())
            .build()
            .unwrap()
    }

    #[test]
    fn test_modify_overflow_is_an_error() {
        let schema = Schema::builder()
            .public("x", Field::scalar(i64::MAX))
            .build()
            .unwrap();
        let mut state = SubState::new(schema);
        assert_eq!(
            state.modify_scalar("x", 1),
            Err(StateError::Overflow("x".into()))
        );
        assert_eq!(state.get_scalar("x"), Ok(i64::MAX));
        assert_eq!(state.modify_scalar("x", -1), Ok(i64::MAX - 1));
    }

    #[test]
    fn test_new_uses_initial_values() {
        let seat = SubState::new(seat_schema());
        assert_eq!(seat.get_scalar("bank"), Ok(100));
        assert_eq!(seat.get("hand"), Ok(&[0, 0, 0][..]));
        assert_eq!(seat.nested("chips").unwrap().get_scalar("count"), Ok(3));
    }

    #[test]
    fn test_set_and_modify() {
        let mut seat = SubState::new(seat_schema());
        seat.set("hand", &[4, 5, 6]).unwrap();
        seat.set_at("hand", 1, 9).unwrap();
        assert_eq!(seat.get("hand"), Ok(&[4, 9, 6][..]));

        assert_eq!(seat.modify_scalar("bank", -30), Ok(70));
        assert_eq!(seat.get_scalar("bank"), Ok(70));
    }

    #[test]
    fn test_set_errors() {
        let mut seat = SubState::new(seat_schema());
        assert_eq!(
            seat.set("hand", &[1]),
            Err(StateError::ShapeMismatch {
                field: "hand".into(),
                expected: 3,
                got: 1
            })
        );
        assert_eq!(
            seat.set_scalar("nope", 1),
            Err(StateError::UnknownField("nope".into()))
        );
        assert_eq!(seat.get("chips"), Err(StateError::NotALeaf("chips".into())));
        assert!(matches!(seat.nested("bank"), Err(StateError::NotNested(_))));
        assert!(seat.set_at("hand", 3, 1).is_err());
    }

    #[test]
    fn test_reset_is_recursive() {
        let mut seat = SubState::new(seat_schema());
        seat.set_scalar("bank", 1).unwrap();
        seat.set_scalar("luck", 0).unwrap();
        seat.nested_mut("chips").unwrap().set_scalar("count", 9).unwrap();
        let schema_before = Arc::clone(seat.schema());

        seat.reset();

        assert_eq!(seat, SubState::new(seat_schema()));
        assert!(Arc::ptr_eq(seat.schema(), &schema_before));
    }

    #[test]
    fn test_from_values_requires_every_field() {
        let schema = chip_schema();
        let err = SubState::from_values(
            Arc::clone(&schema),
            vec![("count".to_string(), FieldValue::leaf(vec![1]))],
        )
        .unwrap_err();
        assert_eq!(err, StateError::MissingField("serial".into()));

        let ok = SubState::from_values(
            schema,
            vec![
                ("serial".to_string(), FieldValue::leaf(vec![1])),
                ("count".to_string(), FieldValue::leaf(vec![2])),
            ],
        )
        .unwrap();
        assert_eq!(ok.get_scalar("count"), Ok(2));
    }

    #[test]
    fn test_from_values_checks_shape() {
        let err = SubState::from_values(
            chip_schema(),
            vec![("count".to_string(), FieldValue::leaf(vec![1, 2]))],
        )
        .unwrap_err();
        assert!(matches!(err, StateError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_project_filters_by_level() {
        let seat = SubState::new(seat_schema());

        let public = seat.project(Visibility::Public);
        assert_eq!(public.names().collect::<Vec<_>>(), vec!["bank", "chips"]);
        match public.get("chips") {
            Some(SnapshotValue::Nested(chips)) => {
                assert!(chips.contains("count"));
                assert!(!chips.contains("serial"));
            }
            other => panic!("expected nested chips, got {other:?}"),
        }

        let own = seat.project(Visibility::SelfOnly);
        assert_eq!(own.names().collect::<Vec<_>>(), vec!["bank", "hand", "chips"]);

        let full = seat.project(Visibility::Hidden);
        assert_eq!(full.len(), 4);
    }

    #[test]
    fn test_numeric_zero_fills_hidden() {
        let mut seat = SubState::new(seat_schema());
        seat.set("hand", &[1, 2, 3]).unwrap();

        // bank, hand x3, luck, chips.count, chips.serial
        assert_eq!(
            seat.to_numeric(Visibility::Hidden),
            vec![100.0, 1.0, 2.0, 3.0, 5.0, 3.0, 77.0]
        );
        assert_eq!(
            seat.to_numeric(Visibility::SelfOnly),
            vec![100.0, 1.0, 2.0, 3.0, 0.0, 3.0, 0.0]
        );
        assert_eq!(
            seat.to_numeric(Visibility::Public),
            vec![100.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0]
        );
    }

    #[test]
    fn test_numeric_clamps_to_bounds() {
        let mut seat = SubState::new(seat_schema());
        seat.set_scalar("bank", 5000).unwrap();
        assert_eq!(seat.to_numeric(Visibility::Public)[0], 1000.0);
        // Structured view keeps the raw value.
        assert_eq!(seat.project(Visibility::Public).values("bank"), Some(&[5000][..]));
    }

    #[test]
    fn test_nothing_visible_still_has_full_width() {
        let schema = Schema::builder()
            .hidden("a", Field::vector(vec![1, 2]))
            .self_only("b", Field::scalar(3))
            .build()
            .unwrap();
        let state = SubState::new(schema);

        let numeric = state.to_numeric(Visibility::Public);
        assert_eq!(numeric, vec![0.0, 0.0, 0.0]);
        assert_eq!(state.describe_shape(Visibility::Public).width(), 3);
        assert!(state.project(Visibility::Public).is_empty());
    }

    #[test]
    fn test_shape_matches_numeric_width() {
        let seat = SubState::new(seat_schema());
        for min in [Visibility::Hidden, Visibility::SelfOnly, Visibility::Public] {
            assert_eq!(seat.describe_shape(min).width(), seat.to_numeric(min).len());
        }
    }
}
