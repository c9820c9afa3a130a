//! Static field declarations for a [`SubState`](super::SubState).
//!
//! A schema is an ordered list of fields. Each field carries a visibility
//! level and is either a leaf (a fixed-length `i64` vector with bounds and an
//! initial value) or a nested schema. Composition forms a tree.
//!
//! ```
//! use turnsim::state::{Field, Schema};
//!
//! let schema = Schema::builder()
//!     .public("bank", Field::scalar(100).bounds(0, 1000))
//!     .self_only("hand", Field::vector(vec![0; 5]).bounds(0, 9))
//!     .hidden("luck", Field::scalar(0))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.len(), 3);
//! assert_eq!(schema.numeric_width(), 7);
//! ```

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

use super::visibility::Visibility;
use crate::core::{NumericSpace, Space, StateError};

/// Leaf values. Scalars are width-1 vectors.
pub type Values = SmallVec<[i64; 4]>;

/// Default bound magnitude: the range of integers f32 represents exactly.
pub const DEFAULT_BOUND: i64 = 1 << 24;

/// Leaf field declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub(crate) initial: Values,
    pub(crate) low: i64,
    pub(crate) high: i64,
}

impl Field {
    /// A single-value field.
    #[must_use]
    pub fn scalar(initial: i64) -> Self {
        Self::vector(vec![initial])
    }

    /// A fixed-length vector field.
    #[must_use]
    pub fn vector(initial: Vec<i64>) -> Self {
        Self {
            initial: Values::from_vec(initial),
            low: -DEFAULT_BOUND,
            high: DEFAULT_BOUND,
        }
    }

    /// Set the inclusive numeric bounds.
    #[must_use]
    pub fn bounds(mut self, low: i64, high: i64) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Number of values.
    #[must_use]
    pub fn width(&self) -> usize {
        self.initial.len()
    }

    /// Values restored by `reset`.
    #[must_use]
    pub fn initial(&self) -> &[i64] {
        &self.initial
    }
}

/// What a field holds.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Leaf(Field),
    Nested(Arc<Schema>),
}

/// One declared field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub visibility: Visibility,
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Numeric width of this field, independent of visibility.
    #[must_use]
    pub fn width(&self) -> usize {
        match &self.kind {
            FieldKind::Leaf(field) => field.width(),
            FieldKind::Nested(schema) => schema.numeric_width(),
        }
    }
}

/// Ordered field declarations with O(1) name lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    index: FxHashMap<String, usize>,
    width: usize,
}

impl Schema {
    /// Start declaring a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Fields in declared order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a field by name.
    pub fn position(&self, name: &str) -> Result<usize, StateError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| StateError::UnknownField(name.to_string()))
    }

    /// Field declaration by name.
    pub fn field(&self, name: &str) -> Result<&FieldSpec, StateError> {
        Ok(&self.fields[self.position(name)?])
    }

    /// Total numeric width of every leaf, recursively.
    #[must_use]
    pub fn numeric_width(&self) -> usize {
        self.width
    }

    /// Static shape of the numeric export at `min` visibility.
    ///
    /// Fields that fail visibility keep their width with `[0, 0]` bounds, so
    /// the layout is the same for every observer.
    #[must_use]
    pub fn describe_shape(&self, min: Visibility) -> NumericSpace {
        let mut space = NumericSpace::new();
        self.describe_into("", min, true, &mut space);
        space
    }

    pub(crate) fn describe_into(
        &self,
        prefix: &str,
        min: Visibility,
        visible: bool,
        out: &mut NumericSpace,
    ) {
        for spec in &self.fields {
            let shown = visible && spec.visibility.visible_at(min);
            let key = format!("{prefix}{}", spec.name);
            match &spec.kind {
                FieldKind::Leaf(field) => {
                    let space = if shown {
                        Space::new(field.low as f32, field.high as f32, field.width())
                    } else {
                        Space::zeros(field.width())
                    };
                    out.push(key, space);
                }
                FieldKind::Nested(schema) => {
                    schema.describe_into(&format!("{key}."), min, shown, out);
                }
            }
        }
    }
}

/// Builder for [`Schema`]. Declaration order is numeric layout order.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    /// Declare a leaf at the given visibility.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, visibility: Visibility, field: Field) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            visibility,
            kind: FieldKind::Leaf(field),
        });
        self
    }

    /// Declare a leaf visible to everyone.
    #[must_use]
    pub fn public(self, name: impl Into<String>, field: Field) -> Self {
        self.field(name, Visibility::Public, field)
    }

    /// Declare a leaf visible to the owner only.
    #[must_use]
    pub fn self_only(self, name: impl Into<String>, field: Field) -> Self {
        self.field(name, Visibility::SelfOnly, field)
    }

    /// Declare a leaf visible to the engine only.
    #[must_use]
    pub fn hidden(self, name: impl Into<String>, field: Field) -> Self {
        self.field(name, Visibility::Hidden, field)
    }

    /// Declare a nested sub-schema.
    #[must_use]
    pub fn nested(
        mut self,
        name: impl Into<String>,
        visibility: Visibility,
        schema: Arc<Schema>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            visibility,
            kind: FieldKind::Nested(schema),
        });
        self
    }

    /// Finish the schema. Fails on duplicate names and on leaves whose
    /// low bound exceeds the high one.
    pub fn build(self) -> Result<Arc<Schema>, StateError> {
        let mut index = FxHashMap::default();
        for (i, spec) in self.fields.iter().enumerate() {
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(StateError::DuplicateField(spec.name.clone()));
            }
            if let FieldKind::Leaf(field) = &spec.kind {
                if field.low > field.high {
                    return Err(StateError::InvalidBounds {
                        field: spec.name.clone(),
                        low: field.low,
                        high: field.high,
                    });
                }
            }
        }
        let width = self.fields.iter().map(FieldSpec::width).sum();
        Ok(Arc::new(Schema {
            fields: self.fields,
            index,
            width,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_schema() -> Arc<Schema> {
        Schema::builder()
            .public("rank", Field::scalar(0).bounds(0, 12))
            .hidden("marked", Field::scalar(0).bounds(0, 1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup() {
        let schema = card_schema();
        assert_eq!(schema.position("marked"), Ok(1));
        assert_eq!(
            schema.position("suit"),
            Err(StateError::UnknownField("suit".into()))
        );
        assert_eq!(schema.field("rank").unwrap().visibility, Visibility::Public);
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Schema::builder()
            .public("a", Field::scalar(0))
            .hidden("a", Field::scalar(1))
            .build()
            .unwrap_err();
        assert_eq!(err, StateError::DuplicateField("a".into()));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = Schema::builder()
            .public("x", Field::scalar(3).bounds(10, 0))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            StateError::InvalidBounds {
                field: "x".into(),
                low: 10,
                high: 0
            }
        );
        assert!(Schema::builder()
            .public("pinned", Field::scalar(4).bounds(4, 4))
            .build()
            .is_ok());
    }

    #[test]
    fn test_nested_width_and_shape() {
        let schema = Schema::builder()
            .public("pot", Field::scalar(0).bounds(0, 100))
            .nested("top", Visibility::Public, card_schema())
            .build()
            .unwrap();

        assert_eq!(schema.numeric_width(), 3);

        let shape = schema.describe_shape(Visibility::Public);
        let keys: Vec<_> = shape.entries().map(|e| e.key.clone()).collect();
        assert_eq!(keys, vec!["pot", "top.rank", "top.marked"]);
        assert_eq!(shape.highs(), vec![100.0, 12.0, 0.0]);
    }

    #[test]
    fn test_hidden_parent_zeroes_children() {
        let schema = Schema::builder()
            .nested("secret", Visibility::Hidden, card_schema())
            .build()
            .unwrap();

        let public = schema.describe_shape(Visibility::Public);
        assert_eq!(public.width(), 2);
        assert_eq!(public.highs(), vec![0.0, 0.0]);

        let full = schema.describe_shape(Visibility::Hidden);
        assert_eq!(full.highs(), vec![12.0, 1.0]);
    }

    #[test]
    fn test_default_bounds() {
        let field = Field::vector(vec![1, 2]);
        assert_eq!(field.width(), 2);
        assert_eq!(field.low, -DEFAULT_BOUND);
        assert_eq!(field.high, DEFAULT_BOUND);
    }
}
