//! Action kinds and their codecs.
//!
//! An [`ActionKind`] is the static description of one member of a game's
//! closed action vocabulary: a text key plus a [`PayloadKind`]. Each kind owns
//! two fixed-width numeric slots:
//!
//! | Payload            | Text     | Instance slot (width 1) | Range slot                        |
//! |--------------------|----------|-------------------------|-----------------------------------|
//! | `Flag`             | `key`    | 1 chosen, 0 null        | width 1: 1 actionable, 0 null     |
//! | `Bounded{min,max}` | `key(n)` | raw value, -1 null      | width 2: `[lower, upper]`, -1 null |
//! | `Choice{options}`  | `key(i)` | option index, -1 null   | width `options`: mask, 0 null     |
//!
//! Payloads are non-negative integers, which leaves -1 free as the null
//! sentinel for payload-carrying slots.
//!
//! For discrete agents every kind also enumerates its instances: a flag has
//! one, a bounded kind one per value, a choice one per option.

use serde::{Deserialize, Serialize};

use crate::core::{DecodeError, EngineError, Result, Space};

/// Payload of one action instance. `None` for flag kinds.
pub type Payload = Option<i64>;

/// Numeric value of a null payload slot.
pub const NULL_VALUE: f32 = -1.0;

/// Shape of the data an action kind carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadKind {
    /// No data: the action is either taken or not.
    Flag,
    /// One integer in `min..=max`.
    Bounded { min: i64, max: i64 },
    /// One index into a fixed set of `options`.
    Choice { options: usize },
}

impl PayloadKind {
    /// Does this kind carry an integer payload?
    #[must_use]
    pub fn has_payload(self) -> bool {
        !matches!(self, PayloadKind::Flag)
    }

    /// Is `value` inside this kind's static bounds?
    #[must_use]
    pub fn admits(self, value: i64) -> bool {
        match self {
            PayloadKind::Flag => false,
            PayloadKind::Bounded { min, max } => (min..=max).contains(&value),
            PayloadKind::Choice { options } => value >= 0 && (value as u64) < options as u64,
        }
    }

    /// Number of distinct instances: 1 for a flag, `max - min + 1` for a
    /// bounded value, `options` for a choice.
    #[must_use]
    pub fn distinct_values(self) -> usize {
        match self {
            PayloadKind::Flag => 1,
            PayloadKind::Bounded { min, max } => (max - min + 1) as usize,
            PayloadKind::Choice { options } => options,
        }
    }

    /// Position of `payload` among this kind's instances.
    #[must_use]
    pub fn to_offset(self, payload: Payload) -> Option<usize> {
        match (self, payload) {
            (PayloadKind::Flag, None) => Some(0),
            (PayloadKind::Bounded { min, .. }, Some(value)) if self.admits(value) => {
                Some((value - min) as usize)
            }
            (PayloadKind::Choice { .. }, Some(value)) if self.admits(value) => Some(value as usize),
            _ => None,
        }
    }

    /// Inverse of [`to_offset`](Self::to_offset). `offset` must be below
    /// [`distinct_values`](Self::distinct_values).
    #[must_use]
    pub fn from_offset(self, offset: usize) -> Payload {
        match self {
            PayloadKind::Flag => None,
            PayloadKind::Bounded { min, .. } => Some(min + offset as i64),
            PayloadKind::Choice { .. } => Some(offset as i64),
        }
    }
}

/// Static description of one action kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ActionKind {
    /// Text key, unique within a registry.
    pub key: &'static str,
    pub payload: PayloadKind,
}

impl ActionKind {
    /// A kind with no payload.
    #[must_use]
    pub const fn flag(key: &'static str) -> Self {
        Self {
            key,
            payload: PayloadKind::Flag,
        }
    }

    /// A kind carrying one integer in `min..=max`.
    ///
    /// # Panics
    ///
    /// Panics if `min` is negative or greater than `max`.
    #[must_use]
    pub const fn bounded(key: &'static str, min: i64, max: i64) -> Self {
        assert!(min >= 0, "bounded payloads are non-negative");
        assert!(min <= max, "empty payload bounds");
        Self {
            key,
            payload: PayloadKind::Bounded { min, max },
        }
    }

    /// A kind choosing one of `options` indices.
    ///
    /// # Panics
    ///
    /// Panics if `options` is zero.
    #[must_use]
    pub const fn choice(key: &'static str, options: usize) -> Self {
        assert!(options > 0, "choice needs at least one option");
        Self {
            key,
            payload: PayloadKind::Choice { options },
        }
    }

    // === Text codec ===

    /// Canonical text form: `key` or `key(value)`.
    #[must_use]
    pub fn format(&self, payload: Payload) -> String {
        match payload {
            Some(value) if self.payload.has_payload() => format!("{}({value})", self.key),
            _ => self.key.to_string(),
        }
    }

    /// Could `text` be an instance of this kind? Only looks at the key.
    #[must_use]
    pub fn claims(&self, text: &str) -> bool {
        text.strip_prefix(self.key)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('('))
    }

    /// Parse the canonical text form.
    ///
    /// Flag kinds match the bare key only. Payload kinds match
    /// `key(<digits>)` with the value inside the static bounds; anything else
    /// is [`EngineError::InvalidAction`].
    pub fn parse(&self, text: &str) -> Result<Payload> {
        let invalid = || EngineError::InvalidAction(format!("`{text}` is not a valid {}", self.key));
        let rest = text.strip_prefix(self.key).ok_or_else(invalid)?;

        if !self.payload.has_payload() {
            return if rest.is_empty() { Ok(None) } else { Err(invalid()) };
        }

        let digits = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(invalid)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: i64 = digits.parse().map_err(|_| invalid())?;
        if !self.payload.admits(value) {
            return Err(invalid());
        }
        Ok(Some(value))
    }

    // === Instance codec ===

    /// Static descriptor of the instance slot.
    #[must_use]
    pub fn instance_space(&self) -> Space {
        match self.payload {
            PayloadKind::Flag => Space::binary(1),
            PayloadKind::Bounded { max, .. } => Space::new(NULL_VALUE, max as f32, 1),
            PayloadKind::Choice { options } => Space::new(NULL_VALUE, (options - 1) as f32, 1),
        }
    }

    /// Write a chosen instance into its slot.
    ///
    /// A payload kind given `None` writes the null encoding.
    pub fn write_instance(&self, payload: Payload, slot: &mut [f32]) {
        slot[0] = match (self.payload, payload) {
            (PayloadKind::Flag, _) => 1.0,
            (_, Some(value)) => value as f32,
            (_, None) => NULL_VALUE,
        };
    }

    /// Write the "not chosen" encoding into the instance slot.
    pub fn write_null_instance(&self, slot: &mut [f32]) {
        slot[0] = match self.payload {
            PayloadKind::Flag => 0.0,
            _ => NULL_VALUE,
        };
    }

    /// Decode an instance slot.
    ///
    /// Returns `Ok(None)` for the null encoding. Only the shape is checked:
    /// a payload outside the static bounds decodes fine and is rejected later
    /// by the owning range.
    pub fn decode_instance(&self, slot: &[f32]) -> std::result::Result<Option<Payload>, DecodeError> {
        let [value] = slot else {
            return Err(DecodeError::Length {
                expected: 1,
                got: slot.len(),
            });
        };
        let value = *value;

        match self.payload {
            PayloadKind::Flag => {
                if value == 1.0 {
                    Ok(Some(None))
                } else if value == 0.0 {
                    Ok(None)
                } else {
                    Err(DecodeError::Flag {
                        kind: self.key.to_string(),
                        value,
                    })
                }
            }
            _ if value == NULL_VALUE => Ok(None),
            _ if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
                Ok(Some(Some(value as i64)))
            }
            _ => Err(DecodeError::Payload {
                kind: self.key.to_string(),
                value,
            }),
        }
    }

    // === Range codec ===

    /// Static descriptor of the range slot.
    #[must_use]
    pub fn range_space(&self) -> Space {
        match self.payload {
            PayloadKind::Flag => Space::binary(1),
            PayloadKind::Bounded { max, .. } => Space::new(NULL_VALUE, max as f32, 2),
            PayloadKind::Choice { options } => Space::binary(options),
        }
    }

    /// Write the "not actionable" encoding into the range slot.
    pub fn write_null_range(&self, slot: &mut [f32]) {
        let fill = match self.payload {
            PayloadKind::Bounded { .. } => NULL_VALUE,
            _ => 0.0,
        };
        slot.fill(fill);
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key)
    }
}
