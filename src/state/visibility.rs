//! Per-field visibility levels.

use serde::{Deserialize, Serialize};

/// Access tier of a state field, ordered `Hidden < SelfOnly < Public`.
///
/// A projection at minimum level `min` keeps every field whose level is
/// `>= min`:
///
/// - `Public`: what every observer may see.
/// - `SelfOnly`: additionally what the owning player may see.
/// - `Hidden`: everything, for the engine itself (logging, debugging).
///
/// ```
/// use turnsim::state::Visibility;
///
/// assert!(Visibility::Public.visible_at(Visibility::SelfOnly));
/// assert!(!Visibility::SelfOnly.visible_at(Visibility::Public));
/// assert!(Visibility::Hidden.visible_at(Visibility::Hidden));
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Visible to nobody but the engine.
    Hidden,
    /// Visible to the owning player.
    SelfOnly,
    /// Visible to everyone.
    Public,
}

impl Visibility {
    /// Does a field at this level survive a projection at `min`?
    #[must_use]
    pub fn visible_at(self, min: Visibility) -> bool {
        self >= min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Visibility::Hidden < Visibility::SelfOnly);
        assert!(Visibility::SelfOnly < Visibility::Public);
    }

    #[test]
    fn test_visible_at_matrix() {
        use Visibility::*;
        let levels = [Hidden, SelfOnly, Public];
        for field in levels {
            for min in levels {
                assert_eq!(field.visible_at(min), field >= min, "{field:?} at {min:?}");
            }
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Visibility::SelfOnly).unwrap();
        assert_eq!(json, "\"SELF_ONLY\"");
    }
}
