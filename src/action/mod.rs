//! Action vocabulary: kinds, legality ranges and the registry codec.
//!
//! A game declares its actions as a closed enum implementing [`Action`].
//! Each variant maps to one static [`ActionKind`]; the exhaustive match in
//! [`Action::kind`] is what keeps the vocabulary closed at compile time.
//!
//! ```
//! use turnsim::action::{Action, ActionKind, ActionRegistry, Payload};
//!
//! const PASS: ActionKind = ActionKind::flag("pass");
//! const RAISE: ActionKind = ActionKind::bounded("raise", 1, 10);
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Poker {
//!     Pass,
//!     Raise(i64),
//! }
//!
//! impl Action for Poker {
//!     fn kind(&self) -> ActionKind {
//!         match self {
//!             Poker::Pass => PASS,
//!             Poker::Raise(_) => RAISE,
//!         }
//!     }
//!
//!     fn payload(&self) -> Payload {
//!         match self {
//!             Poker::Pass => None,
//!             Poker::Raise(n) => Some(*n),
//!         }
//!     }
//!
//!     fn from_parts(kind: &ActionKind, payload: Payload) -> Option<Self> {
//!         match (kind.key, payload) {
//!             ("pass", None) => Some(Poker::Pass),
//!             ("raise", Some(n)) => Some(Poker::Raise(n)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let registry = ActionRegistry::<Poker>::new([PASS, RAISE]).unwrap();
//! let vector = registry.encode(&Poker::Raise(4)).unwrap();
//! assert_eq!(vector, vec![0.0, 4.0]);
//! assert_eq!(registry.decode(&vector).unwrap(), Poker::Raise(4));
//! assert_eq!(registry.from_text("raise(4)").unwrap(), Poker::Raise(4));
//! ```

pub mod kind;
pub mod range;
pub mod registry;

pub use kind::{ActionKind, Payload, PayloadKind, NULL_VALUE};
pub use range::ActionRange;
pub use registry::ActionRegistry;

use std::fmt::Debug;

/// A concrete action instance of a game's closed vocabulary.
///
/// Equality is structural: same kind, same payload.
pub trait Action: Clone + PartialEq + Debug {
    /// The kind this instance belongs to.
    fn kind(&self) -> ActionKind;

    /// The integer payload, `None` for flag kinds.
    fn payload(&self) -> Payload;

    /// Rebuild an instance from decoded parts.
    ///
    /// Returns `None` when the kind is not part of this vocabulary.
    fn from_parts(kind: &ActionKind, payload: Payload) -> Option<Self>;

    /// Canonical text form.
    fn to_text(&self) -> String {
        self.kind().format(self.payload())
    }
}
