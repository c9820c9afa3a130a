//! Legality envelopes computed at decision time.

use smallvec::SmallVec;

use super::kind::{ActionKind, Payload, PayloadKind};
use super::Action;
use crate::core::GameRng;

/// What is legal for one kind right now.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Envelope {
    Unavailable,
    Flag,
    Bounded { lower: i64, upper: i64 },
    Choice { legal: SmallVec<[bool; 8]> },
}

/// Legality envelope for one action kind at one decision point.
///
/// Built fresh from `(state, player)` by the game each turn and never kept
/// across turns. A range that is not actionable rejects every instance of
/// its kind.
///
/// ```
/// use turnsim::action::{ActionKind, ActionRange};
///
/// const BET: ActionKind = ActionKind::bounded("bet", 1, 20);
///
/// let range = ActionRange::bounded(BET, 2, 8);
/// assert!(range.is_actionable());
/// assert!(range.admits(Some(5)));
/// assert!(!range.admits(Some(9)));
/// assert_eq!(range.to_numeric(), vec![2.0, 8.0]);
///
/// // Bank below the minimum bet: nothing to offer.
/// let broke = ActionRange::bounded(BET, 1, 0);
/// assert!(!broke.is_actionable());
/// assert_eq!(broke.to_numeric(), vec![-1.0, -1.0]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRange {
    kind: ActionKind,
    envelope: Envelope,
}

impl ActionRange {
    /// A range that offers nothing.
    #[must_use]
    pub fn unavailable(kind: ActionKind) -> Self {
        Self {
            kind,
            envelope: Envelope::Unavailable,
        }
    }

    /// A flag range, actionable or not.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is not a flag kind.
    #[must_use]
    pub fn flag(kind: ActionKind, actionable: bool) -> Self {
        assert!(
            matches!(kind.payload, PayloadKind::Flag),
            "{kind} is not a flag kind"
        );
        let envelope = if actionable {
            Envelope::Flag
        } else {
            Envelope::Unavailable
        };
        Self { kind, envelope }
    }

    /// A bounded range `lower..=upper`, intersected with the kind's static
    /// bounds. An empty interval is not actionable.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is not a bounded kind.
    #[must_use]
    pub fn bounded(kind: ActionKind, lower: i64, upper: i64) -> Self {
        let PayloadKind::Bounded { min, max } = kind.payload else {
            panic!("{kind} is not a bounded kind");
        };
        let lower = lower.max(min);
        let upper = upper.min(max);
        let envelope = if lower <= upper {
            Envelope::Bounded { lower, upper }
        } else {
            Envelope::Unavailable
        };
        Self { kind, envelope }
    }

    /// A choice range over the given legal option indices.
    ///
    /// Indices outside the kind's options are ignored. No legal index means
    /// not actionable.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is not a choice kind.
    #[must_use]
    pub fn choice(kind: ActionKind, legal: impl IntoIterator<Item = usize>) -> Self {
        let PayloadKind::Choice { options } = kind.payload else {
            panic!("{kind} is not a choice kind");
        };
        let mut mask: SmallVec<[bool; 8]> = SmallVec::from_elem(false, options);
        for index in legal {
            if let Some(slot) = mask.get_mut(index) {
                *slot = true;
            }
        }
        let envelope = if mask.contains(&true) {
            Envelope::Choice { legal: mask }
        } else {
            Envelope::Unavailable
        };
        Self { kind, envelope }
    }

    /// The kind this range governs.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Can this kind be taken at all this turn?
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.envelope != Envelope::Unavailable
    }

    /// Is this payload inside the envelope?
    #[must_use]
    pub fn admits(&self, payload: Payload) -> bool {
        match (&self.envelope, payload) {
            (Envelope::Flag, None) => true,
            (Envelope::Bounded { lower, upper }, Some(value)) => (*lower..=*upper).contains(&value),
            (Envelope::Choice { legal }, Some(value)) => usize::try_from(value)
                .ok()
                .and_then(|i| legal.get(i).copied())
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Is this instance of the matching kind and inside the envelope?
    #[must_use]
    pub fn is_valid<A: Action>(&self, action: &A) -> bool {
        action.kind() == self.kind && self.admits(action.payload())
    }

    /// Dynamic numeric encoding of the range; the null encoding when not
    /// actionable.
    #[must_use]
    pub fn to_numeric(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.kind.range_space().width];
        self.write_numeric(&mut out);
        out
    }

    /// Write the dynamic encoding into a range slot.
    pub fn write_numeric(&self, slot: &mut [f32]) {
        match &self.envelope {
            Envelope::Unavailable => self.kind.write_null_range(slot),
            Envelope::Flag => slot[0] = 1.0,
            Envelope::Bounded { lower, upper } => {
                slot[0] = *lower as f32;
                slot[1] = *upper as f32;
            }
            Envelope::Choice { legal } => {
                for (out, &ok) in slot.iter_mut().zip(legal.iter()) {
                    *out = if ok { 1.0 } else { 0.0 };
                }
            }
        }
    }

    /// Sample a payload uniformly from the envelope.
    ///
    /// Returns `None` when not actionable.
    pub fn pick_random(&self, rng: &mut GameRng) -> Option<Payload> {
        match &self.envelope {
            Envelope::Unavailable => None,
            Envelope::Flag => Some(None),
            Envelope::Bounded { lower, upper } => Some(Some(rng.gen_inclusive(*lower, *upper))),
            Envelope::Choice { legal } => {
                let indices: SmallVec<[usize; 8]> = legal
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &ok)| ok.then_some(i))
                    .collect();
                rng.choose(&indices).map(|&i| Some(i as i64))
            }
        }
    }
}

/// Prompt form of the legal set: `wait`, `bet(1->10)`, `play([0,2])`.
/// A range that is not actionable prints nothing.
impl std::fmt::Display for ActionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.envelope {
            Envelope::Unavailable => Ok(()),
            Envelope::Flag => f.write_str(self.kind.key),
            Envelope::Bounded { lower, upper } => write!(f, "{}({lower}->{upper})", self.kind.key),
            Envelope::Choice { legal } => {
                let indices: Vec<String> = legal
                    .iter()
                    .enumerate()
                    .filter(|(_, &ok)| ok)
                    .map(|(i, _)| i.to_string())
                    .collect();
                write!(f, "{}([{}])", self.kind.key, indices.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: ActionKind = ActionKind::flag("wait");
    const BET: ActionKind = ActionKind::bounded("bet", 1, 20);
    const PLAY: ActionKind = ActionKind::choice("play", 4);

    #[derive(Clone, Debug, PartialEq)]
    enum Step {
        Wait,
        Bet(i64),
    }

    impl Action for Step {
        fn kind(&self) -> ActionKind {
            match self {
                Step::Wait => WAIT,
                Step::Bet(_) => BET,
            }
        }

        fn payload(&self) -> Payload {
            match self {
                Step::Wait => None,
                Step::Bet(n) => Some(*n),
            }
        }

        fn from_parts(kind: &ActionKind, payload: Payload) -> Option<Self> {
            match (kind.key, payload) {
                ("wait", None) => Some(Step::Wait),
                ("bet", Some(n)) => Some(Step::Bet(n)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_flag() {
        let on = ActionRange::flag(WAIT, true);
        assert!(on.is_actionable());
        assert!(on.is_valid(&Step::Wait));
        assert!(!on.is_valid(&Step::Bet(1)));
        assert_eq!(on.to_numeric(), vec![1.0]);

        let off = ActionRange::flag(WAIT, false);
        assert!(!off.is_actionable());
        assert!(!off.is_valid(&Step::Wait));
        assert_eq!(off.to_numeric(), vec![0.0]);
    }

    #[test]
    fn test_bounded_intersects_static_bounds() {
        let range = ActionRange::bounded(BET, -5, 100);
        assert_eq!(range.to_numeric(), vec![1.0, 20.0]);
        assert!(range.is_valid(&Step::Bet(20)));
        assert!(!range.is_valid(&Step::Bet(21)));
        assert!(!range.is_valid(&Step::Bet(0)));
    }

    #[test]
    fn test_unavailable_rejects_everything() {
        let range = ActionRange::bounded(BET, 10, 5);
        assert!(!range.is_actionable());
        for n in 0..30 {
            assert!(!range.is_valid(&Step::Bet(n)));
        }
        assert_eq!(range, ActionRange::unavailable(BET));
    }

    #[test]
    fn test_choice_mask() {
        let range = ActionRange::choice(PLAY, [0, 2, 9]);
        assert_eq!(range.to_numeric(), vec![1.0, 0.0, 1.0, 0.0]);
        assert!(range.admits(Some(2)));
        assert!(!range.admits(Some(1)));
        assert!(!range.admits(Some(-1)));
        assert!(!range.admits(None));

        let empty = ActionRange::choice(PLAY, std::iter::empty());
        assert!(!empty.is_actionable());
        assert_eq!(empty.to_numeric(), vec![0.0; 4]);
    }

    #[test]
    fn test_display() {
        assert_eq!(ActionRange::flag(WAIT, true).to_string(), "wait");
        assert_eq!(ActionRange::bounded(BET, 1, 10).to_string(), "bet(1->10)");
        assert_eq!(ActionRange::choice(PLAY, [2, 0]).to_string(), "play([0,2])");
        assert_eq!(ActionRange::flag(WAIT, false).to_string(), "");
        assert_eq!(ActionRange::bounded(BET, 9, 3).to_string(), "");
    }

    #[test]
    fn test_pick_random_stays_in_envelope() {
        let mut rng = GameRng::new(11);
        let bet = ActionRange::bounded(BET, 3, 6);
        let play = ActionRange::choice(PLAY, [1, 3]);
        for _ in 0..100 {
            let payload = bet.pick_random(&mut rng).unwrap();
            assert!(bet.admits(payload));
            let payload = play.pick_random(&mut rng).unwrap();
            assert!(play.admits(payload));
        }
        assert_eq!(ActionRange::flag(WAIT, true).pick_random(&mut rng), Some(None));
        assert_eq!(ActionRange::unavailable(BET).pick_random(&mut rng), None);
    }

    #[test]
    #[should_panic(expected = "not a bounded kind")]
    fn test_kind_mismatch_panics() {
        let _ = ActionRange::bounded(WAIT, 0, 1);
    }
}
