//! Action vocabulary of the bidding game.

use crate::action::{Action, ActionKind, Payload};

/// Largest bet any table may allow.
pub const MAX_BET: i64 = 100;

/// Hand slots per player.
pub const HAND_SIZE: usize = 5;

/// Do nothing. The no-op every off-turn player submits.
pub const WAIT: ActionKind = ActionKind::flag("wait");

/// Commit chips from the bank.
pub const BET: ActionKind = ActionKind::bounded("bet", 1, MAX_BET);

/// Play the card at a hand slot.
pub const PLAY: ActionKind = ActionKind::choice("play", HAND_SIZE);

/// Registration order of the bidding game's kinds.
pub const KINDS: [ActionKind; 3] = [WAIT, BET, PLAY];

/// A bidding-game action.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Bid {
    Wait,
    Bet(i64),
    Play(usize),
}

impl Action for Bid {
    fn kind(&self) -> ActionKind {
        match self {
            Bid::Wait => WAIT,
            Bid::Bet(_) => BET,
            Bid::Play(_) => PLAY,
        }
    }

    fn payload(&self) -> Payload {
        match self {
            Bid::Wait => None,
            Bid::Bet(amount) => Some(*amount),
            Bid::Play(slot) => Some(*slot as i64),
        }
    }

    fn from_parts(kind: &ActionKind, payload: Payload) -> Option<Self> {
        match (kind.key, payload) {
            ("wait", None) => Some(Bid::Wait),
            ("bet", Some(amount)) => Some(Bid::Bet(amount)),
            ("play", Some(slot)) => usize::try_from(slot).ok().map(Bid::Play),
            _ => None,
        }
    }
}
