//! Round-robin bidding game for exercising the engine.
//!
//! A minimal game that covers every engine feature:
//! - Each player starts with a bank of chips and a dealt hand of cards
//! - On your turn: `bet(n)` chips from your bank, or `play(i)` the card at
//!   hand slot `i` (scores its value plus your hidden luck)
//! - `wait` is the no-op every off-turn player submits
//! - After a fixed number of rounds the highest score wins; ties share
//!
//! Visibility: bank and score are public, the hand is self-only, luck and
//! the deck seed are hidden.
//!
//! Supports 2-8 players to verify N-player generality.

mod action;
mod game;

pub use action::{Bid, BET, HAND_SIZE, KINDS, MAX_BET, PLAY, WAIT};
pub use game::{BiddingGame, BiddingGameBuilder, CARD_MAX, LUCK_MAX};
