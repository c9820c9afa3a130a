//! Bidding game implementation.

use std::sync::Arc;

use super::action::{Bid, BET, HAND_SIZE, KINDS, MAX_BET, PLAY, WAIT};
use crate::action::{ActionKind, ActionRange};
use crate::core::{EngineError, GameRng, PlayerId, PlayerMap, Result};
use crate::scheduler::GameModel;
use crate::state::{Field, FullState, Schema};

/// Highest card value.
pub const CARD_MAX: i64 = 9;

/// Highest hidden luck bonus.
pub const LUCK_MAX: i64 = 3;

const BANK_MAX: i64 = 10_000;

/// Bidding game rules and layout.
#[derive(Clone, Debug)]
pub struct BiddingGame {
    player_count: usize,
    rounds: u32,
    min_bet: i64,
    max_bet: i64,
    hand_size: usize,
    shared: Arc<Schema>,
    player: Arc<Schema>,
}

/// Builder for creating a BiddingGame.
pub struct BiddingGameBuilder {
    player_count: usize,
    rounds: u32,
    starting_bank: i64,
    min_bet: i64,
    max_bet: i64,
    starting_hand_size: usize,
}

impl Default for BiddingGameBuilder {
    fn default() -> Self {
        Self {
            player_count: 2,
            rounds: 3,
            starting_bank: 50,
            min_bet: 1,
            max_bet: 10,
            starting_hand_size: 3,
        }
    }
}

impl BiddingGameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_count(mut self, count: usize) -> Self {
        assert!((2..=8).contains(&count), "Player count must be 2-8");
        self.player_count = count;
        self
    }

    pub fn rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn starting_bank(mut self, bank: i64) -> Self {
        self.starting_bank = bank.clamp(0, BANK_MAX);
        self
    }

    /// Table bet limits, kept within `1..=MAX_BET`.
    pub fn bet_limits(mut self, min_bet: i64, max_bet: i64) -> Self {
        self.min_bet = min_bet.clamp(1, MAX_BET);
        self.max_bet = max_bet.clamp(self.min_bet, MAX_BET);
        self
    }

    pub fn starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size.min(HAND_SIZE);
        self
    }

    /// Bets a seat can always place, whatever amounts it chose before.
    fn guaranteed_bets(&self) -> i64 {
        if self.starting_bank < self.min_bet {
            return 0;
        }
        (self.starting_bank - self.min_bet) / self.max_bet + 1
    }

    /// Build the game and its state layout.
    ///
    /// Fails when some seat could run out of legal actions before its last
    /// round: every round needs a card or an affordable bet.
    pub fn build(self) -> Result<BiddingGame> {
        let actions = self.starting_hand_size as i64 + self.guaranteed_bets();
        if actions < i64::from(self.rounds) {
            return Err(EngineError::InvalidConfiguration(
                "hand and bank cannot cover every round",
            ));
        }

        let turns = i64::from(self.rounds) * self.player_count as i64;
        let shared = Schema::builder()
            .public("pot", Field::scalar(0).bounds(0, BANK_MAX * 8))
            .public("turn", Field::scalar(0).bounds(0, turns))
            .hidden("deck_seed", Field::scalar(0))
            .build()?;

        let player = Schema::builder()
            .public("bank", Field::scalar(self.starting_bank).bounds(0, BANK_MAX))
            .public("score", Field::scalar(0).bounds(0, BANK_MAX))
            .self_only("hand", Field::vector(vec![0; HAND_SIZE]).bounds(0, CARD_MAX))
            .hidden("luck", Field::scalar(0).bounds(0, LUCK_MAX))
            .build()?;

        Ok(BiddingGame {
            player_count: self.player_count,
            rounds: self.rounds,
            min_bet: self.min_bet,
            max_bet: self.max_bet,
            hand_size: self.starting_hand_size,
            shared,
            player,
        })
    }
}

impl BiddingGame {
    /// Total decisions in an episode.
    #[must_use]
    pub fn total_turns(&self) -> i64 {
        i64::from(self.rounds) * self.player_count as i64
    }

    /// Score per player, in seat order.
    pub fn scores(&self, state: &FullState) -> Result<PlayerMap<i64>> {
        let scores = PlayerId::all(state.player_count())
            .map(|p| state.player(p).get_scalar("score"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        PlayerMap::from_vec(state.player_count(), scores)
    }

    fn bet_range(&self, state: &FullState, player: PlayerId) -> ActionRange {
        match state.player(player).get_scalar("bank") {
            Ok(bank) => ActionRange::bounded(BET, self.min_bet, bank.min(self.max_bet)),
            Err(_) => ActionRange::unavailable(BET),
        }
    }

    fn play_range(state: &FullState, player: PlayerId) -> ActionRange {
        match state.player(player).get("hand") {
            Ok(hand) => ActionRange::choice(
                PLAY,
                hand.iter()
                    .enumerate()
                    .filter(|(_, &card)| card > 0)
                    .map(|(slot, _)| slot),
            ),
            Err(_) => ActionRange::unavailable(PLAY),
        }
    }

    fn apply_bid(&self, state: &mut FullState, player: PlayerId, bid: &Bid) -> Result<f64> {
        let reward = match *bid {
            Bid::Wait => 0.0,
            Bid::Bet(amount) => {
                let seat = state.player_mut(player);
                seat.modify_scalar("bank", -amount)?;
                seat.modify_scalar("score", amount)?;
                state.shared_mut().modify_scalar("pot", amount)?;
                0.0
            }
            Bid::Play(slot) => {
                let seat = state.player_mut(player);
                let card = seat.get("hand")?.get(slot).copied().unwrap_or(0);
                let gain = card + seat.get_scalar("luck")?;
                seat.set_at("hand", slot, 0)?;
                seat.modify_scalar("score", gain)?;
                gain as f64 / 10.0
            }
        };
        state.shared_mut().modify_scalar("turn", 1)?;
        Ok(reward)
    }
}

impl GameModel for BiddingGame {
    type Action = Bid;

    fn player_count(&self) -> usize {
        self.player_count
    }

    fn action_kinds(&self) -> Vec<ActionKind> {
        KINDS.to_vec()
    }

    fn noop(&self) -> Bid {
        Bid::Wait
    }

    fn initial_state(&self) -> FullState {
        FullState::new(
            self.player_count,
            Arc::clone(&self.shared),
            Arc::clone(&self.player),
        )
    }

    fn setup(&mut self, state: &mut FullState, rng: &mut GameRng) -> Result<()> {
        let deck_seed = rng.gen_inclusive(0, i64::from(i32::MAX));
        state.shared_mut().set_scalar("deck_seed", deck_seed)?;

        let mut deck = GameRng::new(deck_seed as u64);
        for player in PlayerId::all(self.player_count) {
            let seat = state.player_mut(player);
            for slot in 0..self.hand_size {
                seat.set_at("hand", slot, deck.gen_inclusive(1, CARD_MAX))?;
            }
            seat.set_scalar("luck", deck.gen_inclusive(0, LUCK_MAX))?;
        }
        Ok(())
    }

    fn action_range(&self, kind: &ActionKind, state: &FullState, player: PlayerId) -> ActionRange {
        match *kind {
            k if k == BET => self.bet_range(state, player),
            k if k == PLAY => Self::play_range(state, player),
            k if k == WAIT => ActionRange::flag(WAIT, true),
            other => ActionRange::unavailable(other),
        }
    }

    fn apply(&mut self, state: &mut FullState, player: PlayerId, bid: &Bid, _rng: &mut GameRng) -> Result<f64> {
        self.apply_bid(state, player, bid)
    }

    fn is_finished(&self, state: &FullState) -> bool {
        state
            .shared()
            .get_scalar("turn")
            .map_or(true, |turn| turn >= self.total_turns())
    }

    /// +1 to the highest score; ties share it.
    fn final_rewards(&self, state: &FullState) -> PlayerMap<f64> {
        let mut rewards = PlayerMap::with_value(state.player_count(), 0.0);
        let Ok(scores) = self.scores(state) else {
            return rewards;
        };
        let Some(&top) = scores.values().max() else {
            return rewards;
        };
        let winners: Vec<PlayerId> = scores
            .iter()
            .filter(|(_, &score)| score == top)
            .map(|(p, _)| p)
            .collect();
        let share = 1.0 / winners.len() as f64;
        for winner in winners {
            rewards[winner] = share;
        }
        rewards
    }
}
