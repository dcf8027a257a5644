use crate::model::card::Card;
use crate::model::hand::{Hand, HandError, SET_SIZE};
use crate::model::rank::Rank;
use core::fmt;
use serde::{Deserialize, Serialize};

pub const PLAYER_COUNT: usize = 4;

/// One of the four fixed participants. `Human` is the only seat driven from
/// outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    Human = 0,
    BotA = 1,
    BotB = 2,
    BotC = 3,
}

impl Seat {
    pub const LOOP: [Seat; PLAYER_COUNT] = [Seat::Human, Seat::BotA, Seat::BotB, Seat::BotC];

    pub const BOTS: [Seat; 3] = [Seat::BotA, Seat::BotB, Seat::BotC];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::Human),
            1 => Some(Seat::BotA),
            2 => Some(Seat::BotB),
            3 => Some(Seat::BotC),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_human(self) -> bool {
        matches!(self, Seat::Human)
    }

    pub const fn default_name(self) -> &'static str {
        match self {
            Seat::Human => "Human",
            Seat::BotA => "Alice",
            Seat::BotB => "Bob",
            Seat::BotC => "Charlie",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seat::Human => "Human",
            Seat::BotA => "BotA",
            Seat::BotB => "BotB",
            Seat::BotC => "BotC",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    seat: Seat,
    name: String,
    hand: Hand,
    score: u32,
}

impl Participant {
    pub fn new(seat: Seat, name: impl Into<String>) -> Self {
        Self {
            seat,
            name: name.into(),
            hand: Hand::new(),
            score: 0,
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_human(&self) -> bool {
        self.seat.is_human()
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn valid_ranks(&self) -> Vec<Rank> {
        self.hand.valid_ranks()
    }

    /// Removes the completed set from the hand and credits one point.
    pub fn award_set(&mut self, rank: Rank) -> Result<[Card; SET_SIZE], HandError> {
        let cards = self.hand.remove_set(rank)?;
        self.score += 1;
        Ok(cards)
    }

    pub(crate) fn reset_score(&mut self) {
        self.score = 0;
    }
}
