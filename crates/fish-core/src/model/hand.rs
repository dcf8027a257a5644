use crate::model::card::Card;
use crate::model::rank::Rank;
use std::vec::Vec;
use thiserror::Error;

/// Number of same-rank cards that make a completed set.
pub const SET_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandError {
    #[error("cannot remove a set of {rank}: only {held} held")]
    InvalidSet { rank: Rank, held: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        self.sort();
    }

    pub fn add_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
        self.sort();
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn has_rank(&self, rank: Rank) -> bool {
        self.cards.iter().any(|c| c.rank == rank)
    }

    pub fn count_of(&self, rank: Rank) -> usize {
        self.cards.iter().filter(|c| c.rank == rank).count()
    }

    /// Distinct ranks held, ascending.
    pub fn valid_ranks(&self) -> Vec<Rank> {
        let mut ranks: Vec<Rank> = self.cards.iter().map(|c| c.rank).collect();
        ranks.dedup();
        ranks
    }

    /// Removes every card of `rank`. Returns an empty vec when none are held;
    /// deciding whether that is a failed ask is up to the caller.
    pub fn take_all_of_rank(&mut self, rank: Rank) -> Vec<Card> {
        let (taken, kept): (Vec<Card>, Vec<Card>) =
            self.cards.drain(..).partition(|c| c.rank == rank);
        self.cards = kept;
        taken
    }

    pub fn detect_completed_sets(&self) -> Vec<Rank> {
        let mut counts = [0usize; 13];
        for card in &self.cards {
            counts[card.rank.index()] += 1;
        }
        Rank::ORDERED
            .iter()
            .copied()
            .filter(|rank| counts[rank.index()] == SET_SIZE)
            .collect()
    }

    pub fn remove_set(&mut self, rank: Rank) -> Result<[Card; SET_SIZE], HandError> {
        let held = self.count_of(rank);
        if held != SET_SIZE {
            return Err(HandError::InvalidSet { rank, held });
        }
        self.take_all_of_rank(rank).try_into().map_err(|cards: Vec<Card>| {
            self.add_cards(cards);
            HandError::InvalidSet { rank, held }
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    fn sort(&mut self) {
        self.cards
            .sort_by(|a, b| a.rank.cmp(&b.rank).then(a.suit.cmp(&b.suit)));
    }
}
