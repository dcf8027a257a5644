use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

pub const DECK_SIZE: usize = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("the deck has no cards left to draw")]
    EmptyDeck,
}

/// Draw pile. The front of `cards` is the top of the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 52 cards, suit by suit, ranks ascending within each suit.
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    /// A stacked deck that will be drawn in exactly the given order.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::new();
        deck.shuffle(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self) -> Result<Card, DeckError> {
        if self.cards.is_empty() {
            return Err(DeckError::EmptyDeck);
        }
        Ok(self.cards.remove(0))
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{DECK_SIZE, Deck, DeckError};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use std::collections::HashSet;

    #[test]
    fn standard_deck_has_52_unique_cards() {
        let deck = Deck::new();
        assert_eq!(deck.len(), DECK_SIZE);
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn canonical_order_starts_with_two_of_clubs() {
        let deck = Deck::new();
        assert_eq!(deck.cards()[0], Card::new(Rank::Two, Suit::Clubs));
        assert_eq!(deck.cards()[51], Card::new(Rank::Ace, Suit::Spades));
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_keeps_the_same_cards() {
        let deck = Deck::shuffled_with_seed(7);
        let shuffled: HashSet<_> = deck.cards().iter().copied().collect();
        let canonical: HashSet<_> = Deck::new().cards().iter().copied().collect();
        assert_eq!(shuffled, canonical);
    }

    #[test]
    fn draw_takes_from_the_top_until_empty() {
        let top = Card::new(Rank::King, Suit::Hearts);
        let next = Card::new(Rank::Three, Suit::Clubs);
        let mut deck = Deck::from_cards(vec![top, next]);
        assert_eq!(deck.draw(), Ok(top));
        assert_eq!(deck.draw(), Ok(next));
        assert!(deck.is_empty());
        assert_eq!(deck.draw(), Err(DeckError::EmptyDeck));
    }
}
