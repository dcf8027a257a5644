use crate::model::player::{PLAYER_COUNT, Seat};
use core::fmt;
use serde::{Deserialize, Serialize};

pub const ROUNDS: u8 = 4;

/// Seating rotation for one round. Fixed per round number, never shuffled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrder {
    seats: [Seat; PLAYER_COUNT],
}

impl TurnOrder {
    pub const ROTATION: [[Seat; PLAYER_COUNT]; ROUNDS as usize] = [
        [Seat::Human, Seat::BotA, Seat::BotB, Seat::BotC],
        [Seat::BotA, Seat::BotB, Seat::BotC, Seat::Human],
        [Seat::BotB, Seat::BotC, Seat::Human, Seat::BotA],
        [Seat::BotC, Seat::Human, Seat::BotA, Seat::BotB],
    ];

    /// Order for a 1-based round number; `None` outside `1..=ROUNDS`.
    pub const fn for_round(round: u8) -> Option<Self> {
        if round == 0 || round > ROUNDS {
            return None;
        }
        Some(Self {
            seats: Self::ROTATION[(round - 1) as usize],
        })
    }

    pub const fn seats(&self) -> &[Seat; PLAYER_COUNT] {
        &self.seats
    }

    pub const fn seat_at(&self, index: usize) -> Seat {
        self.seats[index % PLAYER_COUNT]
    }

    pub const fn first(&self) -> Seat {
        self.seats[0]
    }

    pub const fn next_index(index: usize) -> usize {
        (index + 1) % PLAYER_COUNT
    }

    pub fn position_of(&self, seat: Seat) -> Option<usize> {
        self.seats.iter().position(|s| *s == seat)
    }
}

impl fmt::Display for TurnOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.seats.iter().map(|s| s.to_string()).collect();
        f.write_str(&labels.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::{ROUNDS, TurnOrder};
    use crate::model::player::Seat;

    #[test]
    fn rotation_matches_table() {
        let expected = [
            [Seat::Human, Seat::BotA, Seat::BotB, Seat::BotC],
            [Seat::BotA, Seat::BotB, Seat::BotC, Seat::Human],
            [Seat::BotB, Seat::BotC, Seat::Human, Seat::BotA],
            [Seat::BotC, Seat::Human, Seat::BotA, Seat::BotB],
        ];
        for round in 1..=ROUNDS {
            let order = TurnOrder::for_round(round).expect("round in range");
            assert_eq!(order.seats(), &expected[(round - 1) as usize]);
        }
    }

    #[test]
    fn rounds_outside_range_have_no_order() {
        assert!(TurnOrder::for_round(0).is_none());
        assert!(TurnOrder::for_round(5).is_none());
    }

    #[test]
    fn next_index_wraps_around() {
        assert_eq!(TurnOrder::next_index(3), 0);
        assert_eq!(TurnOrder::next_index(1), 2);
    }

    #[test]
    fn every_seat_appears_once_per_round() {
        for round in 1..=ROUNDS {
            let order = TurnOrder::for_round(round).expect("round in range");
            for seat in Seat::LOOP {
                let idx = order.position_of(seat).expect("seat in rotation");
                assert_eq!(order.seat_at(idx), seat);
            }
        }
    }

    #[test]
    fn display_lists_the_rotation() {
        let order = TurnOrder::for_round(2).expect("round 2");
        assert_eq!(order.to_string(), "BotA -> BotB -> BotC -> Human");
    }
}
