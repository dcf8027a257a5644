use crate::model::player::{Participant, Seat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantScore {
    pub seat: Seat,
    pub name: String,
    pub score: u32,
}

/// Standings at a point in the game; final once `finished` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub round: u8,
    pub finished: bool,
    pub scores: Vec<ParticipantScore>,
    pub winners: Vec<String>,
}

impl GameSummary {
    pub fn capture(round: u8, finished: bool, participants: &[Participant]) -> Self {
        let scores = participants
            .iter()
            .map(|p| ParticipantScore {
                seat: p.seat(),
                name: p.name().to_string(),
                score: p.score(),
            })
            .collect();
        let winners = leading_seats(participants)
            .into_iter()
            .filter_map(|seat| participants.iter().find(|p| p.seat() == seat))
            .map(|p| p.name().to_string())
            .collect();
        Self {
            round,
            finished,
            scores,
            winners,
        }
    }

    /// Co-winners joined by name, e.g. "Human, Bob".
    pub fn winner_line(&self) -> String {
        self.winners.join(", ")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Every seat sharing the highest score, in seat order.
pub fn leading_seats(participants: &[Participant]) -> Vec<Seat> {
    let Some(best) = participants.iter().map(Participant::score).max() else {
        return Vec::new();
    };
    participants
        .iter()
        .filter(|p| p.score() == best)
        .map(Participant::seat)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{GameSummary, leading_seats};
    use crate::model::card::Card;
    use crate::model::player::{Participant, Seat};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn with_score(seat: Seat, sets: &[Rank]) -> Participant {
        let mut player = Participant::new(seat, seat.default_name());
        for &rank in sets {
            for suit in Suit::ALL {
                player.hand_mut().add_card(Card::new(rank, suit));
            }
            player.award_set(rank).expect("complete set");
        }
        player
    }

    #[test]
    fn single_leader_wins() {
        let players = vec![
            with_score(Seat::Human, &[Rank::Two]),
            with_score(Seat::BotA, &[Rank::Three, Rank::Four]),
            with_score(Seat::BotB, &[]),
            with_score(Seat::BotC, &[Rank::Five]),
        ];
        assert_eq!(leading_seats(&players), vec![Seat::BotA]);
        let summary = GameSummary::capture(4, true, &players);
        assert_eq!(summary.winner_line(), "Alice");
    }

    #[test]
    fn ties_list_every_co_winner() {
        let players = vec![
            with_score(Seat::Human, &[Rank::Two, Rank::Six]),
            with_score(Seat::BotA, &[Rank::Three]),
            with_score(Seat::BotB, &[Rank::Four, Rank::Seven]),
            with_score(Seat::BotC, &[]),
        ];
        let summary = GameSummary::capture(4, true, &players);
        assert_eq!(summary.winners, vec!["Human".to_string(), "Bob".to_string()]);
        assert_eq!(summary.winner_line(), "Human, Bob");
    }

    #[test]
    fn summary_json_roundtrip() {
        let players = vec![with_score(Seat::Human, &[Rank::Ace])];
        let summary = GameSummary::capture(2, false, &players);
        let json = summary.to_json().expect("serialize");
        assert!(json.contains("\"round\": 2"));
        assert_eq!(GameSummary::from_json(&json).expect("parse"), summary);
    }
}
