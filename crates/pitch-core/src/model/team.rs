use crate::model::card::{Card, CardId};
use crate::model::player::PlayerId;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamId {
    #[serde(rename = "team1")]
    One,
    #[serde(rename = "team2")]
    Two,
}

impl TeamId {
    pub const BOTH: [TeamId; 2] = [TeamId::One, TeamId::Two];

    pub const fn index(self) -> usize {
        match self {
            TeamId::One => 0,
            TeamId::Two => 1,
        }
    }

    pub const fn other(self) -> TeamId {
        match self {
            TeamId::One => TeamId::Two,
            TeamId::Two => TeamId::One,
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamId::One => f.write_str("team1"),
            TeamId::Two => f.write_str("team2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub members: Vec<PlayerId>,
    /// Cumulative across rounds; may go negative.
    pub score: i32,
    pub round_points: i32,
    pub cards_won: Vec<Card>,
    pub point_cards: Vec<Card>,
    pub card_value: u32,
}

impl Team {
    pub fn new(id: TeamId) -> Self {
        Self {
            id,
            members: Vec::new(),
            score: 0,
            round_points: 0,
            cards_won: Vec::new(),
            point_cards: Vec::new(),
            card_value: 0,
        }
    }

    pub fn has_member(&self, player: &PlayerId) -> bool {
        self.members.iter().any(|m| m == player)
    }

    pub fn has_won(&self, card: CardId) -> bool {
        self.cards_won.iter().any(|c| c.id == card)
    }

    /// Credits `card` as a point card once per hand. Returns whether it was new.
    pub fn credit_point_card(&mut self, card: &Card) -> bool {
        if self.point_cards.iter().any(|pc| pc.id == card.id) {
            return false;
        }
        self.point_cards.push(card.clone());
        self.round_points += 1;
        true
    }

    /// Clears everything that belongs to a single hand; `score` and members stay.
    pub fn reset_for_hand(&mut self) {
        self.round_points = 0;
        self.cards_won.clear();
        self.point_cards.clear();
        self.card_value = 0;
    }

    pub fn apply_round(&mut self) {
        self.score += self.round_points;
    }
}
