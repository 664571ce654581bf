use crate::model::bid::Bid;
use crate::model::card::Card;
use crate::model::team::TeamId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Stable identity of a participant (auth uid or a generated AI id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Fixed turn-rotation order. Team one sits North/South, team two East/West.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Seat {
    pub const LOOP: [Seat; 4] = [Seat::North, Seat::East, Seat::South, Seat::West];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::North),
            1 => Some(Seat::East),
            2 => Some(Seat::South),
            3 => Some(Seat::West),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn next(self) -> Seat {
        match self {
            Seat::North => Seat::East,
            Seat::East => Seat::South,
            Seat::South => Seat::West,
            Seat::West => Seat::North,
        }
    }

    /// Seat `offset` places clockwise from `self`.
    pub const fn advance(self, offset: usize) -> Seat {
        Self::LOOP[(self.index() + offset) % 4]
    }

    /// First seat to act after `dealer`; with no dealer yet this is North.
    pub const fn after(dealer: Option<Seat>) -> Seat {
        match dealer {
            Some(seat) => seat.next(),
            None => Seat::North,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seat::North => "North",
            Seat::East => "East",
            Seat::South => "South",
            Seat::West => "West",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub hand: Vec<Card>,
    /// Every card received this deal; play and discard never shrink it.
    #[serde(default)]
    pub original_hand: Vec<Card>,
    #[serde(default)]
    pub bid: Option<Bid>,
    #[serde(default)]
    pub has_bid: bool,
    #[serde(default)]
    pub has_discarded: bool,
    #[serde(default)]
    pub team: Option<TeamId>,
    #[serde(default)]
    pub is_ai: bool,
    #[serde(default)]
    pub is_online: bool,
}

impl Player {
    pub fn human(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            hand: Vec::new(),
            original_hand: Vec::new(),
            bid: None,
            has_bid: false,
            has_discarded: false,
            team: None,
            is_ai: false,
            is_online: true,
        }
    }

    pub fn ai(id: PlayerId, name: impl Into<String>, team: TeamId) -> Self {
        Self {
            is_ai: true,
            is_online: false,
            team: Some(team),
            ..Self::human(id, name)
        }
    }

    pub fn holds(&self, card: crate::model::card::CardId) -> bool {
        self.hand.iter().any(|c| c.id == card)
    }

    pub(crate) fn clear_for_deal(&mut self) {
        self.hand.clear();
        self.original_hand.clear();
        self.reset_bid();
        self.has_discarded = false;
    }

    pub(crate) fn reset_bid(&mut self) {
        self.bid = None;
        self.has_bid = false;
    }
}
