use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuitColor {
    Red,
    Black,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Clubs),
            1 => Some(Suit::Diamonds),
            2 => Some(Suit::Hearts),
            3 => Some(Suit::Spades),
            _ => None,
        }
    }

    pub const fn color(self) -> SuitColor {
        match self {
            Suit::Diamonds | Suit::Hearts => SuitColor::Red,
            Suit::Clubs | Suit::Spades => SuitColor::Black,
        }
    }

    /// The other suit of the same color; its Jack is the off-jack when `self` is trump.
    pub const fn partner(self) -> Suit {
        match self {
            Suit::Clubs => Suit::Spades,
            Suit::Spades => Suit::Clubs,
            Suit::Diamonds => Suit::Hearts,
            Suit::Hearts => Suit::Diamonds,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Suit::Clubs => "Clubs",
            Suit::Diamonds => "Diamonds",
            Suit::Hearts => "Hearts",
            Suit::Spades => "Spades",
        }
    }
}

impl SuitColor {
    pub const fn as_str(self) -> &'static str {
        match self {
            SuitColor::Red => "red",
            SuitColor::Black => "black",
        }
    }
}

/// Fixed red/black mapping for the four suits.
pub const fn suit_color(suit: Suit) -> SuitColor {
    suit.color()
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SuitColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "clubs" | "c" => Ok(Suit::Clubs),
            "diamonds" | "d" => Ok(Suit::Diamonds),
            "hearts" | "h" => Ok(Suit::Hearts),
            "spades" | "s" => Ok(Suit::Spades),
            other => Err(format!("unknown suit '{other}'")),
        }
    }
}

impl FromStr for SuitColor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "red" => Ok(SuitColor::Red),
            "black" => Ok(SuitColor::Black),
            other => Err(format!("unknown color '{other}'")),
        }
    }
}
