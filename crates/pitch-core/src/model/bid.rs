use core::fmt;
use serde::{Deserialize, Serialize};

pub const MIN_BID: u8 = 4;
pub const MAX_BID: u8 = 7;

/// A bidding-phase declaration: a number of points (4..=7) or a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bid {
    Pass,
    Points(u8),
}

impl Bid {
    pub const fn is_pass(self) -> bool {
        matches!(self, Bid::Pass)
    }

    pub const fn points(self) -> Option<u8> {
        match self {
            Bid::Pass => None,
            Bid::Points(value) => Some(value),
        }
    }

    /// Whether this bid may be made over `high_bid` (0 when nobody has bid yet).
    pub const fn is_legal_over(self, high_bid: u8) -> bool {
        match self {
            Bid::Pass => true,
            Bid::Points(value) => value >= MIN_BID && value <= MAX_BID && value > high_bid,
        }
    }

    /// Every bid a seat may make over `high_bid`; always contains [`Bid::Pass`].
    pub fn legal_over(high_bid: u8) -> Vec<Bid> {
        let floor = MIN_BID.max(high_bid.saturating_add(1));
        let mut bids: Vec<Bid> = (floor..=MAX_BID).map(Bid::Points).collect();
        bids.push(Bid::Pass);
        bids
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bid::Pass => f.write_str("pass"),
            Bid::Points(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Bid, MAX_BID};

    #[test]
    fn bid_must_raise() {
        assert!(!Bid::Points(5).is_legal_over(5));
        assert!(Bid::Points(6).is_legal_over(5));
        assert!(Bid::Pass.is_legal_over(5));
    }

    #[test]
    fn opening_bid_is_at_least_four() {
        assert!(!Bid::Points(3).is_legal_over(0));
        assert!(Bid::Points(4).is_legal_over(0));
        assert!(!Bid::Points(MAX_BID + 1).is_legal_over(0));
    }

    #[test]
    fn legal_over_enumerates_raises_and_pass() {
        assert_eq!(
            Bid::legal_over(5),
            vec![Bid::Points(6), Bid::Points(7), Bid::Pass]
        );
        assert_eq!(Bid::legal_over(7), vec![Bid::Pass]);
        assert_eq!(Bid::legal_over(0).len(), 5);
    }
}
