use crate::game::scoring::RoundResults;
use crate::model::card::Card;
use crate::model::player::{Player, PlayerId, Seat};
use crate::model::suit::Suit;
use crate::model::team::{Team, TeamId};
use core::fmt;
use serde::{Deserialize, Serialize};

pub const PLAYER_COUNT: usize = 4;
pub const CARDS_DEALT: usize = 7;
pub const FINAL_HAND_SIZE: usize = 6;
pub const WIDOW_SIZE: usize = 7;
pub const WINNING_SCORE: i32 = 21;
pub const TRICKS_PER_HAND: u8 = FINAL_HAND_SIZE as u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Lobby,
    Bidding,
    WidowPickup,
    TrumpSelection,
    Discarding,
    Playing,
    Scoring,
    RoundEnd,
    GameOver,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Lobby => "lobby",
            Phase::Bidding => "bidding",
            Phase::WidowPickup => "widowPickup",
            Phase::TrumpSelection => "trumpSelection",
            Phase::Discarding => "discarding",
            Phase::Playing => "playing",
            Phase::Scoring => "scoring",
            Phase::RoundEnd => "roundEnd",
            Phase::GameOver => "gameOver",
        }
    }

    /// Phases during which a hand's 54 cards are in circulation.
    pub const fn has_cards_in_play(self) -> bool {
        !matches!(self, Phase::Lobby)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single authoritative game document shared by every participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Incremented on every accepted mutation; writes based on an older version are rejected.
    pub version: u64,
    pub host_id: PlayerId,
    pub phase: Phase,
    /// Index order is the turn rotation (`Seat::index`).
    pub players: Vec<Player>,
    pub teams: [Team; 2],
    /// Undealt cards; the top of the draw stack is the end of the vector.
    pub deck: Vec<Card>,
    pub widow: Vec<Card>,
    pub discards: Vec<Card>,
    pub turn: Seat,
    pub dealer: Option<Seat>,
    pub high_bid: u8,
    pub high_bidder: Option<Seat>,
    pub bids_made: u8,
    pub trump: Option<Suit>,
    pub current_trick: Vec<Card>,
    pub trick_leader: Option<Seat>,
    pub tricks_played: u8,
    pub discards_made: u8,
    pub last_round_results: Option<RoundResults>,
}

impl GameState {
    /// A fresh lobby hosted by `host`.
    pub fn new_lobby(host: Player) -> Self {
        Self {
            version: 0,
            host_id: host.id.clone(),
            phase: Phase::Lobby,
            players: vec![host],
            teams: [Team::new(TeamId::One), Team::new(TeamId::Two)],
            deck: Vec::new(),
            widow: Vec::new(),
            discards: Vec::new(),
            turn: Seat::North,
            dealer: None,
            high_bid: 0,
            high_bidder: None,
            bids_made: 0,
            trump: None,
            current_trick: Vec::new(),
            trick_leader: None,
            tricks_played: 0,
            discards_made: 0,
            last_round_results: None,
        }
    }

    pub fn player(&self, seat: Seat) -> Option<&Player> {
        self.players.get(seat.index())
    }

    pub fn player_mut(&mut self, seat: Seat) -> Option<&mut Player> {
        self.players.get_mut(seat.index())
    }

    pub fn player_by_id(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn seat_of(&self, id: &PlayerId) -> Option<Seat> {
        self.players
            .iter()
            .position(|p| &p.id == id)
            .and_then(Seat::from_index)
    }

    pub fn is_host(&self, id: &PlayerId) -> bool {
        &self.host_id == id
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.index()]
    }

    pub fn team_mut(&mut self, id: TeamId) -> &mut Team {
        &mut self.teams[id.index()]
    }

    /// Team whose roster contains the player with `id`.
    pub fn team_of_player(&self, id: &PlayerId) -> Option<TeamId> {
        self.teams
            .iter()
            .find(|team| team.has_member(id))
            .map(|team| team.id)
    }

    pub fn team_of_seat(&self, seat: Seat) -> Option<TeamId> {
        self.player(seat).and_then(|p| self.team_of_player(&p.id))
    }

    pub fn bidding_team(&self) -> Option<TeamId> {
        self.high_bidder.and_then(|seat| self.team_of_seat(seat))
    }

    /// Total cards accounted for across every zone of the hand.
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.widow.len()
            + self.discards.len()
            + self.current_trick.len()
            + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
            + self.teams.iter().map(|t| t.cards_won.len()).sum::<usize>()
    }

    /// The winning team once the game is over. Ties go to the team that bid the last hand.
    pub fn winner(&self) -> Option<TeamId> {
        if self.phase != Phase::GameOver {
            return None;
        }
        let [one, two] = &self.teams;
        match one.score.cmp(&two.score) {
            core::cmp::Ordering::Greater => Some(TeamId::One),
            core::cmp::Ordering::Less => Some(TeamId::Two),
            core::cmp::Ordering::Equal => self.bidding_team(),
        }
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}
