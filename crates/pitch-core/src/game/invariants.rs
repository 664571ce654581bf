use crate::game::state::{GameState, PLAYER_COUNT, Phase, TRICKS_PER_HAND};
use crate::model::card::CardId;
use crate::model::deck::DECK_SIZE;
use crate::model::player::PlayerId;
use crate::model::trick::TRICK_SIZE;
use std::collections::HashSet;
use thiserror::Error;

/// A state that no sequence of legal moves can produce. Fatal to the hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("expected 4 seated players, found {found}")]
    PlayerCount { found: usize },
    #[error("expected 54 cards in circulation, found {found}")]
    CardCount { found: usize },
    #[error("card {0} appears more than once")]
    DuplicateCard(CardId),
    #[error("current trick holds {0} cards")]
    TrickOverflow(usize),
    #[error("{0} tricks recorded for one hand")]
    TooManyTricks(u8),
    #[error("player {0} is not on exactly one team")]
    TeamMembership(PlayerId),
}

impl GameState {
    /// Checks the structural invariants that must hold after every mutation.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.phase == Phase::Lobby {
            if self.players.len() > PLAYER_COUNT {
                return Err(InvariantViolation::PlayerCount {
                    found: self.players.len(),
                });
            }
            return Ok(());
        }

        if self.players.len() != PLAYER_COUNT {
            return Err(InvariantViolation::PlayerCount {
                found: self.players.len(),
            });
        }

        let found = self.card_count();
        if found != DECK_SIZE {
            return Err(InvariantViolation::CardCount { found });
        }

        let mut seen = HashSet::with_capacity(DECK_SIZE);
        let zones = self
            .deck
            .iter()
            .chain(&self.widow)
            .chain(&self.discards)
            .chain(&self.current_trick)
            .chain(self.players.iter().flat_map(|p| &p.hand))
            .chain(self.teams.iter().flat_map(|t| &t.cards_won));
        for card in zones {
            if !seen.insert(card.id) {
                return Err(InvariantViolation::DuplicateCard(card.id));
            }
        }

        if self.current_trick.len() > TRICK_SIZE {
            return Err(InvariantViolation::TrickOverflow(self.current_trick.len()));
        }
        if self.tricks_played > TRICKS_PER_HAND {
            return Err(InvariantViolation::TooManyTricks(self.tricks_played));
        }

        for player in &self.players {
            let memberships = self
                .teams
                .iter()
                .filter(|team| team.has_member(&player.id))
                .count();
            if memberships != 1 {
                return Err(InvariantViolation::TeamMembership(player.id.clone()));
            }
        }
        Ok(())
    }
}
