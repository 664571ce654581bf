//! Joining, team selection and seating before the first deal.

use crate::game::state::{GameState, PLAYER_COUNT, Phase};
use crate::model::player::{Player, PlayerId};
use crate::model::team::{Team, TeamId};
use thiserror::Error;

pub const TEAM_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("the game has already started")]
    NotInLobby,
    #[error("the table is full")]
    TableFull,
    #[error("player {0} is not in this game")]
    UnknownPlayer(PlayerId),
    #[error("{team} already has {members} players")]
    TeamFull { team: TeamId, members: usize },
}

/// Adds a human player to the lobby. Joining twice is a no-op.
pub fn add_player(
    state: &GameState,
    id: PlayerId,
    name: impl Into<String>,
) -> Result<GameState, LobbyError> {
    if state.phase != Phase::Lobby {
        return Err(LobbyError::NotInLobby);
    }
    if state.player_by_id(&id).is_some() {
        return Ok(state.clone());
    }
    if state.players.len() >= PLAYER_COUNT {
        return Err(LobbyError::TableFull);
    }
    let mut next = state.clone();
    next.players.push(Player::human(id, name));
    next.bump_version();
    Ok(next)
}

/// Moves a lobby player onto `team`.
pub fn choose_team(state: &GameState, id: &PlayerId, team: TeamId) -> Result<GameState, LobbyError> {
    if state.phase != Phase::Lobby {
        return Err(LobbyError::NotInLobby);
    }
    let members = state
        .players
        .iter()
        .filter(|p| p.team == Some(team) && &p.id != id)
        .count();
    if members >= TEAM_SIZE {
        return Err(LobbyError::TeamFull { team, members });
    }
    let mut next = state.clone();
    let player = next
        .players
        .iter_mut()
        .find(|p| &p.id == id)
        .ok_or_else(|| LobbyError::UnknownPlayer(id.clone()))?;
    player.team = Some(team);
    next.bump_version();
    Ok(next)
}

/// Fills both teams to two seats and orders the table
/// `[team1[0], team2[0], team1[1], team2[1]]`.
///
/// Unassigned humans take any open seat; unassigned AI seats left over from a
/// previous game are dropped and refilled.
pub(crate) fn seat_players(state: &mut GameState) -> Result<(), LobbyError> {
    let mut rosters: [Vec<Player>; 2] = [Vec::new(), Vec::new()];
    let mut unassigned = Vec::new();
    for player in state.players.drain(..) {
        match player.team {
            Some(team) => rosters[team.index()].push(player),
            None if player.is_ai => {}
            None => unassigned.push(player),
        }
    }
    for team in TeamId::BOTH {
        let members = rosters[team.index()].len();
        if members > TEAM_SIZE {
            return Err(LobbyError::TeamFull { team, members });
        }
    }
    for mut player in unassigned {
        let Some(team) = TeamId::BOTH
            .into_iter()
            .filter(|t| rosters[t.index()].len() < TEAM_SIZE)
            .min_by_key(|t| rosters[t.index()].len())
        else {
            return Err(LobbyError::TableFull);
        };
        player.team = Some(team);
        rosters[team.index()].push(player);
    }

    let mut ai_counter = 1;
    for team in TeamId::BOTH {
        let roster = &mut rosters[team.index()];
        while roster.len() < TEAM_SIZE {
            let id = PlayerId::new(format!("ai-t{}-{}", team.index() + 1, roster.len()));
            roster.push(Player::ai(id, format!("AI Player {ai_counter}"), team));
            ai_counter += 1;
        }
    }

    let [mut one, mut two] = rosters;
    state.teams = [Team::new(TeamId::One), Team::new(TeamId::Two)];
    state.teams[0].members = one.iter().map(|p| p.id.clone()).collect();
    state.teams[1].members = two.iter().map(|p| p.id.clone()).collect();
    let (one_back, two_back) = (one.split_off(1), two.split_off(1));
    state.players = one
        .into_iter()
        .chain(two)
        .chain(one_back)
        .chain(two_back)
        .collect();
    Ok(())
}
