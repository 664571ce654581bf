use crate::game::state::GameState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot format {found} is newer than supported format {supported}")]
    UnsupportedFormat { found: u32, supported: u32 },
    #[error("snapshot is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Versioned envelope around a persisted game document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub format_version: u32,
    pub state: GameState,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        GameSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            state: state.clone(),
        }
    }

    pub fn restore(self) -> GameState {
        self.state
    }

    pub fn to_json(state: &GameState) -> Result<String, SnapshotError> {
        let snapshot = Self::capture(state);
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        #[derive(Deserialize)]
        struct Header {
            format_version: u32,
        }
        let header: Header = serde_json::from_str(json)?;
        if header.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedFormat {
                found: header.format_version,
                supported: SNAPSHOT_FORMAT_VERSION,
            });
        }
        Ok(serde_json::from_str(json)?)
    }
}
