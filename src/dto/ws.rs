//! Plain-text frames exchanged on the game socket.
//!
//! Frames carry no type tag: while a connection waits for a game to start every frame is a
//! player count, and once its game is running every frame is the winner's name.

use thiserror::Error;

/// Commands accepted from game socket clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundCommand {
    /// Start a game with this many players.
    PlayerCount(u32),
    /// Finish the running game with this winner.
    Winner(String),
}

/// Frames that cannot be turned into an [`InboundCommand`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InboundError {
    /// Count frame that is not a decimal number.
    #[error("expected a decimal player count, got `{0}`")]
    InvalidPlayerCount(String),
    /// Winner frame with nothing but whitespace.
    #[error("winner name is empty")]
    EmptyWinner,
}

impl InboundCommand {
    /// Read a frame sent while no game of this connection is running.
    pub fn player_count(text: &str) -> Result<Self, InboundError> {
        let trimmed = text.trim();
        trimmed
            .parse::<u32>()
            .map(InboundCommand::PlayerCount)
            .map_err(|_| InboundError::InvalidPlayerCount(trimmed.to_string()))
    }

    /// Read a frame sent while this connection's game is running.
    pub fn winner(text: &str) -> Result<Self, InboundError> {
        match text.trim() {
            "" => Err(InboundError::EmptyWinner),
            name => Ok(InboundCommand::Winner(name.to_string())),
        }
    }
}
