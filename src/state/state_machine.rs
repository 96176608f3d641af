use std::num::NonZeroU32;

use thiserror::Error;
use uuid::Uuid;

/// Identifier of a single game, from start to finish.
pub type SessionId = Uuid;

/// High-level phases the game can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No game is running; a new one can be started.
    Idle,
    /// A game is in progress and its blinds are escalating.
    Running {
        /// Session that owns the table.
        session_id: SessionId,
        /// Number of players seated at the start.
        player_count: NonZeroU32,
    },
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A connection asked to start a game.
    Start {
        /// Identifier allocated for the new session.
        session_id: SessionId,
        /// Number of players announced by the connection.
        player_count: NonZeroU32,
    },
    /// A winner was declared.
    Finish,
    /// The game was abandoned without a winner.
    Cancel,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: GamePhase,
    /// The event that cannot be applied from this phase.
    pub event: GameEvent,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: GamePhase,
    /// Version number of the state machine (increments on each transition).
    pub version: usize,
}

/// State machine for the single shared table: `Idle -> Running -> Idle`.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    phase: GamePhase,
    version: usize,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self {
            phase: GamePhase::Idle,
            version: 0,
        }
    }
}

impl GameStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
        }
    }

    /// Validate `event` against the current phase without applying it.
    pub fn check(&self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        self.compute_transition(event)
    }

    /// Apply `event`, returning the new phase or leaving the machine untouched when invalid.
    pub fn apply(&mut self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (
                GamePhase::Idle,
                GameEvent::Start {
                    session_id,
                    player_count,
                },
            ) => GamePhase::Running {
                session_id,
                player_count,
            },
            (GamePhase::Running { .. }, GameEvent::Finish | GameEvent::Cancel) => GamePhase::Idle,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
