use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    dto::ws::{InboundCommand, InboundError},
    services::blind_alerter::{AlertSink, SinkClosed},
    state::{SharedState, game::FinishOutcome, state_machine::SessionId},
};

/// Alert sink pushing text frames onto a connection's outbound queue.
#[derive(Debug, Clone)]
pub struct WebSocketAlertSink {
    tx: mpsc::UnboundedSender<Message>,
}

impl WebSocketAlertSink {
    /// Sink writing to the queue drained by a connection's writer task.
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }
}

impl AlertSink for WebSocketAlertSink {
    fn send_alert(&self, text: &str) -> Result<(), SinkClosed> {
        self.tx
            .send(Message::Text(text.into()))
            .map_err(|_| SinkClosed)
    }
}

/// Where a connection stands in the positional protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionPhase {
    /// Next text frame is a player count.
    AwaitingPlayerCount,
    /// This connection started the running game; next text frame is the winner.
    Playing(SessionId),
}

impl ConnectionPhase {
    fn parse(&self, text: &str) -> Result<InboundCommand, InboundError> {
        match self {
            ConnectionPhase::AwaitingPlayerCount => InboundCommand::player_count(text),
            ConnectionPhase::Playing(_) => InboundCommand::winner(text),
        }
    }
}

/// Handle the full lifecycle of a game socket.
///
/// The first text frame starts a game and the next one names its winner. Blind alerts are
/// written from timer tasks through the same outbound queue the read loop uses, so neither side
/// ever waits for the other. Closing the socket cancels the game it started.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if sender.send(message).await.is_err() || closing {
                break;
            }
        }
    });

    let sink: Arc<dyn AlertSink> = Arc::new(WebSocketAlertSink::new(outbound_tx.clone()));
    let mut phase = ConnectionPhase::AwaitingPlayerCount;
    info!("game socket connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                debug!(payload = %text, "received game socket message");
                let command = match phase.parse(text.as_str()) {
                    Ok(command) => command,
                    Err(err) => {
                        warn!(error = %err, "ignoring game socket message");
                        continue;
                    }
                };
                phase = apply_command(&state, &sink, phase, command).await;
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!("game socket closed by peer");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(error = %err, "websocket error");
                break;
            }
        }
    }

    if let ConnectionPhase::Playing(session_id) = phase {
        if state.game().cancel(session_id).await {
            info!(%session_id, "game socket closed before a winner was declared");
        }
    }
    info!("game socket disconnected");

    drop(sink);
    finalize(writer_task, outbound_tx).await;
}

/// Run one inbound command against the shared game and return the connection's next phase.
async fn apply_command(
    state: &SharedState,
    sink: &Arc<dyn AlertSink>,
    phase: ConnectionPhase,
    command: InboundCommand,
) -> ConnectionPhase {
    match command {
        InboundCommand::PlayerCount(player_count) => {
            match state.game().start(player_count, sink.clone()).await {
                Ok(session_id) => ConnectionPhase::Playing(session_id),
                Err(err) => {
                    warn!(player_count, error = %err, "game not started");
                    phase
                }
            }
        }
        InboundCommand::Winner(winner) => {
            match state.game().finish(&winner).await {
                Ok(FinishOutcome::Recorded { session_id, .. }) => {
                    debug!(%session_id, winner = %winner, "winner recorded from game socket");
                }
                Ok(FinishOutcome::NoActiveSession) => {
                    debug!(winner = %winner, "winner ignored; game already over");
                }
                Err(err) => {
                    warn!(
                        winner = %winner,
                        error = %err,
                        "game finished but the win was not recorded"
                    );
                }
            }
            ConnectionPhase::AwaitingPlayerCount
        }
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
