//! Timed blind alerts: schedule computation and cancellable delivery.

use std::{
    num::NonZeroU32,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use thiserror::Error;
use tokio::{
    task::AbortHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, warn};

use crate::config::BlindConfig;

/// Shortest gap between two blind levels, whatever the player count.
const MIN_BLIND_INTERVAL: Duration = Duration::from_millis(1);

/// Returned by an [`AlertSink`] whose destination is gone.
#[derive(Debug, Error)]
#[error("alert sink closed")]
pub struct SinkClosed;

/// Destination for formatted blind alerts.
///
/// Implementations must not block: alerts are pushed from timer tasks.
pub trait AlertSink: Send + Sync + 'static {
    /// Deliver one alert, failing once the destination is gone.
    fn send_alert(&self, text: &str) -> Result<(), SinkClosed>;
}

/// One step of a blind schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlindLevel {
    /// Offset from the start of the game.
    pub delay: Duration,
    /// Blind announced at this level.
    pub amount: u32,
}

/// Compute the blind levels for a table of `player_count` players.
///
/// The first level is announced immediately; each following one comes `window / player_count`
/// later, so larger tables escalate faster.
pub fn blind_schedule(player_count: NonZeroU32, config: &BlindConfig) -> Vec<BlindLevel> {
    let interval = (config.window() / player_count.get()).max(MIN_BLIND_INTERVAL);
    config
        .amounts()
        .iter()
        .zip(0u32..)
        .map(|(&amount, step)| BlindLevel {
            delay: interval.saturating_mul(step),
            amount,
        })
        .collect()
}

/// Text pushed to clients when a blind level is reached.
pub fn format_blind_alert(amount: u32) -> String {
    format!("Blind is {amount}")
}

/// Arms the alerts for a game.
pub trait BlindAlertScheduler: Send + Sync {
    /// Arm every level for `player_count` players; alerts go to `sink` until cancelled.
    fn schedule(&self, player_count: NonZeroU32, sink: Arc<dyn AlertSink>) -> ScheduledAlerts;
}

/// Scheduler spawning one tokio task per blind level.
#[derive(Debug, Clone, Default)]
pub struct TokioBlindAlerter {
    config: BlindConfig,
}

impl TokioBlindAlerter {
    /// Scheduler using the given window and amounts.
    pub fn new(config: BlindConfig) -> Self {
        Self { config }
    }
}

impl BlindAlertScheduler for TokioBlindAlerter {
    fn schedule(&self, player_count: NonZeroU32, sink: Arc<dyn AlertSink>) -> ScheduledAlerts {
        let started_at = Instant::now();
        let cancelled = Arc::new(Mutex::new(false));

        let tasks = blind_schedule(player_count, &self.config)
            .into_iter()
            .filter_map(|level| {
                let Some(deadline) = started_at.checked_add(level.delay) else {
                    warn!(amount = level.amount, "blind level too far ahead; not scheduled");
                    return None;
                };
                let cancelled = cancelled.clone();
                let sink = sink.clone();
                let task = tokio::spawn(async move {
                    sleep_until(deadline).await;

                    // The flag stays locked while writing so `cancel` cannot return mid-send.
                    let cancelled = cancelled.lock().unwrap_or_else(PoisonError::into_inner);
                    if *cancelled {
                        return;
                    }
                    match sink.send_alert(&format_blind_alert(level.amount)) {
                        Ok(()) => debug!(amount = level.amount, "blind alert sent"),
                        Err(err) => {
                            warn!(amount = level.amount, error = %err, "dropping blind alert")
                        }
                    }
                });
                Some(task.abort_handle())
            })
            .collect();

        ScheduledAlerts { cancelled, tasks }
    }
}

/// Handle over every alert armed for one game.
///
/// Once [`ScheduledAlerts::cancel`] returns no further alert reaches the sink. Alerts the sink
/// accepted before that point may still be in flight to the peer. Dropping the handle cancels.
#[derive(Debug)]
pub struct ScheduledAlerts {
    cancelled: Arc<Mutex<bool>>,
    tasks: Vec<AbortHandle>,
}

impl ScheduledAlerts {
    /// Cancel every alert that has not fired yet. Safe to call repeatedly.
    pub fn cancel(&self) {
        {
            let mut cancelled = self.cancelled.lock().unwrap_or_else(PoisonError::into_inner);
            if *cancelled {
                return;
            }
            *cancelled = true;
        }
        for task in &self.tasks {
            task.abort();
        }
    }

    /// Whether [`ScheduledAlerts::cancel`] has run, explicitly or on drop.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of levels armed when the game started.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no level could be armed.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Drop for ScheduledAlerts {
    fn drop(&mut self) {
        self.cancel();
    }
}
