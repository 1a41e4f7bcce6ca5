//! A local playback clock that drives the sync engine without an audio backend.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::playback::PlaybackState;
use crate::sync::SyncEngine;
use crate::track::TrackId;

const LOG_TARGET_CLOCK: &str = "stanzaline::clock";

#[derive(Debug, Clone, Copy)]
struct ClockState {
    is_playing: bool,
    /// Position at `anchor`
    position: Duration,
    anchor: Instant,
}

impl ClockState {
    fn position(&self, duration: Duration) -> Duration {
        let position = if self.is_playing {
            self.position + self.anchor.elapsed()
        } else {
            self.position
        };

        if duration.is_zero() {
            position
        } else {
            position.min(duration)
        }
    }
}

/// Simulated transport for one track.
///
/// Advances in real time while playing and pushes a [`PlaybackState`] into the
/// sync engine on every tick.
pub struct SimulatedClock {
    sync_engine: Arc<SyncEngine>,
    track_id: TrackId,
    duration: Duration,
    tick_interval: Duration,
    state: Mutex<ClockState>,
    cancel_token: CancellationToken,
}

impl SimulatedClock {
    /// Create a paused clock at zero
    ///
    /// # Arguments
    /// * `duration` - Track length; playback pauses when it is reached. Zero means unbounded
    /// * `cancel_token` - Optional external cancellation token for graceful shutdown
    pub fn new(
        sync_engine: Arc<SyncEngine>,
        track_id: impl Into<TrackId>,
        duration: Duration,
        tick_interval: Duration,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        Self {
            sync_engine,
            track_id: track_id.into(),
            duration,
            tick_interval,
            state: Mutex::new(ClockState {
                is_playing: false,
                position: Duration::ZERO,
                anchor: Instant::now(),
            }),
            cancel_token: cancel_token.unwrap_or_default(),
        }
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub async fn play(&self) {
        let mut state = self.state.lock().await;
        if !state.is_playing {
            state.position = state.position(self.duration);
            state.anchor = Instant::now();
            state.is_playing = true;
        }
        drop(state);
        self.publish().await;
    }

    pub async fn pause(&self) {
        let mut state = self.state.lock().await;
        if state.is_playing {
            state.position = state.position(self.duration);
            state.anchor = Instant::now();
            state.is_playing = false;
        }
        drop(state);
        self.publish().await;
    }

    /// Jump to a position, keeping the play/pause state
    pub async fn seek(&self, position: Duration) {
        let mut state = self.state.lock().await;
        state.position = if self.duration.is_zero() {
            position
        } else {
            position.min(self.duration)
        };
        state.anchor = Instant::now();
        drop(state);
        debug!(target: LOG_TARGET_CLOCK, "Seek to {:?}", position);
        self.publish().await;
    }

    pub async fn is_playing(&self) -> bool {
        self.state.lock().await.is_playing
    }

    /// Current clock position
    pub async fn position(&self) -> Duration {
        self.state.lock().await.position(self.duration)
    }

    /// Push the current clock state into the sync engine
    pub async fn publish(&self) {
        let mut state = self.state.lock().await;
        let position = state.position(self.duration);

        // Reaching the end pauses the transport
        if state.is_playing && !self.duration.is_zero() && position >= self.duration {
            state.is_playing = false;
            state.position = self.duration;
            state.anchor = Instant::now();
            info!(target: LOG_TARGET_CLOCK, "Reached end of {}", self.track_id);
        }

        let playback = PlaybackState::new(
            state.is_playing,
            Some(self.track_id.clone()),
            position,
            self.duration,
        );
        drop(state);

        self.sync_engine.update_state(playback).await;
        self.sync_engine.tick().await;
    }

    /// Start ticking in a background task
    #[must_use]
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        info!(target: LOG_TARGET_CLOCK, "Starting clock for {}", self.track_id);

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(target: LOG_TARGET_CLOCK, "Clock shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.publish().await;
                }
            }
        }
    }
}
