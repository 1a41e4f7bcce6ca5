use crate::cursor::{LyricCursor, TimelinePosition};
use crate::playback::PlaybackState;
use crate::track::{Track, TrackId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

/// Position jump beyond which an update counts as a seek
pub const DEFAULT_SEEK_THRESHOLD: Duration = Duration::from_secs(2);

/// Events emitted by the sync engine
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Playback started for a track
    PlaybackStarted {
        track_id: TrackId,
        position: Duration,
    },
    /// Playback was paused
    PlaybackPaused {
        position: Duration,
    },
    /// Playback was resumed
    PlaybackResumed {
        position: Duration,
    },
    /// Playback stopped (no track loaded on the clock)
    PlaybackStopped,
    /// The clock switched to another track
    TrackChanged {
        track_id: TrackId,
        position: Duration,
    },
    /// Regular position sync update
    PositionSync {
        position: Duration,
    },
    /// A seek occurred within the current track
    SeekOccurred {
        position: Duration,
    },
    /// A track's lyrics are now on display
    TrackDisplayed {
        track: Arc<Track>,
    },
    /// Nothing is on display any more
    TrackCleared,
    /// The active word of the displayed track changed
    ActiveWordChanged {
        word: Option<usize>,
    },
    /// The active stanza of the displayed track changed
    ActiveStanzaChanged {
        stanza: Option<usize>,
    },
    /// A stanza became active during playback and should be scrolled into view
    ScrollToStanza {
        stanza: usize,
    },
    /// Error occurred
    Error {
        message: String,
    },
}

/// Sync engine state
struct SyncEngineInner {
    state: PlaybackState,
    displayed: Option<Arc<Track>>,
    cursor: LyricCursor,
}

impl SyncEngineInner {
    fn new() -> Self {
        Self {
            state: PlaybackState::default(),
            displayed: None,
            cursor: LyricCursor::new(),
        }
    }
}

/// Engine that keeps the displayed lyrics in step with the playback clock
pub struct SyncEngine {
    inner: RwLock<SyncEngineInner>,
    event_tx: broadcast::Sender<SyncEvent>,
    seek_threshold: Duration,
}

impl SyncEngine {
    /// Create a new sync engine
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_seek_threshold(DEFAULT_SEEK_THRESHOLD)
    }

    /// Create a sync engine with a custom seek detection threshold
    #[must_use]
    pub fn with_seek_threshold(seek_threshold: Duration) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(64);

        Arc::new(Self {
            inner: RwLock::new(SyncEngineInner::new()),
            event_tx,
            seek_threshold,
        })
    }

    /// Subscribe to sync events
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    /// Update playback state, emit playback events, then re-resolve the
    /// displayed track against the new clock.
    pub async fn update_state(&self, new_state: PlaybackState) {
        let mut inner = self.inner.write().await;
        let old_state = &inner.state;

        // Detect what changed
        let track_changed = old_state.track_changed(&new_state);
        let playback_changed = old_state.playback_state_changed(&new_state);
        let seek_occurred = old_state.seek_occurred(&new_state, self.seek_threshold);

        if track_changed {
            if let Some(ref track_id) = new_state.track_id {
                let _ = self.event_tx.send(SyncEvent::TrackChanged {
                    track_id: track_id.clone(),
                    position: new_state.position,
                });
                // Also emit play state so listeners know if track is playing or paused
                if new_state.is_playing {
                    let _ = self.event_tx.send(SyncEvent::PlaybackResumed {
                        position: new_state.position,
                    });
                } else {
                    let _ = self.event_tx.send(SyncEvent::PlaybackPaused {
                        position: new_state.position,
                    });
                }
            } else {
                let _ = self.event_tx.send(SyncEvent::PlaybackStopped);
            }
        } else if playback_changed {
            if new_state.is_playing {
                if old_state.track_id.is_some() {
                    let _ = self.event_tx.send(SyncEvent::PlaybackResumed {
                        position: new_state.position,
                    });
                } else if let Some(ref track_id) = new_state.track_id {
                    let _ = self.event_tx.send(SyncEvent::PlaybackStarted {
                        track_id: track_id.clone(),
                        position: new_state.position,
                    });
                }
            } else {
                let _ = self.event_tx.send(SyncEvent::PlaybackPaused {
                    position: new_state.position,
                });
            }
        } else if seek_occurred {
            let _ = self.event_tx.send(SyncEvent::SeekOccurred {
                position: new_state.position,
            });
        } else {
            // Regular position update
            let _ = self.event_tx.send(SyncEvent::PositionSync {
                position: new_state.position,
            });
        }

        inner.state = new_state;
        self.resolve(&mut inner);
    }

    /// Re-resolve the displayed track at the interpolated clock position.
    ///
    /// Call this from the render loop between playback updates.
    pub async fn tick(&self) -> TimelinePosition {
        let mut inner = self.inner.write().await;
        self.resolve(&mut inner);
        inner.cursor.position()
    }

    /// Put a track's lyrics on display
    pub async fn display_track(&self, track: Arc<Track>) {
        let mut inner = self.inner.write().await;
        inner.displayed = Some(Arc::clone(&track));
        inner.cursor.reset();
        let _ = self.event_tx.send(SyncEvent::TrackDisplayed { track });
        self.resolve(&mut inner);
    }

    /// Remove the displayed lyrics
    pub async fn clear_track(&self) {
        let mut inner = self.inner.write().await;
        inner.displayed = None;
        inner.cursor.reset();
        let _ = self.event_tx.send(SyncEvent::TrackCleared);
    }

    fn resolve(&self, inner: &mut SyncEngineInner) {
        let Some(track) = inner.displayed.clone() else {
            return;
        };

        let reading = inner.state.reading();
        let update = inner.cursor.observe(&track, &reading);

        if update.stanza_changed {
            let _ = self.event_tx.send(SyncEvent::ActiveStanzaChanged {
                stanza: update.position.stanza,
            });
        }
        if let Some(stanza) = update.scroll_to {
            let _ = self.event_tx.send(SyncEvent::ScrollToStanza { stanza });
        }
        if update.word_changed {
            let _ = self.event_tx.send(SyncEvent::ActiveWordChanged {
                word: update.position.word,
            });
        }
    }

    /// Emit an error event
    pub fn emit_error(&self, message: String) {
        let _ = self.event_tx.send(SyncEvent::Error { message });
    }

    /// Get current playback state
    pub async fn state(&self) -> PlaybackState {
        self.inner.read().await.state.clone()
    }

    /// Get the displayed track
    pub async fn displayed_track(&self) -> Option<Arc<Track>> {
        self.inner.read().await.displayed.clone()
    }

    /// Last resolved position of the displayed track
    pub async fn timeline_position(&self) -> TimelinePosition {
        self.inner.read().await.cursor.position()
    }

    /// Get interpolated current position
    pub async fn current_position(&self) -> Duration {
        self.inner.read().await.state.interpolated_position()
    }

    /// Check if currently playing
    pub async fn is_playing(&self) -> bool {
        self.inner.read().await.state.is_playing
    }

    /// Get the track the clock currently belongs to
    pub async fn current_track_id(&self) -> Option<TrackId> {
        self.inner.read().await.state.track_id.clone()
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            inner: RwLock::new(SyncEngineInner::new()),
            event_tx,
            seek_threshold: DEFAULT_SEEK_THRESHOLD,
        }
    }
}
