use crate::track::TrackId;
use std::time::{Duration, Instant};

/// Current playback state reported by the audio side
#[derive(Debug, Clone)]
pub struct PlaybackState {
    /// Whether audio is currently playing
    pub is_playing: bool,
    /// Track the clock belongs to (None if nothing is loaded)
    pub track_id: Option<TrackId>,
    /// Current playback position
    pub position: Duration,
    /// Total track duration, zero if unknown
    pub duration: Duration,
    /// When this state was last updated (for interpolation)
    pub updated_at: Instant,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            track_id: None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            updated_at: Instant::now(),
        }
    }
}

/// A single sample of the playback clock, taken once per evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReading {
    pub track_id: Option<TrackId>,
    pub position: Duration,
    pub is_playing: bool,
}

impl PlaybackState {
    /// Create a new playback state
    #[must_use]
    pub fn new(
        is_playing: bool,
        track_id: Option<TrackId>,
        position: Duration,
        duration: Duration,
    ) -> Self {
        Self {
            is_playing,
            track_id,
            position,
            duration,
            updated_at: Instant::now(),
        }
    }

    /// Get interpolated position based on time elapsed since last update
    #[must_use]
    pub fn interpolated_position(&self) -> Duration {
        if !self.is_playing {
            return self.position;
        }

        let interpolated = self.position + self.updated_at.elapsed();

        // Clamp to track duration when it is known
        if self.duration.is_zero() {
            interpolated
        } else {
            interpolated.min(self.duration)
        }
    }

    /// Sample the clock at the interpolated position
    #[must_use]
    pub fn reading(&self) -> ClockReading {
        ClockReading {
            track_id: self.track_id.clone(),
            position: self.interpolated_position(),
            is_playing: self.is_playing,
        }
    }

    /// Check if the track has changed
    #[must_use]
    pub fn track_changed(&self, other: &Self) -> bool {
        self.track_id != other.track_id
    }

    /// Check if playback state changed (playing <-> paused)
    #[must_use]
    pub const fn playback_state_changed(&self, other: &Self) -> bool {
        self.is_playing != other.is_playing
    }

    /// Check if a seek occurred (position jumped unexpectedly)
    #[must_use]
    pub fn seek_occurred(&self, other: &Self, threshold: Duration) -> bool {
        if self.track_changed(other) {
            return false;
        }

        let expected = self.interpolated_position();
        let actual = other.position;

        if actual > expected {
            actual - expected > threshold
        } else {
            expected - actual > threshold
        }
    }
}
