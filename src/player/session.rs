//! The playback cursor: an ordered track snapshot, a position, and a state.
//!
//! Pure state machine, no audio I/O. The audio thread owns the single
//! process-wide instance and applies its transitions to the rodio sink.

use crate::library::Track;

use super::types::PlaybackState;

/// Outcome of the current track ending naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the track at this index.
    Moved(usize),
    /// Already at the last index; the session stopped.
    End,
}

/// Process-local playback session. Never persisted; replaced wholesale by
/// `load` and discarded on exit.
#[derive(Debug, Default)]
pub struct Session {
    tracks: Vec<Track>,
    position: usize,
    state: PlaybackState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session with `tracks`, starting at the first one.
    /// An empty list is a no-op and leaves the previous session intact.
    pub fn load(&mut self, tracks: Vec<Track>) -> bool {
        if tracks.is_empty() {
            return false;
        }
        self.tracks = tracks;
        self.position = 0;
        self.state = PlaybackState::Playing;
        true
    }

    /// Toggle Playing <-> Paused. Returns the new state, or `None` when
    /// nothing is loaded.
    pub fn toggle_pause(&mut self) -> Option<PlaybackState> {
        match self.state {
            PlaybackState::Stopped => None,
            PlaybackState::Playing => {
                self.state = PlaybackState::Paused;
                Some(self.state)
            }
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
                Some(self.state)
            }
        }
    }

    /// Manual skip forward. Returns the new position, or `None` when already
    /// at the last index (no wrap, no stop).
    pub fn advance(&mut self) -> Option<usize> {
        if self.has_tracks() && self.position < self.tracks.len() - 1 {
            self.position += 1;
            self.state = PlaybackState::Playing;
            Some(self.position)
        } else {
            None
        }
    }

    /// Manual skip backward. Returns the new position, or `None` at index 0.
    pub fn retreat(&mut self) -> Option<usize> {
        if self.has_tracks() && self.position > 0 {
            self.position -= 1;
            self.state = PlaybackState::Playing;
            Some(self.position)
        } else {
            None
        }
    }

    /// The current track ended naturally: advance like `advance`, except
    /// that past the last index the session transitions to Stopped.
    pub fn finish_current(&mut self) -> Advance {
        match self.advance() {
            Some(i) => Advance::Moved(i),
            None => {
                self.state = PlaybackState::Stopped;
                Advance::End
            }
        }
    }

    pub fn current(&self) -> Option<&Track> {
        if self.state == PlaybackState::Stopped {
            return None;
        }
        self.tracks.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }
}
