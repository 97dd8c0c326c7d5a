//! Playback-related small types and handles.
//!
//! This module defines the command and event enums exchanged with the audio
//! thread, plus the shared playback snapshot sampled by the UI.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::Track;

/// The playback state of the active session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Replace the session with a snapshot of a playlist's tracks and start
    /// playing the first one. Empty lists are ignored.
    Load(Vec<Track>),
    /// Toggle between playing and paused for the current track.
    PlayPause,
    /// Skip to the next track (clamped at the end, no wrap).
    Next,
    /// Go back to the previous track (clamped at the start).
    Prev,
    /// Set the output volume; the value is clamped to 0.0..=1.0.
    SetVolume(f32),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i32),
    /// Stop playback and shut down the audio thread.
    Quit,
}

/// Notifications pushed from the audio thread to the UI shell.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    TrackChanged { index: usize, total: usize },
    StateChanged(PlaybackState),
    /// The current track's file could not be opened or decoded; the player
    /// moves on as if the track had ended.
    PlaybackError { index: usize, path: PathBuf },
}

/// Runtime playback snapshot shared with the UI.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    /// Index of the current track within the loaded session (if any).
    pub index: Option<usize>,
    /// Number of tracks in the loaded session.
    pub total: usize,
    /// Display string of the current track.
    pub track: Option<String>,
    /// Total duration of the current track.
    pub track_duration: Option<Duration>,
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    pub state: PlaybackState,
    /// Current output volume, 0.0..=1.0.
    pub volume: f32,
}

impl PlaybackInfo {
    /// 1-based index for display, alongside `total`.
    pub fn display_index(&self) -> Option<usize> {
        self.index.map(|i| i + 1)
    }
}

pub type InfoHandle = Arc<Mutex<PlaybackInfo>>;
