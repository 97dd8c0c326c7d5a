use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in `User::recently_played_playlists`.
pub const RECENT_CAP: usize = 5;

/// Serialize/deserialize a `Duration` as fractional seconds, the layout used
/// by the on-disk `user.json` documents.
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        if !secs.is_finite() || secs <= 0.0 {
            return Ok(Duration::ZERO);
        }
        // Values past Duration's range saturate instead of failing the load;
        // playlist durations get recomputed on the next set_tracks anyway.
        Ok(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }
}

/// A single audio item. Identity within a playlist is `file_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    #[serde(with = "secs")]
    pub duration: Duration,
    pub file_path: PathBuf,
}

impl Track {
    /// Display string for list rendering: "Artist - Title", or just the
    /// title when the artist is the "Unknown" placeholder.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() || artist == "Unknown" {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    /// A reorder request referenced an index outside the track list.
    IndexOutOfRange { from: usize, to: usize, len: usize },
}

impl fmt::Display for PlaylistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistError::IndexOutOfRange { from, to, len } => {
                write!(f, "move {from} -> {to} is out of range for {len} tracks")
            }
        }
    }
}

impl Error for PlaylistError {}

/// A named, ordered collection of tracks bound to a source folder.
///
/// Invariant: `duration` always equals the sum of `tracks[*].duration`.
/// All mutation goes through methods that recompute it in the same call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub title: String,
    #[serde(with = "secs")]
    pub duration: Duration,
    pub folder_path: PathBuf,
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(
        title: impl Into<String>,
        folder_path: impl Into<PathBuf>,
        tracks: Vec<Track>,
    ) -> Self {
        let duration = total_duration(&tracks);
        Self {
            title: title.into(),
            duration,
            folder_path: folder_path.into(),
            tracks,
        }
    }

    /// Replace the track list and recompute the derived duration.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.duration = total_duration(&self.tracks);
    }

    /// Move the track at `from` so it ends up at index `to`, shifting the
    /// tracks in between by one (list-move, not swap). Rejects out-of-range
    /// indices without mutating anything.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<(), PlaylistError> {
        let len = self.tracks.len();
        if from >= len || to >= len {
            return Err(PlaylistError::IndexOutOfRange { from, to, len });
        }
        if from != to {
            let track = self.tracks.remove(from);
            self.tracks.insert(to, track);
        }
        self.duration = total_duration(&self.tracks);
        Ok(())
    }
}

/// Fresh sum over all tracks; never computed incrementally, to avoid drift.
pub fn total_duration(tracks: &[Track]) -> Duration {
    tracks.iter().map(|t| t.duration).sum()
}

/// The owning account: one per application session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub recently_played_playlists: Vec<String>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            playlists: Vec::new(),
            recently_played_playlists: Vec::new(),
        }
    }

    /// Record `title` as the most recently played playlist: any existing
    /// occurrence moves to the end, and the list is trimmed from the front
    /// to at most [`RECENT_CAP`] entries.
    pub fn add_to_recently_played(&mut self, title: &str) {
        self.recently_played_playlists.retain(|t| t != title);
        self.recently_played_playlists.push(title.to_string());

        while self.recently_played_playlists.len() > RECENT_CAP {
            self.recently_played_playlists.remove(0);
        }
    }

    pub fn is_recently_played(&self, title: &str) -> bool {
        self.recently_played_playlists.iter().any(|t| t == title)
    }
}
