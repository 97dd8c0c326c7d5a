//! JSON persistence for the `User` aggregate.
//!
//! One document per user at `<data_dir>/<username>/user.json`. Saving writes
//! to a temp file in the same directory and renames it over the old document,
//! so a failed save never corrupts the previously-saved file.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::LibrarySettings;
use crate::library::{ScanError, User, reconcile};

#[derive(Debug)]
pub enum StoreError {
    /// No persisted document for this username (first run).
    NotFound(String),
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(name) => write!(f, "no saved data for user '{name}'"),
            StoreError::Io(e) => write!(f, "user storage I/O error: {e}"),
            StoreError::Json(e) => write!(f, "user document is not valid JSON: {e}"),
        }
    }
}

impl Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// Gateway to the per-user JSON documents.
pub struct UserStore {
    root: PathBuf,
}

impl UserStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn user_file(&self, username: &str) -> PathBuf {
        self.root.join(username).join("user.json")
    }

    /// Load the persisted `User` as-is, without refreshing playlists.
    pub fn load(&self, username: &str) -> Result<User, StoreError> {
        let path = self.user_file(username);
        if !path.is_file() {
            return Err(StoreError::NotFound(username.to_string()));
        }

        let data = fs::read_to_string(&path)?;
        let user: User = serde_json::from_str(&data)?;
        Ok(user)
    }

    /// Load the persisted `User` and refresh every playlist from its folder,
    /// picking up audio files added since the last run.
    pub fn load_refreshed(
        &self,
        username: &str,
        library: &LibrarySettings,
    ) -> Result<User, StoreError> {
        let mut user = self.load(username)?;
        log::info!(
            "loaded user '{}' with {} playlists",
            user.username,
            user.playlists.len()
        );
        refresh_playlists(&mut user, library);
        Ok(user)
    }

    /// Persist `user`, replacing the previous document atomically.
    pub fn save(&self, user: &User) -> Result<(), StoreError> {
        let dir = self.root.join(&user.username);
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(user)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(dir.join("user.json"))
            .map_err(|e| StoreError::Io(e.error))?;

        log::info!("saved user '{}'", user.username);
        Ok(())
    }
}

/// Re-run reconciliation for every playlist. A playlist whose folder is gone
/// is kept as-is and skipped with a warning; per-playlist failures never
/// abort the batch.
pub fn refresh_playlists(user: &mut User, library: &LibrarySettings) {
    for playlist in &mut user.playlists {
        match reconcile(&playlist.folder_path, &playlist.tracks, library) {
            Ok(outcome) => {
                log::info!(
                    "refreshed playlist '{}': {} tracks",
                    playlist.title,
                    outcome.tracks.len()
                );
                playlist.set_tracks(outcome.tracks);
            }
            Err(ScanError::FolderUnavailable(path)) => {
                log::warn!(
                    "skipping refresh of '{}': {}",
                    playlist.title,
                    path.display()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Playlist, Track};
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_user(name: &str) -> User {
        let mut user = User::new(name);
        let track = Track {
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            duration: Duration::from_secs(200),
            file_path: PathBuf::from("/music/song.mp3"),
        };
        user.playlists.push(Playlist::new("mix", "/music", vec![track]));
        user.add_to_recently_played("mix");
        user
    }

    #[test]
    fn load_missing_user_is_not_found() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());
        assert!(matches!(
            store.load("nobody"),
            Err(StoreError::NotFound(name)) if name == "nobody"
        ));
    }

    #[test]
    fn save_then_load_round_trips_the_aggregate() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());
        let user = sample_user("sam");

        store.save(&user).unwrap();
        let loaded = store.load("sam").unwrap();

        assert_eq!(loaded.username, "sam");
        assert_eq!(loaded.playlists.len(), 1);
        assert_eq!(loaded.playlists[0].title, "mix");
        assert_eq!(loaded.playlists[0].duration, Duration::from_secs(200));
        assert_eq!(loaded.recently_played_playlists, vec!["mix"]);
    }

    #[test]
    fn save_replaces_previous_document_in_place() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());

        let mut user = sample_user("sam");
        store.save(&user).unwrap();

        user.playlists[0].title = "renamed".to_string();
        store.save(&user).unwrap();

        let loaded = store.load("sam").unwrap();
        assert_eq!(loaded.playlists[0].title, "renamed");

        // The write-then-rename must not leave temp files around.
        let user_dir = dir.path().join("sam");
        let entries: Vec<_> = std::fs::read_dir(&user_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn failed_save_keeps_the_previous_document() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());

        let user = sample_user("sam");
        store.save(&user).unwrap();
        let user_dir = dir.path().join("sam");
        let before = std::fs::read_to_string(user_dir.join("user.json")).unwrap();

        // Park the user directory and put a file in its place so the next
        // save cannot create its temp file.
        let parked = dir.path().join("sam.parked");
        std::fs::rename(&user_dir, &parked).unwrap();
        std::fs::write(&user_dir, b"in the way").unwrap();

        let mut changed = user.clone();
        changed.playlists[0].title = "changed".to_string();
        assert!(store.save(&changed).is_err());

        std::fs::remove_file(&user_dir).unwrap();
        std::fs::rename(&parked, &user_dir).unwrap();

        // The failed save wrote nothing: the document is byte-identical and
        // still loads with the old contents.
        let after = std::fs::read_to_string(user_dir.join("user.json")).unwrap();
        assert_eq!(after, before);
        let loaded = store.load("sam").unwrap();
        assert_eq!(loaded.playlists[0].title, "mix");
    }

    #[test]
    fn load_refreshed_picks_up_new_files_and_keeps_missing_folders() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());
        let music = tempdir().unwrap();

        let mut user = User::new("sam");
        user.playlists
            .push(Playlist::new("live", music.path(), vec![]));
        user.playlists
            .push(Playlist::new("gone", "/no/such/folder", vec![]));
        store.save(&user).unwrap();

        // Unreadable as audio, so refresh sees it and skips it gracefully.
        std::fs::write(music.path().join("a.mp3"), b"x").unwrap();

        let loaded = store
            .load_refreshed("sam", &LibrarySettings::default())
            .unwrap();
        assert_eq!(loaded.playlists.len(), 2);
        assert_eq!(loaded.playlists[1].title, "gone");
        assert!(loaded.playlists[1].tracks.is_empty());
    }
}
