use std::error::Error;
use std::fmt;

use crate::config::LibrarySettings;
use crate::library::{Playlist, PlaylistError, ScanError, User, reconcile};
use crate::player::InfoHandle;
use crate::store::{StoreError, UserStore};

/// Which pane currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Playlists,
    Tracks,
}

/// Input mode of the shell. The `Enter*` modes capture typed text into
/// `App::input` for the two-step playlist creation flow and renaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    EnterTitle,
    EnterFolder,
    Rename,
}

#[derive(Debug)]
pub enum AppError {
    Scan(ScanError),
    Store(StoreError),
    Playlist(PlaylistError),
    DuplicateTitle(String),
    EmptyTitle,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Scan(e) => write!(f, "{e}"),
            AppError::Store(e) => write!(f, "{e}"),
            AppError::Playlist(e) => write!(f, "{e}"),
            AppError::DuplicateTitle(t) => write!(f, "a playlist named '{t}' already exists"),
            AppError::EmptyTitle => write!(f, "playlist title cannot be empty"),
        }
    }
}

impl Error for AppError {}

impl From<ScanError> for AppError {
    fn from(e: ScanError) -> Self {
        AppError::Scan(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<PlaylistError> for AppError {
    fn from(e: PlaylistError) -> Self {
        AppError::Playlist(e)
    }
}

/// UI-facing application state. Every mutation that touches the `User`
/// aggregate saves immediately; when the save fails the in-memory state is
/// rolled back so the screen never drifts from the document on disk.
pub struct App {
    pub user: User,
    pub selected_playlist: usize,
    pub selected_track: usize,
    pub focus: Pane,
    pub mode: Mode,
    pub input: String,
    /// Title captured during the two-step creation flow, while the folder
    /// is being typed.
    pub pending_title: Option<String>,
    /// Transient message shown in the status box.
    pub status: Option<String>,
    pub info: Option<InfoHandle>,
    /// Title of the playlist currently loaded in the player, if any.
    pub playing_playlist: Option<String>,
    pub volume: f32,
}

impl App {
    pub fn new(user: User, volume: f32) -> Self {
        Self {
            user,
            selected_playlist: 0,
            selected_track: 0,
            focus: Pane::Playlists,
            mode: Mode::Normal,
            input: String::new(),
            pending_title: None,
            status: None,
            info: None,
            playing_playlist: None,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn selected_playlist(&self) -> Option<&Playlist> {
        self.user.playlists.get(self.selected_playlist)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Playlists => Pane::Tracks,
            Pane::Tracks => Pane::Playlists,
        };
    }

    pub fn select_next(&mut self) {
        match self.focus {
            Pane::Playlists => {
                if self.selected_playlist + 1 < self.user.playlists.len() {
                    self.selected_playlist += 1;
                    self.selected_track = 0;
                }
            }
            Pane::Tracks => {
                let len = self.selected_playlist().map_or(0, |p| p.tracks.len());
                if self.selected_track + 1 < len {
                    self.selected_track += 1;
                }
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            Pane::Playlists => {
                if self.selected_playlist > 0 {
                    self.selected_playlist -= 1;
                    self.selected_track = 0;
                }
            }
            Pane::Tracks => {
                if self.selected_track > 0 {
                    self.selected_track -= 1;
                }
            }
        }
    }

    fn validated_title(&self, title: &str) -> Result<String, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::EmptyTitle);
        }
        if self.user.playlists.iter().any(|p| p.title == title) {
            return Err(AppError::DuplicateTitle(title.to_string()));
        }
        Ok(title.to_string())
    }

    /// Create a playlist backed by `folder`, populated by an initial scan,
    /// and persist it. On a failed save the playlist is removed again.
    pub fn create_playlist(
        &mut self,
        store: &UserStore,
        library: &LibrarySettings,
        title: &str,
        folder: &str,
    ) -> Result<(), AppError> {
        let title = self.validated_title(title)?;
        let outcome = reconcile(folder.as_ref(), &[], library)?;

        self.user
            .playlists
            .push(Playlist::new(&title, folder, outcome.tracks));

        if let Err(e) = store.save(&self.user) {
            self.user.playlists.pop();
            return Err(e.into());
        }

        self.selected_playlist = self.user.playlists.len() - 1;
        self.selected_track = 0;
        Ok(())
    }

    /// Rename the selected playlist and its recently-played entry.
    pub fn rename_playlist(&mut self, store: &UserStore, new_title: &str) -> Result<(), AppError> {
        let new_title = self.validated_title(new_title)?;
        let Some(playlist) = self.user.playlists.get_mut(self.selected_playlist) else {
            return Ok(());
        };

        let old_title = std::mem::replace(&mut playlist.title, new_title.clone());
        for entry in &mut self.user.recently_played_playlists {
            if *entry == old_title {
                *entry = new_title.clone();
            }
        }

        if let Err(e) = store.save(&self.user) {
            self.user.playlists[self.selected_playlist].title = old_title.clone();
            for entry in &mut self.user.recently_played_playlists {
                if *entry == new_title {
                    *entry = old_title.clone();
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove the selected playlist. The folder and its files are untouched.
    pub fn remove_playlist(&mut self, store: &UserStore) -> Result<(), AppError> {
        if self.selected_playlist >= self.user.playlists.len() {
            return Ok(());
        }

        let index = self.selected_playlist;
        let removed = self.user.playlists.remove(index);
        let recents = self.user.recently_played_playlists.clone();
        self.user
            .recently_played_playlists
            .retain(|t| *t != removed.title);

        if let Err(e) = store.save(&self.user) {
            self.user.playlists.insert(index, removed);
            self.user.recently_played_playlists = recents;
            return Err(e.into());
        }

        if self.selected_playlist >= self.user.playlists.len() && self.selected_playlist > 0 {
            self.selected_playlist -= 1;
        }
        self.selected_track = 0;
        Ok(())
    }

    /// Move the selected track by `delta` positions within its playlist and
    /// persist the new order. A failed save restores the previous order.
    pub fn move_selected_track(&mut self, store: &UserStore, delta: isize) -> Result<(), AppError> {
        let from = self.selected_track;
        let Some(playlist) = self.user.playlists.get_mut(self.selected_playlist) else {
            return Ok(());
        };
        if playlist.tracks.is_empty() {
            return Ok(());
        }

        let to = from
            .saturating_add_signed(delta)
            .min(playlist.tracks.len() - 1);
        if to == from {
            return Ok(());
        }

        playlist.move_track(from, to)?;

        if let Err(e) = store.save(&self.user) {
            // Undo by applying the inverse move.
            let _ = self.user.playlists[self.selected_playlist].move_track(to, from);
            return Err(e.into());
        }

        self.selected_track = to;
        Ok(())
    }

    /// Rescan the selected playlist's folder and persist the merged listing.
    pub fn refresh_selected_playlist(
        &mut self,
        store: &UserStore,
        library: &LibrarySettings,
    ) -> Result<(), AppError> {
        let Some(playlist) = self.user.playlists.get_mut(self.selected_playlist) else {
            return Ok(());
        };

        let outcome = reconcile(&playlist.folder_path, &playlist.tracks, library)?;
        let previous = std::mem::take(&mut playlist.tracks);
        let previous_duration = playlist.duration;
        playlist.set_tracks(outcome.tracks);

        if let Err(e) = store.save(&self.user) {
            let playlist = &mut self.user.playlists[self.selected_playlist];
            playlist.tracks = previous;
            playlist.duration = previous_duration;
            return Err(e.into());
        }

        let len = self.user.playlists[self.selected_playlist].tracks.len();
        if self.selected_track >= len {
            self.selected_track = len.saturating_sub(1);
        }
        Ok(())
    }

    /// Record `title` as the most recently played playlist and persist.
    pub fn mark_recently_played(
        &mut self,
        store: &UserStore,
        title: &str,
    ) -> Result<(), AppError> {
        let previous = self.user.recently_played_playlists.clone();
        self.user.add_to_recently_played(title);

        if let Err(e) = store.save(&self.user) {
            self.user.recently_played_playlists = previous;
            return Err(e.into());
        }
        Ok(())
    }
}
