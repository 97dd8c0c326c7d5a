use std::path::PathBuf;
use std::time::Duration;

use tempfile::{TempDir, tempdir};

use crate::config::LibrarySettings;
use crate::library::{Playlist, Track, User};
use crate::store::UserStore;

use super::{App, AppError, Pane};

fn track(name: &str) -> Track {
    Track {
        title: name.to_string(),
        artist: "Unknown".to_string(),
        duration: Duration::from_secs(60),
        file_path: PathBuf::from(format!("/music/{name}.mp3")),
    }
}

fn app_with_playlist(tracks: Vec<Track>) -> (App, UserStore, TempDir) {
    let dir = tempdir().unwrap();
    let store = UserStore::new(dir.path());
    let mut user = User::new("sam");
    user.playlists.push(Playlist::new("mix", "/music", tracks));
    (App::new(user, 1.0), store, dir)
}

/// Make the next save fail by putting a file where the user's storage
/// directory should be.
fn block_saves(dir: &TempDir) {
    let user_dir = dir.path().join("sam");
    if user_dir.exists() {
        std::fs::remove_dir_all(&user_dir).unwrap();
    }
    std::fs::write(&user_dir, b"in the way").unwrap();
}

#[test]
fn create_playlist_rejects_duplicate_titles() {
    let (mut app, store, _dir) = app_with_playlist(vec![]);
    let music = tempdir().unwrap();

    let err = app
        .create_playlist(
            &store,
            &LibrarySettings::default(),
            "mix",
            music.path().to_str().unwrap(),
        )
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateTitle(t) if t == "mix"));
    assert_eq!(app.user.playlists.len(), 1);
}

#[test]
fn create_playlist_rejects_blank_titles() {
    let (mut app, store, _dir) = app_with_playlist(vec![]);
    let err = app
        .create_playlist(&store, &LibrarySettings::default(), "   ", "/music")
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyTitle));
}

#[test]
fn create_playlist_with_missing_folder_changes_nothing() {
    let (mut app, store, _dir) = app_with_playlist(vec![]);
    let err = app
        .create_playlist(&store, &LibrarySettings::default(), "new", "/no/such/dir")
        .unwrap_err();

    assert!(matches!(err, AppError::Scan(_)));
    assert_eq!(app.user.playlists.len(), 1);
    assert_eq!(app.selected_playlist, 0);
}

#[test]
fn create_playlist_persists_and_selects_the_new_entry() {
    let (mut app, store, _dir) = app_with_playlist(vec![]);
    let music = tempdir().unwrap();

    app.create_playlist(
        &store,
        &LibrarySettings::default(),
        "fresh",
        music.path().to_str().unwrap(),
    )
    .unwrap();

    assert_eq!(app.user.playlists.len(), 2);
    assert_eq!(app.selected_playlist, 1);
    assert_eq!(store.load("sam").unwrap().playlists.len(), 2);
}

#[test]
fn create_playlist_rolls_back_when_save_fails() {
    let (mut app, store, dir) = app_with_playlist(vec![]);
    let music = tempdir().unwrap();
    block_saves(&dir);

    let err = app
        .create_playlist(
            &store,
            &LibrarySettings::default(),
            "fresh",
            music.path().to_str().unwrap(),
        )
        .unwrap_err();

    assert!(matches!(err, AppError::Store(_)));
    assert_eq!(app.user.playlists.len(), 1);
}

#[test]
fn rename_playlist_updates_recents_too() {
    let (mut app, store, _dir) = app_with_playlist(vec![]);
    app.user.add_to_recently_played("mix");

    app.rename_playlist(&store, "evening mix").unwrap();

    assert_eq!(app.user.playlists[0].title, "evening mix");
    assert_eq!(app.user.recently_played_playlists, vec!["evening mix"]);
}

#[test]
fn rename_playlist_rolls_back_when_save_fails() {
    let (mut app, store, dir) = app_with_playlist(vec![]);
    app.user.add_to_recently_played("mix");
    block_saves(&dir);

    assert!(app.rename_playlist(&store, "evening mix").is_err());
    assert_eq!(app.user.playlists[0].title, "mix");
    assert_eq!(app.user.recently_played_playlists, vec!["mix"]);
}

#[test]
fn remove_playlist_clamps_selection_and_drops_recents_entry() {
    let (mut app, store, _dir) = app_with_playlist(vec![]);
    app.user.playlists.push(Playlist::new("b", "/b", vec![]));
    app.user.add_to_recently_played("b");
    app.selected_playlist = 1;

    app.remove_playlist(&store).unwrap();

    assert_eq!(app.user.playlists.len(), 1);
    assert_eq!(app.selected_playlist, 0);
    assert!(app.user.recently_played_playlists.is_empty());
}

#[test]
fn remove_playlist_rolls_back_when_save_fails() {
    let (mut app, store, dir) = app_with_playlist(vec![]);
    app.user.add_to_recently_played("mix");
    block_saves(&dir);

    assert!(app.remove_playlist(&store).is_err());
    assert_eq!(app.user.playlists.len(), 1);
    assert_eq!(app.user.playlists[0].title, "mix");
    assert_eq!(app.user.recently_played_playlists, vec!["mix"]);
}

#[test]
fn moving_a_track_persists_and_follows_the_selection() {
    let (mut app, store, _dir) = app_with_playlist(vec![track("a"), track("b"), track("c")]);
    app.selected_track = 0;

    app.move_selected_track(&store, 2).unwrap();

    let titles: Vec<_> = app.user.playlists[0]
        .tracks
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["b", "c", "a"]);
    assert_eq!(app.selected_track, 2);

    let saved = store.load("sam").unwrap();
    assert_eq!(saved.playlists[0].tracks[2].title, "a");
}

#[test]
fn moving_a_track_rolls_back_when_save_fails() {
    let (mut app, store, dir) = app_with_playlist(vec![track("a"), track("b"), track("c")]);
    block_saves(&dir);

    assert!(app.move_selected_track(&store, 1).is_err());

    let titles: Vec<_> = app.user.playlists[0]
        .tracks
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["a", "b", "c"]);
    assert_eq!(app.selected_track, 0);
}

#[test]
fn moving_past_either_end_is_a_no_op() {
    let (mut app, store, _dir) = app_with_playlist(vec![track("a"), track("b")]);

    app.move_selected_track(&store, -1).unwrap();
    app.selected_track = 1;
    app.move_selected_track(&store, 5).unwrap();

    let titles: Vec<_> = app.user.playlists[0]
        .tracks
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["a", "b"]);
}

#[test]
fn mark_recently_played_rolls_back_when_save_fails() {
    let (mut app, store, dir) = app_with_playlist(vec![]);
    block_saves(&dir);

    assert!(app.mark_recently_played(&store, "mix").is_err());
    assert!(app.user.recently_played_playlists.is_empty());
}

#[test]
fn selection_stays_in_range_while_navigating() {
    let (mut app, _store, _dir) = app_with_playlist(vec![track("a"), track("b")]);
    app.user.playlists.push(Playlist::new("b", "/b", vec![]));

    app.select_prev();
    assert_eq!(app.selected_playlist, 0);
    app.select_next();
    app.select_next();
    assert_eq!(app.selected_playlist, 1);

    app.focus = Pane::Tracks;
    app.selected_playlist = 0;
    app.selected_track = 0;
    app.select_next();
    app.select_next();
    assert_eq!(app.selected_track, 1);
    app.select_prev();
    app.select_prev();
    assert_eq!(app.selected_track, 0);
}

#[test]
fn switching_playlists_resets_the_track_selection() {
    let (mut app, _store, _dir) = app_with_playlist(vec![track("a"), track("b")]);
    app.user.playlists.push(Playlist::new("b", "/b", vec![]));
    app.focus = Pane::Tracks;
    app.selected_track = 1;

    app.focus = Pane::Playlists;
    app.select_next();
    assert_eq!(app.selected_track, 0);
}
