use std::path::PathBuf;
use std::time::Duration;

use crate::library::Track;

use super::session::{Advance, Session};
use super::types::{PlaybackInfo, PlaybackState};

fn track(n: usize) -> Track {
    Track {
        title: format!("track {n}"),
        artist: "Unknown".to_string(),
        duration: Duration::from_secs(60),
        file_path: PathBuf::from(format!("/music/{n}.mp3")),
    }
}

fn tracks(n: usize) -> Vec<Track> {
    (0..n).map(track).collect()
}

#[test]
fn loading_an_empty_list_keeps_the_previous_session() {
    let mut session = Session::new();
    assert!(session.load(tracks(2)));
    session.advance();

    assert!(!session.load(vec![]));
    assert_eq!(session.position(), 1);
    assert_eq!(session.len(), 2);
    assert_eq!(session.state(), PlaybackState::Playing);
}

#[test]
fn loading_starts_at_the_first_track() {
    let mut session = Session::new();
    assert!(session.load(tracks(3)));
    assert_eq!(session.position(), 0);
    assert_eq!(session.state(), PlaybackState::Playing);
    assert_eq!(session.current().unwrap().title, "track 0");
}

#[test]
fn advance_clamps_at_the_last_track() {
    let mut session = Session::new();
    session.load(tracks(3));

    assert_eq!(session.advance(), Some(1));
    assert_eq!(session.advance(), Some(2));
    assert_eq!(session.advance(), None);
    assert_eq!(session.position(), 2);
    assert_eq!(session.state(), PlaybackState::Playing);
}

#[test]
fn retreat_clamps_at_the_first_track() {
    let mut session = Session::new();
    session.load(tracks(3));

    assert_eq!(session.retreat(), None);
    session.advance();
    assert_eq!(session.retreat(), Some(0));
    assert_eq!(session.retreat(), None);
    assert_eq!(session.position(), 0);
}

#[test]
fn skipping_while_paused_resumes_playback() {
    let mut session = Session::new();
    session.load(tracks(2));
    session.toggle_pause();
    assert_eq!(session.state(), PlaybackState::Paused);

    session.advance();
    assert_eq!(session.state(), PlaybackState::Playing);
}

#[test]
fn toggle_pause_alternates_between_playing_and_paused() {
    let mut session = Session::new();
    assert_eq!(session.toggle_pause(), None);

    session.load(tracks(1));
    assert_eq!(session.toggle_pause(), Some(PlaybackState::Paused));
    assert_eq!(session.toggle_pause(), Some(PlaybackState::Playing));
}

#[test]
fn finishing_the_last_track_stops_the_session() {
    let mut session = Session::new();
    session.load(tracks(2));

    assert_eq!(session.finish_current(), Advance::Moved(1));
    assert_eq!(session.finish_current(), Advance::End);
    assert_eq!(session.state(), PlaybackState::Stopped);
    assert!(session.current().is_none());
}

#[test]
fn position_stays_in_range_under_any_command_sequence() {
    let mut session = Session::new();
    session.load(tracks(3));

    session.retreat();
    session.advance();
    session.advance();
    session.advance();
    session.advance();
    session.retreat();
    session.retreat();
    session.retreat();

    assert!(session.position() < session.len());
}

#[test]
fn display_index_is_one_based() {
    let info = PlaybackInfo {
        index: Some(0),
        total: 4,
        ..PlaybackInfo::default()
    };
    assert_eq!(info.display_index(), Some(1));
    assert_eq!(PlaybackInfo::default().display_index(), None);
}
