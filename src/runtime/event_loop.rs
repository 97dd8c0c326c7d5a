use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Mode};
use crate::config::Settings;
use crate::library::Track;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{PlaybackInfo, PlaybackState, Player, PlayerCmd, PlayerEvent};
use crate::runtime::mpris_sync::update_mpris;
use crate::store::UserStore;
use crate::ui;

const VOLUME_STEP: f32 = 0.05;

/// State tracked by the runtime event loop across iterations.
struct EventLoopState {
    /// Snapshot of the tracks last handed to the player; MPRIS metadata is
    /// resolved against this, not against the on-screen playlist.
    session_tracks: Vec<Track>,
    /// Last-known playing index as emitted to MPRIS.
    last_mpris_index: Option<usize>,
    /// Last-known playback state as emitted to MPRIS.
    last_mpris_state: PlaybackState,
}

/// Main terminal event loop: handles input, UI drawing, sync with the audio
/// thread and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &Settings,
    app: &mut App,
    player: &Player,
    store: &UserStore,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState {
        session_tracks: Vec::new(),
        last_mpris_index: None,
        last_mpris_state: PlaybackState::Stopped,
    };

    loop {
        while let Some(ev) = player.try_event() {
            match ev {
                // Index and state changes reach the UI and MPRIS through the
                // shared snapshot sampled below; only errors carry information
                // the snapshot does not.
                PlayerEvent::TrackChanged { .. } | PlayerEvent::StateChanged(_) => {}
                PlayerEvent::PlaybackError { path, .. } => {
                    app.set_status(format!("cannot play {}", path.display()));
                }
            }
        }

        let info: PlaybackInfo = app
            .info
            .as_ref()
            .and_then(|h| h.lock().ok().map(|i| i.clone()))
            .unwrap_or_default();

        if info.state == PlaybackState::Stopped {
            app.playing_playlist = None;
        }

        // Keep MPRIS in sync even when playback changes come from media keys
        // or auto-advance.
        if info.index != state.last_mpris_index || info.state != state.last_mpris_state {
            update_mpris(mpris, &info, &state.session_tracks);
            state.last_mpris_index = info.index;
            state.last_mpris_state = info.state;
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.playback))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, player, store, &mut state, info.state) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player, store, &mut state) {
                    return Ok(());
                }
            }
        }
    }
}

/// Hand the selected playlist's tracks to the player and record the play.
fn load_selected(app: &mut App, player: &Player, store: &UserStore, state: &mut EventLoopState) {
    let Some(playlist) = app.selected_playlist() else {
        return;
    };
    if playlist.tracks.is_empty() {
        app.set_status("playlist is empty");
        return;
    }

    let title = playlist.title.clone();
    let tracks = playlist.tracks.clone();

    if player.send(PlayerCmd::Load(tracks.clone())).is_ok() {
        state.session_tracks = tracks;
        app.playing_playlist = Some(title.clone());
        if let Err(e) = app.mark_recently_played(store, &title) {
            app.set_status(e.to_string());
        }
    }
}

fn handle_control_cmd(
    cmd: ControlCmd,
    app: &mut App,
    player: &Player,
    store: &UserStore,
    state: &mut EventLoopState,
    playback: PlaybackState,
) -> bool {
    match cmd {
        ControlCmd::Quit => {
            player.quit();
            return true;
        }
        ControlCmd::Play => match playback {
            PlaybackState::Paused => {
                let _ = player.send(PlayerCmd::PlayPause);
            }
            PlaybackState::Stopped => load_selected(app, player, store, state),
            PlaybackState::Playing => {}
        },
        ControlCmd::Pause | ControlCmd::Stop => {
            if playback == PlaybackState::Playing {
                let _ = player.send(PlayerCmd::PlayPause);
            }
        }
        ControlCmd::PlayPause => match playback {
            PlaybackState::Stopped => load_selected(app, player, store, state),
            _ => {
                let _ = player.send(PlayerCmd::PlayPause);
            }
        },
        ControlCmd::Next => {
            let _ = player.send(PlayerCmd::Next);
        }
        ControlCmd::Prev => {
            let _ = player.send(PlayerCmd::Prev);
        }
    }
    false
}

fn handle_key_event(
    key: KeyEvent,
    settings: &Settings,
    app: &mut App,
    player: &Player,
    store: &UserStore,
    state: &mut EventLoopState,
) -> bool {
    if app.mode != Mode::Normal {
        handle_input_key(key, settings, app, store);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            player.quit();
            return true;
        }
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => load_selected(app, player, store, state),
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            let _ = player.send(PlayerCmd::PlayPause);
        }
        KeyCode::Char('l') | KeyCode::Char('n') => {
            let _ = player.send(PlayerCmd::Next);
        }
        KeyCode::Char('h') | KeyCode::Char('b') => {
            let _ = player.send(PlayerCmd::Prev);
        }
        KeyCode::Char('L') => {
            let secs = settings.playback.seek_seconds.min(i32::MAX as u64) as i32;
            let _ = player.send(PlayerCmd::SeekBy(secs));
        }
        KeyCode::Char('H') => {
            let secs = settings.playback.seek_seconds.min(i32::MAX as u64) as i32;
            let _ = player.send(PlayerCmd::SeekBy(-secs));
        }
        KeyCode::Char('J') => {
            if let Err(e) = app.move_selected_track(store, 1) {
                app.set_status(e.to_string());
            }
        }
        KeyCode::Char('K') => {
            if let Err(e) = app.move_selected_track(store, -1) {
                app.set_status(e.to_string());
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.volume = (app.volume + VOLUME_STEP).clamp(0.0, 1.0);
            let _ = player.send(PlayerCmd::SetVolume(app.volume));
        }
        KeyCode::Char('-') => {
            app.volume = (app.volume - VOLUME_STEP).clamp(0.0, 1.0);
            let _ = player.send(PlayerCmd::SetVolume(app.volume));
        }
        KeyCode::Char('a') => {
            app.input.clear();
            app.pending_title = None;
            app.mode = Mode::EnterTitle;
        }
        KeyCode::Char('r') => {
            if let Some(title) = app.selected_playlist().map(|p| p.title.clone()) {
                app.input = title;
                app.mode = Mode::Rename;
            }
        }
        KeyCode::Char('d') => {
            if let Err(e) = app.remove_playlist(store) {
                app.set_status(e.to_string());
            }
        }
        KeyCode::Char('u') => {
            match app.refresh_selected_playlist(store, &settings.library) {
                Ok(()) => app.set_status("playlist rescanned"),
                Err(e) => app.set_status(e.to_string()),
            }
        }
        KeyCode::Esc => app.status = None,
        _ => {}
    }

    false
}

/// Key handling for the text-entry popup (create and rename flows).
fn handle_input_key(key: KeyEvent, settings: &Settings, app: &mut App, store: &UserStore) {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
            app.input.clear();
            app.pending_title = None;
        }
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => match app.mode {
            Mode::EnterTitle => {
                app.pending_title = Some(app.input.trim().to_string());
                app.input.clear();
                app.mode = Mode::EnterFolder;
            }
            Mode::EnterFolder => {
                let title = app.pending_title.take().unwrap_or_default();
                let folder = std::mem::take(&mut app.input);
                app.mode = Mode::Normal;
                match app.create_playlist(store, &settings.library, &title, folder.trim()) {
                    Ok(()) => app.set_status(format!("created playlist '{}'", title.trim())),
                    Err(e) => app.set_status(e.to_string()),
                }
            }
            Mode::Rename => {
                let new_title = std::mem::take(&mut app.input);
                app.mode = Mode::Normal;
                if let Err(e) = app.rename_playlist(store, &new_title) {
                    app.set_status(e.to_string());
                }
            }
            Mode::Normal => {}
        },
        KeyCode::Char(c) => {
            if !c.is_control() {
                app.input.push(c);
            }
        }
        _ => {}
    }
}
