//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Mode, Pane};
use crate::config::{PlaybackSettings, UiSettings};
use crate::player::PlaybackState;

/// Render the controls help text, incorporating seek seconds.
fn controls_text(seek_seconds: u64) -> String {
    [
        "[tab] switch pane".to_string(),
        "[j/k] up/down".to_string(),
        "[enter] play playlist".to_string(),
        "[space/p] play/pause".to_string(),
        "[l/h] next/prev track".to_string(),
        format!("[L/H] seek +/-{seek_seconds}s"),
        "[J/K] move track".to_string(),
        "[+/-] volume".to_string(),
        "[a] add".to_string(),
        "[r] rename".to_string(),
        "[d] delete".to_string(),
        "[u] rescan".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(info) = app.info.as_ref().and_then(|h| h.lock().ok()) {
        match info.state {
            PlaybackState::Stopped => parts.push("Stopped".to_string()),
            PlaybackState::Playing => parts.push("Playing".to_string()),
            PlaybackState::Paused => parts.push("Paused".to_string()),
        }

        if let (Some(shown), Some(track)) = (info.display_index(), info.track.as_ref()) {
            if let Some(playlist) = &app.playing_playlist {
                parts.push(format!("Playlist: {playlist}"));
            }
            let time = match info.track_duration {
                Some(total) => format!("{}/{}", format_mmss(info.elapsed), format_mmss(total)),
                None => format_mmss(info.elapsed),
            };
            parts.push(format!(
                "Track {}/{}: {} [{}]",
                shown, info.total, track, time
            ));
        }

        parts.push(format!("Vol: {:.0}%", info.volume * 100.0));
    } else {
        parts.push("Stopped".to_string());
        parts.push(format!("Vol: {:.0}%", app.volume * 100.0));
    }

    if let Some(msg) = &app.status {
        parts.push(msg.clone());
    }

    parts.join(" • ")
}

fn playlist_items(app: &App) -> Vec<ListItem<'_>> {
    app.user
        .playlists
        .iter()
        .map(|p| {
            let recent = if app.user.is_recently_played(&p.title) {
                "* "
            } else {
                "  "
            };
            ListItem::new(format!(
                "{}{} ({} tracks, {})",
                recent,
                p.title,
                p.tracks.len(),
                format_mmss(p.duration)
            ))
        })
        .collect()
}

fn track_items(app: &App) -> Vec<ListItem<'_>> {
    let Some(playlist) = app.selected_playlist() else {
        return vec![];
    };
    playlist
        .tracks
        .iter()
        .enumerate()
        .map(|(i, t)| {
            ListItem::new(format!(
                "{:>3}. {} [{}]",
                i + 1,
                t.display(),
                format_mmss(t.duration)
            ))
        })
        .collect()
}

fn input_title(mode: Mode) -> &'static str {
    match mode {
        Mode::EnterTitle => " new playlist: title ",
        Mode::EnterFolder => " new playlist: folder path ",
        Mode::Rename => " rename playlist ",
        Mode::Normal => "",
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, playback: &PlaybackSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" segue ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Main panes
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);

    let playlists = List::new(playlist_items(app))
        .block(pane_block(" playlists ", app.focus == Pane::Playlists))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut playlist_state = ListState::default();
    if !app.user.playlists.is_empty() {
        playlist_state.select(Some(app.selected_playlist));
    }
    frame.render_stateful_widget(playlists, panes[0], &mut playlist_state);

    let track_rows = track_items(app);
    let has_tracks = !track_rows.is_empty();
    let tracks = List::new(track_rows)
        .block(pane_block(" tracks ", app.focus == Pane::Tracks))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut track_state = ListState::default();
    if has_tracks {
        track_state.select(Some(app.selected_track));
    }
    frame.render_stateful_widget(tracks, panes[1], &mut track_state);

    // Input popup for the create/rename flows.
    if app.mode != Mode::Normal {
        let popup_area = centered_rect_sized(60, 3, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let input = Paragraph::new(format!("{}_", app.input)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(input_title(app.mode))
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        );
        frame.render_widget(input, popup_area);
    }

    let footer = Paragraph::new(controls_text(playback.seek_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
