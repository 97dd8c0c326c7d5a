use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::PlaybackSettings;

use super::session::{Advance, Session};
use super::sink::create_sink_at;
use super::types::{InfoHandle, PlaybackState, PlayerCmd, PlayerEvent};

/// Mutable state owned by the audio thread: the single process-wide session,
/// the active sink, and elapsed-time bookkeeping for seeks.
struct PlayerState {
    session: Session,
    sink: Option<Sink>,
    volume: f32,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl PlayerState {
    /// Start playback of the session's current track. When the file cannot
    /// be opened or decoded, a `PlaybackError` is emitted and playback moves
    /// on as if the track had ended, stopping past the last index.
    fn start_current(
        &mut self,
        stream: &OutputStream,
        events: &Sender<PlayerEvent>,
        info: &InfoHandle,
    ) {
        loop {
            let Some(track) = self.session.current() else {
                return;
            };
            let index = self.session.position();
            let total = self.session.len();
            let display = track.display();
            let duration = track.duration;
            let path = track.file_path.clone();

            if let Some(old) = self.sink.take() {
                old.stop();
            }

            match create_sink_at(stream, track, Duration::ZERO) {
                Ok(sink) => {
                    sink.set_volume(self.volume);
                    sink.play();
                    self.sink = Some(sink);
                    self.started_at = Some(Instant::now());
                    self.accumulated = Duration::ZERO;

                    if let Ok(mut i) = info.lock() {
                        i.index = Some(index);
                        i.total = total;
                        i.track = Some(display);
                        i.track_duration = Some(duration);
                        i.elapsed = Duration::ZERO;
                        i.state = PlaybackState::Playing;
                    }
                    let _ = events.send(PlayerEvent::TrackChanged { index, total });
                    return;
                }
                Err(err) => {
                    log::warn!("cannot play {}: {err}", path.display());
                    let _ = events.send(PlayerEvent::PlaybackError { index, path });
                    match self.session.finish_current() {
                        Advance::Moved(_) => continue,
                        Advance::End => {
                            self.stop_playback(events, info);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn stop_playback(&mut self, events: &Sender<PlayerEvent>, info: &InfoHandle) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.started_at = None;
        self.accumulated = Duration::ZERO;

        if let Ok(mut i) = info.lock() {
            i.index = None;
            i.track = None;
            i.track_duration = None;
            i.elapsed = Duration::ZERO;
            i.state = PlaybackState::Stopped;
        }
        let _ = events.send(PlayerEvent::StateChanged(PlaybackState::Stopped));
    }

    /// Scrubbing: rebuild the current sink and skip into the file.
    /// This uses `Source::skip_duration` (works for common formats).
    fn seek_by(&mut self, secs: i32, stream: &OutputStream, info: &InfoHandle) {
        if self.sink.is_none() {
            return;
        }
        let Some(track) = self.session.current() else {
            return;
        };

        let elapsed = self.accumulated + self.started_at.map_or(Duration::ZERO, |t| t.elapsed());
        let cur = elapsed.as_secs() as i64;
        let new = (cur + secs as i64).max(0) as u64;
        let new_elapsed = Duration::from_secs(new);

        if let Some(s) = self.sink.take() {
            s.stop();
        }

        let paused = self.session.state() == PlaybackState::Paused;
        match create_sink_at(stream, track, new_elapsed) {
            Ok(sink) => {
                sink.set_volume(self.volume);
                if paused {
                    sink.pause();
                    self.started_at = None;
                } else {
                    sink.play();
                    self.started_at = Some(Instant::now());
                }
                self.sink = Some(sink);
                self.accumulated = new_elapsed;
                if let Ok(mut i) = info.lock() {
                    i.elapsed = new_elapsed;
                }
            }
            Err(err) => {
                log::warn!("seek failed for {}: {err}", track.file_path.display());
            }
        }
    }
}

pub(super) fn spawn_player_thread(
    rx: Receiver<PlayerCmd>,
    events: Sender<PlayerEvent>,
    info: InfoHandle,
    settings: PlaybackSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                log::error!("no audio output device: {e}");
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        stream.log_on_drop(false);

        let mut st = PlayerState {
            session: Session::new(),
            sink: None,
            volume: settings.default_volume.clamp(0.0, 1.0),
            started_at: None,
            accumulated: Duration::ZERO,
        };
        if let Ok(mut i) = info.lock() {
            i.volume = st.volume;
        }

        // Ticker thread updating the shared elapsed time; the UI samples it
        // on its own cadence instead of receiving per-frame pushes.
        let info_for_ticker = info.clone();
        thread::spawn(move || {
            loop {
                thread::sleep(Duration::from_millis(500));
                if let Ok(mut i) = info_for_ticker.lock() {
                    if i.state == PlaybackState::Playing {
                        i.elapsed += Duration::from_millis(500);
                    }
                }
            }
        });

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(PlayerCmd::Load(tracks)) => {
                    if st.session.load(tracks) {
                        st.start_current(&stream, &events, &info);
                    }
                }

                Ok(PlayerCmd::PlayPause) => {
                    if let Some(new_state) = st.session.toggle_pause() {
                        if let Some(ref s) = st.sink {
                            match new_state {
                                PlaybackState::Playing => {
                                    s.play();
                                    st.started_at = Some(Instant::now());
                                }
                                PlaybackState::Paused => {
                                    if let Some(t0) = st.started_at {
                                        st.accumulated += t0.elapsed();
                                    }
                                    st.started_at = None;
                                    s.pause();
                                }
                                PlaybackState::Stopped => {}
                            }
                        }
                        if let Ok(mut i) = info.lock() {
                            i.state = new_state;
                        }
                        let _ = events.send(PlayerEvent::StateChanged(new_state));
                    }
                }

                Ok(PlayerCmd::Next) => {
                    if st.session.advance().is_some() {
                        st.start_current(&stream, &events, &info);
                    }
                }

                Ok(PlayerCmd::Prev) => {
                    if st.session.retreat().is_some() {
                        st.start_current(&stream, &events, &info);
                    }
                }

                Ok(PlayerCmd::SetVolume(v)) => {
                    st.volume = v.clamp(0.0, 1.0);
                    if let Some(ref s) = st.sink {
                        s.set_volume(st.volume);
                    }
                    if let Ok(mut i) = info.lock() {
                        i.volume = st.volume;
                    }
                }

                Ok(PlayerCmd::SeekBy(secs)) => {
                    st.seek_by(secs, &stream, &info);
                }

                Ok(PlayerCmd::Quit) => {
                    if let Some(s) = st.sink.take() {
                        s.stop();
                    }
                    if let Ok(mut i) = info.lock() {
                        i.state = PlaybackState::Stopped;
                    }
                    break;
                }

                Err(RecvTimeoutError::Timeout) => {
                    // Periodic check for natural track end.
                    if st.session.state() == PlaybackState::Playing {
                        let finished = st.sink.as_ref().is_some_and(|s| s.empty());
                        if finished {
                            match st.session.finish_current() {
                                Advance::Moved(_) => st.start_current(&stream, &events, &info),
                                Advance::End => st.stop_playback(&events, &info),
                            }
                        }
                    }
                }

                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
