use std::sync::mpsc::{self, Receiver, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::PlaybackSettings;

use super::thread::spawn_player_thread;
use super::types::{InfoHandle, PlaybackInfo, PlayerCmd, PlayerEvent};

/// Handle to the audio thread. Commands go through a channel; playback
/// progress comes back through the shared `PlaybackInfo` snapshot and the
/// event receiver.
pub struct Player {
    tx: Sender<PlayerCmd>,
    events: Receiver<PlayerEvent>,
    info: InfoHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    pub fn new(settings: PlaybackSettings) -> Self {
        let (tx, rx) = mpsc::channel();
        let (event_tx, events) = mpsc::channel();
        let info: InfoHandle = Arc::new(Mutex::new(PlaybackInfo {
            volume: settings.default_volume.clamp(0.0, 1.0),
            ..PlaybackInfo::default()
        }));

        let join = spawn_player_thread(rx, event_tx, info.clone(), settings);

        Self {
            tx,
            events,
            info,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    pub fn info_handle(&self) -> InfoHandle {
        self.info.clone()
    }

    /// Non-blocking poll of the next pending playback event.
    pub fn try_event(&self) -> Option<PlayerEvent> {
        self.events.try_recv().ok()
    }

    /// Stop playback and wait for the audio thread to exit.
    pub fn quit(&self) {
        let _ = self.tx.send(PlayerCmd::Quit);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}
