use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config::Settings;
use crate::library::User;
use crate::mpris::ControlCmd;
use crate::player::Player;
use crate::store::{StoreError, UserStore};

mod event_loop;
mod logging;
mod mpris_sync;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    settings.validate()?;
    logging::init();

    let username = settings.username();
    let data_dir = settings
        .data_dir()
        .ok_or("cannot determine data directory (set storage.data_dir or HOME)")?;
    let store = UserStore::new(data_dir);

    let user = match store.load_refreshed(&username, &settings.library) {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => {
            log::info!("no saved data for '{username}', starting fresh");
            User::new(&username)
        }
        Err(e) => return Err(e.into()),
    };
    // Persist the refreshed listings so the document reflects what is shown.
    if let Err(e) = store.save(&user) {
        log::warn!("could not persist refreshed playlists: {e}");
    }

    let player = Player::new(settings.playback.clone());
    let mut app = App::new(user, settings.playback.default_volume);
    app.info = Some(player.info_handle());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &player,
        &store,
        &mpris,
        &control_rx,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
