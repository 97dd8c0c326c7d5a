use std::fs::{self, File};
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

/// Route log output to a file; stderr would tear up the alternate screen.
/// Level defaults to `info` and can be overridden with `SEGUE_LOG`.
pub fn init() {
    let Some(path) = log_file_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = File::create(&path) else {
        return;
    };

    let _ = Builder::from_env(Env::default().filter_or("SEGUE_LOG", "info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
}

/// `$XDG_STATE_HOME/segue/segue.log` or `~/.local/state/segue/segue.log`.
fn log_file_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = std::env::var_os("XDG_STATE_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("state")
    } else {
        return None;
    };
    Some(state_home.join("segue").join("segue.log"))
}
