mod handle;
mod session;
mod sink;
mod thread;
mod types;

pub use handle::Player;
pub use session::{Advance, Session};
pub use types::{InfoHandle, PlaybackInfo, PlaybackState, PlayerCmd, PlayerEvent};

#[cfg(test)]
mod tests;
