use crate::library::Track;
use crate::mpris::MprisHandle;
use crate::player::PlaybackInfo;

/// Mirror the playback snapshot into the MPRIS shared state. `session_tracks`
/// is the snapshot the player was loaded with, so indices line up even when
/// the on-screen playlist has changed since.
pub fn update_mpris(mpris: &MprisHandle, info: &PlaybackInfo, session_tracks: &[Track]) {
    let track = info.index.and_then(|i| session_tracks.get(i));
    mpris.set_track_metadata(info.index, track);
    mpris.set_playback(info.state);
}
