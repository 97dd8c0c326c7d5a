use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use lofty::tag::ItemKey;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Track, total_duration};

/// Result of reconciling a playlist folder against its known track list.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub tracks: Vec<Track>,
    pub duration: Duration,
}

#[derive(Debug)]
pub enum ScanError {
    /// The scan target is missing or unreadable; the caller must leave the
    /// playlist unchanged.
    FolderUnavailable(PathBuf),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::FolderUnavailable(p) => {
                write!(f, "folder missing or unreadable: {}", p.display())
            }
        }
    }
}

impl Error for ScanError {}

/// Per-file metadata read failure. Scanning logs these and moves on; they
/// never abort the batch.
#[derive(Debug)]
pub struct MetadataError {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read metadata for {}: {}", self.path.display(), self.reason)
    }
}

impl Error for MetadataError {}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Read title/artist/duration from an audio file. Missing title falls back
/// to the file stem, missing artist to "Unknown".
fn read_track(path: &Path) -> Result<Track, MetadataError> {
    let tagged = lofty::read_from_path(path).map_err(|e| MetadataError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string();

    let mut title = stem;
    let mut artist = "Unknown".to_string();
    let duration = tagged.properties().duration();

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
            if !v.trim().is_empty() {
                title = v.to_string();
            }
        }
        if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
            let v = v.trim();
            if !v.is_empty() {
                artist = v.to_string();
            }
        }
    }

    Ok(Track {
        title,
        artist,
        duration,
        file_path: path.to_path_buf(),
    })
}

/// List the audio files directly inside `folder` (non-recursive), in the
/// order the filesystem enumerates them.
fn list_audio_files(folder: &Path, settings: &LibrarySettings) -> Result<Vec<PathBuf>, ScanError> {
    if !folder.is_dir() {
        return Err(ScanError::FolderUnavailable(folder.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(settings.follow_links)
    {
        let entry = match entry {
            Ok(e) => e,
            // Depth 0 means the folder itself could not be read.
            Err(err) if err.depth() == 0 => {
                return Err(ScanError::FolderUnavailable(folder.to_path_buf()));
            }
            Err(err) => {
                log::warn!("skipping unreadable entry in {}: {err}", folder.display());
                continue;
            }
        };

        let path = entry.path();
        if path.is_file() && is_audio_file(path, settings) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Reconcile `folder`'s current audio files against `known` tracks.
///
/// Known tracks (matched by exact `file_path`) keep their entry and position;
/// their metadata is not re-read. Newly discovered files are appended at the
/// end in enumeration order. Files that vanished from disk are kept unless
/// `settings.prune_missing` is set. The returned duration is a fresh sum over
/// the result.
///
/// Pure with respect to the stored playlist: applying the outcome is the
/// caller's job, so a failed scan leaves everything untouched.
pub fn reconcile(
    folder: &Path,
    known: &[Track],
    settings: &LibrarySettings,
) -> Result<ScanOutcome, ScanError> {
    let on_disk = list_audio_files(folder, settings)?;
    Ok(reconcile_files(&on_disk, known, settings.prune_missing, read_track))
}

/// Core of [`reconcile`], split from the filesystem listing so the merge
/// logic can be exercised with a stub metadata reader.
fn reconcile_files(
    on_disk: &[PathBuf],
    known: &[Track],
    prune_missing: bool,
    read: impl Fn(&Path) -> Result<Track, MetadataError>,
) -> ScanOutcome {
    let mut tracks: Vec<Track> = known.to_vec();

    if prune_missing {
        let present: HashSet<&Path> = on_disk.iter().map(PathBuf::as_path).collect();
        tracks.retain(|t| present.contains(t.file_path.as_path()));
    }

    let existing: HashSet<&Path> = tracks.iter().map(|t| t.file_path.as_path()).collect();
    let mut added: Vec<Track> = Vec::new();

    for path in on_disk {
        if existing.contains(path.as_path()) {
            continue;
        }
        match read(path) {
            Ok(track) => {
                log::info!("discovered track: {}", track.title);
                added.push(track);
            }
            Err(err) => log::warn!("{err}"),
        }
    }

    tracks.extend(added);
    let duration = total_duration(&tracks);
    ScanOutcome { tracks, duration }
}
