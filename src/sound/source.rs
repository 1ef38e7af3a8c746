//! Track resource resolution.
//!
//! Tracks live under a static asset root and follow the `<id>.mp3` naming
//! convention. This module maps track ids to paths and reports which files
//! are present.

use std::path::{Path, PathBuf};

use crate::types::TrackId;

/// A known track and where its file is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEntry {
    /// Track identifier
    pub track: TrackId,
    /// Expected file path
    pub path: PathBuf,
    /// Whether the file currently exists
    pub available: bool,
}

/// Returns the path of `track` under `root`.
#[must_use]
pub fn resolve_track_path(root: &Path, track: TrackId) -> PathBuf {
    root.join(track.file_name())
}

/// Lists every known track with its expected path under `root`.
#[must_use]
pub fn discover_tracks(root: &Path) -> Vec<TrackEntry> {
    TrackId::ALL
        .into_iter()
        .map(|track| {
            let path = resolve_track_path(root, track);
            TrackEntry {
                track,
                available: path.is_file(),
                path,
            }
        })
        .collect()
}
