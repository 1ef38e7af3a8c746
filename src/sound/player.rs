//! Audio backend implementation using rodio.
//!
//! `RodioAudioBackend` serves both the tone and the track backend. The output
//! stream is opened on first use and kept for the lifetime of the backend.

use std::cell::{Cell, OnceCell};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::source::SineWave;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use crate::types::{SourceKind, TrackId};

use super::error::PlaybackError;
use super::handle::ActiveHandle;
use super::source::resolve_track_path;

/// rodio-backed tone generator and looping track player.
///
/// The output stream is not `Send`; the backend lives on the scheduler's
/// thread.
pub struct RodioAudioBackend {
    /// Lazily opened output stream and its handle.
    output: OnceCell<(OutputStream, OutputStreamHandle)>,
    /// Directory containing `<track>.mp3` files.
    asset_root: PathBuf,
    /// Next handle id.
    next_id: Cell<u64>,
}

impl RodioAudioBackend {
    /// Creates a backend reading tracks from `asset_root`.
    ///
    /// No audio device is touched until the first source is started.
    #[must_use]
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            output: OnceCell::new(),
            asset_root: asset_root.into(),
            next_id: Cell::new(1),
        }
    }

    /// Returns the asset directory.
    #[must_use]
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Returns true once the output stream has been opened.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.output.get().is_some()
    }

    /// Starts an endless sine tone.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::ResourceUnavailable` if no output device or
    /// sink can be acquired.
    pub fn start_tone(&self, frequency_hz: u32) -> Result<ActiveHandle, PlaybackError> {
        let sink = self.new_sink()?;
        sink.append(SineWave::new(frequency_hz as f32));

        let handle = ActiveHandle::new(self.next_id(), SourceKind::Tone { frequency_hz })
            .with_sink(sink);
        debug!("Tone started: {} Hz (handle {})", frequency_hz, handle.id());
        Ok(handle)
    }

    /// Starts looping playback of a track file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, cannot be
    /// decoded, or no output is available.
    pub fn start_track(&self, track: TrackId) -> Result<ActiveHandle, PlaybackError> {
        let path = resolve_track_path(&self.asset_root, track);

        let file = File::open(&path).map_err(|e| PlaybackError::from_io(path.display(), &e))?;
        let decoder = Decoder::new_looped(BufReader::new(file)).map_err(|e| {
            PlaybackError::UnsupportedFormat(format!("{}: {}", path.display(), e))
        })?;

        let sink = self.new_sink()?;
        sink.append(decoder);

        let handle = ActiveHandle::new(self.next_id(), SourceKind::Track { track }).with_sink(sink);
        debug!("Track started: {} (handle {})", path.display(), handle.id());
        Ok(handle)
    }

    /// Stops and releases a handle.
    pub fn release(&self, handle: ActiveHandle) {
        debug!("Releasing handle {} ({})", handle.id(), handle.source());
        handle.release();
    }

    /// Creates a sink on the shared output stream, opening it if needed.
    fn new_sink(&self) -> Result<Sink, PlaybackError> {
        let stream_handle = self.stream_handle()?;
        Sink::try_new(stream_handle).map_err(|e| PlaybackError::ResourceUnavailable(e.to_string()))
    }

    fn stream_handle(&self) -> Result<&OutputStreamHandle, PlaybackError> {
        if self.output.get().is_none() {
            let output = OutputStream::try_default().map_err(|e| {
                warn!("Audio output unavailable: {}", e);
                PlaybackError::ResourceUnavailable(e.to_string())
            })?;
            debug!("Audio output stream initialized");
            let _ = self.output.set(output);
        }

        self.output
            .get()
            .map(|(_, handle)| handle)
            .ok_or_else(|| PlaybackError::ResourceUnavailable("output stream".to_string()))
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl std::fmt::Debug for RodioAudioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioAudioBackend")
            .field("asset_root", &self.asset_root)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
