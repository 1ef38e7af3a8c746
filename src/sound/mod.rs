//! Sound playback backends.
//!
//! This module provides the two playback backends the scheduler drives:
//!
//! - A tone backend producing an endless sine wave
//! - A track backend looping one of the bundled MP3 files
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  PlaybackController  │
//! └─────┬──────────┬─────┘
//!       │          │
//!       ▼          ▼
//! ┌───────────┐ ┌────────────┐     ┌──────────────────┐
//! │ToneBackend│ │TrackBackend│────▶│ <root>/<id>.mp3  │
//! └─────┬─────┘ └─────┬──────┘     └──────────────────┘
//!       └──────┬──────┘
//!              ▼
//!   ┌────────────────────┐
//!   │ RodioAudioBackend  │ ← one lazily opened output stream
//!   └────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use tonewindow::sound::{RodioAudioBackend, ToneBackend};
//!
//! let backend = RodioAudioBackend::new("public");
//! let handle = ToneBackend::start(&backend, 4000).expect("tone");
//! ToneBackend::stop(&backend, handle);
//! ```

mod error;
mod handle;
mod player;
mod source;

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

pub use error::PlaybackError;
pub use handle::ActiveHandle;
pub use player::RodioAudioBackend;
pub use source::{discover_tracks, resolve_track_path, TrackEntry};

use crate::types::{SourceKind, TrackId};

/// Synthesized tone playback.
pub trait ToneBackend {
    /// Starts a continuous sine wave at `frequency_hz`.
    ///
    /// # Errors
    ///
    /// Returns an error if the audio output cannot be acquired.
    fn start(&self, frequency_hz: u32) -> Result<ActiveHandle, PlaybackError>;

    /// Halts and releases a handle returned by `start`.
    fn stop(&self, handle: ActiveHandle);
}

/// Looping track playback.
pub trait TrackBackend {
    /// Resolves `track` and starts looping it.
    ///
    /// # Errors
    ///
    /// Returns an error if the track cannot be opened, decoded or played.
    fn start(&self, track: TrackId) -> Result<ActiveHandle, PlaybackError>;

    /// Stops and releases a handle returned by `start`.
    fn stop(&self, handle: ActiveHandle);
}

impl ToneBackend for RodioAudioBackend {
    fn start(&self, frequency_hz: u32) -> Result<ActiveHandle, PlaybackError> {
        self.start_tone(frequency_hz)
    }

    fn stop(&self, handle: ActiveHandle) {
        self.release(handle)
    }
}

impl TrackBackend for RodioAudioBackend {
    fn start(&self, track: TrackId) -> Result<ActiveHandle, PlaybackError> {
        self.start_track(track)
    }

    fn stop(&self, handle: ActiveHandle) {
        self.release(handle)
    }
}

/// Calls observed by `MockAudioBackend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    /// A source was started and received this handle id
    Start { id: u64, source: SourceKind },
    /// A handle was stopped
    Stop { id: u64, source: SourceKind },
}

/// Mock audio backend for testing.
///
/// Tracks live handles so tests can assert that no more than one source ever
/// plays at a time.
#[derive(Debug, Default)]
pub struct MockAudioBackend {
    calls: Mutex<Vec<BackendCall>>,
    next_id: AtomicU64,
    live: AtomicUsize,
    max_live: AtomicUsize,
    tone_failure: Mutex<Option<PlaybackError>>,
    track_failure: Mutex<Option<PlaybackError>>,
}

impl MockAudioBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent tone start fail with `error` (or succeed on `None`).
    pub fn set_tone_failure(&self, error: Option<PlaybackError>) {
        *self.tone_failure.lock().unwrap() = error;
    }

    /// Makes every subsequent track start fail with `error` (or succeed on `None`).
    pub fn set_track_failure(&self, error: Option<PlaybackError>) {
        *self.track_failure.lock().unwrap() = error;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the sources started so far, in order.
    #[must_use]
    pub fn started(&self) -> Vec<SourceKind> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Start { source, .. } => Some(source),
                BackendCall::Stop { .. } => None,
            })
            .collect()
    }

    #[must_use]
    pub fn start_count(&self) -> usize {
        self.started().len()
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::Stop { .. }))
            .count()
    }

    /// Number of handles started and not yet stopped.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live handles observed.
    #[must_use]
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record_start(
        &self,
        source: SourceKind,
        failure: &Mutex<Option<PlaybackError>>,
    ) -> Result<ActiveHandle, PlaybackError> {
        if let Some(err) = failure.lock().unwrap().clone() {
            return Err(err);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Start { id, source });
        Ok(ActiveHandle::new(id, source))
    }

    fn record_stop(&self, handle: ActiveHandle) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(BackendCall::Stop {
            id: handle.id(),
            source: handle.source(),
        });
        handle.release();
    }
}

impl ToneBackend for MockAudioBackend {
    fn start(&self, frequency_hz: u32) -> Result<ActiveHandle, PlaybackError> {
        self.record_start(SourceKind::Tone { frequency_hz }, &self.tone_failure)
    }

    fn stop(&self, handle: ActiveHandle) {
        self.record_stop(handle)
    }
}

impl TrackBackend for MockAudioBackend {
    fn start(&self, track: TrackId) -> Result<ActiveHandle, PlaybackError> {
        self.record_start(SourceKind::Track { track }, &self.track_failure)
    }

    fn stop(&self, handle: ActiveHandle) {
        self.record_stop(handle)
    }
}
