//! tonewindow library
//!
//! Plays a sine tone or a looping track during a daily window of local hours.
//! It includes:
//! - Tone and track playback backends built on rodio
//! - A playback controller that keeps at most one source running
//! - A schedule evaluator with manual override and live configuration
//! - CLI command parsing, console input and display utilities
//! - Type definitions for configuration and state

pub mod cli;
pub mod scheduler;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    ActiveWindow, FailurePolicy, PlaybackConfig, PlaybackMode, PlaybackState, ScheduleCheck,
    SourceKind, StatusSnapshot, TrackId,
};

// Re-export scheduler types
pub use scheduler::{
    Clock, Command, FixedClock, PlaybackController, PlaybackEvent, ScheduleEvaluator, SystemClock,
};

// Re-export sound types
pub use sound::{
    discover_tracks, ActiveHandle, BackendCall, MockAudioBackend, PlaybackError,
    RodioAudioBackend, ToneBackend, TrackBackend, TrackEntry,
};
