//! Core data types for tonewindow.
//!
//! This module defines the data structures used for:
//! - Playback mode and source selection
//! - The daily active window
//! - Playback configuration with validation
//! - Playback state and status snapshots

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// ============================================================================
// PlaybackMode
// ============================================================================

/// Selects which backend produces sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Synthesized sine tone
    #[default]
    Normal,
    /// Looping audio track
    Special,
}

impl PlaybackMode {
    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackMode::Normal => "normal",
            PlaybackMode::Special => "special",
        }
    }

    /// Returns the other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            PlaybackMode::Normal => PlaybackMode::Special,
            PlaybackMode::Special => PlaybackMode::Normal,
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ToneConfig
// ============================================================================

/// Lowest frequency offered by the frequency control.
pub const MIN_FREQUENCY_HZ: u32 = 20;

/// Highest frequency offered by the frequency control.
pub const MAX_FREQUENCY_HZ: u32 = 20_000;

/// Frequency used until the user picks another one.
pub const DEFAULT_FREQUENCY_HZ: u32 = 4000;

/// Settings for the tone backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneConfig {
    /// Sine frequency in hertz (nominally 20-20000, not enforced)
    pub frequency_hz: u32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
        }
    }
}

impl ToneConfig {
    /// Creates a tone configuration for the given frequency.
    pub fn new(frequency_hz: u32) -> Self {
        Self { frequency_hz }
    }

    /// Returns true if the frequency is inside the nominal audible range.
    pub fn is_in_nominal_range(&self) -> bool {
        (MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&self.frequency_hz)
    }
}

// ============================================================================
// TrackId / TrackConfig
// ============================================================================

/// One of the fixed set of bundled tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrackId {
    #[default]
    Tiktok,
    Heihei,
}

impl TrackId {
    /// Every known track, in display order.
    pub const ALL: [TrackId; 2] = [TrackId::Tiktok, TrackId::Heihei];

    /// Returns the identifier used in file names and commands.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackId::Tiktok => "tiktok",
            TrackId::Heihei => "heihei",
        }
    }

    /// Returns the human-readable label shown in the console.
    pub fn label(&self) -> &'static str {
        match self {
            TrackId::Tiktok => "Tik ToK",
            TrackId::Heihei => "Hei Hei",
        }
    }

    /// Returns the asset file name (`<id>.mp3`).
    pub fn file_name(&self) -> String {
        format!("{}.mp3", self.as_str())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("不明なトラックです: {} (tiktok / heihei)", s.trim()))
    }
}

/// Settings for the track backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Selected track
    pub track: TrackId,
}

// ============================================================================
// SourceKind
// ============================================================================

/// What a running playback handle is producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// Sine tone at a frequency
    Tone { frequency_hz: u32 },
    /// Looping track
    Track { track: TrackId },
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Tone { frequency_hz } => write!(f, "{} Hz", frequency_hz),
            SourceKind::Track { track } => write!(f, "{}", track.label()),
        }
    }
}

// ============================================================================
// ActiveWindow
// ============================================================================

/// Inclusive range of local hours during which playback is scheduled.
///
/// `start_hour > end_hour` describes a window that wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    /// First active hour (0-23)
    pub start_hour: u32,
    /// Last active hour (0-23), inclusive
    pub end_hour: u32,
}

impl Default for ActiveWindow {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 14,
        }
    }
}

impl ActiveWindow {
    /// Creates a window covering `start_hour..=end_hour`.
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// Returns true if the given local hour falls inside the window.
    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour <= self.end_hour
        } else {
            hour >= self.start_hour || hour <= self.end_hour
        }
    }

    /// Returns the label shown under the status line, e.g. `08:00 - 14:59`.
    pub fn label(&self) -> String {
        format!("{:02}:00 - {:02}:59", self.start_hour, self.end_hour)
    }

    /// Validates the window bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.start_hour > 23 || self.end_hour > 23 {
            return Err("時間帯は0-23時の範囲で指定してください".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// FailurePolicy
// ============================================================================

/// How playback faults reach the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep the state inactive and surface the fault
    #[default]
    Report,
    /// Log the fault and behave as if playback started
    Silent,
}

// ============================================================================
// PlaybackConfig
// ============================================================================

/// Default directory holding `<track>.mp3` files.
pub const DEFAULT_ASSET_ROOT: &str = "public";

/// Default schedule evaluation period in seconds.
pub const DEFAULT_TICK_SECS: u64 = 60;

/// Longest accepted evaluation period (one day).
pub const MAX_TICK_SECS: u64 = 86_400;

/// Complete configuration read by the scheduler on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Which backend to use
    pub mode: PlaybackMode,
    /// Tone backend settings
    pub tone: ToneConfig,
    /// Track backend settings
    pub track: TrackConfig,
    /// Daily active window
    pub window: ActiveWindow,
    /// Directory containing track files
    pub asset_root: PathBuf,
    /// Seconds between schedule evaluations
    pub tick_interval_secs: u64,
    /// Fault handling policy
    pub failure_policy: FailurePolicy,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::default(),
            tone: ToneConfig::default(),
            track: TrackConfig::default(),
            window: ActiveWindow::default(),
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            tick_interval_secs: DEFAULT_TICK_SECS,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl PlaybackConfig {
    /// Sets the playback mode.
    pub fn with_mode(mut self, mode: PlaybackMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the tone frequency.
    pub fn with_frequency(mut self, frequency_hz: u32) -> Self {
        self.tone.frequency_hz = frequency_hz;
        self
    }

    /// Sets the selected track.
    pub fn with_track(mut self, track: TrackId) -> Self {
        self.track.track = track;
        self
    }

    /// Sets the active window.
    pub fn with_window(mut self, window: ActiveWindow) -> Self {
        self.window = window;
        self
    }

    /// Sets the asset directory.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Sets the evaluation period in seconds.
    pub fn with_tick_interval_secs(mut self, secs: u64) -> Self {
        self.tick_interval_secs = secs;
        self
    }

    /// Sets the fault handling policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Returns the source the current mode would play.
    pub fn source(&self) -> SourceKind {
        match self.mode {
            PlaybackMode::Normal => SourceKind::Tone {
                frequency_hz: self.tone.frequency_hz,
            },
            PlaybackMode::Special => SourceKind::Track {
                track: self.track.track,
            },
        }
    }

    /// Returns the evaluation period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails. An out-of-range
    /// frequency is not an error.
    pub fn validate(&self) -> Result<(), String> {
        self.window.validate()?;
        if !(1..=MAX_TICK_SECS).contains(&self.tick_interval_secs) {
            return Err(format!(
                "チェック間隔は1-{}秒の範囲で指定してください",
                MAX_TICK_SECS
            ));
        }
        Ok(())
    }
}

// ============================================================================
// PlaybackState
// ============================================================================

/// Scheduler-visible playback state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Whether a sound source is running
    pub active: bool,
    /// Whether automatic transitions are suspended by a manual override
    pub overridden: bool,
}

// ============================================================================
// StatusSnapshot
// ============================================================================

/// Point-in-time view of the scheduler, for display and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Current mode
    pub mode: PlaybackMode,
    /// Configured tone frequency
    #[serde(rename = "frequencyHz")]
    pub frequency_hz: u32,
    /// Configured track
    pub track: TrackId,
    /// Window label
    pub window: String,
    /// Local hour at the time of the snapshot
    pub hour: u32,
    /// Whether the hour is inside the window
    #[serde(rename = "inWindow")]
    pub in_window: bool,
    /// Playback state
    #[serde(flatten)]
    pub state: PlaybackState,
    /// Whether the greeting has been acknowledged
    pub acknowledged: bool,
    /// Last surfaced fault, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

// ============================================================================
// ScheduleCheck
// ============================================================================

/// Whether scheduled playback would be active at a given hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleCheck {
    pub hour: u32,
    pub window: String,
    pub active: bool,
}

impl ScheduleCheck {
    /// Evaluates `window` at `hour`.
    pub fn evaluate(window: &ActiveWindow, hour: u32) -> Self {
        Self {
            hour,
            window: window.label(),
            active: window.contains(hour),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
