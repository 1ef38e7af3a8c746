//! Command definitions for the tonewindow CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{
    ActiveWindow, FailurePolicy, PlaybackConfig, PlaybackMode, TrackId, DEFAULT_ASSET_ROOT,
    MAX_TICK_SECS,
};

// ============================================================================
// CLI Structure
// ============================================================================

/// tonewindow - plays a tone or a looping track during a daily time window
#[derive(Parser, Debug)]
#[command(
    name = "tonewindow",
    version,
    about = "決まった時間帯にトーンまたはトラックを再生するCLI",
    long_about = "毎日の指定時間帯にサイン波トーン（通常モード）またはループ再生トラック\n\
                  （スペシャルモード）を鳴らします。強制再生で時間帯外でも再生できます。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive scheduler console
    Run(RunArgs),

    /// Show whether playback would be active at an hour
    Check(CheckArgs),

    /// List the bundled tracks and whether their files exist
    Tracks(TracksArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Shared Arguments
// ============================================================================

/// Active window bounds
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowArgs {
    /// First active hour (0-23)
    #[arg(
        long,
        default_value = "8",
        value_parser = clap::value_parser!(u32).range(0..=23)
    )]
    pub window_start: u32,

    /// Last active hour, inclusive (0-23)
    #[arg(
        long,
        default_value = "14",
        value_parser = clap::value_parser!(u32).range(0..=23)
    )]
    pub window_end: u32,
}

impl WindowArgs {
    /// Converts to an `ActiveWindow`.
    pub fn to_window(self) -> ActiveWindow {
        ActiveWindow::new(self.window_start, self.window_end)
    }
}

impl Default for WindowArgs {
    fn default() -> Self {
        let window = ActiveWindow::default();
        Self {
            window_start: window.start_hour,
            window_end: window.end_hour,
        }
    }
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Tone frequency in Hz (20-20000 recommended, not enforced)
    #[arg(short, long, default_value = "4000")]
    pub frequency: u32,

    /// Initial playback mode
    #[arg(short, long, value_enum, default_value_t = PlaybackMode::Normal)]
    pub mode: PlaybackMode,

    /// Track played in special mode
    #[arg(short, long, value_enum, default_value_t = TrackId::Tiktok)]
    pub track: TrackId,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Directory containing <track>.mp3 files
    #[arg(long, default_value = DEFAULT_ASSET_ROOT)]
    pub assets: PathBuf,

    /// Seconds between schedule checks (1-86400)
    #[arg(
        long,
        default_value = "60",
        value_parser = clap::value_parser!(u64).range(1..=MAX_TICK_SECS)
    )]
    pub tick_secs: u64,

    /// Hide playback failures instead of reporting them
    #[arg(long)]
    pub silent_failures: bool,

    /// Skip the greeting prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            frequency: 4000,
            mode: PlaybackMode::Normal,
            track: TrackId::Tiktok,
            window: WindowArgs::default(),
            assets: PathBuf::from(DEFAULT_ASSET_ROOT),
            tick_secs: 60,
            silent_failures: false,
            yes: false,
        }
    }
}

impl RunArgs {
    /// Builds the scheduler configuration from the arguments.
    pub fn to_config(&self) -> PlaybackConfig {
        let policy = if self.silent_failures {
            FailurePolicy::Silent
        } else {
            FailurePolicy::Report
        };

        PlaybackConfig::default()
            .with_mode(self.mode)
            .with_frequency(self.frequency)
            .with_track(self.track)
            .with_window(self.window.to_window())
            .with_asset_root(self.assets.clone())
            .with_tick_interval_secs(self.tick_secs)
            .with_failure_policy(policy)
    }
}

// ============================================================================
// Check / Tracks Arguments
// ============================================================================

/// Arguments for the check command
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Hour to check (defaults to the current local hour)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
    pub hour: Option<u32>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the tracks command
#[derive(Args, Debug, Clone)]
pub struct TracksArgs {
    /// Directory containing <track>.mp3 files
    #[arg(long, default_value = DEFAULT_ASSET_ROOT)]
    pub assets: PathBuf,
}

// ============================================================================
// Tests
// ============================================================================
