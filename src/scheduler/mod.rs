//! Scheduler module for tonewindow.
//!
//! This module contains the playback core:
//! - `clock`: local-hour sources
//! - `controller`: single-handle playback controller
//! - `evaluator`: window checks, overrides and the tick loop

pub mod clock;
pub mod controller;
pub mod evaluator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use controller::PlaybackController;
pub use evaluator::{Command, PlaybackEvent, ScheduleEvaluator};
