//! Schedule evaluator.
//!
//! This module provides the time-gated scheduling logic:
//! - Window checks on a recurring tick (tokio::time::interval)
//! - Manual override that freezes automatic transitions
//! - Live configuration changes without restarting the timer
//! - Event firing for the console

use std::rc::Rc;

use anyhow::{ensure, Context, Result};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::sound::PlaybackError;
use crate::types::{
    PlaybackConfig, PlaybackMode, PlaybackState, SourceKind, StatusSnapshot, ToneConfig, TrackId,
};

use super::clock::Clock;
use super::controller::PlaybackController;

// ============================================================================
// Command / PlaybackEvent
// ============================================================================

/// User input fed into the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Greeting acknowledged
    Acknowledge,
    /// Force button: play if stopped, stop if playing
    ToggleOverride,
    /// Switch between normal and special mode
    ToggleMode,
    /// Select a mode explicitly
    SetMode(PlaybackMode),
    /// Change the tone frequency
    SetFrequency(u32),
    /// Change the selected track
    SetTrack(TrackId),
    /// Request a status snapshot
    Status,
    /// Tear down and exit the run loop
    Quit,
}

/// Notifications emitted for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Greeting acknowledged
    Acknowledged,
    /// Sound started
    Started {
        /// Source now playing
        source: SourceKind,
        /// Whether a manual override started it
        overridden: bool,
    },
    /// Sound stopped
    Stopped {
        /// Whether a manual action stopped it
        manual: bool,
    },
    /// Running source replaced after a configuration change
    SourceChanged {
        /// Previous source, if a handle existed
        from: Option<SourceKind>,
        /// New source
        to: SourceKind,
    },
    /// Override flag changed
    OverrideChanged {
        /// New value
        overridden: bool,
    },
    /// Mode changed
    ModeChanged {
        /// New mode
        mode: PlaybackMode,
    },
    /// Tone frequency changed
    FrequencyChanged {
        /// New frequency
        frequency_hz: u32,
    },
    /// Track selection changed
    TrackChanged {
        /// New track
        track: TrackId,
    },
    /// Playback could not be started
    Fault {
        /// The surfaced error
        error: PlaybackError,
    },
    /// Status snapshot
    Status(StatusSnapshot),
}

// ============================================================================
// ScheduleEvaluator
// ============================================================================

/// Decides when sound plays, based on the local hour and the override flag.
pub struct ScheduleEvaluator {
    /// Live configuration, re-read on every evaluation
    config: PlaybackConfig,
    /// Playback controller
    controller: PlaybackController,
    /// Hour source
    clock: Rc<dyn Clock>,
    /// Whether automatic transitions are suspended
    overridden: bool,
    /// Whether the greeting has been acknowledged
    acknowledged: bool,
    /// Last surfaced fault
    last_fault: Option<PlaybackError>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl ScheduleEvaluator {
    /// Creates an evaluator with the given configuration, controller and clock.
    pub fn new(
        config: PlaybackConfig,
        controller: PlaybackController,
        clock: Rc<dyn Clock>,
        event_tx: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> Self {
        Self {
            config,
            controller,
            clock,
            overridden: false,
            acknowledged: false,
            last_fault: None,
            event_tx,
        }
    }

    /// Starts with the greeting already acknowledged.
    #[must_use]
    pub fn with_acknowledged(mut self, acknowledged: bool) -> Self {
        self.acknowledged = acknowledged;
        self
    }

    /// Runs the scheduling loop until `Command::Quit` or the command channel closes.
    ///
    /// Evaluates once immediately, then on every tick. Always tears down
    /// before returning.
    pub async fn run(&mut self, mut commands: mpsc::UnboundedReceiver<Command>) -> Result<()> {
        let result = self.run_loop(&mut commands).await;
        self.teardown();
        result
    }

    async fn run_loop(&mut self, commands: &mut mpsc::UnboundedReceiver<Command>) -> Result<()> {
        self.evaluate()?;

        let period = self.config.tick_interval();
        ensure!(!period.is_zero(), "Tick interval must be non-zero");
        let first_tick = Instant::now()
            .checked_add(period)
            .context("Tick interval is too large")?;
        let mut ticker = interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.evaluate()?;
                }
                command = commands.recv() => match command {
                    Some(Command::Quit) | None => return Ok(()),
                    Some(command) => self.handle(command)?,
                },
            }
        }
    }

    /// Applies one command.
    ///
    /// `Command::Quit` tears down playback; the run loop exits on it.
    pub fn handle(&mut self, command: Command) -> Result<()> {
        debug!("Handling command: {:?}", command);
        match command {
            Command::Acknowledge => self.acknowledge(),
            Command::ToggleOverride => self.toggle_override(),
            Command::ToggleMode => self.toggle_mode(),
            Command::SetMode(mode) => self.set_mode(mode),
            Command::SetFrequency(hz) => self.set_frequency(hz),
            Command::SetTrack(track) => self.set_track(track),
            Command::Status => self.emit(PlaybackEvent::Status(self.snapshot())),
            Command::Quit => {
                self.teardown();
                Ok(())
            }
        }
    }

    /// Checks the window and starts or stops playback to match it.
    ///
    /// Does nothing while overridden.
    pub fn evaluate(&mut self) -> Result<()> {
        if self.overridden {
            debug!("Override active, skipping evaluation");
            return Ok(());
        }

        let hour = self.clock.current_hour();
        let should_play = self.config.window.contains(hour);
        debug!(
            "Evaluating: hour={} window={} should_play={} active={}",
            hour,
            self.config.window.label(),
            should_play,
            self.controller.is_active()
        );

        match (should_play, self.controller.is_active()) {
            (true, false) => self.start_playback(),
            (false, true) => self.stop_playback(false),
            _ => Ok(()),
        }
    }

    /// Marks the greeting acknowledged and re-evaluates immediately.
    pub fn acknowledge(&mut self) -> Result<()> {
        if !self.acknowledged {
            self.acknowledged = true;
            self.emit(PlaybackEvent::Acknowledged)?;
        }
        self.evaluate()?;
        self.emit(PlaybackEvent::Status(self.snapshot()))
    }

    /// Starts playback regardless of the window and suspends automatic transitions.
    ///
    /// If the start fails the override is cleared again, so the schedule
    /// keeps retrying on later ticks.
    pub fn force_play(&mut self) -> Result<()> {
        self.set_overridden(true)?;
        if !self.controller.is_active() {
            self.start_playback()?;
            if !self.controller.is_active() {
                self.set_overridden(false)?;
            }
        }
        Ok(())
    }

    /// Stops playback and resumes automatic transitions.
    pub fn force_stop(&mut self) -> Result<()> {
        self.set_overridden(false)?;
        if self.controller.is_active() {
            self.stop_playback(true)?;
        }
        Ok(())
    }

    /// Force button: stops if playing, otherwise forces playback.
    pub fn toggle_override(&mut self) -> Result<()> {
        if self.controller.is_active() {
            self.force_stop()
        } else {
            self.force_play()
        }
    }

    /// Switches between normal and special mode.
    pub fn toggle_mode(&mut self) -> Result<()> {
        self.set_mode(self.config.mode.toggled())
    }

    /// Selects a mode; a running source is swapped to the new backend.
    pub fn set_mode(&mut self, mode: PlaybackMode) -> Result<()> {
        self.config.mode = mode;
        info!("Mode set to {}", mode);
        self.emit(PlaybackEvent::ModeChanged { mode })?;
        self.apply_config()
    }

    /// Changes the tone frequency; values outside 20-20000 Hz are accepted.
    pub fn set_frequency(&mut self, frequency_hz: u32) -> Result<()> {
        let tone = ToneConfig::new(frequency_hz);
        if !tone.is_in_nominal_range() {
            warn!("Frequency {} Hz is outside the nominal 20-20000 Hz range", frequency_hz);
        }
        self.config.tone = tone;
        self.emit(PlaybackEvent::FrequencyChanged { frequency_hz })?;
        self.apply_config()
    }

    /// Changes the selected track.
    pub fn set_track(&mut self, track: TrackId) -> Result<()> {
        self.config.track.track = track;
        self.emit(PlaybackEvent::TrackChanged { track })?;
        self.apply_config()
    }

    /// Stops any active sound unconditionally.
    ///
    /// Events are best-effort here since the console may already be gone.
    pub fn teardown(&mut self) {
        if self.controller.stop() {
            let _ = self.event_tx.send(PlaybackEvent::Stopped { manual: true });
        }
        debug!("Scheduler torn down");
    }

    /// Returns the scheduler-visible playback state.
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            active: self.controller.is_active(),
            overridden: self.overridden,
        }
    }

    /// Returns a snapshot for display.
    pub fn snapshot(&self) -> StatusSnapshot {
        let hour = self.clock.current_hour();
        StatusSnapshot {
            mode: self.config.mode,
            frequency_hz: self.config.tone.frequency_hz,
            track: self.config.track.track,
            window: self.config.window.label(),
            hour,
            in_window: self.config.window.contains(hour),
            state: self.state(),
            acknowledged: self.acknowledged,
            fault: self.last_fault.as_ref().map(ToString::to_string),
        }
    }

    /// Returns the live configuration.
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Returns the playback controller.
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// Returns the last surfaced fault.
    pub fn last_fault(&self) -> Option<&PlaybackError> {
        self.last_fault.as_ref()
    }

    /// Returns true if the greeting has been acknowledged.
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    fn start_playback(&mut self) -> Result<()> {
        match self.controller.start(&self.config) {
            Ok(()) => {
                self.last_fault = None;
                self.emit(PlaybackEvent::Started {
                    source: self.config.source(),
                    overridden: self.overridden,
                })
            }
            Err(err) => self.report_fault(err),
        }
    }

    fn stop_playback(&mut self, manual: bool) -> Result<()> {
        if self.controller.stop() {
            self.emit(PlaybackEvent::Stopped { manual })?;
        }
        Ok(())
    }

    fn apply_config(&mut self) -> Result<()> {
        let from = self.controller.current_source();
        match self.controller.apply(&self.config) {
            Ok(true) => self.emit(PlaybackEvent::SourceChanged {
                from,
                to: self.config.source(),
            }),
            Ok(false) => Ok(()),
            Err(err) => {
                self.emit(PlaybackEvent::Stopped { manual: false })?;
                self.report_fault(err)
            }
        }
    }

    fn set_overridden(&mut self, overridden: bool) -> Result<()> {
        if self.overridden != overridden {
            self.overridden = overridden;
            info!("Override {}", if overridden { "enabled" } else { "cleared" });
            self.emit(PlaybackEvent::OverrideChanged { overridden })?;
        }
        Ok(())
    }

    /// Records a fault; repeats of the same fault are not re-emitted.
    fn report_fault(&mut self, error: PlaybackError) -> Result<()> {
        warn!("Playback failed: {}", error);
        if self.last_fault.as_ref() == Some(&error) {
            return Ok(());
        }
        self.last_fault = Some(error.clone());
        self.emit(PlaybackEvent::Fault { error })
    }

    fn emit(&self, event: PlaybackEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .context("Failed to send playback event")
    }
}

impl std::fmt::Debug for ScheduleEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleEvaluator")
            .field("config", &self.config)
            .field("controller", &self.controller)
            .field("overridden", &self.overridden)
            .field("acknowledged", &self.acknowledged)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
