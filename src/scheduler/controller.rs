//! Playback controller.
//!
//! Owns the single active handle and routes start/stop to the backend that
//! matches the configured mode.

use std::rc::Rc;

use tracing::{debug, info};

use crate::sound::{ActiveHandle, PlaybackError, ToneBackend, TrackBackend};
use crate::types::{FailurePolicy, PlaybackConfig, SourceKind};

// ============================================================================
// PlaybackController
// ============================================================================

/// Starts and stops sound, holding at most one `ActiveHandle`.
pub struct PlaybackController {
    tone: Rc<dyn ToneBackend>,
    track: Rc<dyn TrackBackend>,
    /// Handle of the running source, if any
    handle: Option<ActiveHandle>,
    /// Whether playback is considered running
    active: bool,
}

impl PlaybackController {
    /// Creates an inactive controller over the given backends.
    pub fn new(tone: Rc<dyn ToneBackend>, track: Rc<dyn TrackBackend>) -> Self {
        Self {
            tone,
            track,
            handle: None,
            active: false,
        }
    }

    /// Starts the source selected by `config`.
    ///
    /// Any existing handle is released first, so two sources never overlap.
    ///
    /// # Errors
    ///
    /// Returns the backend error under `FailurePolicy::Report`; the
    /// controller is then inactive. Under `FailurePolicy::Silent` the error
    /// is logged and the controller reports active with no handle.
    pub fn start(&mut self, config: &PlaybackConfig) -> Result<(), PlaybackError> {
        self.release_handle();

        let source = config.source();
        let result = match source {
            SourceKind::Tone { frequency_hz } => self.tone.start(frequency_hz),
            SourceKind::Track { track } => self.track.start(track),
        };

        match result {
            Ok(handle) => {
                info!("Playback started: {} (handle {})", source, handle.id());
                self.handle = Some(handle);
                self.active = true;
                Ok(())
            }
            Err(err) => match config.failure_policy {
                FailurePolicy::Report => {
                    self.active = false;
                    Err(err)
                }
                FailurePolicy::Silent => {
                    debug!("Playback of {} failed silently: {}", source, err);
                    self.active = true;
                    Ok(())
                }
            },
        }
    }

    /// Stops playback.
    ///
    /// Returns false (and does nothing) if already inactive.
    pub fn stop(&mut self) -> bool {
        if !self.active {
            return false;
        }

        self.release_handle();
        self.active = false;
        info!("Playback stopped");
        true
    }

    /// Switches the running source to the one selected by `config`.
    ///
    /// Performs one stop followed by one start when active and the source
    /// differs. Returns true if a switch happened.
    ///
    /// # Errors
    ///
    /// Propagates a start failure from `start`.
    pub fn apply(&mut self, config: &PlaybackConfig) -> Result<bool, PlaybackError> {
        if !self.active || self.current_source() == Some(config.source()) {
            return Ok(false);
        }

        self.stop();
        self.start(config)?;
        Ok(true)
    }

    /// Returns true if playback is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the id of the running handle.
    pub fn handle_id(&self) -> Option<u64> {
        self.handle.as_ref().map(ActiveHandle::id)
    }

    /// Returns what the running handle is playing.
    pub fn current_source(&self) -> Option<SourceKind> {
        self.handle.as_ref().map(ActiveHandle::source)
    }

    fn release_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            match handle.source() {
                SourceKind::Tone { .. } => self.tone.stop(handle),
                SourceKind::Track { .. } => self.track.stop(handle),
            }
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("handle", &self.handle)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::{BackendCall, MockAudioBackend};
    use crate::types::{PlaybackMode, TrackId};

    fn create_controller() -> (PlaybackController, Rc<MockAudioBackend>) {
        let mock = Rc::new(MockAudioBackend::new());
        let controller = PlaybackController::new(mock.clone(), mock.clone());
        (controller, mock)
    }

    mod start_stop_tests {
        use super::*;

        #[test]
        fn test_new_is_inactive() {
            let (controller, mock) = create_controller();
            assert!(!controller.is_active());
            assert!(controller.handle_id().is_none());
            assert_eq!(mock.start_count(), 0);
        }

        #[test]
        fn test_start_normal_uses_tone() {
            let (mut controller, mock) = create_controller();
            let config = PlaybackConfig::default().with_frequency(440);

            controller.start(&config).unwrap();

            assert!(controller.is_active());
            assert_eq!(
                controller.current_source(),
                Some(SourceKind::Tone { frequency_hz: 440 })
            );
            assert_eq!(mock.started(), vec![SourceKind::Tone { frequency_hz: 440 }]);
        }

        #[test]
        fn test_start_special_uses_track() {
            let (mut controller, mock) = create_controller();
            let config = PlaybackConfig::default()
                .with_mode(PlaybackMode::Special)
                .with_track(TrackId::Heihei);

            controller.start(&config).unwrap();

            assert_eq!(
                mock.started(),
                vec![SourceKind::Track {
                    track: TrackId::Heihei
                }]
            );
        }

        #[test]
        fn test_start_while_active_releases_previous() {
            let (mut controller, mock) = create_controller();
            let config = PlaybackConfig::default();

            controller.start(&config).unwrap();
            controller.start(&config).unwrap();

            assert_eq!(mock.live_count(), 1);
            assert_eq!(mock.max_live(), 1);
            assert_eq!(mock.stop_count(), 1);
        }

        #[test]
        fn test_stop_releases_handle() {
            let (mut controller, mock) = create_controller();
            controller.start(&PlaybackConfig::default()).unwrap();

            assert!(controller.stop());

            assert!(!controller.is_active());
            assert!(controller.handle_id().is_none());
            assert_eq!(mock.live_count(), 0);
        }

        #[test]
        fn test_stop_twice_is_noop() {
            let (mut controller, mock) = create_controller();
            controller.start(&PlaybackConfig::default()).unwrap();

            assert!(controller.stop());
            let calls_after_first = mock.calls();
            assert!(!controller.stop());

            assert_eq!(mock.calls(), calls_after_first);
            assert!(!controller.is_active());
        }

        #[test]
        fn test_stop_when_never_started() {
            let (mut controller, mock) = create_controller();
            assert!(!controller.stop());
            assert_eq!(mock.stop_count(), 0);
        }

        #[test]
        fn test_stop_releases_through_tone_backend() {
            let (mut controller, mock) = create_controller();
            controller.start(&PlaybackConfig::default()).unwrap();

            controller.stop();

            match mock.calls().last() {
                Some(BackendCall::Stop { source, .. }) => {
                    assert_eq!(*source, SourceKind::Tone { frequency_hz: 4000 })
                }
                other => panic!("Expected Stop call, got {:?}", other),
            }
        }
    }

    mod failure_policy_tests {
        use super::*;

        #[test]
        fn test_report_policy_stays_inactive() {
            let (mut controller, mock) = create_controller();
            mock.set_tone_failure(Some(PlaybackError::ResourceUnavailable("no device".into())));

            let result = controller.start(&PlaybackConfig::default());

            assert!(matches!(result, Err(PlaybackError::ResourceUnavailable(_))));
            assert!(!controller.is_active());
            assert!(controller.handle_id().is_none());
        }

        #[test]
        fn test_silent_policy_reports_active_without_handle() {
            let (mut controller, mock) = create_controller();
            mock.set_track_failure(Some(PlaybackError::PermissionDenied("blocked".into())));
            let config = PlaybackConfig::default()
                .with_mode(PlaybackMode::Special)
                .with_failure_policy(FailurePolicy::Silent);

            assert!(controller.start(&config).is_ok());
            assert!(controller.is_active());
            assert!(controller.handle_id().is_none());

            // Stop still clears the state
            assert!(controller.stop());
            assert!(!controller.is_active());
            assert_eq!(mock.stop_count(), 0);
        }
    }

    mod apply_tests {
        use super::*;

        #[test]
        fn test_apply_when_inactive_is_noop() {
            let (mut controller, mock) = create_controller();
            let changed = controller
                .apply(&PlaybackConfig::default().with_frequency(880))
                .unwrap();
            assert!(!changed);
            assert!(mock.calls().is_empty());
        }

        #[test]
        fn test_apply_frequency_change_restarts_once() {
            let (mut controller, mock) = create_controller();
            controller.start(&PlaybackConfig::default()).unwrap();
            let old_id = controller.handle_id();
            mock.clear_calls();

            let changed = controller
                .apply(&PlaybackConfig::default().with_frequency(880))
                .unwrap();

            assert!(changed);
            assert!(controller.is_active());
            assert_ne!(controller.handle_id(), old_id);
            let calls = mock.calls();
            assert_eq!(calls.len(), 2);
            assert!(matches!(calls[0], BackendCall::Stop { .. }));
            assert!(matches!(
                calls[1],
                BackendCall::Start {
                    source: SourceKind::Tone { frequency_hz: 880 },
                    ..
                }
            ));
        }

        #[test]
        fn test_apply_same_source_is_noop() {
            let (mut controller, mock) = create_controller();
            let config = PlaybackConfig::default();
            controller.start(&config).unwrap();
            mock.clear_calls();

            // Track change does not affect a running tone
            let changed = controller
                .apply(&config.clone().with_track(TrackId::Heihei))
                .unwrap();

            assert!(!changed);
            assert!(mock.calls().is_empty());
        }

        #[test]
        fn test_apply_mode_switch_swaps_backend() {
            let (mut controller, mock) = create_controller();
            controller.start(&PlaybackConfig::default()).unwrap();

            let special = PlaybackConfig::default().with_mode(PlaybackMode::Special);
            controller.apply(&special).unwrap();

            assert!(controller.is_active());
            assert_eq!(
                controller.current_source(),
                Some(SourceKind::Track {
                    track: TrackId::Tiktok
                })
            );
            assert_eq!(mock.live_count(), 1);
            assert_eq!(mock.max_live(), 1);
        }
    }
}
