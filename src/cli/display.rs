//! Display utilities for the tonewindow CLI.
//!
//! This module provides formatted output for:
//! - The greeting and help text
//! - Playback events and status
//! - Schedule checks and the track list
//! - Error messages

use crate::scheduler::PlaybackEvent;
use crate::sound::TrackEntry;
use crate::types::{PlaybackMode, ScheduleCheck, SourceKind, StatusSnapshot};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the greeting that must be acknowledged before state is shown.
    pub fn show_greeting() {
        println!("こんにちは");
        println!("Enterキーを押すと開始します");
    }

    /// Shows the console command list.
    pub fn show_help() {
        println!("コマンド:");
        println!("  play  (p)            強制再生 / 停止");
        println!("  mode  (m) [normal|special]  スペシャルモード切替");
        println!("  freq  (f) <Hz>       周波数を設定");
        println!("  track (t) <id>       トラックを選択 (tiktok / heihei)");
        println!("  status (s)           状態を表示");
        println!("  quit  (q)            終了");
    }

    /// Formats a playback event as a console line.
    pub fn format_event(event: &PlaybackEvent) -> Option<String> {
        let line = match event {
            PlaybackEvent::Acknowledged => return None,
            PlaybackEvent::Started { source, overridden } => {
                if *overridden {
                    format!("> 強制再生中: {}", Self::format_source(source))
                } else {
                    format!("> 再生中: {}", Self::format_source(source))
                }
            }
            PlaybackEvent::Stopped { .. } => "[] 停止中".to_string(),
            PlaybackEvent::SourceChanged { to, .. } => {
                format!("> 切り替えました: {}", Self::format_source(to))
            }
            PlaybackEvent::OverrideChanged { overridden } => {
                if *overridden {
                    "* 強制再生: ON".to_string()
                } else {
                    "* 強制再生: OFF".to_string()
                }
            }
            PlaybackEvent::ModeChanged { mode } => format!("* {}", Self::format_mode(*mode)),
            PlaybackEvent::FrequencyChanged { frequency_hz } => {
                format!("* 周波数: {} Hz", frequency_hz)
            }
            PlaybackEvent::TrackChanged { track } => format!("* トラック: {}", track.label()),
            PlaybackEvent::Fault { error } => {
                let mut text = format!("エラー: {}\n  ヒント: {}", error, error.suggestion());
                if error.is_recoverable() {
                    text.push_str("\n  次のチェックで再試行します");
                }
                text
            }
            PlaybackEvent::Status(snapshot) => Self::format_status(snapshot),
        };
        Some(line)
    }

    /// Formats a status snapshot.
    pub fn format_status(snapshot: &StatusSnapshot) -> String {
        let mut lines = vec![
            "tonewindow ステータス".to_string(),
            "─────────────────────────────".to_string(),
        ];

        let state = if snapshot.state.active {
            "再生中"
        } else {
            "停止中"
        };
        lines.push(format!("状態: {}", state));
        if snapshot.state.overridden {
            lines.push("強制再生: ON".to_string());
        }
        lines.push(Self::format_mode(snapshot.mode));
        match snapshot.mode {
            PlaybackMode::Normal => lines.push(format!("周波数: {} Hz", snapshot.frequency_hz)),
            PlaybackMode::Special => lines.push(format!("トラック: {}", snapshot.track.label())),
        }
        lines.push(format!(
            "時間帯: {} (現在 {}時{})",
            snapshot.window,
            snapshot.hour,
            if snapshot.in_window { ", 時間帯内" } else { "" }
        ));
        if let Some(fault) = &snapshot.fault {
            lines.push(format!("エラー: {}", fault));
        }

        lines.join("\n")
    }

    /// Shows the result of a schedule check.
    pub fn show_check(check: &ScheduleCheck) {
        println!("{}", Self::format_check(check));
    }

    /// Formats the result of a schedule check.
    pub fn format_check(check: &ScheduleCheck) -> String {
        let verdict = if check.active { "再生" } else { "停止" };
        format!("{}時: {} (時間帯 {})", check.hour, verdict, check.window)
    }

    /// Shows the known tracks and whether their files exist.
    pub fn show_tracks(entries: &[TrackEntry]) {
        for entry in entries {
            println!("{}", Self::format_track(entry));
        }
    }

    /// Formats one track entry.
    pub fn format_track(entry: &TrackEntry) -> String {
        let marker = if entry.available { "ok" } else { "missing" };
        format!(
            "{:<8} {:<10} {} [{}]",
            entry.track.as_str(),
            entry.track.label(),
            entry.path.display(),
            marker
        )
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    fn format_mode(mode: PlaybackMode) -> String {
        match mode {
            PlaybackMode::Normal => "スペシャルモード: OFF".to_string(),
            PlaybackMode::Special => "スペシャルモード: ON".to_string(),
        }
    }

    fn format_source(source: &SourceKind) -> String {
        source.to_string()
    }
}

// ============================================================================
// ConsoleView
// ============================================================================

/// Filters events until the greeting is acknowledged.
///
/// Before acknowledgement nothing that reveals whether sound is playing is
/// printed; configuration changes and faults still are.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleView {
    acknowledged: bool,
}

impl ConsoleView {
    #[must_use]
    pub fn new(acknowledged: bool) -> Self {
        Self { acknowledged }
    }

    /// Returns the line to print for `event`, if any.
    pub fn render(&mut self, event: &PlaybackEvent) -> Option<String> {
        if matches!(event, PlaybackEvent::Acknowledged) {
            self.acknowledged = true;
        }

        let reveals_state = matches!(
            event,
            PlaybackEvent::Started { .. }
                | PlaybackEvent::Stopped { .. }
                | PlaybackEvent::SourceChanged { .. }
                | PlaybackEvent::OverrideChanged { .. }
                | PlaybackEvent::Status(_)
        );
        if reveals_state && !self.acknowledged {
            return None;
        }

        Display::format_event(event)
    }

    /// Returns true once the greeting has been acknowledged.
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::sound::PlaybackError;
    use crate::types::{PlaybackState, TrackId};

    fn create_snapshot(active: bool, overridden: bool) -> StatusSnapshot {
        StatusSnapshot {
            mode: PlaybackMode::Normal,
            frequency_hz: 4000,
            track: TrackId::Tiktok,
            window: "08:00 - 14:59".to_string(),
            hour: 10,
            in_window: true,
            state: PlaybackState { active, overridden },
            acknowledged: true,
            fault: None,
        }
    }

    mod format_event_tests {
        use super::*;

        #[test]
        fn test_started() {
            let line = Display::format_event(&PlaybackEvent::Started {
                source: SourceKind::Tone { frequency_hz: 4000 },
                overridden: false,
            })
            .unwrap();
            assert!(line.contains("再生中"));
            assert!(line.contains("4000 Hz"));
        }

        #[test]
        fn test_started_overridden() {
            let line = Display::format_event(&PlaybackEvent::Started {
                source: SourceKind::Track {
                    track: TrackId::Heihei,
                },
                overridden: true,
            })
            .unwrap();
            assert!(line.contains("強制再生中"));
            assert!(line.contains("Hei Hei"));
        }

        #[test]
        fn test_stopped() {
            let line = Display::format_event(&PlaybackEvent::Stopped { manual: true }).unwrap();
            assert!(line.contains("停止中"));
        }

        #[test]
        fn test_mode_changed() {
            let line = Display::format_event(&PlaybackEvent::ModeChanged {
                mode: PlaybackMode::Special,
            })
            .unwrap();
            assert!(line.contains("スペシャルモード: ON"));
        }

        #[test]
        fn test_fault_includes_suggestion() {
            let line = Display::format_event(&PlaybackEvent::Fault {
                error: PlaybackError::UnsupportedFormat("tiktok.mp3".into()),
            })
            .unwrap();
            assert!(line.contains("tiktok.mp3"));
            assert!(line.contains("MP3"));
            assert!(!line.contains("再試行"));
        }

        #[test]
        fn test_recoverable_fault_mentions_retry() {
            let line = Display::format_event(&PlaybackEvent::Fault {
                error: PlaybackError::ResourceUnavailable("default output".into()),
            })
            .unwrap();
            assert!(line.contains("再試行"));
        }

        #[test]
        fn test_acknowledged_is_silent() {
            assert!(Display::format_event(&PlaybackEvent::Acknowledged).is_none());
        }
    }

    mod format_status_tests {
        use super::*;

        #[test]
        fn test_active_status() {
            let text = Display::format_status(&create_snapshot(true, false));
            assert!(text.contains("状態: 再生中"));
            assert!(text.contains("周波数: 4000 Hz"));
            assert!(text.contains("08:00 - 14:59"));
            assert!(!text.contains("強制再生"));
        }

        #[test]
        fn test_overridden_special_status() {
            let mut snapshot = create_snapshot(true, true);
            snapshot.mode = PlaybackMode::Special;
            let text = Display::format_status(&snapshot);
            assert!(text.contains("強制再生: ON"));
            assert!(text.contains("トラック: Tik ToK"));
            assert!(!text.contains("周波数"));
        }

        #[test]
        fn test_status_with_fault() {
            let mut snapshot = create_snapshot(false, false);
            snapshot.fault = Some("no device".to_string());
            let text = Display::format_status(&snapshot);
            assert!(text.contains("状態: 停止中"));
            assert!(text.contains("no device"));
        }
    }

    mod format_other_tests {
        use super::*;

        #[test]
        fn test_format_check() {
            let check = ScheduleCheck {
                hour: 15,
                window: "08:00 - 14:59".to_string(),
                active: false,
            };
            assert_eq!(Display::format_check(&check), "15時: 停止 (時間帯 08:00 - 14:59)");
        }

        #[test]
        fn test_format_track() {
            let entry = TrackEntry {
                track: TrackId::Tiktok,
                path: PathBuf::from("public/tiktok.mp3"),
                available: false,
            };
            let line = Display::format_track(&entry);
            assert!(line.starts_with("tiktok"));
            assert!(line.contains("public/tiktok.mp3"));
            assert!(line.ends_with("[missing]"));
        }
    }

    mod console_view_tests {
        use super::*;

        #[test]
        fn test_hides_state_until_acknowledged() {
            let mut view = ConsoleView::new(false);
            let started = PlaybackEvent::Started {
                source: SourceKind::Tone { frequency_hz: 4000 },
                overridden: false,
            };

            assert!(view.render(&started).is_none());
            assert!(view
                .render(&PlaybackEvent::Status(create_snapshot(true, false)))
                .is_none());

            assert!(view.render(&PlaybackEvent::Acknowledged).is_none());
            assert!(view.is_acknowledged());
            assert!(view.render(&started).is_some());
        }

        #[test]
        fn test_config_and_faults_always_shown() {
            let mut view = ConsoleView::new(false);
            assert!(view
                .render(&PlaybackEvent::FrequencyChanged { frequency_hz: 440 })
                .is_some());
            assert!(view
                .render(&PlaybackEvent::Fault {
                    error: PlaybackError::ResourceUnavailable("x".into())
                })
                .is_some());
        }

        #[test]
        fn test_pre_acknowledged_view() {
            let mut view = ConsoleView::new(true);
            assert!(view
                .render(&PlaybackEvent::Stopped { manual: false })
                .is_some());
        }
    }
}
