//! Console input for the interactive scheduler.
//!
//! Each line typed by the user maps to one scheduler `Command`. Reading
//! happens on a dedicated thread with blocking I/O; commands cross over to
//! the scheduler task through an unbounded channel.

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::debug;

use crate::scheduler::Command;
use crate::types::{PlaybackMode, TrackId};

use super::display::Display;

/// A parsed console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Forward to the scheduler
    Command(Command),
    /// Print the command list
    Help,
}

/// Parses one console line.
///
/// An empty line acknowledges the greeting.
///
/// # Errors
///
/// Returns a user-facing message for unknown commands or bad arguments.
pub fn parse_line(line: &str) -> Result<ConsoleInput, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(ConsoleInput::Command(Command::Acknowledge));
    };
    let arg = parts.next();

    let command = match (word.to_lowercase().as_str(), arg) {
        ("play" | "p", None) => Command::ToggleOverride,
        ("mode" | "m", None) => Command::ToggleMode,
        ("mode" | "m", Some(value)) => Command::SetMode(parse_mode(value)?),
        ("freq" | "f", Some(value)) => Command::SetFrequency(parse_frequency(value)?),
        ("freq" | "f", None) => return Err("周波数を指定してください (例: freq 4000)".to_string()),
        ("track" | "t", Some(value)) => Command::SetTrack(value.parse::<TrackId>()?),
        ("track" | "t", None) => {
            return Err("トラックを指定してください (tiktok / heihei)".to_string())
        }
        ("status" | "s", None) => Command::Status,
        ("quit" | "q" | "exit", None) => Command::Quit,
        ("help" | "h" | "?", None) => return Ok(ConsoleInput::Help),
        _ => return Err(format!("不明なコマンドです: {}", line.trim())),
    };

    Ok(ConsoleInput::Command(command))
}

fn parse_mode(value: &str) -> Result<PlaybackMode, String> {
    [PlaybackMode::Normal, PlaybackMode::Special]
        .into_iter()
        .find(|mode| mode.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("不明なモードです: {} (normal / special)", value))
}

fn parse_frequency(value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("周波数は正の整数で指定してください: {}", value))
}

/// Reads commands from `reader` until EOF, `quit`, or the scheduler goes away.
///
/// Parse errors are shown and skipped. Intended to run on its own thread.
pub fn read_commands<R: BufRead>(reader: R, tx: mpsc::UnboundedSender<Command>) {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };

        match parse_line(&line) {
            Ok(ConsoleInput::Command(command)) => {
                debug!("Console command: {:?}", command);
                if tx.send(command).is_err() || command == Command::Quit {
                    return;
                }
            }
            Ok(ConsoleInput::Help) => Display::show_help(),
            Err(message) => Display::show_error(&message),
        }
    }
    debug!("Console input closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    mod parse_line_tests {
        use super::*;

        fn command(line: &str) -> Command {
            match parse_line(line) {
                Ok(ConsoleInput::Command(command)) => command,
                other => panic!("Expected command for {:?}, got {:?}", line, other),
            }
        }

        #[test]
        fn test_empty_line_acknowledges() {
            assert_eq!(command(""), Command::Acknowledge);
            assert_eq!(command("   "), Command::Acknowledge);
        }

        #[test]
        fn test_play_and_mode() {
            assert_eq!(command("play"), Command::ToggleOverride);
            assert_eq!(command("P"), Command::ToggleOverride);
            assert_eq!(command("mode"), Command::ToggleMode);
            assert_eq!(command("m special"), Command::SetMode(PlaybackMode::Special));
            assert_eq!(command("mode normal"), Command::SetMode(PlaybackMode::Normal));
        }

        #[test]
        fn test_arguments_ignore_case() {
            assert_eq!(command("mode Special"), Command::SetMode(PlaybackMode::Special));
            assert_eq!(command("MODE NORMAL"), Command::SetMode(PlaybackMode::Normal));
            assert_eq!(command("track HeiHei"), Command::SetTrack(TrackId::Heihei));
            assert!(parse_line("mode Loud").unwrap_err().contains("Loud"));
        }

        #[test]
        fn test_frequency() {
            assert_eq!(command("freq 440"), Command::SetFrequency(440));
            assert_eq!(command("f 25000"), Command::SetFrequency(25000));
            assert!(parse_line("freq").is_err());
            assert!(parse_line("freq -3").is_err());
            assert!(parse_line("freq abc").unwrap_err().contains("abc"));
        }

        #[test]
        fn test_track() {
            assert_eq!(command("track heihei"), Command::SetTrack(TrackId::Heihei));
            assert_eq!(command("t tiktok"), Command::SetTrack(TrackId::Tiktok));
            assert!(parse_line("track").is_err());
            assert!(parse_line("track polka").is_err());
        }

        #[test]
        fn test_status_quit_help() {
            assert_eq!(command("status"), Command::Status);
            assert_eq!(command("q"), Command::Quit);
            assert_eq!(command("exit"), Command::Quit);
            assert_eq!(parse_line("help"), Ok(ConsoleInput::Help));
        }

        #[test]
        fn test_unknown_command() {
            let err = parse_line("dance").unwrap_err();
            assert!(err.contains("dance"));
            assert!(parse_line("mode loud").is_err());
            assert!(parse_line("play now").is_err());
        }
    }

    mod read_commands_tests {
        use super::*;

        #[test]
        fn test_reads_until_quit() {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let input = Cursor::new("\nfreq 440\nbogus\nplay\nquit\nstatus\n");

            read_commands(input, tx);

            let mut received = Vec::new();
            while let Ok(command) = rx.try_recv() {
                received.push(command);
            }
            assert_eq!(
                received,
                vec![
                    Command::Acknowledge,
                    Command::SetFrequency(440),
                    Command::ToggleOverride,
                    Command::Quit,
                ]
            );
        }

        #[test]
        fn test_stops_when_scheduler_gone() {
            let (tx, rx) = mpsc::unbounded_channel();
            drop(rx);
            read_commands(Cursor::new("play\nplay\n"), tx);
        }

        #[test]
        fn test_eof_without_quit() {
            let (tx, mut rx) = mpsc::unbounded_channel();
            read_commands(Cursor::new("mode"), tx);
            assert_eq!(rx.try_recv().unwrap(), Command::ToggleMode);
            assert!(rx.try_recv().is_err());
        }
    }
}
