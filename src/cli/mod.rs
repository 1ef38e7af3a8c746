//! CLI module for tonewindow.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `console`: Interactive console input for the scheduler
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod console;
pub mod display;

pub use commands::{CheckArgs, Cli, Commands, RunArgs, TracksArgs, WindowArgs};
pub use console::{parse_line, read_commands, ConsoleInput};
pub use display::{ConsoleView, Display};
