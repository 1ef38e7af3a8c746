//! Playback error types.
//!
//! Every failure in acquiring the audio output, resolving a track or starting
//! a source maps to one of three recoverable kinds. The scheduler surfaces
//! them to the console instead of aborting.

use std::io;

use thiserror::Error;

/// Errors that can occur while starting or stopping playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Audio output or the requested resource could not be acquired.
    #[error("オーディオリソースが利用できません: {0}")]
    ResourceUnavailable(String),

    /// The host refused access to the device or file.
    #[error("再生が許可されていません: {0}")]
    PermissionDenied(String),

    /// The resource exists but cannot be decoded.
    #[error("対応していない形式です: {0}")]
    UnsupportedFormat(String),
}

impl PlaybackError {
    /// Maps an I/O error on `what` to the matching kind.
    pub fn from_io(what: impl std::fmt::Display, err: &io::Error) -> Self {
        let detail = format!("{}: {}", what, err);
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(detail),
            _ => Self::ResourceUnavailable(detail),
        }
    }

    /// Returns true if retrying later may succeed without user action.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ResourceUnavailable(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::ResourceUnavailable(_) => {
                "オーディオデバイスとトラックファイルの配置を確認してください"
            }
            Self::PermissionDenied(_) => "オーディオデバイスまたはファイルの権限を確認してください",
            Self::UnsupportedFormat(_) => "MP3形式のファイルを配置してください",
        }
    }
}
