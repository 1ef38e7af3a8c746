//! Ownership token for a running sound source.

use std::fmt;

use rodio::Sink;

use crate::types::SourceKind;

/// Token for whichever backend resource is currently producing sound.
///
/// A handle is not `Clone`; releasing it consumes it. Dropping a handle that
/// still owns a sink also silences it.
pub struct ActiveHandle {
    id: u64,
    source: SourceKind,
    sink: Option<Sink>,
}

impl ActiveHandle {
    /// Creates a handle with no attached output, as used by test backends.
    #[must_use]
    pub fn new(id: u64, source: SourceKind) -> Self {
        Self {
            id,
            source,
            sink: None,
        }
    }

    /// Attaches the rodio sink that is playing this source.
    #[must_use]
    pub fn with_sink(mut self, sink: Sink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns the backend-assigned identifier.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns what this handle is playing.
    #[must_use]
    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Stops the attached sink, if any, and consumes the handle.
    pub fn release(self) {
        if let Some(sink) = self.sink {
            sink.stop();
        }
    }
}

impl fmt::Debug for ActiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveHandle")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
