//! Crate-level error types.

use std::fmt;

use crate::identifier::RejectedInput;
use crate::viewport::RenderError;

/// Errors produced by the molview crate.
#[derive(Debug)]
pub enum MolviewError {
    /// The identifier was rejected before any request was issued.
    Rejected(RejectedInput),
    /// The rendering surface refused a structure.
    Render(RenderError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// The background fetch thread is no longer running.
    WorkerStopped,
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for MolviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(e) => write!(f, "rejected input: {e}"),
            Self::Render(e) => write!(f, "render error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::WorkerStopped => f.write_str("fetch worker has stopped"),
        }
    }
}

impl std::error::Error for MolviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(e) => Some(e),
            Self::Render(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            Self::OptionsParse(_) | Self::WorkerStopped => None,
        }
    }
}

impl From<RejectedInput> for MolviewError {
    fn from(e: RejectedInput) -> Self {
        Self::Rejected(e)
    }
}

impl From<RenderError> for MolviewError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

impl From<std::io::Error> for MolviewError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
