use crate::ContentKind;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The connection to the generation service failed or dropped.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The event stream carried bytes that could not be read as events.
    #[error("Event stream error: {0}")]
    EventStream(String),
    /// The generation request returned a non-OK status code
    #[error("Generation request failed: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The generation service reported a logical failure. The message is
    /// shown to the teacher as is.
    #[error("{0}")]
    Server(String),
    /// The final payload could not be decoded into the expected shape.
    #[error("The generated {kind} could not be read. Please try again.")]
    PayloadParse { kind: ContentKind },
    /// The stream closed before a result or an error was delivered.
    #[error("The connection to the generation service was lost before it finished.")]
    Disconnected,
    #[error("Generation did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("Generation was cancelled")]
    Cancelled,
}

/// Cloneable classification of a [`GenerationError`], kept on a session
/// next to its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    /// The generation endpoint answered with a non-OK status.
    Open,
    /// The connection dropped or the stream was unreadable.
    Network,
    Server,
    PayloadParse,
    Disconnected,
    TimedOut,
    Cancelled,
}

impl GenerationError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::Transport(_) | Self::EventStream(_) => FailureKind::Network,
            Self::StatusCode(..) => FailureKind::Open,
            Self::Server(_) => FailureKind::Server,
            Self::PayloadParse { .. } => FailureKind::PayloadParse,
            Self::Disconnected => FailureKind::Disconnected,
            Self::TimedOut(_) => FailureKind::TimedOut,
            Self::Cancelled => FailureKind::Cancelled,
        }
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The materials endpoint returned an unexpected status code
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// A stored artifact could not be decoded.
    #[error("Failed to decode stored {kind}: {message}")]
    Decode { kind: ContentKind, message: String },
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
