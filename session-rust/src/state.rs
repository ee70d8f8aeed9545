use lesson_gen::{Artifact, ContentKind, FailureKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a generation attempt.
///
/// `Idle → Connecting → Streaming → {Completed | Errored | Cancelled}`.
/// The three right-hand states stay put until the session is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Streaming,
    Completed,
    Errored,
    Cancelled,
}

impl SessionState {
    /// An attempt is in flight.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Streaming)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored | Self::Cancelled)
    }
}

/// Tag of one generation attempt within a session slot. Messages carrying
/// an older tag are discarded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AttemptId(pub u64);

impl AttemptId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observable fields of a session slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSession {
    pub state: SessionState,
    pub content_kind: Option<ContentKind>,
    /// Latest status text from the generation service.
    pub progress_message: String,
    /// Working premise of a story. Never set for other kinds.
    pub partial_idea: Option<String>,
    pub result_artifact: Option<Artifact>,
    pub error_message: Option<String>,
    pub failure: Option<FailureKind>,
}

impl GenerationSession {
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.state.is_active()
    }
}

/// What a call to `start` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new attempt was started with this tag.
    Started(AttemptId),
    /// An attempt was already in flight; nothing changed.
    AlreadyRunning(AttemptId),
}

impl StartOutcome {
    #[must_use]
    pub fn attempt(self) -> AttemptId {
        match self {
            Self::Started(attempt) | Self::AlreadyRunning(attempt) => attempt,
        }
    }
}
