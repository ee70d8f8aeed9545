use crate::AttemptId;
use lesson_gen::{Artifact, FailureKind};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Notification about a generation attempt.
///
/// Each attempt produces zero or more `Progress`/`Idea` events followed by
/// exactly one of `Completed`, `Errored` or `Cancelled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Progress {
        message: String,
    },
    Idea {
        idea: String,
    },
    Completed {
        artifact: Artifact,
    },
    Errored {
        kind: FailureKind,
        message: String,
    },
    Cancelled,
}

impl SessionEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Errored { .. } | Self::Cancelled
        )
    }
}

/// A [`SessionEvent`] tagged with the attempt it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub attempt: AttemptId,
    #[serde(flatten)]
    pub event: SessionEvent,
}

/// Receiving end of a session's event channel.
pub struct SessionEvents {
    receiver: mpsc::UnboundedReceiver<SessionUpdate>,
}

impl SessionEvents {
    pub(crate) fn channel() -> (mpsc::UnboundedSender<SessionUpdate>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self { receiver })
    }

    /// Wait for the next update. `None` once the controller is dropped and
    /// every update has been received.
    pub async fn recv(&mut self) -> Option<SessionUpdate> {
        self.receiver.recv().await
    }

    /// The next update if one is already queued.
    pub fn try_recv(&mut self) -> Option<SessionUpdate> {
        self.receiver.try_recv().ok()
    }

    /// Receive updates until the terminal event of `attempt`, returning every
    /// event of that attempt in order. Updates of other attempts are skipped.
    pub async fn collect_attempt(&mut self, attempt: AttemptId) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(update) = self.recv().await {
            if update.attempt != attempt {
                continue;
            }
            let terminal = update.event.is_terminal();
            events.push(update.event);
            if terminal {
                break;
            }
        }
        events
    }
}
