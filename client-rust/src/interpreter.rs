//! Decodes generation frames into typed messages.
//!
//! The event name selects the message. `data` payloads are decoded into the
//! artifact shape of the requested [`ContentKind`]; a payload that does not
//! decode becomes [`GenerationError::PayloadParse`] and the serde error is
//! only logged. Unknown event names are skipped so that newer backends can
//! add events without breaking older clients.

use crate::{Artifact, ContentKind, Frame, FrameStream, GenerationError, GenerationResult};
use futures::{Stream, StreamExt};
use std::{
    pin::Pin,
    task::{Context, Poll},
};

pub const PROGRESS_EVENT: &str = "progress";
pub const IDEA_EVENT: &str = "idea";
pub const DATA_EVENT: &str = "data";
pub const ERROR_EVENT: &str = "error";

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationMessage {
    /// Human readable status update.
    Progress(String),
    /// Working premise of a story, sent before the final text.
    Idea(String),
    /// The final artifact.
    Data(Artifact),
    /// Logical failure reported by the generation service.
    Error(String),
}

impl GenerationMessage {
    /// Whether the message ends the attempt.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Data(_) | Self::Error(_))
    }
}

/// Interpret one frame. `Ok(None)` means the frame carries nothing for the
/// session and should be skipped.
pub fn interpret(kind: ContentKind, frame: &Frame) -> GenerationResult<Option<GenerationMessage>> {
    let message = match frame.event.as_str() {
        PROGRESS_EVENT => GenerationMessage::Progress(frame.data.clone()),
        IDEA_EVENT => GenerationMessage::Idea(frame.data.clone()),
        ERROR_EVENT => GenerationMessage::Error(frame.data.clone()),
        DATA_EVENT => match Artifact::parse(kind, &frame.data) {
            Ok(artifact) => GenerationMessage::Data(artifact),
            Err(error) => {
                tracing::warn!(%kind, %error, "failed to decode generation payload");
                return Err(GenerationError::PayloadParse { kind });
            }
        },
        // The event-stream default name, used by keep-alive comments.
        "message" if frame.data.is_empty() => return Ok(None),
        other => {
            tracing::warn!(event = other, "ignoring unrecognized generation event");
            return Ok(None);
        }
    };

    tracing::debug!(event = frame.event.as_str(), "received generation event");
    Ok(Some(message))
}

/// Interpreted messages of one generation attempt.
pub struct MessageStream(Pin<Box<dyn Stream<Item = GenerationResult<GenerationMessage>> + Send>>);

impl MessageStream {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = GenerationResult<GenerationMessage>> + Send + 'static,
    {
        Self(Box::pin(stream))
    }
}

impl Stream for MessageStream {
    type Item = GenerationResult<GenerationMessage>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.as_mut().poll_next(cx)
    }
}

/// Interpret a frame stream. Transport errors and payload errors are passed
/// through as items; skipped frames produce nothing.
#[must_use]
pub fn interpret_stream(kind: ContentKind, mut frames: FrameStream) -> MessageStream {
    let stream = async_stream::stream! {
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(frame) => match interpret(kind, &frame) {
                    Ok(Some(message)) => yield Ok(message),
                    Ok(None) => {}
                    Err(error) => yield Err(error),
                },
                Err(error) => yield Err(error),
            }
        }
    };

    MessageStream::from_stream(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoryArtifact;
    use futures::stream;

    #[test]
    fn maps_known_events() {
        let progress = interpret(ContentKind::Story, &Frame::new("progress", "Thinking..."));
        assert_eq!(
            progress.unwrap(),
            Some(GenerationMessage::Progress("Thinking...".to_string()))
        );

        let idea = interpret(ContentKind::Story, &Frame::new("idea", "A droplet's journey"));
        assert_eq!(
            idea.unwrap(),
            Some(GenerationMessage::Idea("A droplet's journey".to_string()))
        );

        let error = interpret(ContentKind::Game, &Frame::new("error", "quota"));
        assert_eq!(
            error.unwrap(),
            Some(GenerationMessage::Error("quota".to_string()))
        );
    }

    #[test]
    fn decodes_data_for_the_requested_kind() {
        let data = interpret(ContentKind::Story, &Frame::new("data", "\"Once upon\""));
        assert_eq!(
            data.unwrap(),
            Some(GenerationMessage::Data(Artifact::Story(StoryArtifact::new(
                "Once upon"
            ))))
        );
    }

    #[test]
    fn malformed_data_is_a_payload_error_without_serde_details() {
        let err = interpret(ContentKind::Flashcards, &Frame::new("data", "{not json"))
            .expect_err("payload should not parse");
        assert!(matches!(
            err,
            GenerationError::PayloadParse {
                kind: ContentKind::Flashcards
            }
        ));
        assert!(!err.to_string().contains("line"));
    }

    #[test]
    fn skips_unknown_and_keep_alive_events() {
        assert_eq!(
            interpret(ContentKind::Story, &Frame::new("heartbeat", "x")).unwrap(),
            None
        );
        assert_eq!(
            interpret(ContentKind::Story, &Frame::new("message", "")).unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn stream_preserves_order_and_passes_errors_through() {
        let frames = FrameStream::from_stream(stream::iter(vec![
            Ok(Frame::new("progress", "one")),
            Ok(Frame::new("unknown", "skip me")),
            Ok(Frame::new("progress", "two")),
            Err(GenerationError::Disconnected),
        ]));

        let messages: Vec<_> = interpret_stream(ContentKind::Game, frames).collect().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[0].as_ref().unwrap(),
            &GenerationMessage::Progress("one".to_string())
        );
        assert_eq!(
            messages[1].as_ref().unwrap(),
            &GenerationMessage::Progress("two".to_string())
        );
        assert!(matches!(messages[2], Err(GenerationError::Disconnected)));
    }
}
