use crate::{AttemptId, SessionState};
use lesson_gen::GenerationRequest;
use opentelemetry::trace::Status;
use tracing::{info_span, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Span covering one generation attempt, from `start` to its terminal state.
pub struct AttemptSpan {
    span: Span,
    outcome: Option<SessionState>,
    error_message: Option<String>,
}

impl AttemptSpan {
    pub fn new(attempt: AttemptId, request: &GenerationRequest) -> Self {
        let span = info_span!("lesson_session.attempt");
        span.set_attribute("lesson.operation.name", "generation_session");
        span.set_attribute("lesson.attempt", i64::try_from(attempt.0).unwrap_or(i64::MAX));
        span.set_attribute("lesson.content_kind", request.content_kind.path_segment());
        span.set_attribute("lesson.topic_id", request.topic_id.clone());
        span.set_attribute("lesson.day_id", request.day_id.clone());
        span.set_attribute("lesson.thread_id", request.thread_id.clone());

        Self {
            span,
            outcome: None,
            error_message: None,
        }
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn on_outcome(&mut self, state: SessionState, error_message: Option<String>) {
        self.outcome = Some(state);
        self.error_message = error_message;
    }

    pub fn on_end(&mut self) {
        let Some(outcome) = self.outcome else {
            return;
        };
        let outcome_name = match outcome {
            SessionState::Completed => "completed",
            SessionState::Errored => "errored",
            SessionState::Cancelled => "cancelled",
            // Superseded by a reset before reaching a terminal state.
            _ => "abandoned",
        };
        self.span.set_attribute("lesson.session.outcome", outcome_name);

        if let Some(message) = &self.error_message {
            self.span.set_attribute("exception.message", message.clone());
            self.span.set_status(Status::error(message.clone()));
        }
    }
}

impl Drop for AttemptSpan {
    fn drop(&mut self) {
        self.on_end();
    }
}
