use crate::{
    events::{SessionEvent, SessionEvents, SessionUpdate},
    opentelemetry::AttemptSpan,
    AttemptId, GenerationSession, SessionError, SessionParams, SessionState, StartOutcome,
};
use futures::StreamExt;
use lesson_gen::{
    interpret_stream, Artifact, CancellationToken, ContentKind, FailureKind, GenerationError,
    GenerationMessage, GenerationRequest, GenerationTransport,
};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::sync::mpsc;
use tracing_futures::Instrument;

/// Drives generation attempts for one session slot, typically one open
/// dialog.
///
/// At most one attempt is in flight at a time. Every attempt gets a fresh
/// [`AttemptId`] and cancellation token; messages that arrive for an attempt
/// that is no longer the active one are dropped, so a cancelled attempt can
/// never touch the fields of the attempt that replaced it.
///
/// Cloning the controller yields another handle to the same slot.
#[derive(Clone)]
pub struct SessionController {
    transport: Arc<dyn GenerationTransport>,
    budget: Option<Duration>,
    shared: Arc<Shared>,
}

struct Slot {
    attempt: AttemptId,
    session: GenerationSession,
    token: Option<CancellationToken>,
}

struct Shared {
    slot: Mutex<Slot>,
    events: mpsc::UnboundedSender<SessionUpdate>,
}

impl SessionController {
    /// Create a controller and the receiving end of its event channel.
    #[must_use]
    pub fn new(params: SessionParams) -> (Self, SessionEvents) {
        let (events, receiver) = SessionEvents::channel();
        let controller = Self {
            transport: params.transport,
            budget: params.budget,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    attempt: AttemptId::default(),
                    session: GenerationSession::default(),
                    token: None,
                }),
                events,
            }),
        };
        (controller, receiver)
    }

    /// Start a new attempt.
    ///
    /// Does nothing and returns [`StartOutcome::AlreadyRunning`] while an
    /// attempt is connecting or streaming, whatever the request. Otherwise an
    /// invalid request is rejected before any field changes. Must be called
    /// within a Tokio runtime.
    pub fn start(&self, request: GenerationRequest) -> Result<StartOutcome, SessionError> {
        let mut slot = self.shared.slot();
        if slot.session.state.is_active() {
            tracing::debug!(attempt = %slot.attempt, "generation already running, start ignored");
            return Ok(StartOutcome::AlreadyRunning(slot.attempt));
        }

        request.validate()?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SessionError::NoRuntime)?;

        let attempt = slot.attempt.next();
        let token = CancellationToken::new();
        slot.attempt = attempt;
        slot.token = Some(token.clone());
        slot.session = GenerationSession {
            state: SessionState::Connecting,
            content_kind: Some(request.content_kind),
            ..GenerationSession::default()
        };
        drop(slot);

        tracing::info!(%attempt, kind = %request.content_kind, "generation started");

        let span = AttemptSpan::new(attempt, &request);
        let span_handle = span.span();
        let driver = Driver {
            shared: self.shared.clone(),
            transport: self.transport.clone(),
            attempt,
            token,
            budget: self.budget,
        };
        runtime.spawn(driver.run(request, span).instrument(span_handle));

        Ok(StartOutcome::Started(attempt))
    }

    /// Abort the attempt in flight. Returns `false` when no attempt is
    /// connecting or streaming.
    pub fn cancel(&self) -> bool {
        let mut slot = self.shared.slot();
        if !slot.session.state.is_active() {
            return false;
        }

        if let Some(token) = slot.token.take() {
            token.cancel();
        }
        slot.session.state = SessionState::Cancelled;
        let attempt = slot.attempt;
        self.shared.emit(attempt, SessionEvent::Cancelled);
        tracing::info!(%attempt, "generation cancelled");
        true
    }

    /// Clear every field and return to `Idle`. An attempt still in flight is
    /// aborted and reported as cancelled.
    pub fn reset(&self) {
        let mut slot = self.shared.slot();
        if let Some(token) = slot.token.take() {
            token.cancel();
        }
        if slot.session.state.is_active() {
            let attempt = slot.attempt;
            self.shared.emit(attempt, SessionEvent::Cancelled);
        }
        slot.session = GenerationSession::default();
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.slot().session.state
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.state().is_active()
    }

    /// Tag of the latest attempt. `AttemptId(0)` before the first start.
    #[must_use]
    pub fn attempt(&self) -> AttemptId {
        self.shared.slot().attempt
    }

    #[must_use]
    pub fn snapshot(&self) -> GenerationSession {
        self.shared.slot().session.clone()
    }

    /// The generated artifact, only once the attempt has completed. This is
    /// the value to hand to the persistence gateway.
    #[must_use]
    pub fn completed_artifact(&self) -> Option<Artifact> {
        let slot = self.shared.slot();
        match slot.session.state {
            SessionState::Completed => slot.session.result_artifact.clone(),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn deliver(&self, attempt: AttemptId, message: GenerationMessage) -> bool {
        self.shared.apply(attempt, message)
    }
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, attempt: AttemptId, event: SessionEvent) {
        // The receiver may be gone; the slot stays authoritative.
        let _ = self.events.send(SessionUpdate { attempt, event });
    }

    /// The slot if `attempt` is still the one in flight.
    fn active_slot(&self, attempt: AttemptId) -> Option<MutexGuard<'_, Slot>> {
        let slot = self.slot();
        if slot.attempt == attempt && slot.session.state.is_active() {
            Some(slot)
        } else {
            tracing::debug!(%attempt, active = %slot.attempt, "discarding message of inactive attempt");
            None
        }
    }

    fn opened(&self, attempt: AttemptId) -> bool {
        let Some(mut slot) = self.active_slot(attempt) else {
            return false;
        };
        slot.session.state = SessionState::Streaming;
        true
    }

    /// Apply one message. Returns whether the attempt is still in flight.
    fn apply(&self, attempt: AttemptId, message: GenerationMessage) -> bool {
        let Some(mut slot) = self.active_slot(attempt) else {
            return false;
        };

        match message {
            GenerationMessage::Progress(message) => {
                slot.session.progress_message.clone_from(&message);
                self.emit(attempt, SessionEvent::Progress { message });
                true
            }
            GenerationMessage::Idea(idea) => {
                if slot.session.content_kind == Some(ContentKind::Story) {
                    slot.session.partial_idea = Some(idea.clone());
                    self.emit(attempt, SessionEvent::Idea { idea });
                } else {
                    tracing::warn!(%attempt, "ignoring idea event outside story generation");
                }
                true
            }
            GenerationMessage::Data(artifact) => {
                slot.session.state = SessionState::Completed;
                slot.session.result_artifact = Some(artifact.clone());
                slot.token = None;
                self.emit(attempt, SessionEvent::Completed { artifact });
                tracing::info!(%attempt, "generation completed");
                false
            }
            GenerationMessage::Error(message) => {
                Self::record_failure(&mut slot, FailureKind::Server, message.clone());
                self.emit(
                    attempt,
                    SessionEvent::Errored {
                        kind: FailureKind::Server,
                        message,
                    },
                );
                tracing::info!(%attempt, "generation failed on the server");
                false
            }
        }
    }

    fn fail(&self, attempt: AttemptId, error: &GenerationError) {
        let Some(mut slot) = self.active_slot(attempt) else {
            return;
        };
        let kind = error.kind();
        let message = error.to_string();
        Self::record_failure(&mut slot, kind, message.clone());
        self.emit(attempt, SessionEvent::Errored { kind, message });
        tracing::info!(%attempt, ?kind, %error, "generation failed");
    }

    fn record_failure(slot: &mut Slot, kind: FailureKind, message: String) {
        slot.session.state = SessionState::Errored;
        slot.session.result_artifact = None;
        slot.session.error_message = Some(message);
        slot.session.failure = Some(kind);
        slot.token = None;
    }

    fn outcome(&self, attempt: AttemptId) -> (SessionState, Option<String>) {
        let slot = self.slot();
        if slot.attempt == attempt {
            (slot.session.state, slot.session.error_message.clone())
        } else {
            (SessionState::Idle, None)
        }
    }
}

/// Owns one attempt from open to its terminal message.
struct Driver {
    shared: Arc<Shared>,
    transport: Arc<dyn GenerationTransport>,
    attempt: AttemptId,
    token: CancellationToken,
    budget: Option<Duration>,
}

impl Driver {
    async fn run(self, request: GenerationRequest, mut span: AttemptSpan) {
        let deadline = async {
            match self.budget {
                Some(budget) => tokio::time::sleep(budget).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => {}
            () = self.consume(request) => {}
            () = deadline => {
                if let Some(budget) = self.budget {
                    self.shared.fail(self.attempt, &GenerationError::TimedOut(budget));
                }
            }
        }

        // Releases the transport on every path.
        self.token.cancel();

        let (state, error_message) = self.shared.outcome(self.attempt);
        span.on_outcome(state, error_message);
    }

    async fn consume(&self, request: GenerationRequest) {
        let kind = request.content_kind;
        let frames = match self.transport.open(request, self.token.clone()).await {
            Ok(frames) => frames,
            Err(error) => {
                self.shared.fail(self.attempt, &error);
                return;
            }
        };

        if !self.shared.opened(self.attempt) {
            return;
        }

        let mut messages = interpret_stream(kind, frames);
        loop {
            match messages.next().await {
                Some(Ok(message)) => {
                    if !self.shared.apply(self.attempt, message) {
                        return;
                    }
                }
                Some(Err(error)) => {
                    self.shared.fail(self.attempt, &error);
                    return;
                }
                None => {
                    self.shared.fail(self.attempt, &GenerationError::Disconnected);
                    return;
                }
            }
        }
    }
}
