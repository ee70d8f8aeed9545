use crate::{
    client_utils,
    options::{Backend, BackendOptions},
    GenerationError, GenerationRequest, GenerationResult,
};
use futures::{future::BoxFuture, Stream, StreamExt};
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tokio_util::sync::CancellationToken;

/// One named event received from a generation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub event: String,
    pub data: String,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// Frames of one generation attempt, in arrival order.
pub struct FrameStream(Pin<Box<dyn Stream<Item = GenerationResult<Frame>> + Send>>);

impl FrameStream {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = GenerationResult<Frame>> + Send + 'static,
    {
        Self(Box::pin(stream))
    }
}

impl Stream for FrameStream {
    type Item = GenerationResult<Frame>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.as_mut().poll_next(cx)
    }
}

/// Opens generation streams.
/// Implementations must stop delivering frames once `token` is cancelled.
pub trait GenerationTransport: Send + Sync {
    fn open(
        &self,
        request: GenerationRequest,
        token: CancellationToken,
    ) -> BoxFuture<'_, GenerationResult<FrameStream>>;
}

/// Streams generation events from the lesson backend over HTTP.
pub struct HttpTransport {
    backend: Backend,
}

impl HttpTransport {
    #[must_use]
    pub fn new(options: BackendOptions) -> Self {
        Self {
            backend: Backend::new(options),
        }
    }
}

impl GenerationTransport for HttpTransport {
    fn open(
        &self,
        request: GenerationRequest,
        token: CancellationToken,
    ) -> BoxFuture<'_, GenerationResult<FrameStream>> {
        Box::pin(async move {
            let url = self.backend.endpoints.generation_url(
                request.content_kind,
                &request.topic_id,
                &request.day_id,
            );

            let endpoint = url.as_str();
            crate::opentelemetry::trace_open(endpoint, request, |request| async move {
                request.validate()?;
                let headers = self
                    .backend
                    .request_headers()
                    .map_err(GenerationError::InvalidInput)?;

                tracing::debug!(url = endpoint, kind = %request.content_kind, "opening generation stream");

                let events = client_utils::send_sse(
                    &self.backend.client,
                    endpoint,
                    &request.body(),
                    headers,
                    token,
                )
                .await?;

                let frames = events.map(|event| {
                    event.map(|event| Frame {
                        event: event.event,
                        data: event.data,
                    })
                });

                Ok(FrameStream::from_stream(frames))
            })
            .await
        })
    }
}
