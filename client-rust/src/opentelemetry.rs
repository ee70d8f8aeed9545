use crate::{FrameStream, GenerationRequest, GenerationResult, MaterialKey};
use futures::StreamExt;
use opentelemetry::trace::Status;
use std::{future::Future, time::Instant};
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct GenerationSpan {
    span: Span,
    start_time: Instant,
    time_to_first_frame: Option<f64>,
    frames: i64,
}

impl GenerationSpan {
    pub fn new(endpoint: &str, request: &GenerationRequest) -> Self {
        let span = info_span!("lesson_gen.generate");
        span.set_attribute("lesson.operation.name", "generate_material");
        span.set_attribute("lesson.content_kind", request.content_kind.path_segment());
        span.set_attribute("lesson.topic_id", request.topic_id.clone());
        span.set_attribute("lesson.day_id", request.day_id.clone());
        span.set_attribute("lesson.thread_id", request.thread_id.clone());
        span.set_attribute("url.full", endpoint.to_string());

        Self {
            span,
            start_time: Instant::now(),
            time_to_first_frame: None,
            frames: 0,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_frame(&mut self) {
        self.frames += 1;
        if self.time_to_first_frame.is_none() {
            self.time_to_first_frame = Some(self.start_time.elapsed().as_secs_f64());
        }
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span.set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        self.span.set_attribute("lesson.stream.frames", self.frames);
        if let Some(time_to_first_frame) = self.time_to_first_frame {
            self.span
                .set_attribute("lesson.stream.time_to_first_frame", time_to_first_frame);
        }
    }
}

impl Drop for GenerationSpan {
    fn drop(&mut self) {
        self.on_end();
    }
}

/// Open a frame stream inside a `lesson_gen.generate` span that stays open
/// until the stream is dropped.
pub async fn trace_open<F, Fut>(
    endpoint: &str,
    request: GenerationRequest,
    f: F,
) -> GenerationResult<FrameStream>
where
    F: FnOnce(GenerationRequest) -> Fut,
    Fut: Future<Output = GenerationResult<FrameStream>>,
{
    let mut span = GenerationSpan::new(endpoint, &request);
    let stream_result = span.instrument_future(f(request)).await;

    match stream_result {
        Ok(mut stream) => {
            let span_handle = span.span();
            let instrumented = async_stream::try_stream! {
                let mut span_state = span;

                while let Some(item) = stream.next().await {
                    match item {
                        Ok(frame) => {
                            span_state.on_frame();
                            yield frame;
                        }
                        Err(err) => {
                            span_state.on_error(&err);
                            Err(err)?;
                        }
                    }
                }
            }
            .instrument(span_handle);

            Ok(FrameStream::from_stream(instrumented))
        }
        Err(error) => {
            span.on_error(&error);
            Err(error)
        }
    }
}

#[derive(Clone, Copy)]
pub enum MaterialsOperation {
    Save,
    Fetch,
}

impl MaterialsOperation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save_material",
            Self::Fetch => "fetch_material",
        }
    }
}

/// Run a class-materials request inside a span.
pub async fn trace_materials<T, E, Fut>(
    operation: MaterialsOperation,
    key: &MaterialKey,
    future: Fut,
) -> Result<T, E>
where
    E: std::error::Error + 'static,
    Fut: Future<Output = Result<T, E>>,
{
    let span = match operation {
        MaterialsOperation::Save => info_span!("lesson_gen.save"),
        MaterialsOperation::Fetch => info_span!("lesson_gen.fetch"),
    };
    span.set_attribute("lesson.operation.name", operation.as_str());
    span.set_attribute("lesson.content_kind", key.kind.path_segment());
    span.set_attribute("lesson.topic_id", key.topic_id.clone());
    span.set_attribute("lesson.day_id", key.day_id.clone());

    match future.instrument(span.clone()).await {
        Ok(value) => Ok(value),
        Err(err) => {
            span.set_attribute("exception.message", err.to_string());
            span.set_status(Status::error(err.to_string()));
            Err(err)
        }
    }
}
