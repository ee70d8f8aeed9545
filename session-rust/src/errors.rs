use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The request was rejected before any state changed.
    #[error("Generation error: {0}")]
    Generation(#[from] lesson_gen::GenerationError),
    /// `start` was called outside of a Tokio runtime.
    #[error("A Tokio runtime is required to drive a generation session")]
    NoRuntime,
}
