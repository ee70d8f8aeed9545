use std::{collections::VecDeque, sync::Mutex};

use futures::{channel::mpsc, future::BoxFuture, stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::{
    transport::{Frame, FrameStream, GenerationTransport},
    GenerationError, GenerationRequest, GenerationResult,
};

/// Result for a mocked `open` call.
pub enum MockOpenResult {
    /// Deliver the frames, then end the stream. Delivery stops when the
    /// token is cancelled, like the HTTP transport.
    Frames(Vec<Frame>),
    /// Fail to open the stream.
    Error(GenerationError),
    /// Deliver whatever is pushed through the paired sender, ignoring the
    /// token. Simulates a server that keeps emitting after an abort.
    Live(mpsc::UnboundedReceiver<GenerationResult<Frame>>),
    /// Never connect. The open call resolves with
    /// [`GenerationError::Cancelled`] once the token fires.
    Pending,
}

impl MockOpenResult {
    /// Construct a result that yields the provided frames.
    pub fn frames<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Frame>,
    {
        Self::Frames(frames.into_iter().collect())
    }

    /// Construct a result that fails with the provided error.
    pub fn error(error: GenerationError) -> Self {
        Self::Error(error)
    }

    /// Construct a live result and the sender that feeds it.
    #[must_use]
    pub fn live() -> (Self, mpsc::UnboundedSender<GenerationResult<Frame>>) {
        let (sender, receiver) = mpsc::unbounded();
        (Self::Live(receiver), sender)
    }
}

impl From<Vec<Frame>> for MockOpenResult {
    fn from(frames: Vec<Frame>) -> Self {
        Self::Frames(frames)
    }
}

impl From<GenerationError> for MockOpenResult {
    fn from(error: GenerationError) -> Self {
        Self::Error(error)
    }
}

#[derive(Default)]
struct MockTransportState {
    mocked_open_results: VecDeque<MockOpenResult>,
    tracked_requests: Vec<GenerationRequest>,
    tokens: Vec<CancellationToken>,
}

/// A transport for tests that tracks requests and replays scripted streams.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockTransportState>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one mocked open result.
    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockOpenResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_open_results.push_back(result.into());
        drop(state);
        self
    }

    /// Requests passed to `open` so far.
    pub fn tracked_requests(&self) -> Vec<GenerationRequest> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.clone()
    }

    /// Number of `open` calls so far.
    pub fn open_count(&self) -> usize {
        self.state
            .lock()
            .expect("mock state poisoned")
            .tracked_requests
            .len()
    }

    /// Whether the token handed to the `index`-th `open` call was cancelled.
    pub fn was_cancelled(&self, index: usize) -> bool {
        let state = self.state.lock().expect("mock state poisoned");
        state
            .tokens
            .get(index)
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl GenerationTransport for MockTransport {
    fn open(
        &self,
        request: GenerationRequest,
        token: CancellationToken,
    ) -> BoxFuture<'_, GenerationResult<FrameStream>> {
        let result = {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.tracked_requests.push(request);
            state.tokens.push(token.clone());
            state.mocked_open_results.pop_front()
        };

        Box::pin(async move {
            let result = result.ok_or_else(|| {
                GenerationError::InvalidInput("no mocked open results available".into())
            })?;

            match result {
                MockOpenResult::Frames(frames) => {
                    let frames = stream::iter(frames.into_iter().map(Ok))
                        .take_until(token.cancelled_owned());
                    Ok(FrameStream::from_stream(frames))
                }
                MockOpenResult::Error(error) => Err(error),
                MockOpenResult::Live(receiver) => Ok(FrameStream::from_stream(receiver)),
                MockOpenResult::Pending => {
                    token.cancelled().await;
                    Err(GenerationError::Cancelled)
                }
            }
        })
    }
}
