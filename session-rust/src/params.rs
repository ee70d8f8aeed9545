use lesson_gen::GenerationTransport;
use std::{sync::Arc, time::Duration};

/// Parameters required to create a session controller.
/// # Default Values
/// - `budget`: `None`
pub struct SessionParams {
    /// Opens the generation streams. Usually an `HttpTransport`, shared by
    /// every dialog of the application.
    pub transport: Arc<dyn GenerationTransport>,
    /// Wall-clock limit for one attempt, from `start` to the terminal
    /// message. The attempt ends as errored when it is exceeded.
    pub budget: Option<Duration>,
}

impl SessionParams {
    pub fn new(transport: Arc<dyn GenerationTransport>) -> Self {
        Self {
            transport,
            budget: None,
        }
    }

    #[must_use]
    pub fn budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }
}
