mod controller;
mod errors;
mod events;
mod opentelemetry;
mod params;
mod state;

pub use controller::SessionController;
pub use errors::SessionError;
pub use events::{SessionEvent, SessionEvents, SessionUpdate};
pub use params::SessionParams;
pub use state::{AttemptId, GenerationSession, SessionState, StartOutcome};
