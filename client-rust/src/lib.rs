mod cache;
mod client_utils;
mod endpoints;
mod errors;
mod image_utils;
pub mod interpreter;
pub mod lesson_gen_test;
mod opentelemetry;
mod options;
mod persistence;
pub mod transport;
mod types;
mod types_ext;

pub use cache::ReadCache;
pub use endpoints::{EndpointLayout, Endpoints};
pub use errors::*;
pub use image_utils::decode_data_url;
pub use interpreter::{interpret, interpret_stream, GenerationMessage, MessageStream};
pub use options::BackendOptions;
pub use persistence::PersistenceGateway;
pub use transport::{Frame, FrameStream, GenerationTransport, HttpTransport};
pub use reqwest::StatusCode;
pub use tokio_util::sync::CancellationToken;
pub use types::*;
