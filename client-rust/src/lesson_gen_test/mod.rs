//! Test doubles for code built on top of this crate.

mod transport;

pub use transport::{MockOpenResult, MockTransport};
