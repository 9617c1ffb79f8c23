//! Library side of the `tagdoc` binary, exposed for integration tests.
pub mod cli;
pub mod error;
pub mod input;
