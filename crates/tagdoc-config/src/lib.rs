pub mod config;
pub mod error;

pub use config::{Config, ConfigLayer};
pub use error::ConfigError;
