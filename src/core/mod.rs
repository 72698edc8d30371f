/*!
 * Core Module
 * Fundamental host types, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use config::{ConfigError, ConfigResult, HostConfig};
pub use errors::RemoteError;
pub use types::*;
