/*!
 * Interrupt Types
 * Handler, statistics and error definitions
 */

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Interrupt operation result
pub type InterruptResult<T> = Result<T, InterruptError>;

/// Interrupt dispatcher errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptError {
    #[error("Failed to start dispatcher: {0}")]
    SpawnFailed(String),

    #[error("Dispatcher thread panicked")]
    DispatcherPanicked,
}

/// Host-side interrupt handler callback
pub type InterruptHandler = Arc<dyn Fn() + Send + Sync>;

/// Dispatch statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterruptStats {
    /// Events that found a handler and ran it
    pub dispatched: u64,
    /// Events with no registered handler
    pub dropped: u64,
    /// Handler runs that panicked
    pub panicked: u64,
    /// Handlers currently registered
    pub handlers_registered: usize,
}
