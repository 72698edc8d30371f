/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::Size;

// Re-export subsystem errors
pub use crate::core::config::ConfigError;
pub use crate::gateway::GatewayError;
pub use crate::interrupts::InterruptError;
pub use crate::memory::MemoryError;

/// Errors surfaced to client code by arrays, the device heap and the session
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum RemoteError {
    #[error("Index {index} out of range for array of length {length}")]
    #[diagnostic(
        code(array::index_out_of_range),
        help("Valid indices are 0..length. No remote call was issued.")
    )]
    IndexOutOfRange { index: usize, length: usize },

    #[error("Cannot store a {kind} value in a device array cell")]
    #[diagnostic(
        code(array::invalid_value_type),
        help("Only integral values can be written to device memory.")
    )]
    InvalidValueType { kind: String },

    #[error("Transport error: {0}")]
    #[diagnostic(
        code(gateway::transport),
        help("The remote call did not complete. Check the link to the device; the call was not retried.")
    )]
    Transport(String),

    #[error("Out of device memory: requested {requested} bytes")]
    #[diagnostic(
        code(memory::out_of_device_memory),
        help("Drop unused arrays to return memory to the device heap.")
    )]
    OutOfDeviceMemory { requested: Size },

    #[error("Device fault: {0}")]
    #[diagnostic(
        code(gateway::device_fault),
        help("The device rejected the operation. Check addresses and operation arguments.")
    )]
    DeviceFault(String),

    #[error("Invalid array length: {0}")]
    #[diagnostic(code(array::invalid_length), help("Arrays must hold at least one element."))]
    InvalidLength(usize),

    #[error("Unsupported element width: {0} bytes")]
    #[diagnostic(code(array::unsupported_width), help("Use 1, 2 or 4 byte elements."))]
    UnsupportedWidth(usize),

    #[error("Interrupt dispatch error: {0}")]
    #[diagnostic(code(interrupts::dispatch))]
    Interrupt(String),
}

impl RemoteError {
    /// True for errors detected locally before any remote call was issued
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            RemoteError::IndexOutOfRange { .. }
                | RemoteError::InvalidValueType { .. }
                | RemoteError::InvalidLength(_)
                | RemoteError::UnsupportedWidth(_)
        )
    }
}

impl From<GatewayError> for RemoteError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::DeviceFault { .. } => RemoteError::DeviceFault(err.to_string()),
            GatewayError::Transport { .. } | GatewayError::MalformedReply { .. } => {
                RemoteError::Transport(err.to_string())
            }
        }
    }
}

impl From<MemoryError> for RemoteError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::OutOfDeviceMemory { requested } => {
                RemoteError::OutOfDeviceMemory { requested }
            }
            MemoryError::AddressOverflow { .. } => RemoteError::DeviceFault(err.to_string()),
            MemoryError::Gateway(inner) => inner.into(),
        }
    }
}

impl From<InterruptError> for RemoteError {
    fn from(err: InterruptError) -> Self {
        RemoteError::Interrupt(err.to_string())
    }
}
