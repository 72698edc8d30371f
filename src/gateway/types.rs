/*!
 * Gateway Types
 * Requests, replies and errors of the remote call boundary
 */

use crate::core::types::{IrqNumber, Word};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Gateway operation result
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Remote call errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayError {
    #[error("Transport failure during '{operation}': {reason}")]
    Transport { operation: String, reason: String },

    #[error("Device fault in '{operation}': {reason}")]
    DeviceFault { operation: String, reason: String },

    #[error("Malformed reply to '{operation}': expected {expected}")]
    MalformedReply {
        operation: String,
        expected: ReturnKind,
    },
}

impl GatewayError {
    pub fn transport(operation: &str, reason: impl Into<String>) -> Self {
        GatewayError::Transport {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn device_fault(operation: &str, reason: impl Into<String>) -> Self {
        GatewayError::DeviceFault {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }
}

/// How the reply to a remote call is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    /// No value
    Void,
    /// A single integral value
    Int,
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReturnKind::Void => write!(f, "void"),
            ReturnKind::Int => write!(f, "int"),
        }
    }
}

/// Decoded reply to a remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    Void,
    Int(Word),
}

impl Reply {
    #[inline]
    pub fn kind(&self) -> ReturnKind {
        match self {
            Reply::Void => ReturnKind::Void,
            Reply::Int(_) => ReturnKind::Int,
        }
    }

    /// Extract an integral reply
    pub fn into_int(self, operation: &str) -> GatewayResult<Word> {
        match self {
            Reply::Int(value) => Ok(value),
            Reply::Void => Err(GatewayError::MalformedReply {
                operation: operation.to_string(),
                expected: ReturnKind::Int,
            }),
        }
    }
}

/// A remote call as handed to a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRequest<'a> {
    pub operation: &'a str,
    pub kind: ReturnKind,
    pub args: &'a [Word],
}

/// Notification that an interrupt fired on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterruptEvent {
    pub irq: IrqNumber,
}

impl InterruptEvent {
    #[inline]
    pub const fn new(irq: IrqNumber) -> Self {
        Self { irq }
    }
}

/// Names of remote operations
pub mod ops {
    /// Read (address, width) -> int, or write (address, width, value) -> void
    pub const DEREF: &str = "deref";
    /// Allocate (size) -> address, 0 on exhaustion
    pub const MALLOC: &str = "malloc";
    /// Free (address) -> void
    pub const FREE: &str = "free";

    pub const ROBOVERO_CONFIG: &str = "roboveroConfig";
    pub const HEARTBEAT_ON: &str = "heartbeatOn";
    pub const HEARTBEAT_OFF: &str = "heartbeatOff";
    pub const INIT_MATCH: &str = "initMatch";
    pub const PWM_SET_SPEED: &str = "PWM_SetSpeed";
    pub const PWM_COUNTER_STATE: &str = "PWM_CounterState";
}
