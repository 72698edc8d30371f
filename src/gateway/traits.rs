/*!
 * Gateway Traits
 * Remote call and transport abstractions
 */

use super::types::{CallRequest, GatewayResult, InterruptEvent, Reply, ReturnKind};
use crate::core::types::Word;
use flume::Receiver;
use std::sync::Arc;

/// Executes named operations on the device
///
/// Implementations must not have two calls in flight on one connection.
pub trait RemoteCall: Send + Sync {
    /// Invoke `operation` with `args`, decoding the reply as `kind`
    fn call(&self, operation: &str, kind: ReturnKind, args: &[Word]) -> GatewayResult<Reply>;
}

/// Shared handle to a gateway
pub type SharedGateway = Arc<dyn RemoteCall>;

/// A single-owner link to the device
///
/// Transports move bytes; serialization of callers is the gateway's job.
pub trait Transport: Send {
    /// Send one request and block until its reply arrives or the link fails
    fn exchange(&mut self, request: &CallRequest<'_>) -> GatewayResult<Reply>;

    /// Inbound interrupt notifications, if this link carries them
    fn interrupt_events(&self) -> Option<Receiver<InterruptEvent>> {
        None
    }
}
