/*!
 * Serialized Gateway
 * One call in flight per transport, with tracing and counters
 */

use super::traits::{RemoteCall, Transport};
use super::types::{CallRequest, GatewayError, GatewayResult, InterruptEvent, Reply, ReturnKind};
use crate::core::types::Word;
use crate::monitoring::generate_trace_id;
use flume::Receiver;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, debug_span, warn};

/// Gateway call counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GatewayStats {
    pub calls: u64,
    pub failures: u64,
}

/// Lock-free call counters
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
#[repr(C, align(64))]
#[derive(Default)]
struct AtomicGatewayStats {
    calls: AtomicU64,
    failures: AtomicU64,
}

impl AtomicGatewayStats {
    #[inline(always)]
    fn inc_calls(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> GatewayStats {
        GatewayStats {
            calls: self.calls.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Gateway that serializes every call onto a single transport
///
/// Callers on different threads (main flow and interrupt handlers) queue on the
/// transport lock, so the link never sees two outstanding requests.
pub struct SerializedGateway<T: Transport> {
    transport: Mutex<T>,
    events: Option<Receiver<InterruptEvent>>,
    stats: AtomicGatewayStats,
}

impl<T: Transport> SerializedGateway<T> {
    pub fn new(transport: T) -> Self {
        let events = transport.interrupt_events();
        Self {
            transport: Mutex::new(transport),
            events,
            stats: AtomicGatewayStats::default(),
        }
    }

    /// Inbound interrupt notifications carried by the transport
    pub fn interrupt_events(&self) -> Option<Receiver<InterruptEvent>> {
        self.events.clone()
    }

    pub fn stats(&self) -> GatewayStats {
        self.stats.snapshot()
    }
}

impl<T: Transport> RemoteCall for SerializedGateway<T> {
    fn call(&self, operation: &str, kind: ReturnKind, args: &[Word]) -> GatewayResult<Reply> {
        let call_id = generate_trace_id();
        let span = debug_span!("remote_call", %call_id, operation, %kind);
        let _enter = span.enter();

        self.stats.inc_calls();
        let request = CallRequest {
            operation,
            kind,
            args,
        };

        let result = self
            .transport
            .lock()
            .exchange(&request)
            .and_then(|reply| {
                if reply.kind() == kind {
                    Ok(reply)
                } else {
                    Err(GatewayError::MalformedReply {
                        operation: operation.to_string(),
                        expected: kind,
                    })
                }
            });

        match &result {
            Ok(reply) => debug!(?args, ?reply, "Remote call completed"),
            Err(e) => {
                self.stats.inc_failures();
                warn!(?args, error = %e, "Remote call failed");
            }
        }
        result
    }
}
