/*!
 * Interrupt Dispatch Table
 * Maps interrupt numbers to host-side handlers
 */

use super::types::{InterruptHandler, InterruptStats};
use crate::core::types::IrqNumber;
use ahash::RandomState;
use dashmap::DashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Handler registry consulted when the device reports an interrupt
///
/// At most one handler per interrupt number; registering again replaces it.
/// Numbers are not validated here: a number the device never raises simply
/// never fires.
///
/// # Performance
/// - Cache-line aligned to prevent false sharing of the atomic counters
#[repr(C, align(64))]
pub struct InterruptTable {
    handlers: DashMap<IrqNumber, InterruptHandler, RandomState>,
    dispatched: AtomicU64,
    dropped: AtomicU64,
    panicked: AtomicU64,
}

impl InterruptTable {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::with_hasher(RandomState::new()),
            dispatched: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
        }
    }

    /// Register `handler` for `irq`, returning `true` if one was replaced
    pub fn register<F>(&self, irq: IrqNumber, handler: F) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        let replaced = self.handlers.insert(irq, Arc::new(handler)).is_some();
        if replaced {
            info!(irq, "Replaced interrupt handler");
        } else {
            info!(irq, "Registered interrupt handler");
        }
        replaced
    }

    /// Remove the handler for `irq`
    pub fn unregister(&self, irq: IrqNumber) -> bool {
        let removed = self.handlers.remove(&irq).is_some();
        if removed {
            info!(irq, "Unregistered interrupt handler");
        }
        removed
    }

    pub fn lookup(&self, irq: IrqNumber) -> Option<InterruptHandler> {
        self.handlers.get(&irq).map(|h| Arc::clone(h.value()))
    }

    pub fn is_registered(&self, irq: IrqNumber) -> bool {
        self.handlers.contains_key(&irq)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `irq`, if any; returns whether one ran
    ///
    /// The handler runs after the table entry is released, so it may register
    /// or unregister handlers itself. A panicking handler is contained here and
    /// counted; later interrupts are still delivered.
    pub fn dispatch(&self, irq: IrqNumber) -> bool {
        match self.lookup(irq) {
            Some(handler) => {
                debug!(irq, "Dispatching interrupt");
                if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler())) {
                    self.panicked.fetch_add(1, Ordering::Relaxed);
                    error!(irq, panic = panic_message(&*payload), "Interrupt handler panicked");
                }
                self.dispatched.fetch_add(1, Ordering::Relaxed);
                true
            }
            None => {
                debug!(irq, "No handler registered, interrupt dropped");
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn stats(&self) -> InterruptStats {
        InterruptStats {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            handlers_registered: self.handlers.len(),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl Default for InterruptTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InterruptTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptTable")
            .field("stats", &self.stats())
            .finish()
    }
}
