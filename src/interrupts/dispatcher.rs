/*!
 * Interrupt Dispatcher
 * Drains inbound interrupt events on a dedicated thread
 */

use super::table::InterruptTable;
use super::types::{InterruptError, InterruptResult};
use crate::core::limits::DISPATCHER_THREAD_NAME;
use crate::gateway::InterruptEvent;
use flume::{Receiver, Selector, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

enum Step {
    Event(InterruptEvent),
    Stop,
}

/// Background delivery of device interrupts to an [`InterruptTable`]
///
/// Events are handled one at a time in arrival order; a slow handler delays
/// the ones behind it. The thread stops on [`shutdown`](Self::shutdown), on
/// drop, or when the event source disconnects.
pub struct InterruptDispatcher {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl InterruptDispatcher {
    pub fn spawn(
        table: Arc<InterruptTable>,
        events: Receiver<InterruptEvent>,
    ) -> InterruptResult<Self> {
        let (stop_tx, stop_rx) = flume::bounded::<()>(1);

        let handle = std::thread::Builder::new()
            .name(DISPATCHER_THREAD_NAME.to_string())
            .spawn(move || run(&table, &events, &stop_rx))
            .map_err(|e| InterruptError::SpawnFailed(e.to_string()))?;

        info!("Interrupt dispatcher started");
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the dispatcher and wait for the current handler to return
    pub fn shutdown(mut self) -> InterruptResult<()> {
        self.stop()
    }

    fn stop(&mut self) -> InterruptResult<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Disconnecting the stop channel wakes the selector as well
            let _ = stop_tx.try_send(());
        }
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| InterruptError::DispatcherPanicked),
            None => Ok(()),
        }
    }
}

fn run(table: &InterruptTable, events: &Receiver<InterruptEvent>, stop_rx: &Receiver<()>) {
    loop {
        let step = Selector::new()
            .recv(events, |msg| match msg {
                Ok(event) => Step::Event(event),
                Err(_) => Step::Stop,
            })
            .recv(stop_rx, |_| Step::Stop)
            .wait();

        match step {
            Step::Event(event) => {
                table.dispatch(event.irq);
            }
            Step::Stop => break,
        }
    }
    debug!("Interrupt dispatcher exiting");
}

impl Drop for InterruptDispatcher {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "Interrupt dispatcher did not stop cleanly");
        }
    }
}
