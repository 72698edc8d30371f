/*!
 * Device Session
 * Wires a gateway, the device heap and interrupt dispatch together
 */

use crate::array::{InitialValues, RemoteArray};
use crate::core::types::{IrqNumber, RemoteResult, Size};
use crate::gateway::{InterruptEvent, SerializedGateway, SharedGateway, Transport};
use crate::interrupts::{InterruptDispatcher, InterruptTable};
use crate::memory::{DeviceAllocator, DeviceHeap, ElementWidth};
use crate::peripherals::Peripherals;
use flume::Receiver;
use std::sync::Arc;
use tracing::info;

/// Everything client code needs to work with one device
///
/// # Example
///
/// ```ignore
/// let device = LoopbackDevice::new(&HostConfig::default());
/// let session = DeviceSession::connect(device)?;
/// let buffer = session.array(16, ElementWidth::Byte, "hello")?;
/// session.register_callback(4, || println!("timer fired"));
/// ```
pub struct DeviceSession {
    gateway: SharedGateway,
    heap: Arc<DeviceHeap>,
    interrupts: Arc<InterruptTable>,
    dispatcher: Option<InterruptDispatcher>,
}

impl DeviceSession {
    /// Serialize calls onto `transport` and start interrupt dispatch if it carries events
    pub fn connect<T: Transport + 'static>(transport: T) -> RemoteResult<Self> {
        let gateway = SerializedGateway::new(transport);
        let events = gateway.interrupt_events();
        let mut session = Self::new(Arc::new(gateway));
        if let Some(events) = events {
            session.start_dispatch(events)?;
        }
        Ok(session)
    }

    /// Session over an existing gateway, without interrupt dispatch
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            heap: Arc::new(DeviceHeap::new(gateway.clone())),
            gateway,
            interrupts: Arc::new(InterruptTable::new()),
            dispatcher: None,
        }
    }

    /// Deliver events from `events` to this session's handlers
    ///
    /// Replaces any dispatcher already running.
    pub fn start_dispatch(&mut self, events: Receiver<InterruptEvent>) -> RemoteResult<()> {
        if let Some(previous) = self.dispatcher.take() {
            previous.shutdown()?;
        }
        self.dispatcher = Some(InterruptDispatcher::spawn(self.interrupts.clone(), events)?);
        Ok(())
    }

    /// Allocate a device array
    pub fn array(
        &self,
        length: Size,
        width: ElementWidth,
        initial: impl Into<InitialValues>,
    ) -> RemoteResult<RemoteArray> {
        RemoteArray::new(
            self.gateway.clone(),
            self.heap.clone() as Arc<dyn DeviceAllocator>,
            length,
            width,
            initial,
        )
    }

    /// Run `handler` whenever the device reports interrupt `irq`
    ///
    /// Replaces any handler already registered for `irq`. Enabling the
    /// interrupt on the device is a separate remote call.
    pub fn register_callback<F>(&self, irq: IrqNumber, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.interrupts.register(irq, handler);
    }

    pub fn peripherals(&self) -> Peripherals {
        Peripherals::new(self.gateway.clone())
    }

    pub fn gateway(&self) -> &SharedGateway {
        &self.gateway
    }

    pub fn heap(&self) -> &Arc<DeviceHeap> {
        &self.heap
    }

    pub fn interrupts(&self) -> &Arc<InterruptTable> {
        &self.interrupts
    }

    pub fn is_dispatching(&self) -> bool {
        self.dispatcher.as_ref().is_some_and(|d| d.is_running())
    }

    /// Stop interrupt dispatch; arrays still alive keep working
    pub fn shutdown(mut self) -> RemoteResult<()> {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.shutdown()?;
        }
        info!("Device session closed");
        Ok(())
    }
}
