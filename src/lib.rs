/*!
 * MCU Remote
 * Host-side access to a microcontroller's RAM and interrupts over remote calls
 */

pub mod array;
pub mod core;
pub mod gateway;
pub mod interrupts;
pub mod memory;
pub mod monitoring;
pub mod peripherals;
pub mod session;

// Re-exports
pub use array::{InitialValues, RemoteArray, Value};
pub use crate::core::{HostConfig, RemoteError, RemoteResult};
pub use gateway::{LoopbackDevice, RemoteCall, ReturnKind, SerializedGateway, Transport};
pub use interrupts::{InterruptDispatcher, InterruptTable};
pub use memory::{DeviceAllocator, DeviceHeap, ElementWidth};
pub use monitoring::{init_tracing, init_tracing_with};
pub use peripherals::Peripherals;
pub use session::DeviceSession;
