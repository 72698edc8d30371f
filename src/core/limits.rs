/*!
 * System Limits and Constants
 *
 * Centralized location for device geometry, channel sizes and defaults.
 * Grouped by domain; values marked [LPC17XX] follow the RoboVero's LPC1769.
 */

use super::types::{Address, IrqNumber, Size};

// =============================================================================
// DEVICE MEMORY
// =============================================================================

/// Start of the on-chip local SRAM block
/// [LPC17XX] Local SRAM is mapped at 0x1000_0000
pub const DEFAULT_DEVICE_RAM_BASE: Address = 0x1000_0000;

/// Size of the local SRAM block (32KB)
/// [LPC17XX]
pub const DEFAULT_DEVICE_RAM_SIZE: Size = 32 * 1024;

/// Granularity of device heap allocations
/// Keeps every block word aligned so 4-byte cells never straddle a boundary
pub const DEVICE_HEAP_ALIGNMENT: Size = 4;

/// Address returned by the device allocator when it cannot satisfy a request
pub const NULL_ADDRESS: Address = 0;

// =============================================================================
// INTERRUPTS
// =============================================================================

/// Number of peripheral interrupt lines on the device
/// [LPC17XX] IRQ 0 (WDT) through IRQ 34 (CANActivity)
pub const DEFAULT_INTERRUPT_LINES: IrqNumber = 35;

/// Capacity of the inbound interrupt event channel
/// Events beyond this are rejected at the source rather than blocking the link reader
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Name given to the dispatcher thread
pub const DISPATCHER_THREAD_NAME: &str = "mcu-irq-dispatch";

// =============================================================================
// LOOPBACK DEVICE
// =============================================================================

/// Most recent calls the loopback device keeps in its journal
/// Older entries are evicted first
pub const LOOPBACK_JOURNAL_CAPACITY: usize = 4096;
