/*!
 * Memory Traits
 * Device memory management abstractions
 */

use super::types::MemoryResult;
use crate::core::types::{Address, Size};

/// Device-side allocator interface
pub trait DeviceAllocator: Send + Sync {
    /// Reserve `total_bytes` contiguous bytes of device RAM
    fn allocate(&self, total_bytes: Size) -> MemoryResult<Address>;

    /// Return a previously allocated block to the device
    fn release(&self, address: Address) -> MemoryResult<()>;
}
