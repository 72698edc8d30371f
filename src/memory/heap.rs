/*!
 * Device Heap
 * Host-side handle to the device allocator, reached through remote calls
 */

use super::traits::DeviceAllocator;
use super::types::{MemoryError, MemoryResult};
use crate::core::limits::NULL_ADDRESS;
use crate::core::types::{Address, Size, Word};
use crate::gateway::{ops, GatewayError, ReturnKind, SharedGateway};
use ahash::RandomState;
use dashmap::DashMap;
use tracing::{info, warn};

/// Snapshot of blocks this host currently holds on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeapUsage {
    pub live_blocks: usize,
    pub live_bytes: Size,
}

/// Device heap reached through `malloc`/`free` remote calls
pub struct DeviceHeap {
    gateway: SharedGateway,
    // Blocks handed out by this host, for usage reporting only
    live: DashMap<Address, Size, RandomState>,
}

impl DeviceHeap {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            live: DashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn usage(&self) -> HeapUsage {
        HeapUsage {
            live_blocks: self.live.len(),
            live_bytes: self.live.iter().map(|e| *e.value()).sum(),
        }
    }

    /// Size of a block this host allocated, if still live
    pub fn block_size(&self, address: Address) -> Option<Size> {
        self.live.get(&address).map(|e| *e.value())
    }
}

impl DeviceAllocator for DeviceHeap {
    fn allocate(&self, total_bytes: Size) -> MemoryResult<Address> {
        let reply = self
            .gateway
            .call(ops::MALLOC, ReturnKind::Int, &[total_bytes as Word])?;
        let raw = reply.into_int(ops::MALLOC)?;

        // Only a null reply means exhaustion; anything outside 32 bits is garbage
        let address = Address::try_from(raw).map_err(|_| GatewayError::MalformedReply {
            operation: ops::MALLOC.to_string(),
            expected: ReturnKind::Int,
        })?;
        if address == NULL_ADDRESS {
            warn!(requested = total_bytes, "Device heap exhausted");
            return Err(MemoryError::OutOfDeviceMemory {
                requested: total_bytes,
            });
        }

        self.live.insert(address, total_bytes);
        info!(
            address = format_args!("0x{:08x}", address),
            bytes = total_bytes,
            "Allocated device memory"
        );
        Ok(address)
    }

    fn release(&self, address: Address) -> MemoryResult<()> {
        if self.live.remove(&address).is_none() {
            warn!(
                address = format_args!("0x{:08x}", address),
                "Releasing a block this host did not allocate"
            );
        }

        self.gateway
            .call(ops::FREE, ReturnKind::Void, &[Word::from(address)])?;
        info!(address = format_args!("0x{:08x}", address), "Released device memory");
        Ok(())
    }
}

impl std::fmt::Debug for DeviceHeap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHeap")
            .field("usage", &self.usage())
            .finish()
    }
}
