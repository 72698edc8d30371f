/*!
 * Device Range Guard
 * Owns a block of device RAM and frees it when dropped
 */

use super::traits::DeviceAllocator;
use super::types::{DeviceRange, ElementWidth, MemoryResult};
use crate::core::types::{Address, Size};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Scoped device memory with automatic release
///
/// The block is freed through the allocator exactly once: by [`release`](Self::release),
/// which consumes the guard, or on drop. Drop-time failures are logged, never
/// propagated or retried.
pub struct DeviceRangeGuard {
    range: DeviceRange,
    allocator: Arc<dyn DeviceAllocator>,
    acquired_at: Instant,
    active: bool,
}

impl DeviceRangeGuard {
    /// Allocate `width * length` bytes on the device and guard them
    pub fn acquire(
        allocator: Arc<dyn DeviceAllocator>,
        width: ElementWidth,
        length: Size,
    ) -> MemoryResult<Self> {
        let total_bytes = DeviceRange::byte_len_for(width, length)?;
        let base_address = allocator.allocate(total_bytes)?;

        debug!(
            base = format_args!("0x{:08x}", base_address),
            bytes = total_bytes,
            "Device range acquired"
        );

        Ok(Self {
            range: DeviceRange::new(base_address, width, length),
            allocator,
            acquired_at: Instant::now(),
            active: true,
        })
    }

    #[inline]
    pub fn range(&self) -> &DeviceRange {
        &self.range
    }

    #[inline]
    pub fn base_address(&self) -> Address {
        self.range.base_address
    }

    /// Free the block now and report the outcome
    pub fn release(mut self) -> MemoryResult<()> {
        self.free()
    }

    fn free(&mut self) -> MemoryResult<()> {
        // Deactivate first: a failed free is never retried
        self.active = false;
        self.allocator.release(self.range.base_address)?;

        debug!(
            base = format_args!("0x{:08x}", self.range.base_address),
            held_us = self.acquired_at.elapsed().as_micros() as u64,
            "Device range released"
        );
        Ok(())
    }
}

impl Drop for DeviceRangeGuard {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(e) = self.free() {
            error!(
                base = format_args!("0x{:08x}", self.range.base_address),
                bytes = self.range.byte_len(),
                error = %e,
                "Device range release failed during drop"
            );
        }
    }
}

impl std::fmt::Debug for DeviceRangeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRangeGuard")
            .field("range", &self.range)
            .field("active", &self.active)
            .finish()
    }
}
