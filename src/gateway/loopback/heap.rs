/*!
 * Loopback Heap
 * Best-fit free list backing the simulated device's malloc/free
 */

use crate::core::limits::DEVICE_HEAP_ALIGNMENT;
use crate::core::types::{Address, Size};
use std::collections::{BTreeMap, HashMap};

/// Free block for address recycling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct FreeBlock {
    pub address: Address,
    pub size: Size,
}

/// Heap over a fixed window of device RAM
///
/// - Free blocks indexed by size for O(log n) best-fit lookup
/// - Larger blocks are split; the remainder returns to the free list
/// - Adjacent free blocks are coalesced on every free
#[derive(Debug)]
pub(super) struct LoopbackHeap {
    free_by_size: BTreeMap<Size, Vec<FreeBlock>>,
    allocated: HashMap<Address, Size>,
    capacity: Size,
}

impl LoopbackHeap {
    pub fn new(base: Address, capacity: Size) -> Self {
        let mut heap = Self {
            free_by_size: BTreeMap::new(),
            allocated: HashMap::new(),
            capacity,
        };
        heap.insert(FreeBlock {
            address: base,
            size: capacity,
        });
        heap
    }

    fn insert(&mut self, block: FreeBlock) {
        self.free_by_size.entry(block.size).or_default().push(block);
    }

    fn take_best_fit(&mut self, size: Size) -> Option<FreeBlock> {
        let block_size = *self.free_by_size.range(size..).next()?.0;
        let blocks = self.free_by_size.get_mut(&block_size)?;
        let block = blocks.pop();
        if blocks.is_empty() {
            self.free_by_size.remove(&block_size);
        }
        block
    }

    /// Allocate `size` bytes, rounded up to the heap alignment
    ///
    /// Zero-byte requests still receive a distinct minimum-size block.
    pub fn malloc(&mut self, size: Size) -> Option<Address> {
        let rounded = size
            .max(1)
            .checked_next_multiple_of(DEVICE_HEAP_ALIGNMENT)?;
        let block = self.take_best_fit(rounded)?;

        if block.size > rounded {
            self.insert(FreeBlock {
                address: block.address + rounded as Address,
                size: block.size - rounded,
            });
        }

        self.allocated.insert(block.address, rounded);
        Some(block.address)
    }

    /// Free a block; `false` if `address` was not allocated
    pub fn free(&mut self, address: Address) -> bool {
        let Some(size) = self.allocated.remove(&address) else {
            return false;
        };
        self.insert(FreeBlock { address, size });
        self.coalesce();
        true
    }

    fn coalesce(&mut self) {
        let mut blocks: Vec<FreeBlock> = std::mem::take(&mut self.free_by_size)
            .into_values()
            .flatten()
            .collect();
        blocks.sort_by_key(|b| b.address);

        let mut merged: Vec<FreeBlock> = Vec::with_capacity(blocks.len());
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.address as u64 + last.size as u64 == block.address as u64 => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }

        for block in merged {
            self.insert(block);
        }
    }

    pub fn used_bytes(&self) -> Size {
        self.allocated.values().sum()
    }

    pub fn free_bytes(&self) -> Size {
        self.capacity - self.used_bytes()
    }

    pub fn live_blocks(&self) -> usize {
        self.allocated.len()
    }
}
