/*!
 * Remote Array
 * Bounds-checked, element-typed view over a block of device RAM
 */

use super::init::InitialValues;
use super::value::Value;
use crate::core::errors::RemoteError;
use crate::core::types::{Address, RemoteResult, Size, Word};
use crate::gateway::{ops, ReturnKind, SharedGateway};
use crate::memory::{DeviceAllocator, DeviceRange, DeviceRangeGuard, ElementWidth};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Array living in device RAM
///
/// Every element access is one remote round trip; nothing is cached on the
/// host. The device block is freed exactly once when the array is dropped,
/// including after failed accesses or a failed initialization.
///
/// Elements never written read back whatever the device allocator left
/// there; do not assume zero fill.
///
/// # Example
///
/// ```ignore
/// let array = RemoteArray::new(gateway, heap, 4, ElementWidth::Byte, [10, 20, 30])?;
/// assert_eq!(array.get(1)?, 20);
/// array.set(3, 40)?;
/// ```
pub struct RemoteArray {
    guard: DeviceRangeGuard,
    gateway: SharedGateway,
}

impl RemoteArray {
    /// Allocate `length` elements of `width` bytes and write `initial` into them
    ///
    /// Initialization is one write per element and is not atomic: on a failed
    /// write the error is returned and the already allocated block is released
    /// as the partial array is dropped.
    #[instrument(skip(gateway, allocator, initial))]
    pub fn new(
        gateway: SharedGateway,
        allocator: Arc<dyn DeviceAllocator>,
        length: Size,
        width: ElementWidth,
        initial: impl Into<InitialValues>,
    ) -> RemoteResult<Self> {
        if length == 0 {
            return Err(RemoteError::InvalidLength(length));
        }

        let guard = DeviceRangeGuard::acquire(allocator, width, length)?;
        let array = Self { guard, gateway };

        for (index, value) in initial.into().writes(length) {
            array.write_cell(index, value)?;
        }

        debug!(
            base = format_args!("0x{:08x}", array.base_address()),
            length,
            "Remote array ready"
        );
        Ok(array)
    }

    /// Like [`new`](Self::new) with the width given as a byte count
    pub fn with_width_bytes(
        gateway: SharedGateway,
        allocator: Arc<dyn DeviceAllocator>,
        length: Size,
        width_bytes: Size,
        initial: impl Into<InitialValues>,
    ) -> RemoteResult<Self> {
        let width = ElementWidth::from_bytes(width_bytes)
            .ok_or(RemoteError::UnsupportedWidth(width_bytes))?;
        Self::new(gateway, allocator, length, width, initial)
    }

    /// Read element `index` from the device
    ///
    /// Values come back zero-extended from the element width.
    pub fn get(&self, index: Size) -> RemoteResult<Word> {
        let address = self.checked_address(index)?;
        let reply = self.gateway.call(
            ops::DEREF,
            ReturnKind::Int,
            &[Word::from(address), self.width().bytes() as Word],
        )?;
        Ok(reply.into_int(ops::DEREF)?)
    }

    /// Write `value` to element `index` on the device
    ///
    /// The device keeps the low `width` bytes of the value.
    pub fn set(&self, index: Size, value: impl Into<Value>) -> RemoteResult<()> {
        self.checked_address(index)?;
        let value = value.into();
        let raw = value
            .as_integral()
            .ok_or_else(|| RemoteError::InvalidValueType {
                kind: value.kind().to_string(),
            })?;
        self.write_cell(index, raw)
    }

    /// Read every element, one call each
    pub fn to_vec(&self) -> RemoteResult<Vec<Word>> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    #[inline]
    pub fn len(&self) -> Size {
        self.range().length
    }

    /// Always false; arrays hold at least one element
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn width(&self) -> ElementWidth {
        self.range().width
    }

    #[inline]
    pub fn base_address(&self) -> Address {
        self.guard.base_address()
    }

    #[inline]
    pub fn range(&self) -> &DeviceRange {
        self.guard.range()
    }

    fn checked_address(&self, index: Size) -> RemoteResult<Address> {
        if index >= self.len() {
            return Err(RemoteError::IndexOutOfRange {
                index,
                length: self.len(),
            });
        }
        Ok(self.range().address_of(index))
    }

    fn write_cell(&self, index: Size, value: Word) -> RemoteResult<()> {
        let address = self.checked_address(index)?;
        self.gateway.call(
            ops::DEREF,
            ReturnKind::Void,
            &[Word::from(address), self.width().bytes() as Word, value],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for RemoteArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteArray")
            .field("range", self.range())
            .finish()
    }
}
