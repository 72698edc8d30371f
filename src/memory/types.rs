/*!
 * Memory Types
 * Common types for device memory management
 */

use crate::core::types::{Address, Size, Word};
use crate::gateway::GatewayError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Device memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Out of device memory: requested {requested} bytes")]
    OutOfDeviceMemory { requested: Size },

    #[error("Range of {length} x {width}-byte elements does not fit the device address space")]
    AddressOverflow { length: Size, width: Size },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Width of a single array element on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ElementWidth {
    Byte = 1,
    HalfWord = 2,
    Word = 4,
}

impl ElementWidth {
    /// Map a byte count onto a supported width
    pub fn from_bytes(bytes: Size) -> Option<Self> {
        match bytes {
            1 => Some(ElementWidth::Byte),
            2 => Some(ElementWidth::HalfWord),
            4 => Some(ElementWidth::Word),
            _ => None,
        }
    }

    #[inline]
    pub const fn bytes(self) -> Size {
        self as Size
    }

    /// Bit mask selecting the low `bytes()` bytes
    #[inline]
    pub const fn mask(self) -> u64 {
        match self {
            ElementWidth::Byte => 0xFF,
            ElementWidth::HalfWord => 0xFFFF,
            ElementWidth::Word => 0xFFFF_FFFF,
        }
    }

    /// Truncate a value to this width, as the device stores it
    #[inline]
    pub const fn truncate(self, value: Word) -> Word {
        (value as u64 & self.mask()) as Word
    }
}

impl TryFrom<Size> for ElementWidth {
    type Error = Size;

    fn try_from(bytes: Size) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes).ok_or(bytes)
    }
}

impl std::fmt::Display for ElementWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}B", self.bytes())
    }
}

/// Contiguous block of device RAM holding `length` elements of `width` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRange {
    pub base_address: Address,
    pub width: ElementWidth,
    pub length: Size,
}

impl DeviceRange {
    pub fn new(base_address: Address, width: ElementWidth, length: Size) -> Self {
        Self {
            base_address,
            width,
            length,
        }
    }

    /// Bytes needed for `length` elements, rejecting sizes past the 32-bit space
    pub fn byte_len_for(width: ElementWidth, length: Size) -> MemoryResult<Size> {
        width
            .bytes()
            .checked_mul(length)
            .filter(|total| *total as u64 <= u64::from(Address::MAX))
            .ok_or(MemoryError::AddressOverflow {
                length,
                width: width.bytes(),
            })
    }

    #[inline]
    pub fn byte_len(&self) -> Size {
        self.width.bytes() * self.length
    }

    /// Device address of element `index`
    ///
    /// Callers bounds-check `index` first; the device allocator guarantees the
    /// whole range lies inside the address space.
    #[inline]
    pub fn address_of(&self, index: Size) -> Address {
        self.base_address
            .wrapping_add((self.width.bytes() * index) as Address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_from_bytes() {
        assert_eq!(ElementWidth::from_bytes(2), Some(ElementWidth::HalfWord));
        assert_eq!(ElementWidth::from_bytes(3), None);
        assert_eq!(ElementWidth::try_from(8), Err(8));
    }

    #[test]
    fn test_truncate_masks_to_width() {
        assert_eq!(ElementWidth::Byte.truncate(0x1FF), 0xFF);
        assert_eq!(ElementWidth::HalfWord.truncate(-1), 0xFFFF);
        assert_eq!(ElementWidth::Word.truncate(0x1_2345_6789), 0x2345_6789);
    }

    #[test]
    fn test_address_of_scales_by_width() {
        let range = DeviceRange::new(0x1000_0000, ElementWidth::Word, 4);
        assert_eq!(range.address_of(0), 0x1000_0000);
        assert_eq!(range.address_of(3), 0x1000_000C);
        assert_eq!(range.byte_len(), 16);
    }

    #[test]
    fn test_byte_len_overflow_rejected() {
        assert!(DeviceRange::byte_len_for(ElementWidth::Word, usize::MAX / 2).is_err());
        assert_eq!(DeviceRange::byte_len_for(ElementWidth::HalfWord, 3), Ok(6));
    }
}
