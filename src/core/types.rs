/*!
 * Core Types
 * Common types used across the host library
 */

/// Device-side address (the target is a 32-bit microcontroller)
pub type Address = u32;

/// Size type for host-side byte counts and element counts
pub type Size = usize;

/// Hardware interrupt number as reported by the device
pub type IrqNumber = u32;

/// Raw integral argument or reply carried by a remote call
pub type Word = i64;

/// Common result type for operations exposed to client code
pub type RemoteResult<T> = Result<T, super::errors::RemoteError>;
