/*!
 * Memory Module
 * Device memory allocation and ranges
 */

pub mod guard;
pub mod heap;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use guard::DeviceRangeGuard;
pub use heap::{DeviceHeap, HeapUsage};
pub use traits::*;
pub use types::*;
