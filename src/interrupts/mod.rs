/*!
 * Interrupts Module
 * Host-side handlers for device interrupts
 */

mod dispatcher;
mod table;
pub mod types;

// Re-export public API
pub use dispatcher::InterruptDispatcher;
pub use table::InterruptTable;
pub use types::{InterruptError, InterruptHandler, InterruptResult, InterruptStats};
