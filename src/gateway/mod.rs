/*!
 * Gateway Module
 * Remote call boundary between host code and the device
 */

pub mod loopback;
pub mod serialized;
pub mod traits;
pub mod types;

// Re-export public API
pub use loopback::{JournalEntry, LoopbackDevice};
pub use serialized::{GatewayStats, SerializedGateway};
pub use traits::{RemoteCall, SharedGateway, Transport};
pub use types::{
    ops, CallRequest, GatewayError, GatewayResult, InterruptEvent, Reply, ReturnKind,
};
