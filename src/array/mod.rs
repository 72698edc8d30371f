/*!
 * Array Module
 * Remote arrays over device memory
 */

mod init;
mod remote_array;
mod value;

// Re-export public API
pub use init::InitialValues;
pub use remote_array::RemoteArray;
pub use value::Value;
