/*!
 * Monitoring Module
 * Structured logging setup
 */

pub mod tracer;

pub use tracer::{generate_trace_id, init_tracing, init_tracing_with};
