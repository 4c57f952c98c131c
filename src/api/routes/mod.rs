//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`batch`] - Batch lifecycle and job observation
//! - [`formats`] - Format discovery
//! - [`system`] - Health, events, OpenAPI

mod batch;
mod formats;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use batch::*;
pub use formats::*;
pub use system::*;
