//! Request handler module
//!
//! Method validation, access logging, and dispatch into the static file
//! serving logic.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
