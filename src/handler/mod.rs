//! Request handler module
//!
//! Responsible for request routing dispatch: the `/compress` upload endpoint,
//! the landing page and frontend assets, and health checks.

pub mod compress;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
