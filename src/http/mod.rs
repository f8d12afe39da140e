//! HTTP protocol layer module
//!
//! Response builders, MIME lookup and cache validation shared by the
//! frontend and upload handlers.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    attachment_disposition, build_304_response, build_404_response, build_405_response,
    build_413_response, build_attachment_response, build_health_response, build_options_response,
    build_text_response,
};
