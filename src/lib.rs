//! squeeze: a small HTTP front end that hands uploaded images and PDFs to
//! external compression scripts and returns whatever file they produce.

pub mod config;
pub mod dispatch;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

#[cfg(test)]
mod test_utils;
