//! HTTP request handlers.

pub mod export;
pub mod notion;
