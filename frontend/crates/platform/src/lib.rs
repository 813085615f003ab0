//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations for the client:
//! - Cookie building and parsing
//! - HTTP client construction (timeouts, user agent, cookie jar)

pub mod client;
pub mod cookie;
