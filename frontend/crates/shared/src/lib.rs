//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by the
//! client crates:
//! - Error classification mirroring the backend's HTTP status codes
//! - The unified [`error::app_error::AppError`] type and result alias
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all client crates.

pub mod error {
    pub mod app_error;
    pub mod kind;
}
