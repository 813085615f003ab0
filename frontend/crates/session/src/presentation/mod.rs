//! Presentation Layer
//!
//! Route guarding for the view layer.

pub mod guard;

pub use guard::{GuardOutcome, RouteGuard};
