//! Application Layer
//!
//! Use cases and the session gate that owns them.

pub mod config;
pub mod gate;
pub mod hydrate;
pub mod refresh;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub(crate) mod state;

// Re-exports
pub use config::GateConfig;
pub use gate::SessionGate;
pub use hydrate::HydrateUseCase;
pub use refresh::RefreshUseCase;
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
