//! Value Object Module

pub mod email;
pub mod password;
pub mod token;
pub mod user_role;
pub mod user_status;
