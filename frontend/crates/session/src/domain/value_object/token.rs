//! Token Value Objects
//!
//! Opaque bearer strings issued by the backend. The gate never looks
//! inside them; `Debug` output is redacted so they stay out of logs.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn expose(&self) -> &str {
                &self.0
            }

            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "(***)"))
            }
        }
    };
}

opaque_token!(
    /// Short-lived token sent as `Authorization: Bearer ...`
    AccessToken
);

opaque_token!(
    /// Long-lived token exchanged at `/auth/refresh`
    RefreshToken
);
