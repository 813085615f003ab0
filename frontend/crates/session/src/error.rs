//! Gate Error Types
//!
//! This module provides the session gate's error variants and maps them
//! onto the unified `kernel::error::kind::ErrorKind` classification.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Gate-specific result type alias
pub type GateResult<T> = Result<T, GateError>;

/// Gate-specific error variants
#[derive(Debug, Error)]
pub enum GateError {
    /// Input rejected before or by the backend (bad email, short password,
    /// email already registered)
    #[error("{0}")]
    Validation(String),

    /// Credentials or token rejected by the backend
    #[error("{0}")]
    Authentication(String),

    /// The backend accepted the credentials but the account may not sign in
    #[error("Account is disabled")]
    AccountDisabled,

    /// Request could not complete (DNS, connect, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend reachable but temporarily unable to answer (429, 5xx)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Response did not match the expected shape
    #[error("Unexpected response from auth service: {0}")]
    Protocol(String),

    /// Operation needs a session or stored credentials and there are none
    #[error("Not signed in")]
    NotAuthenticated,

    /// Credential store failure
    #[error("Credential store error: {0}")]
    Storage(String),

    /// A later sign-out or sign-in replaced the session while this call
    /// was in flight; its result was discarded
    #[error("Session changed while the request was in flight")]
    Superseded,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::Validation(_) => ErrorKind::UnprocessableEntity,
            GateError::Authentication(_) | GateError::NotAuthenticated => ErrorKind::Unauthorized,
            GateError::AccountDisabled => ErrorKind::Forbidden,
            GateError::Network(_) | GateError::Unavailable(_) => ErrorKind::ServiceUnavailable,
            GateError::Protocol(_) => ErrorKind::BadGateway,
            GateError::Superseded => ErrorKind::Conflict,
            GateError::Storage(_) | GateError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether retrying the same call later can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, GateError::Network(_) | GateError::Unavailable(_))
    }

    /// Whether this failure means the stored credentials are no good and
    /// the session must be cleared
    pub fn clears_session(&self) -> bool {
        matches!(
            self,
            GateError::Authentication(_) | GateError::AccountDisabled
        )
    }

    /// Message suitable for showing inline next to a form
    pub fn user_message(&self) -> String {
        match self {
            GateError::Validation(msg) | GateError::Authentication(msg) => msg.clone(),
            GateError::Network(_) | GateError::Unavailable(_) => {
                "The service is unreachable right now. Please try again.".to_string()
            }
            GateError::Protocol(_) | GateError::Storage(_) | GateError::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            GateError::Storage(msg) => {
                tracing::error!(message = %msg, "Credential store error");
            }
            GateError::Internal(msg) => {
                tracing::error!(message = %msg, "Gate internal error");
            }
            GateError::Protocol(msg) => {
                tracing::error!(message = %msg, "Malformed auth service response");
            }
            GateError::Network(msg) | GateError::Unavailable(msg) => {
                tracing::warn!(message = %msg, "Auth service unreachable");
            }
            GateError::AccountDisabled => {
                tracing::warn!("Disabled account rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Gate error");
            }
        }
    }
}

impl From<AppError> for GateError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            GateError::Validation(err.message().to_string())
        } else {
            GateError::Internal(err.to_string())
        }
    }
}
