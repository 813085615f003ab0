//! HTTP Auth API
//!
//! `AuthApi` over the backend's REST routes, using the platform client.

use std::sync::Arc;

use chrono::Utc;
use kernel::error::kind::ErrorKind;
use platform::client::{HttpClientConfig, bearer, build_client};
use reqwest::cookie::Jar;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::application::config::GateConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::{AuthApi, AuthGrant, Registration};
use crate::domain::value_object::{
    email::Email,
    password::Password,
    token::{AccessToken, RefreshToken},
    user_role::UserRole,
};
use crate::error::{GateError, GateResult};
use crate::infra::dto::{
    ErrorBody, GoogleLoginRequest, LoginRequest, RefreshRequest, RegisterRequest,
    RegisterResponse, TokenResponse,
};

/// Reqwest-backed Auth API client
#[derive(Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Build a client for `config.api_base_url`, optionally sharing a
    /// cookie jar with a [`CookieCredentialStore`](super::store::CookieCredentialStore)
    pub fn new(config: &GateConfig, jar: Option<Arc<Jar>>) -> GateResult<Self> {
        let client = build_client(&HttpClientConfig::with_timeout(config.request_timeout), jar)
            .map_err(|e| GateError::Internal(e.to_string()))?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, route: &'static str) -> GateResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(route, error = %e, "Auth API request failed");
            GateError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        let message = body
            .message()
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| status.to_string());

        tracing::debug!(route, status = status.as_u16(), code = ?body.code, "Auth API rejected request");
        Err(classify(status, message))
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        route: &'static str,
    ) -> GateResult<T> {
        let response = self.send(request, route).await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                GateError::Protocol(format!("{route}: {e}"))
            } else {
                GateError::Network(e.to_string())
            }
        })
    }

    async fn token_grant<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        route: &'static str,
    ) -> GateResult<AuthGrant> {
        let request = self.client.post(self.endpoint(path)).json(body);
        let tokens: TokenResponse = self.json(request, route).await?;
        Ok(tokens.into_grant(Utc::now()))
    }
}

/// Map a non-success status onto a gate error
fn classify(status: StatusCode, message: String) -> GateError {
    match ErrorKind::from_status_code(status.as_u16()) {
        Some(
            ErrorKind::BadRequest
            | ErrorKind::NotFound
            | ErrorKind::Conflict
            | ErrorKind::UnprocessableEntity,
        ) => GateError::Validation(message),
        Some(ErrorKind::Unauthorized | ErrorKind::Forbidden) => GateError::Authentication(message),
        Some(kind) if kind == ErrorKind::TooManyRequests || kind.is_server_error() => {
            GateError::Unavailable(message)
        }
        _ => GateError::Protocol(format!("unexpected status {status}: {message}")),
    }
}

impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &Email, password: &Password) -> GateResult<AuthGrant> {
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose(),
        };
        self.token_grant("/auth/login", &body, "login").await
    }

    async fn register(
        &self,
        email: &Email,
        password: &Password,
        role: UserRole,
    ) -> GateResult<Registration> {
        let body = RegisterRequest {
            email: email.as_str(),
            password: password.expose(),
            role,
        };
        let request = self.client.post(self.endpoint("/auth/register")).json(&body);
        let response: RegisterResponse = self.json(request, "register").await?;
        Ok(response.into_registration(Utc::now()))
    }

    async fn login_with_google(&self, google_token: &str) -> GateResult<AuthGrant> {
        let body = GoogleLoginRequest { google_token };
        self.token_grant("/auth/google", &body, "google").await
    }

    async fn current_user(&self, token: &AccessToken) -> GateResult<User> {
        let request = self
            .client
            .get(self.endpoint("/auth/me"))
            .header(AUTHORIZATION, bearer(token.expose()));
        self.json(request, "me").await
    }

    async fn logout(&self, token: &AccessToken) -> GateResult<()> {
        let request = self
            .client
            .post(self.endpoint("/auth/logout"))
            .header(AUTHORIZATION, bearer(token.expose()));
        self.send(request, "logout").await?;
        Ok(())
    }

    async fn refresh(&self, refresh_token: &RefreshToken) -> GateResult<AuthGrant> {
        let body = RefreshRequest {
            refresh_token: refresh_token.expose(),
        };
        self.token_grant("/auth/refresh", &body, "refresh").await
    }
}
