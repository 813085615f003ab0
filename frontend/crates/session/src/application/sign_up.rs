//! Sign Up Use Case
//!
//! Registers a marketplace account and signs it in.

use std::sync::Arc;

use crate::application::sign_in::SignInUseCase;
use crate::application::state::GateContext;
use crate::domain::entity::session::Session;
use crate::domain::repository::{AuthApi, CredentialStore, Registration};
use crate::domain::value_object::{email::Email, password::Password, user_role::UserRole};
use crate::error::{GateError, GateResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    /// Customer or freelancer
    pub role: UserRole,
}

/// Sign up use case
pub struct SignUpUseCase<A, S>
where
    A: AuthApi,
    S: CredentialStore,
{
    ctx: Arc<GateContext<A, S>>,
}

impl<A, S> SignUpUseCase<A, S>
where
    A: AuthApi + Send + Sync + 'static,
    S: CredentialStore + Send + Sync + 'static,
{
    pub(crate) fn new(ctx: Arc<GateContext<A, S>>) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self, input: SignUpInput) -> GateResult<Session> {
        let email = Email::new(&input.email)?;
        let password = Password::for_sign_up(input.password)?;

        if !input.role.is_self_service() {
            return Err(GateError::Validation(format!(
                "Accounts with role {} cannot be created here",
                input.role
            )));
        }

        let generation = self.ctx.cell.generation();
        let registration = self
            .ctx
            .api
            .register(&email, &password, input.role)
            .await
            .inspect_err(GateError::log)?;

        match registration {
            Registration::Granted(grant) => {
                let session = self.ctx.install_grant(generation, grant).await?;
                tracing::info!(
                    user_id = ?session.user().map(|u| u.id),
                    role = %input.role,
                    "Account created and signed in"
                );
                Ok(session)
            }
            Registration::Created(user) => {
                tracing::info!(user_id = user.id, role = %user.role, "Account created, signing in");
                SignInUseCase::new(self.ctx.clone())
                    .authenticate(generation, &email, &password)
                    .await
            }
        }
    }
}
