use async_trait::async_trait;
use serde_json::{Map, Value};

use super::error::AuthError;
use super::session::AuthSession;

/// State needed to answer a `NEW_PASSWORD_REQUIRED` challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPasswordChallenge {
    pub username: String,
    pub session: String,
    pub user_attributes: Map<String, Value>,
    pub required_attributes: Vec<String>,
}

/// Result of an interactive sign-in step.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    SignedIn(AuthSession),
    NewPasswordRequired(NewPasswordChallenge),
    Failed(String),
}

/// The hosted identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> AuthOutcome;

    async fn complete_new_password(
        &self,
        challenge: &NewPasswordChallenge,
        new_password: &str,
    ) -> AuthOutcome;

    /// The remembered user's session, refreshed first if it has expired.
    /// `None` when nobody is signed in.
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError>;

    /// Reissue tokens for the remembered user without asking for credentials.
    async fn refresh_session(&self) -> Result<Option<AuthSession>, AuthError>;

    /// Forget the remembered user.
    fn sign_out(&self);
}
