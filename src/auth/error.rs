use thiserror::Error;

use crate::aws::AwsError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error(transparent)]
    Remote(#[from] AwsError),
    #[error("identity provider returned no tokens")]
    MissingTokens,
    #[error("session cache error: {0}")]
    Cache(String),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Remote(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}
