use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Claims read from an identity provider JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// A JWT kept alongside its decoded claims. The signature is not checked;
/// the remote services do that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JwtToken {
    raw: String,
    claims: TokenClaims,
}

impl JwtToken {
    pub fn parse(raw: impl Into<String>) -> Result<Self, AuthError> {
        let raw = raw.into();
        let mut parts = raw.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(AuthError::InvalidToken("expected three segments".into())),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|err| AuthError::InvalidToken(err.to_string()))?;
        let claims: TokenClaims = serde_json::from_slice(&bytes)
            .map_err(|err| AuthError::InvalidToken(err.to_string()))?;

        Ok(Self { raw, claims })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.claims.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

impl TryFrom<String> for JwtToken {
    type Error = AuthError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<JwtToken> for String {
    fn from(token: JwtToken) -> Self {
        token.raw
    }
}

/// Tokens issued for one sign-in. Replaced as a whole, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id_token: JwtToken,
    pub access_token: JwtToken,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AuthSession {
    pub fn from_raw(
        id_token: &str,
        access_token: &str,
        refresh_token: Option<String>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            id_token: JwtToken::parse(id_token)?,
            access_token: JwtToken::parse(access_token)?,
            refresh_token,
        })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.id_token.is_expired_at(now) && !self.access_token.is_expired_at(now)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn email(&self) -> Option<&str> {
        self.id_token.claims().email.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Unsigned JWT carrying the given claims.
    pub fn token(email: Option<&str>, exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = serde_json::json!({ "sub": "user-1", "email": email, "exp": exp });
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.sig")
    }

    pub fn session(email: &str, exp: i64) -> AuthSession {
        AuthSession::from_raw(
            &token(Some(email), exp),
            &token(None, exp),
            Some("refresh".into()),
        )
        .unwrap()
    }

    pub fn valid_session(email: &str) -> AuthSession {
        session(email, Utc::now().timestamp() + 3600)
    }
}
