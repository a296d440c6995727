use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Error codes that mean the caller's credentials are no longer accepted.
const EXPIRED_CODES: [&str; 4] = [
    "ExpiredTokenException",
    "ExpiredToken",
    "TokenRefreshRequired",
    "NotAuthorizedException",
];

#[derive(Debug, Error)]
pub enum AwsError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Service(ServiceError),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AwsError {
    pub fn is_credential_expired(&self) -> bool {
        match self {
            AwsError::Service(err) => err.is_credential_expired(),
            _ => false,
        }
    }

    /// Message suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            AwsError::Service(err) if !err.message.is_empty() => err.message.clone(),
            other => other.to_string(),
        }
    }
}

/// A structured error returned by an AWS endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl ServiceError {
    /// Build from the status, the optional `x-amzn-ErrorType` header and the body.
    pub fn parse(status: u16, error_type_header: Option<&str>, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let (body_kind, message) = match parsed {
            Some(body) => (body.kind, body.message),
            None => (None, None),
        };

        let code = error_type_header
            .map(str::to_string)
            .or(body_kind)
            .map(|raw| normalize_code(&raw))
            .unwrap_or_else(|| format!("Http{status}"));

        let message = message.unwrap_or_else(|| body.trim().to_string());

        Self {
            status,
            code,
            message,
        }
    }

    pub fn is_credential_expired(&self) -> bool {
        EXPIRED_CODES.contains(&self.code.as_str()) || mentions_expired_token(&self.message)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status, self.message)
    }
}

// "com.amazonaws.cognito#NotAuthorizedException" and
// "ExpiredTokenException:http://internal.amazon.com/" both reduce to the bare name.
fn normalize_code(raw: &str) -> String {
    let name = raw.rsplit('#').next().unwrap_or(raw);
    let name = name.split(':').next().unwrap_or(name);
    name.trim().to_string()
}

fn mentions_expired_token(message: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)\b(token|credentials?)\b.*\bexpired\b|\bexpired\b.*\b(token|credentials?)\b")
                .map_err(|err| log::error!("Invalid expiry pattern: {err}"))
                .ok()
        })
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(message))
}
