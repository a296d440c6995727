use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aws::JsonRpcClient;
use crate::config::AppConfig;

use super::cache::SessionCache;
use super::error::AuthError;
use super::provider::{AuthOutcome, IdentityProvider, NewPasswordChallenge};
use super::session::AuthSession;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const NEW_PASSWORD_REQUIRED: &str = "NEW_PASSWORD_REQUIRED";

/// Cognito user pool client for the public (secretless) app client flows.
pub struct CognitoUserPool {
    rpc: JsonRpcClient,
    client_id: String,
    cache: SessionCache,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: HashMap<&'a str, &'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RespondToAuthChallengeRequest<'a> {
    challenge_name: &'a str,
    client_id: &'a str,
    session: &'a str,
    challenge_responses: HashMap<&'a str, &'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
    #[serde(default)]
    session: Option<String>,
    #[serde(default)]
    challenge_parameters: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: Option<String>,
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl CognitoUserPool {
    pub fn new(config: &AppConfig, http: reqwest::Client, cache: SessionCache) -> Self {
        let endpoint = format!("https://cognito-idp.{}.amazonaws.com/", config.region);
        Self {
            rpc: JsonRpcClient::new(http, endpoint, TARGET_PREFIX),
            client_id: config.client_id.clone(),
            cache,
        }
    }

    fn remember(&self, session: &AuthSession) {
        if let Err(err) = self.cache.store(session) {
            log::warn!("Could not cache session: {err}");
        }
    }

    async fn refresh_with(&self, cached: &AuthSession) -> Result<Option<AuthSession>, AuthError> {
        let Some(refresh_token) = cached.refresh_token.as_deref() else {
            log::info!("Cached session has no refresh token");
            return Ok(None);
        };

        let request = InitiateAuthRequest {
            auth_flow: "REFRESH_TOKEN_AUTH",
            client_id: &self.client_id,
            auth_parameters: HashMap::from([("REFRESH_TOKEN", refresh_token)]),
        };
        let response: AuthResponse = self.rpc.call("InitiateAuth", &request).await?;
        let result = response
            .authentication_result
            .ok_or(AuthError::MissingTokens)?;

        // Refresh responses omit the refresh token; keep the one we have.
        let session = session_from(result, cached.refresh_token.clone())?;
        self.remember(&session);
        log::info!("Session refreshed");
        Ok(Some(session))
    }

    fn outcome_from(&self, response: AuthResponse, username: &str) -> AuthOutcome {
        if let Some(result) = response.authentication_result {
            return match session_from(result, None) {
                Ok(session) => {
                    self.remember(&session);
                    AuthOutcome::SignedIn(session)
                }
                Err(err) => AuthOutcome::Failed(err.user_message()),
            };
        }

        match response.challenge_name.as_deref() {
            Some(NEW_PASSWORD_REQUIRED) => {
                AuthOutcome::NewPasswordRequired(challenge_from(username, response))
            }
            Some(other) => AuthOutcome::Failed(format!("Unsupported sign-in challenge: {other}")),
            None => AuthOutcome::Failed(AuthError::MissingTokens.to_string()),
        }
    }
}

#[async_trait]
impl IdentityProvider for CognitoUserPool {
    async fn authenticate(&self, email: &str, password: &str) -> AuthOutcome {
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.client_id,
            auth_parameters: HashMap::from([("USERNAME", email), ("PASSWORD", password)]),
        };

        match self.rpc.call::<_, AuthResponse>("InitiateAuth", &request).await {
            Ok(response) => self.outcome_from(response, email),
            Err(err) => {
                log::warn!("Sign-in failed for {email}: {err}");
                AuthOutcome::Failed(non_empty_or(err.user_message(), "Login failed"))
            }
        }
    }

    async fn complete_new_password(
        &self,
        challenge: &NewPasswordChallenge,
        new_password: &str,
    ) -> AuthOutcome {
        let request = RespondToAuthChallengeRequest {
            challenge_name: NEW_PASSWORD_REQUIRED,
            client_id: &self.client_id,
            session: &challenge.session,
            challenge_responses: HashMap::from([
                ("USERNAME", challenge.username.as_str()),
                ("NEW_PASSWORD", new_password),
            ]),
        };

        match self
            .rpc
            .call::<_, AuthResponse>("RespondToAuthChallenge", &request)
            .await
        {
            Ok(response) => self.outcome_from(response, &challenge.username),
            Err(err) => {
                log::warn!("New password challenge failed: {err}");
                AuthOutcome::Failed(non_empty_or(err.user_message(), "Failed to set password"))
            }
        }
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let Some(cached) = self.cache.load() else {
            return Ok(None);
        };
        if cached.is_valid() {
            return Ok(Some(cached));
        }
        log::info!("Cached session expired; refreshing");
        self.refresh_with(&cached).await
    }

    async fn refresh_session(&self) -> Result<Option<AuthSession>, AuthError> {
        match self.cache.load() {
            Some(cached) => self.refresh_with(&cached).await,
            None => Ok(None),
        }
    }

    fn sign_out(&self) {
        self.cache.clear();
    }
}

fn session_from(
    result: AuthenticationResult,
    fallback_refresh: Option<String>,
) -> Result<AuthSession, AuthError> {
    let (Some(id_token), Some(access_token)) = (result.id_token, result.access_token) else {
        return Err(AuthError::MissingTokens);
    };
    AuthSession::from_raw(
        &id_token,
        &access_token,
        result.refresh_token.or(fallback_refresh),
    )
}

// Cognito sends the attribute maps as JSON encoded strings.
fn challenge_from(username: &str, response: AuthResponse) -> NewPasswordChallenge {
    let params = response.challenge_parameters;

    let mut user_attributes: Map<String, Value> = params
        .get("userAttributes")
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();
    // Immutable attributes cannot be sent back with the new password.
    user_attributes.remove("email_verified");
    user_attributes.remove("email");

    let required_attributes = params
        .get("requiredAttributes")
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();

    NewPasswordChallenge {
        username: params
            .get("USER_ID_FOR_SRP")
            .cloned()
            .unwrap_or_else(|| username.to_string()),
        session: response.session.unwrap_or_default(),
        user_attributes,
        required_attributes,
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::test_support::token;

    fn pool(dir: &tempfile::TempDir) -> CognitoUserPool {
        let config = AppConfig {
            region: "eu-west-2".into(),
            client_id: "client".into(),
            ..AppConfig::default()
        };
        CognitoUserPool::new(
            &config,
            reqwest::Client::new(),
            SessionCache::new(dir.path().join("session.json")),
        )
    }

    #[test]
    fn endpoint_follows_region() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            pool(&dir).rpc.endpoint(),
            "https://cognito-idp.eu-west-2.amazonaws.com/"
        );
    }

    #[test]
    fn authentication_result_signs_in_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let pool = pool(&dir);
        let body = serde_json::json!({
            "AuthenticationResult": {
                "IdToken": token(Some("a@b.c"), 4_000_000_000),
                "AccessToken": token(None, 4_000_000_000),
                "RefreshToken": "r1",
                "ExpiresIn": 3600,
                "TokenType": "Bearer"
            }
        });
        let response: AuthResponse = serde_json::from_value(body).unwrap();

        let AuthOutcome::SignedIn(session) = pool.outcome_from(response, "a@b.c") else {
            panic!("expected sign-in");
        };
        assert_eq!(session.email(), Some("a@b.c"));
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));
        assert_eq!(pool.cache.load(), Some(session));
    }

    #[test]
    fn new_password_challenge_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "Session": "challenge-session",
            "ChallengeParameters": {
                "USER_ID_FOR_SRP": "user-123",
                "requiredAttributes": "[\"name\"]",
                "userAttributes": "{\"email\":\"a@b.c\",\"email_verified\":\"true\",\"name\":\"\"}"
            }
        });
        let response: AuthResponse = serde_json::from_value(body).unwrap();

        let AuthOutcome::NewPasswordRequired(challenge) = pool(&dir).outcome_from(response, "a@b.c")
        else {
            panic!("expected challenge");
        };
        assert_eq!(challenge.username, "user-123");
        assert_eq!(challenge.session, "challenge-session");
        assert_eq!(challenge.required_attributes, vec!["name".to_string()]);
        assert!(challenge.user_attributes.contains_key("name"));
        assert!(!challenge.user_attributes.contains_key("email"));
    }

    #[test]
    fn unknown_challenge_fails() {
        let dir = tempfile::tempdir().unwrap();
        let response = AuthResponse {
            challenge_name: Some("SMS_MFA".into()),
            ..AuthResponse::default()
        };
        assert_eq!(
            pool(&dir).outcome_from(response, "a@b.c"),
            AuthOutcome::Failed("Unsupported sign-in challenge: SMS_MFA".into())
        );
    }

    #[test]
    fn refresh_keeps_previous_refresh_token() {
        let result = AuthenticationResult {
            id_token: Some(token(Some("a@b.c"), 4_000_000_000)),
            access_token: Some(token(None, 4_000_000_000)),
            refresh_token: None,
        };
        let session = session_from(result, Some("old".into())).unwrap();
        assert_eq!(session.refresh_token.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn no_cached_user_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let pool = pool(&dir);
        assert_eq!(pool.current_session().await.unwrap(), None);
        assert_eq!(pool.refresh_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn valid_cached_session_is_returned_without_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let pool = pool(&dir);
        let session = crate::auth::session::test_support::valid_session("a@b.c");
        pool.cache.store(&session).unwrap();

        assert_eq!(pool.current_session().await.unwrap(), Some(session));

        pool.sign_out();
        assert_eq!(pool.current_session().await.unwrap(), None);
    }
}
