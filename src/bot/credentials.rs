use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::aws::JsonRpcClient;
use crate::aws::sigv4::Credentials;

use super::error::BotError;

const TARGET_PREFIX: &str = "AWSCognitoIdentityService";
/// Credentials this close to expiry are fetched again before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Temporary AWS credentials issued by an identity pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    pub credentials: Credentials,
    pub expiration: DateTime<Utc>,
}

impl TemporaryCredentials {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expiration
    }
}

/// Exchanges a user pool id token for identity pool credentials.
pub struct IdentityPoolCredentials {
    rpc: JsonRpcClient,
    identity_pool_id: String,
    provider_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetIdRequest<'a> {
    identity_pool_id: &'a str,
    logins: HashMap<&'a str, &'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetIdResponse {
    identity_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetCredentialsRequest<'a> {
    identity_id: &'a str,
    logins: HashMap<&'a str, &'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetCredentialsResponse {
    credentials: Option<RawCredentials>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCredentials {
    access_key_id: Option<String>,
    secret_key: Option<String>,
    session_token: Option<String>,
    /// Epoch seconds.
    expiration: Option<f64>,
}

impl IdentityPoolCredentials {
    pub fn new(
        http: reqwest::Client,
        region: &str,
        identity_pool_id: String,
        provider_name: String,
    ) -> Self {
        let endpoint = format!("https://cognito-identity.{region}.amazonaws.com/");
        Self {
            rpc: JsonRpcClient::new(http, endpoint, TARGET_PREFIX),
            identity_pool_id,
            provider_name,
        }
    }

    pub async fn fetch(&self, id_token: &str) -> Result<TemporaryCredentials, BotError> {
        let logins = HashMap::from([(self.provider_name.as_str(), id_token)]);

        let identity: GetIdResponse = self
            .rpc
            .call(
                "GetId",
                &GetIdRequest {
                    identity_pool_id: &self.identity_pool_id,
                    logins: logins.clone(),
                },
            )
            .await?;

        let response: GetCredentialsResponse = self
            .rpc
            .call(
                "GetCredentialsForIdentity",
                &GetCredentialsRequest {
                    identity_id: &identity.identity_id,
                    logins,
                },
            )
            .await?;

        let credentials = response
            .credentials
            .ok_or_else(|| BotError::Credentials("no credentials returned".into()))?;
        let temporary = convert(credentials)?;
        log::debug!(
            "Obtained identity pool credentials valid until {}",
            temporary.expiration
        );
        Ok(temporary)
    }
}

fn convert(raw: RawCredentials) -> Result<TemporaryCredentials, BotError> {
    let (Some(access_key_id), Some(secret_key)) = (raw.access_key_id, raw.secret_key) else {
        return Err(BotError::Credentials("missing access key".into()));
    };
    let expiration = raw
        .expiration
        .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single())
        .ok_or_else(|| BotError::Credentials("missing expiration".into()))?;

    Ok(TemporaryCredentials {
        credentials: Credentials {
            access_key_id,
            secret_key,
            session_token: raw.session_token,
        },
        expiration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_identity_pool_payload() {
        let raw: GetCredentialsResponse = serde_json::from_str(
            r#"{"IdentityId":"eu-west-2:1","Credentials":{
                "AccessKeyId":"AKID","SecretKey":"secret","SessionToken":"tok","Expiration":1.7e9}}"#,
        )
        .unwrap();

        let creds = convert(raw.credentials.unwrap()).unwrap();
        assert_eq!(creds.credentials.access_key_id, "AKID");
        assert_eq!(creds.credentials.session_token.as_deref(), Some("tok"));
        assert_eq!(creds.expiration.timestamp(), 1_700_000_000);
    }

    #[test]
    fn incomplete_payload_is_rejected() {
        let raw = RawCredentials {
            access_key_id: Some("AKID".into()),
            secret_key: None,
            session_token: None,
            expiration: Some(1.0),
        };
        assert!(matches!(convert(raw), Err(BotError::Credentials(_))));
    }

    #[test]
    fn freshness_keeps_a_margin() {
        let now = Utc::now();
        let creds = TemporaryCredentials {
            credentials: Credentials {
                access_key_id: "a".into(),
                secret_key: "s".into(),
                session_token: None,
            },
            expiration: now + Duration::seconds(30),
        };
        assert!(!creds.is_fresh_at(now));
        assert!(creds.is_fresh_at(now - Duration::seconds(60)));
    }
}
