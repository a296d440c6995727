use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{AMZ_JSON, AwsError, ServiceError};

/// Client for the unsigned `X-Amz-Target` JSON protocol spoken by the
/// Cognito user pool and identity pool endpoints.
#[derive(Clone)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    endpoint: String,
    target_prefix: &'static str,
}

impl JsonRpcClient {
    pub fn new(http: reqwest::Client, endpoint: String, target_prefix: &'static str) -> Self {
        Self {
            http,
            endpoint,
            target_prefix,
        }
    }

    #[cfg(test)]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn call<B, T>(&self, action: &str, body: &B) -> Result<T, AwsError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_string(body)?;
        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", format!("{}.{}", self.target_prefix, action))
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let error_type = response
            .headers()
            .get("x-amzn-ErrorType")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;

        if status.is_success() {
            Ok(serde_json::from_str(&text)?)
        } else {
            let err = ServiceError::parse(status.as_u16(), error_type.as_deref(), &text);
            log::debug!("{}.{} failed: {err}", self.target_prefix, action);
            Err(AwsError::Service(err))
        }
    }
}
