//! Shared plumbing for the AWS JSON APIs used by the client.

pub mod error;
pub mod json_rpc;
pub mod sigv4;

use std::time::Duration;

pub use error::{AwsError, ServiceError};
pub use json_rpc::JsonRpcClient;

/// Content type of the `X-Amz-Target` style JSON protocol.
pub const AMZ_JSON: &str = "application/x-amz-json-1.1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|err| {
            log::warn!("Falling back to default HTTP client: {err}");
            reqwest::Client::new()
        })
}
