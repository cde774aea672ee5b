//! Shared HTTP plumbing for the upstream data services.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::retry::{with_retry, RetryConfig};
use crate::types::ConditionsError;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!("Cropwise/", env!("CARGO_PKG_VERSION"));

/// Connection settings shared by every client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
        }
    }
}

impl ClientSettings {
    pub fn build_client(&self) -> Result<Client, ConditionsError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(client)
    }
}

/// Send a GET built by `request` (with retries) and decode a JSON body.
pub(crate) async fn get_json<T, F>(retry: &RetryConfig, request: F) -> Result<T, ConditionsError>
where
    T: DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let response = with_retry(retry, || request().send()).await?;
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ConditionsError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ConditionsError::Parse(format!("JSON parse error: {}", e)))
}

/// Treat blank keys from config or environment as unset.
pub(crate) fn non_blank(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}
