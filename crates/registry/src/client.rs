use std::time::Duration;

use async_trait::async_trait;
use freightdesk_core::config::RegistryConfig;
use freightdesk_core::{DotNumber, McNumber};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::warn;

use crate::error::RegistryError;

/// The four logical registry lookups. Implementations return the raw
/// payload untouched; shape normalization happens in [`crate::decode`] so
/// fakes can script realistic upstream responses in tests.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    async fn docket_lookup(&self, mc: &McNumber) -> Result<Value, RegistryError>;
    async fn carrier_record(&self, dot: &DotNumber) -> Result<Value, RegistryError>;
    async fn authority_record(&self, dot: &DotNumber) -> Result<Value, RegistryError>;
    async fn oos_record(&self, dot: &DotNumber) -> Result<Value, RegistryError>;
}

pub struct HttpRegistryClient {
    http: Client,
    base_url: String,
    web_key: SecretString,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HttpRegistryClient {
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let web_key = config
            .web_key
            .clone()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(RegistryError::MissingWebKey)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| RegistryError::Transport { source })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            web_key,
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// Linear backoff: first retry waits one base delay, the second two.
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base_delay * attempt
    }

    async fn get_json(&self, path: &str) -> Result<Value, RegistryError> {
        let url = format!("{}/{path}", self.base_url);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.fetch_once(&url).await {
                Ok(payload) => return Ok(payload),
                Err(error) if attempt <= self.max_retries && error.is_transient() => {
                    let delay = self.backoff(attempt);
                    warn!(
                        path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient registry failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Value, RegistryError> {
        let response = self
            .http
            .get(url)
            .query(&[("webKey", self.web_key.expose_secret())])
            .send()
            .await
            .map_err(|source| RegistryError::Transport { source })?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(RegistryError::Authentication),
            status if status.is_success() => response
                .json::<Value>()
                .await
                .map_err(|source| RegistryError::Decode(source.to_string())),
            status => Err(RegistryError::UpstreamStatus { status: status.as_u16() }),
        }
    }
}

#[async_trait]
impl RegistryApi for HttpRegistryClient {
    async fn docket_lookup(&self, mc: &McNumber) -> Result<Value, RegistryError> {
        self.get_json(&format!("carriers/docket-number/{mc}")).await
    }

    async fn carrier_record(&self, dot: &DotNumber) -> Result<Value, RegistryError> {
        self.get_json(&format!("carriers/{dot}")).await
    }

    async fn authority_record(&self, dot: &DotNumber) -> Result<Value, RegistryError> {
        self.get_json(&format!("carriers/{dot}/authority")).await
    }

    async fn oos_record(&self, dot: &DotNumber) -> Result<Value, RegistryError> {
        self.get_json(&format!("carriers/{dot}/oos")).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use freightdesk_core::config::RegistryConfig;

    use super::HttpRegistryClient;
    use crate::error::RegistryError;

    fn config(web_key: Option<&str>) -> RegistryConfig {
        RegistryConfig {
            base_url: "https://registry.example/services".to_string(),
            web_key: web_key.map(|key| key.to_string().into()),
            timeout_secs: 10,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }

    #[test]
    fn construction_requires_a_web_key() {
        let missing = HttpRegistryClient::from_config(&config(None))
            .err()
            .expect("missing key must fail");
        assert!(matches!(missing, RegistryError::MissingWebKey));

        let blank = HttpRegistryClient::from_config(&config(Some("  ")))
            .err()
            .expect("blank key must fail");
        assert!(matches!(blank, RegistryError::MissingWebKey));

        assert!(HttpRegistryClient::from_config(&config(Some("test-key"))).is_ok());
    }

    #[test]
    fn backoff_grows_linearly_with_attempts() {
        let client =
            HttpRegistryClient::from_config(&config(Some("test-key"))).expect("client builds");

        assert_eq!(client.backoff(1), Duration::from_millis(500));
        assert_eq!(client.backoff(2), Duration::from_millis(1000));
        assert_eq!(client.backoff(3), Duration::from_millis(1500));
    }

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let mut cfg = config(Some("test-key"));
        cfg.base_url = "https://registry.example/services/".to_string();
        let client = HttpRegistryClient::from_config(&cfg).expect("client builds");
        assert_eq!(client.base_url, "https://registry.example/services");
    }
}
