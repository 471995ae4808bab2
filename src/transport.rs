use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::error::TransportError;

pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection parameters for one BMC.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub verify_ssl: bool,
    pub timeout: Duration,
}

/// HTTP client bound to one host/port/credential set. All Redfish traffic
/// goes through here; every request carries basic auth and the configured
/// timeout.
pub struct RedfishTransport {
    client: Client,
    base_url: String,
    host: String,
    username: String,
    password: String,
}

impl RedfishTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            // BMCs ship self-signed certificates; verification is opt-in.
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            base_url: format!("https://{}:{}", config.host, config.port),
            host: config.host,
            username: config.username,
            password: config.password,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Turn an `@odata.id` path into an absolute URL. Absolute inputs pass
    /// through untouched.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    pub async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|source| TransportError::Request {
                method: "GET",
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                method: "GET",
                url: url.to_string(),
                status,
            });
        }

        response.json().await.map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })
    }

    pub async fn patch_json(&self, url: &str, body: &Value) -> Result<StatusCode, TransportError> {
        self.send_json("PATCH", url, body).await
    }

    pub async fn post_json(&self, url: &str, body: &Value) -> Result<StatusCode, TransportError> {
        self.send_json("POST", url, body).await
    }

    async fn send_json(
        &self,
        method: &'static str,
        url: &str,
        body: &Value,
    ) -> Result<StatusCode, TransportError> {
        debug!("{} {}", method, url);
        let request = match method {
            "POST" => self.client.post(url),
            _ => self.client.patch(url),
        };
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            // Some BMC firmwares reject writes without a wildcard If-Match.
            .header("If-Match", "*")
            .json(body)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                method,
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                method,
                url: url.to_string(),
                status,
            });
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TransportConfig {
        TransportConfig {
            host: "10.0.0.5".to_string(),
            port: 8443,
            username: "admin".to_string(),
            password: "secret".to_string(),
            verify_ssl: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[test]
    fn joins_relative_paths_to_base_url() {
        let transport = RedfishTransport::new(config()).unwrap();
        assert_eq!(
            transport.url("/redfish/v1/Systems"),
            "https://10.0.0.5:8443/redfish/v1/Systems"
        );
    }

    #[test]
    fn leaves_absolute_urls_untouched() {
        let transport = RedfishTransport::new(config()).unwrap();
        assert_eq!(
            transport.url("https://10.0.0.5:8443/redfish/v1/"),
            "https://10.0.0.5:8443/redfish/v1/"
        );
    }
}
