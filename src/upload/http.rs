//! HTTP object-store client.
//!
//! Uploads are a single `PUT <endpoint>/<key>` with a JPEG body. Stores in
//! the S3/GCS/MinIO family accept this for public or pre-authorized buckets;
//! for anything else a bearer token can be configured.
//!
//! The returned URL is, in order of preference: the response's `Location`
//! header, `<public_base_url>/<key>`, or the URL that was `PUT` to.

use super::{UploadClient, UploadError};
use crate::config::UploadConfig;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use std::time::Duration;
use tracing::debug;

pub struct HttpUploadClient {
    client: reqwest::Client,
    endpoint: String,
    public_base_url: Option<String>,
    auth_token: Option<String>,
}

impl HttpUploadClient {
    pub fn new(config: &UploadConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            public_base_url: config
                .public_base_url
                .as_deref()
                .map(|u| u.trim_end_matches('/').to_string()),
            auth_token: config.auth_token.clone(),
        })
    }

    /// URL an object with `key` is written to.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.endpoint, key)
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}/{key}"),
            None => self.object_url(key),
        }
    }
}

#[async_trait]
impl UploadClient for HttpUploadClient {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, UploadError> {
        let url = self.object_url(key);
        debug!(%url, bytes = bytes.len(), "PUT object");

        let mut request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(bytes);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status.as_u16()));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(location.unwrap_or_else(|| self.public_url(key)))
    }
}

/// Timeouts and connection failures get their own variants; anything else
/// keeps the full `reqwest::Error`.
fn transport_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        UploadError::Timeout
    } else if err.is_connect() {
        UploadError::Network(err.to_string())
    } else {
        UploadError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> UploadConfig {
        UploadConfig {
            endpoint: endpoint.to_string(),
            ..UploadConfig::default()
        }
    }

    #[test]
    fn object_url_joins_without_double_slash() {
        let client = HttpUploadClient::new(&config("http://store.test/bucket/")).unwrap();
        assert_eq!(
            client.object_url("images/1/a.jpg"),
            "http://store.test/bucket/images/1/a.jpg"
        );
    }

    #[test]
    fn public_url_prefers_base_url() {
        let mut cfg = config("http://store.test/bucket");
        cfg.public_base_url = Some("https://cdn.test/".into());
        let client = HttpUploadClient::new(&cfg).unwrap();
        assert_eq!(client.public_url("k.jpg"), "https://cdn.test/k.jpg");
    }

    #[test]
    fn public_url_defaults_to_object_url() {
        let client = HttpUploadClient::new(&config("http://store.test")).unwrap();
        assert_eq!(client.public_url("k.jpg"), "http://store.test/k.jpg");
    }
}
