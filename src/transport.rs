//! HTTP transport used for token-endpoint requests.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// Raw status and body from the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends form-encoded POST requests.
///
/// Implementations report transport failures as [`crate::AuthError::Network`]
/// and never retry; any timeout is theirs to enforce.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<TransportResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<TransportResponse> {
        let resp = self
            .client
            .post(url.clone())
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(TransportResponse { status, body })
    }
}
