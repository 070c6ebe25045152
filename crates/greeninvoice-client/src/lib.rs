//! Client for the GreenInvoice document API.
//!
//! Only the calls needed to reconcile donation receipts are covered: token
//! authentication, document search and document creation.

mod error;

pub use error::ApiError;

use std::fmt;
use std::time::Duration;

use anyhow::{Context as _, Result};
use bank2receipt::ReceiptProvider;
use bank2receipt::receipt::{CreatedReceipt, ReceiptRequest, ReceiptSummary, SearchQuery};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const SANDBOX_URL: &str = "https://sandbox.d.greeninvoice.co.il/api/v1";
pub const PRODUCTION_URL: &str = "https://api.greeninvoice.co.il/api/v1";

const TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("bank2receipt/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn default_url(self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_URL,
            Environment::Production => PRODUCTION_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        })
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub api_key_id: String,
    pub api_key_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key_id", &self.api_key_id)
            .field("api_key_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    id: &'a str,
    secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<ReceiptSummary>,
}

/// An authenticated session with the API.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl Client {
    /// Exchange the API key for a session token.
    pub async fn connect(base_url: &str, credentials: &Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = base_url.trim_end_matches('/').to_owned();

        let url = format!("{base_url}/account/token");
        tracing::debug!("requesting token from {url}");
        let request = http.post(&url).json(&TokenRequest {
            id: &credentials.api_key_id,
            secret: &credentials.api_key_secret,
        });
        let TokenResponse { token } = send(request, &url)
            .await
            .context("Failed to authenticate with GreenInvoice")?;

        Ok(Client {
            http,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!("POST {url}");
        let request = self.http.post(&url).bearer_auth(&self.token).json(body);
        send(request, &url).await
    }
}

async fn send<R: DeserializeOwned>(request: reqwest::RequestBuilder, url: &str) -> Result<R> {
    let response = request
        .send()
        .await
        .with_context(|| format!("Request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::from_response(status.as_u16(), &body).into());
    }

    response
        .json()
        .await
        .with_context(|| format!("Invalid response from {url}"))
}

impl ReceiptProvider for Client {
    async fn search_receipts(&self, query: &SearchQuery) -> Result<Vec<ReceiptSummary>> {
        let response: SearchResponse = self.post("/documents/search", query).await?;
        Ok(response.items)
    }

    async fn create_receipt(&self, request: &ReceiptRequest) -> Result<CreatedReceipt> {
        self.post("/documents", request).await
    }
}
