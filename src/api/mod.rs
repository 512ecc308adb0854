//! HTTP client wrapper for the console's REST backend.
//!
//! Every call goes through [`ApiClient::send`], which attaches the stored
//! session token as a bearer header and unwraps the JSON body. Non-2xx
//! responses become [`ApiError::Status`] carrying the backend's `message`.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::session::TokenStorage;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(
        "request failed with status {status}{}",
        .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    Status { status: u16, message: Option<String> },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Text for an inline error: the backend's message when it sent one,
    /// otherwise the caller's fallback.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Error bodies look like `{"message": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Percent-encode an identifier for use as a single path segment.
pub fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStorage>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStorage>) -> Result<Self, ApiError> {
        Self::with_client(Client::new(), base_url, tokens)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        tokens: Arc<dyn TokenStorage>,
    ) -> Result<Self, ApiError> {
        // Url::join drops the last segment unless the base ends in '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token_storage(&self) -> &Arc<dyn TokenStorage> {
        &self.tokens
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<(), T>(Method::DELETE, path, None).await
    }

    async fn bearer_token(&self) -> Option<String> {
        match self.tokens.load().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read session token, sending request unauthenticated: {}", e);
                None
            }
        }
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut request = self.client.request(method.clone(), url.clone());

        let token = self.bearer_token().await;
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, %url, authenticated = token.is_some(), "API request");

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.is_empty());
            debug!(%method, %url, status = status.as_u16(), ?message, "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
