//! Red Canary API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Higher-level operations live on the resource types and the
//! [`Collection`](crate::Collection) engine.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{CanaryError, Result};

const DOMAIN: &str = "my.redcanary.co";
const BASE_PATH: &str = "openapi/v3";
const USER_AGENT: &str = concat!("canaryapi/", env!("CARGO_PKG_VERSION"));

/// One page of raw collection items plus the server-reported total.
#[derive(Debug)]
pub struct RawPage {
    /// Raw JSON items from the response's `data` array.
    pub items: Vec<Value>,
    /// Value of `meta.total_items`: the collection size across all pages.
    pub total_items: u64,
}

/// Low-level Red Canary API client.
///
/// Handles authentication and HTTP requests against a customer portal at
/// `https://<customer>.my.redcanary.co/openapi/v3/`. Every request carries
/// the API key in the `X-Api-Key` header.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use canaryapi::CanaryClient;
///
/// # fn example() -> canaryapi::Result<()> {
/// // Create from environment variables
/// let client = CanaryClient::from_env()?;
///
/// // Or configure manually
/// let client = CanaryClient::new("demo", "your-api-key")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CanaryClient {
    http: Client,
    base_url: Arc<Url>,
    api_key: String,
}

impl std::fmt::Debug for CanaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanaryClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl CanaryClient {
    /// Create a client from environment variables.
    ///
    /// Uses `RED_CANARY_CUSTOMER_ID` and `RED_CANARY_API_KEY`. If
    /// `RED_CANARY_API_URL` is set it overrides the derived portal URL,
    /// which is mainly useful for pointing tests at a local server.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is not set. This is checked
    /// at construction, before any request is made.
    pub fn from_env() -> Result<Self> {
        if let Ok(base_url) = env::var("RED_CANARY_API_URL") {
            let api_key = env::var("RED_CANARY_API_KEY").map_err(|_| {
                CanaryError::ConfigMissing(
                    "RED_CANARY_API_KEY environment variable not set".to_string(),
                )
            })?;
            return Self::with_base_url(&base_url, &api_key);
        }

        let customer_id = env::var("RED_CANARY_CUSTOMER_ID").map_err(|_| {
            CanaryError::ConfigMissing(
                "RED_CANARY_CUSTOMER_ID environment variable not set".to_string(),
            )
        })?;
        let api_key = env::var("RED_CANARY_API_KEY").map_err(|_| {
            CanaryError::ConfigMissing(
                "RED_CANARY_API_KEY environment variable not set".to_string(),
            )
        })?;

        Self::new(&customer_id, &api_key)
    }

    /// Create a new client for a customer portal.
    ///
    /// The base URL is derived from the customer identifier:
    /// `https://<customer_id>.my.redcanary.co/openapi/v3/`.
    ///
    /// # Errors
    ///
    /// Returns an error if `customer_id` or `api_key` is empty.
    pub fn new(customer_id: &str, api_key: &str) -> Result<Self> {
        if customer_id.is_empty() {
            return Err(CanaryError::ConfigMissing(
                "customer_id must not be empty".to_string(),
            ));
        }
        let base_url = format!("https://{customer_id}.{DOMAIN}/{BASE_PATH}/");
        Self::with_base_url(&base_url, api_key)
    }

    /// Create a client against an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or `api_key` is empty.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(CanaryError::ConfigMissing(
                "api_key must not be empty".to_string(),
            ));
        }

        // Ensure base URL ends with / so Url::join treats it as a directory
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(CanaryError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            api_key: api_key.to_string(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path relative to the base URL.
    pub(crate) fn join(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Make a GET request to a path under the base URL, returning the
    /// parsed JSON body.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Value> {
        let url = self.join(path)?;
        self.get_url(url).await
    }

    /// Make a GET request to an absolute URL, returning the parsed JSON
    /// body. Used for hydration, where the target comes from a resource's
    /// self link rather than a known collection path.
    #[tracing::instrument(skip(self))]
    pub async fn get_url(&self, url: Url) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(CanaryError::HttpError)?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await.map_err(CanaryError::HttpError)?)
    }

    /// Request one page of a collection.
    ///
    /// Merges `query` with `page=<page>` and parses the standard envelope:
    /// items from the `data` array, total from `meta.total_items`.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_page(
        &self,
        url: &Url,
        query: &[(String, String)],
        page: u32,
    ) -> Result<RawPage> {
        let response = self
            .http
            .get(url.clone())
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .query(&[("page", page)])
            .send()
            .await
            .map_err(CanaryError::HttpError)?;

        let response = Self::check_response(response).await?;
        let body: Value = response.json().await.map_err(CanaryError::HttpError)?;

        let items = match body.get("data") {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return Err(CanaryError::MalformedResponse {
                    kind: "collection",
                    reason: "missing 'data' array".to_string(),
                })
            }
        };
        let total_items = body
            .get("meta")
            .and_then(|m| m.get("total_items"))
            .and_then(Value::as_u64)
            .ok_or_else(|| CanaryError::MalformedResponse {
                kind: "collection",
                reason: "missing 'meta.total_items'".to_string(),
            })?;

        Ok(RawPage { items, total_items })
    }

    /// Make a PATCH request with query parameters, returning the parsed
    /// JSON body. The v3 write endpoints are query-parameter driven and
    /// take no body.
    #[tracing::instrument(skip(self, query))]
    pub async fn patch<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Value> {
        let url = self.join(path)?;

        let response = self
            .http
            .patch(url)
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(CanaryError::HttpError)?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await.map_err(CanaryError::HttpError)?)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = Self::extract_error_message(response, status).await;
        Err(CanaryError::ApiError {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: reqwest::StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        // Try to parse as JSON and extract message field
        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}
