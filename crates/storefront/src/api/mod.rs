//! REST client for the food delivery backend.
//!
//! # Architecture
//!
//! - One `reqwest::Client` shared by every endpoint group
//! - The backend is the source of truth; nothing is cached here
//! - Bearer token read from the shared [`AuthContext`] on every request
//! - A 401 or 403 from any endpoint clears the session process-wide
//!
//! # Example
//!
//! ```rust,ignore
//! use food_delivery_storefront::api::{ApiClient, RestaurantQuery};
//!
//! let api = ApiClient::new(&config, auth)?;
//! let page = api.restaurants(&RestaurantQuery::default()).await?;
//! let restaurant = api.restaurant(page.restaurants[0].id).await?;
//! ```

mod addresses;
mod auth;
mod cart;
pub mod conversions;
mod health;
mod orders;
mod restaurants;
pub mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{Span, debug, error, info, instrument};
use url::Url;
use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::session::AuthContext;
use crate::validation::FieldErrors;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend rejected the credentials (401 or 403).
    #[error("Unauthorized (HTTP {status})")]
    Unauthorized {
        status: u16,
        message: Option<String>,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("Server error (HTTP {status}): {}", message.as_deref().unwrap_or("no details"))]
    Server {
        status: u16,
        message: Option<String>,
        field_errors: FieldErrors,
    },
}

impl ApiError {
    /// The human-readable message the backend supplied, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } | Self::Unauthorized { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Per-field errors the backend supplied, if any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Server { field_errors, .. } if !field_errors.is_empty() => Some(field_errors),
            _ => None,
        }
    }

    /// Whether this is the global 401/403 case.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the food delivery REST API.
///
/// Cheap to clone; all clones share one connection pool and one
/// [`AuthContext`].
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    auth: Arc<AuthContext>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, auth: Arc<AuthContext>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                auth,
            }),
        })
    }

    /// The session context this client authenticates with.
    #[must_use]
    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.inner.auth
    }

    /// Resolve `path` against the base URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and return the raw success body.
    ///
    /// Non-success responses are mapped to [`ApiError`]. A 401 or 403 clears
    /// the session before the error is returned.
    #[instrument(
        skip(self, url, body),
        fields(path = %url.path(), request_id = tracing::field::Empty, status = tracing::field::Empty)
    )]
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());
        sentry::configure_scope(|scope| {
            scope.set_tag("request_id", &request_id);
        });

        let mut request = self
            .inner
            .client
            .request(method, url.clone())
            .header(REQUEST_ID_HEADER, &request_id)
            .header("Accept", "application/json");

        if let Some(token) = self.inner.auth.bearer_token().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let event_id = sentry::capture_error(&e);
                error!(error = %e, sentry_event_id = %event_id, "Request failed");
                return Err(ApiError::Http(e));
            }
        };

        let status = response.status();
        Span::current().record("status", status.as_u16());

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let response_text = response.text().await?;

        if status.is_success() {
            debug!(%status, "Request succeeded");
            return Ok(response_text);
        }

        let (message, field_errors) = parse_error_body(&response_text);

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            info!(%status, "Backend rejected credentials, clearing session");
            self.inner.auth.invalidate(true).await;
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NOT_FOUND {
            debug!(path = %url.path(), "Resource not found");
            return Err(ApiError::NotFound(
                message.unwrap_or_else(|| url.path().to_string()),
            ));
        }

        let err = ApiError::Server {
            status: status.as_u16(),
            message,
            field_errors,
        };

        if status.is_server_error() {
            let event_id = sentry::capture_error(&err);
            error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                sentry_event_id = %event_id,
                "Backend returned server error"
            );
        } else {
            debug!(status = %status, error = %err, "Backend rejected request");
        }

        Err(err)
    }

    /// Send a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let text = self.send(method, url, body).await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };

        serde_json::from_str(text).map_err(|e| {
            error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is irrelevant.
    async fn execute_unit(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<(), ApiError> {
        self.send(method, url, body).await.map(drop)
    }
}

// =============================================================================
// Error bodies
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Vec<WireFieldError>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireFieldError {
    Text(String),
    Field {
        #[serde(alias = "param", alias = "path")]
        field: Option<String>,
        #[serde(alias = "msg")]
        message: String,
    },
}

/// Extract `{ message, errors }` from an error response body.
///
/// `errors` may be a list of strings or of `{ field|param|path, message|msg }`
/// objects. Unfielded messages are filed under `form`.
fn parse_error_body(text: &str) -> (Option<String>, FieldErrors) {
    let Ok(body) = serde_json::from_str::<ErrorBody>(text) else {
        return (None, FieldErrors::new());
    };

    let mut field_errors = FieldErrors::new();
    let mut loose = Vec::new();
    for entry in body.errors {
        match entry {
            WireFieldError::Field {
                field: Some(field),
                message,
            } => field_errors.insert(field, message),
            WireFieldError::Field { field: None, message } | WireFieldError::Text(message) => {
                loose.push(message);
            }
        }
    }

    let message = body
        .message
        .or(body.error)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| (!loose.is_empty()).then(|| loose.join("; ")));

    for text in loose {
        field_errors.insert("form", text);
    }

    (message, field_errors)
}
