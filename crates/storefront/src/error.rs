//! Unified error handling with Sentry integration.
//!
//! Store and view operations return `Result<T, AppError>`. No error is
//! fatal: every failure renders as a one-line message via
//! [`AppError::user_message`] and the caller decides whether to retry.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;
use crate::validation::FieldErrors;

/// Message shown for any failure without a better description.
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Message shown when the backend has ended the session.
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client-side validation failed; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A named operation failed at the backend.
    #[error("{action}: {source}")]
    Request {
        /// Fallback message, e.g. "Failed to add item to cart".
        action: &'static str,
        source: ApiError,
    },

    /// Login or registration was rejected.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    /// Token storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The operation needs a signed-in user.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The operation is not allowed in the current state.
    #[error("{0}")]
    InvalidState(String),
}

impl AppError {
    /// Wrap a backend failure with the message to show when the backend
    /// does not supply one.
    #[must_use]
    pub const fn request(action: &'static str, source: ApiError) -> Self {
        Self::Request { action, source }
    }

    /// The banner text for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::Api(source) => api_message(source, GENERIC_FAILURE),
            Self::Request { action, source } => api_message(source, action),
            Self::Auth(failure) => failure.message.clone(),
            Self::Storage(_) => "Could not access the saved session.".to_string(),
            Self::NotAuthenticated => "Please log in to continue.".to_string(),
            Self::InvalidState(message) => message.clone(),
        }
    }

    /// Per-field errors, from client-side validation or the backend.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Auth(failure) if !failure.field_errors.is_empty() => Some(&failure.field_errors),
            Self::Api(source) | Self::Request { source, .. } => source.field_errors(),
            _ => None,
        }
    }

    /// The underlying backend error, if this came from one.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(source) | Self::Request { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn api_message(source: &ApiError, fallback: &str) -> String {
    match source {
        ApiError::Unauthorized { .. } => SESSION_EXPIRED.to_string(),
        ApiError::RateLimited(seconds) => {
            format!("Too many requests. Please try again in {seconds} seconds.")
        }
        _ => source
            .server_message()
            .map_or_else(|| fallback.to_string(), str::to_string),
    }
}

/// A rejected login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthFailure {
    /// Server-supplied message, or the operation's fallback.
    pub message: String,
    /// Per-field errors, from validation or the backend.
    pub field_errors: FieldErrors,
}

impl AuthFailure {
    /// Build a failure from a backend error.
    #[must_use]
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        Self {
            message: err
                .server_message()
                .map_or_else(|| fallback.to_string(), str::to_string),
            field_errors: err.field_errors().cloned().unwrap_or_default(),
        }
    }

    /// Build a failure from client-side validation.
    #[must_use]
    pub fn invalid(field_errors: FieldErrors) -> Self {
        Self {
            message: "Please correct the highlighted fields.".to_string(),
            field_errors,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("menu_item_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn server_error(message: Option<&str>) -> ApiError {
        ApiError::Server {
            status: 400,
            message: message.map(String::from),
            field_errors: FieldErrors::new(),
        }
    }

    #[test]
    fn test_request_prefers_server_message() {
        let err = AppError::request(
            "Failed to add item to cart",
            server_error(Some("Item is sold out")),
        );
        assert_eq!(err.user_message(), "Item is sold out");
    }

    #[test]
    fn test_request_falls_back_to_action() {
        let err = AppError::request("Failed to add item to cart", server_error(None));
        assert_eq!(err.user_message(), "Failed to add item to cart");
        assert_eq!(
            err.to_string(),
            "Failed to add item to cart: Server error (HTTP 400): no details"
        );
    }

    #[test]
    fn test_unauthorized_message() {
        let err = AppError::request(
            "Failed to load orders",
            ApiError::Unauthorized {
                status: 401,
                message: Some("jwt expired".to_string()),
            },
        );
        assert_eq!(err.user_message(), SESSION_EXPIRED);
    }

    #[test]
    fn test_validation_message_and_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("city", "City is required");
        let err = AppError::Validation(fields);

        assert_eq!(err.user_message(), "City is required");
        assert_eq!(err.field_errors().unwrap().get("city"), Some("City is required"));
    }

    #[test]
    fn test_auth_failure_from_api() {
        let mut fields = FieldErrors::new();
        fields.insert("email", "Email already registered");
        let failure = AuthFailure::from_api(
            &ApiError::Server {
                status: 409,
                message: None,
                field_errors: fields,
            },
            "Registration failed",
        );

        assert_eq!(failure.message, "Registration failed");
        assert_eq!(
            failure.field_errors.get("email"),
            Some("Email already registered")
        );
    }
}
