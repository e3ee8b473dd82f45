//! CLI error type.

use food_delivery_storefront::config::ConfigError;
use food_delivery_storefront::validation::FieldErrors;
use food_delivery_storefront::{AppError, AuthFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<AuthFailure> for CliError {
    fn from(failure: AuthFailure) -> Self {
        Self::App(AppError::Auth(failure))
    }
}

impl CliError {
    /// The line printed to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::App(e) => e.user_message(),
        }
    }

    /// Per-field details, printed under the message.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Config(_) => None,
            Self::App(e) => e.field_errors(),
        }
    }
}
