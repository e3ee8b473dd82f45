//! Profile editor.

use crate::api::{ApiError, UserProfile};
use crate::error::AppError;
use crate::session::SessionStore;
use crate::validation::{FieldErrors, ProfileForm};

/// Edits the signed-in user's name, email and phone.
#[derive(Debug, Clone, Default)]
pub struct ProfileEditor {
    /// The form being edited.
    pub form: ProfileForm,
    field_errors: FieldErrors,
    error: Option<String>,
}

impl ProfileEditor {
    /// Start editing from the current profile.
    #[must_use]
    pub fn from_user(user: &UserProfile) -> Self {
        Self {
            form: ProfileForm {
                name: user.name.clone(),
                email: user.email.clone(),
                phone: user.phone.clone().unwrap_or_default(),
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate and save. On success the form reflects what the backend
    /// stored. A rejected session clears the form.
    ///
    /// # Errors
    ///
    /// Whatever [`SessionStore::update_profile`] returns; field errors are
    /// also kept on the editor.
    pub async fn save(&mut self, session: &SessionStore) -> Result<UserProfile, AppError> {
        match session.update_profile(&self.form).await {
            Ok(user) => {
                *self = Self::from_user(&user);
                Ok(user)
            }
            Err(e) => {
                if e.api_error().is_some_and(ApiError::is_unauthorized) {
                    self.form = ProfileForm::default();
                }
                self.field_errors = e.field_errors().cloned().unwrap_or_default();
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
