//! Session state: who is signed in, and the token that proves it.
//!
//! [`AuthContext`] is the single shared holder of the bearer token. The API
//! client reads it on every request and clears it on any 401/403, so a
//! rejected token ends the session no matter which store made the call.
//! [`SessionStore`] drives the login, registration, hydration and logout
//! transitions on top of it.

use std::sync::Arc;

use food_delivery_core::UserId;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, Credentials, ProfileUpdate, RegisterRequest, UserProfile};
use crate::error::{AppError, AuthFailure, clear_sentry_user, set_sentry_user};
use crate::storage::{StoredSession, TokenStore};
use crate::validation::{
    FieldErrors, ProfileForm, RegistrationForm, normalized_phone, require, validate_profile,
    validate_registration,
};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    /// A stored token is being checked against the profile endpoint.
    Hydrating,
    Authenticated(UserProfile),
}

impl SessionState {
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Session transitions observers may react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionEvent {
    /// Nothing has happened yet.
    #[default]
    Idle,
    LoggedIn(UserId),
    /// The session ended. `forced` is set when the backend rejected the
    /// token; the surface should return to the login view.
    LoggedOut { forced: bool },
}

// =============================================================================
// AuthContext
// =============================================================================

/// Shared token holder and session state.
pub struct AuthContext {
    token: RwLock<Option<SecretString>>,
    state: watch::Sender<SessionState>,
    events: watch::Sender<SessionEvent>,
    storage: Arc<dyn TokenStore>,
}

impl AuthContext {
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStore>) -> Self {
        Self {
            token: RwLock::new(None),
            state: watch::Sender::new(SessionState::Unauthenticated),
            events: watch::Sender::new(SessionEvent::Idle),
            storage,
        }
    }

    /// The token to send as `Authorization: Bearer`, if any.
    pub async fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|token| token.expose_secret().to_string())
    }

    /// Whether a token is currently held.
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn TokenStore> {
        &self.storage
    }

    /// Observe session events.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Observe state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    async fn set_token(&self, token: SecretString) {
        *self.token.write().await = Some(token);
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    /// Adopt `session` as the signed-in session and persist it.
    async fn establish(&self, session: StoredSession, user: UserProfile) {
        self.set_token(session.token.clone()).await;
        if let Err(e) = self.storage.save(&StoredSession {
            token: session.token,
            user: Some(user.clone()),
        }) {
            warn!(error = %e, "Failed to persist session token");
        }
        set_sentry_user(&user.id, Some(&user.email));
        self.events.send_replace(SessionEvent::LoggedIn(user.id));
        self.set_state(SessionState::Authenticated(user));
    }

    /// Drop the token, clear storage and mark the session unauthenticated.
    ///
    /// `forced` marks a backend rejection. `LoggedOut` is only broadcast if
    /// there was a session to end.
    pub async fn invalidate(&self, forced: bool) {
        let had_token = self.token.write().await.take().is_some();
        let had_session = !matches!(*self.state.borrow(), SessionState::Unauthenticated);

        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.set_state(SessionState::Unauthenticated);
        clear_sentry_user();

        if had_token || had_session {
            info!(forced, "Session cleared");
            self.events.send_replace(SessionEvent::LoggedOut { forced });
        }
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// Login, registration and logout over the shared [`AuthContext`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    api: ApiClient,
}

impl SessionStore {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn auth(&self) -> &AuthContext {
        self.api.auth()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.auth().state()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state().user().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Observe session events, e.g. to return to the login view on a forced
    /// logout.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.auth().subscribe()
    }

    /// Restore the session from storage at startup.
    ///
    /// With no stored token the session is unauthenticated. Otherwise the
    /// token is checked against the profile endpoint; if that fails the token
    /// is discarded. Never fails.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> SessionState {
        let stored = match self.auth().storage().load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Stored session unreadable, starting signed out");
                None
            }
        };

        let Some(stored) = stored else {
            debug!("No stored session");
            self.auth().set_state(SessionState::Unauthenticated);
            return SessionState::Unauthenticated;
        };

        self.auth().set_token(stored.token.clone()).await;
        self.auth().set_state(SessionState::Hydrating);

        match self.api.profile().await {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored");
                self.auth().establish(stored, user).await;
            }
            Err(e) => {
                info!(error = %e, "Stored session rejected, discarding token");
                self.auth().invalidate(false).await;
            }
        }

        self.state()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthFailure` carrying the server message (or "Login failed");
    /// the session stays unauthenticated.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, AuthFailure> {
        let mut errors = FieldErrors::new();
        require(&credentials.email, "email", "Email is required", &mut errors);
        require(&credentials.password, "password", "Password is required", &mut errors);
        if !errors.is_empty() {
            return Err(AuthFailure::invalid(errors));
        }

        match self.api.login(credentials).await {
            Ok(response) => {
                let user = response.user;
                info!(user_id = %user.id, "Logged in");
                self.auth()
                    .establish(StoredSession::new(response.token, None), user.clone())
                    .await;
                Ok(user)
            }
            Err(e) => {
                debug!(error = %e, "Login rejected");
                Err(AuthFailure::from_api(&e, "Login failed"))
            }
        }
    }

    /// Create an account and sign in.
    ///
    /// The form is validated locally first; an invalid form is never sent.
    ///
    /// # Errors
    ///
    /// Returns `AuthFailure` with per-field errors from validation or from the
    /// backend, and the server message (or "Registration failed").
    #[instrument(skip_all)]
    pub async fn register(&self, form: &RegistrationForm) -> Result<UserProfile, AuthFailure> {
        validate_registration(form).map_err(AuthFailure::invalid)?;

        let request = RegisterRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
            phone: normalized_phone(&form.phone),
        };

        match self.api.register(&request).await {
            Ok(response) => {
                let user = response.user;
                info!(user_id = %user.id, "Registered");
                self.auth()
                    .establish(StoredSession::new(response.token, None), user.clone())
                    .await;
                Ok(user)
            }
            Err(e) => {
                debug!(error = %e, "Registration rejected");
                Err(AuthFailure::from_api(&e, "Registration failed"))
            }
        }
    }

    /// Sign out.
    ///
    /// The backend is notified on a best-effort basis; the local session is
    /// cleared regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.auth().has_token().await
            && let Err(e) = self.api.logout().await
        {
            warn!(error = %e, "Logout notification failed, clearing session anyway");
        }
        self.auth().invalidate(false).await;
    }

    /// Update the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when signed out, `Validation` for an
    /// invalid form, or the backend error.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<UserProfile, AppError> {
        if !self.is_authenticated() {
            return Err(AppError::NotAuthenticated);
        }
        validate_profile(form).map_err(AppError::Validation)?;

        let update = ProfileUpdate {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: normalized_phone(&form.phone),
        };
        let user = self
            .api
            .update_profile(&update)
            .await
            .map_err(|e| AppError::request("Failed to update profile", e))?;

        if let Some(token) = self.auth().token.read().await.clone()
            && let Err(e) = self.auth().storage().save(&StoredSession {
                token,
                user: Some(user.clone()),
            })
        {
            warn!(error = %e, "Failed to persist updated profile");
        }
        self.auth().set_state(SessionState::Authenticated(user.clone()));
        info!(user_id = %user.id, "Profile updated");

        Ok(user)
    }
}
