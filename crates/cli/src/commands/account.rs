//! Account commands: login, register, logout, whoami, profile.

use food_delivery_storefront::api::Credentials;
use food_delivery_storefront::validation::{ProfileForm, RegistrationForm};
use food_delivery_storefront::views::ProfileEditor;
use food_delivery_storefront::Storefront;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use super::require_login;
use crate::error::CliError;
use crate::output;

/// Registration details from the command line.
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

/// # Errors
///
/// Returns the login failure.
pub async fn login(
    storefront: &Storefront,
    email: String,
    password: SecretString,
) -> Result<(), CliError> {
    let credentials = Credentials {
        email,
        password: password.expose_secret().to_string(),
    };
    let user = storefront.session().login(&credentials).await?;

    output::notice(&format!("Welcome back, {}!", user.name));
    Ok(())
}

/// # Errors
///
/// Returns the validation or backend failure.
pub async fn register(storefront: &Storefront, registration: Registration) -> Result<(), CliError> {
    let form = RegistrationForm {
        name: registration.name,
        email: registration.email,
        password: registration.password.expose_secret().to_string(),
        confirm_password: registration.confirm_password.expose_secret().to_string(),
        phone: registration.phone,
    };
    let user = storefront.session().register(&form).await?;
    info!(user_id = %user.id, "Registered");

    output::notice(&format!("Welcome, {}!", user.name));
    Ok(())
}

pub async fn logout(storefront: &Storefront) {
    storefront.logout().await;
    output::notice("Signed out.");
}

/// # Errors
///
/// Returns `NotAuthenticated` when signed out.
pub fn whoami(storefront: &Storefront) -> Result<(), CliError> {
    let user = require_login(storefront)?;
    output::user(&user);
    Ok(())
}

/// Change the given fields, keeping the rest.
///
/// # Errors
///
/// Returns the validation or backend failure.
pub async fn update_profile(
    storefront: &Storefront,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
) -> Result<(), CliError> {
    let user = require_login(storefront)?;
    let mut editor = ProfileEditor::from_user(&user);
    let current = editor.form.clone();
    editor.form = ProfileForm {
        name: name.unwrap_or(current.name),
        email: email.unwrap_or(current.email),
        phone: phone.unwrap_or(current.phone),
    };

    let user = editor.save(storefront.session()).await?;
    output::notice("Profile updated.");
    output::user(&user);
    Ok(())
}
