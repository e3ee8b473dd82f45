//! Client-side form validation.
//!
//! Field errors are produced and surfaced locally; a form that fails
//! validation is never sent to the backend.

use std::collections::BTreeMap;
use std::fmt;

use food_delivery_core::{Email, PhoneNumber};
use serde::{Deserialize, Serialize};

use crate::api::NewAddress;

/// Minimum length of a display name.
const MIN_NAME_LENGTH: usize = 2;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record a message for `field`. The first message for a field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.insert(field, message);
        }
        errors
    }
}

/// Registration form as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
}

/// Profile editor form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Validate the registration form.
///
/// # Errors
///
/// Returns every failing field with a display message.
pub fn validate_registration(form: &RegistrationForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_name(&form.name, &mut errors);
    check_email(&form.email, &mut errors);
    check_phone(&form.phone, &mut errors);

    if form.password.is_empty() {
        errors.insert("password", "Password is required");
    } else if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.insert(
            "password",
            format!("Password should be of minimum {MIN_PASSWORD_LENGTH} characters length"),
        );
    }

    if form.confirm_password.is_empty() {
        errors.insert("confirmPassword", "Confirm password is required");
    } else if form.confirm_password != form.password {
        errors.insert("confirmPassword", "Passwords must match");
    }

    errors.into_result()
}

/// Validate the profile form.
///
/// # Errors
///
/// Returns every failing field with a display message.
pub fn validate_profile(form: &ProfileForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_name(&form.name, &mut errors);
    check_email(&form.email, &mut errors);
    check_phone(&form.phone, &mut errors);
    errors.into_result()
}

/// Validate an address form: line 1, city, state and postal code are
/// required.
///
/// # Errors
///
/// Returns every blank required field.
pub fn validate_address(form: &NewAddress) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    require(&form.address_line1, "addressLine1", "Street address is required", &mut errors);
    require(&form.city, "city", "City is required", &mut errors);
    require(&form.state, "state", "State is required", &mut errors);
    require(&form.postal_code, "postalCode", "ZIP code is required", &mut errors);
    errors.into_result()
}

/// Record `message` under `field` when `value` is blank.
pub fn require(value: &str, field: &str, message: &str, errors: &mut FieldErrors) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

/// Digits-only form of a phone number that passed validation.
#[must_use]
pub fn normalized_phone(raw: &str) -> String {
    PhoneNumber::parse(raw).map_or_else(|_| raw.trim().to_string(), |p| p.as_str().to_string())
}

fn check_name(name: &str, errors: &mut FieldErrors) {
    let name = name.trim();
    if name.is_empty() {
        errors.insert("name", "Name is required");
    } else if name.chars().count() < MIN_NAME_LENGTH {
        errors.insert(
            "name",
            format!("Name should be of minimum {MIN_NAME_LENGTH} characters length"),
        );
    }
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if let Err(e) = Email::parse(email) {
        errors.insert("email", e.to_string());
    }
}

fn check_phone(phone: &str, errors: &mut FieldErrors) {
    if let Err(e) = PhoneNumber::parse(phone) {
        errors.insert("phone", e.to_string());
    }
}
