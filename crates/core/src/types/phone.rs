//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// Nothing was entered.
    #[error("Phone number is required")]
    Empty,
    /// Not exactly ten digits.
    #[error("Phone number must be 10 digits")]
    InvalidLength,
}

/// A ten-digit phone number.
///
/// Spaces, dashes, dots and parentheses are accepted as separators and
/// stripped; what remains must be exactly ten ASCII digits.
///
/// ```
/// use food_delivery_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("(555) 123-4567").unwrap();
/// assert_eq!(phone.as_str(), "5551234567");
/// assert!(PhoneNumber::parse("555-1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Required number of digits.
    pub const DIGITS: usize = 10;

    /// Parse a phone number, normalizing separators away.
    ///
    /// # Errors
    ///
    /// Returns `PhoneError::Empty` for blank input and
    /// `PhoneError::InvalidLength` when the input is not ten digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();

        if digits.len() != Self::DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::InvalidLength);
        }

        Ok(Self(digits))
    }

    /// The normalized digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
