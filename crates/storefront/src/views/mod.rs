//! Page-level views over the API.
//!
//! Each view fetches on `load` and exposes its result as a [`Loadable`].
//! Nothing is cached: reloading always goes back to the backend.

mod addresses;
mod orders;
pub mod placeholder;
mod profile;
mod restaurants;

pub use addresses::AddressBook;
pub use orders::{OrderDetail, OrderListing, TimelineProgress};
pub use profile::ProfileEditor;
pub use restaurants::{MenuSection, RestaurantDetail, RestaurantListing};

use crate::error::AppError;

/// Data fetched from the backend, with its loading and error state.
#[derive(Debug, Clone)]
pub struct Loadable<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Loadable<T> {
    /// Nothing fetched yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Retryable error from the last load.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Record the outcome of a load. A failed load leaves only the error,
    /// so nothing fetched under a rejected session stays readable.
    pub(crate) fn settle(&mut self, result: Result<T, AppError>) -> Result<(), AppError> {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                Ok(())
            }
            Err(e) => {
                self.data = None;
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Store `data` and an error together (a fallback was used).
    pub(crate) fn degrade(&mut self, data: T, error: String) {
        self.loading = false;
        self.data = Some(data);
        self.error = Some(error);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_drops_data_on_error() {
        let mut state = Loadable::new();
        state.begin();
        assert!(state.is_loading());
        state.settle(Ok(vec![1, 2])).unwrap();

        state.begin();
        let err = state
            .settle(Err(AppError::InvalidState("offline".to_string())))
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
        assert!(!state.is_loading());
        assert!(state.data().is_none());
        assert_eq!(state.error(), Some("offline"));
    }

    #[test]
    fn test_begin_clears_error() {
        let mut state: Loadable<u8> = Loadable::new();
        state.degrade(1, "fallback".to_string());
        state.begin();
        assert!(state.error().is_none());
    }
}
