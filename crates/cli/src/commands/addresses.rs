//! Saved address commands.

use clap::Args;
use food_delivery_core::{AddressId, AddressLabel};
use food_delivery_storefront::api::NewAddress;
use food_delivery_storefront::views::AddressBook;
use food_delivery_storefront::Storefront;

use super::require_login;
use crate::error::CliError;
use crate::output;

/// A full address on the command line.
#[derive(Debug, Args)]
pub struct AddressArgs {
    /// Street address
    #[arg(long)]
    street: String,

    /// Apartment, suite, floor
    #[arg(long)]
    line2: Option<String>,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    /// ZIP or postal code
    #[arg(long)]
    zip: String,

    /// `home`, `work` or `other`
    #[arg(long, default_value_t = AddressLabel::Home)]
    label: AddressLabel,
}

impl AddressArgs {
    fn into_form(self) -> NewAddress {
        NewAddress {
            address_line1: self.street,
            address_line2: self.line2.filter(|l| !l.trim().is_empty()),
            city: self.city,
            state: self.state,
            postal_code: self.zip,
            label: self.label,
        }
    }
}

/// # Errors
///
/// Returns `NotAuthenticated` or the fetch error.
pub async fn list(storefront: &Storefront) -> Result<(), CliError> {
    let book = loaded(storefront).await?;
    output::addresses(&book);
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated`, missing fields, or the backend error.
pub async fn add(storefront: &Storefront, address: AddressArgs) -> Result<(), CliError> {
    require_login(storefront)?;
    let mut book = AddressBook::new();
    let id = book.create(storefront.api(), &address.into_form()).await?;

    output::notice(&format!("Address #{id} saved."));
    finish(&book);
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated`, missing fields, or the backend error.
pub async fn update(
    storefront: &Storefront,
    id: AddressId,
    address: AddressArgs,
) -> Result<(), CliError> {
    require_login(storefront)?;
    let mut book = AddressBook::new();
    book.update(storefront.api(), id, &address.into_form()).await?;

    output::notice(&format!("Address #{id} updated."));
    finish(&book);
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated` or the backend error.
pub async fn remove(storefront: &Storefront, id: AddressId) -> Result<(), CliError> {
    require_login(storefront)?;
    let mut book = AddressBook::new();
    book.delete(storefront.api(), id).await?;

    output::notice(&format!("Address #{id} deleted."));
    finish(&book);
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated` or the backend error.
pub async fn set_default(storefront: &Storefront, id: AddressId) -> Result<(), CliError> {
    require_login(storefront)?;
    let mut book = AddressBook::new();
    book.set_default(storefront.api(), id).await?;
    finish(&book);
    Ok(())
}

async fn loaded(storefront: &Storefront) -> Result<AddressBook, CliError> {
    require_login(storefront)?;
    let mut book = AddressBook::new();
    book.load(storefront.api()).await?;
    Ok(book)
}

/// Show the reloaded list, or why it could not be reloaded.
fn finish(book: &AddressBook) {
    if let Some(error) = book.state().error() {
        output::banner(error);
    }
    output::addresses(book);
}
