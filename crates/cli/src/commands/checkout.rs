//! `food checkout`: walk the checkout steps non-interactively.

use clap::Args;
use food_delivery_core::{AddressId, AddressLabel, PaymentMethod};
use food_delivery_storefront::api::NewAddress;
use food_delivery_storefront::{AddressChoice, DeliveryDetails, Storefront};
use tracing::info;

use super::require_login;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Deliver to a saved address
    #[arg(long, conflicts_with_all = ["street", "line2", "city", "state", "zip"])]
    address_id: Option<AddressId>,

    /// Street address of a new delivery address
    #[arg(long)]
    street: Option<String>,

    #[arg(long)]
    line2: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    zip: Option<String>,

    /// Label for the new address
    #[arg(long, default_value_t = AddressLabel::Home)]
    label: AddressLabel,

    /// Contact phone (defaults to the profile phone)
    #[arg(long)]
    phone: Option<String>,

    /// `card`, `cash` or `digital`
    #[arg(long, default_value_t = PaymentMethod::Card)]
    payment: PaymentMethod,

    /// Special instructions for the courier
    #[arg(long)]
    notes: Option<String>,
}

impl CheckoutArgs {
    /// A saved address, a new one if any of its fields were given, or none.
    fn address_choice(&mut self) -> AddressChoice {
        if let Some(id) = self.address_id {
            return AddressChoice::Saved(id);
        }
        let given = [&self.street, &self.city, &self.state, &self.zip]
            .iter()
            .any(|field| field.is_some());
        if !given {
            return AddressChoice::None;
        }
        AddressChoice::New(NewAddress {
            address_line1: self.street.take().unwrap_or_default(),
            address_line2: self.line2.take().filter(|l| !l.trim().is_empty()),
            city: self.city.take().unwrap_or_default(),
            state: self.state.take().unwrap_or_default(),
            postal_code: self.zip.take().unwrap_or_default(),
            label: self.label,
        })
    }
}

/// Review the cart, enter delivery details, place the order.
///
/// # Errors
///
/// Returns the first failing step: an empty cart, incomplete delivery
/// details, or the backend error.
pub async fn run(storefront: &Storefront, mut args: CheckoutArgs) -> Result<(), CliError> {
    let user = require_login(storefront)?;
    storefront.cart().refresh().await?;
    let cart = storefront.cart().snapshot();

    let mut flow = storefront.checkout();
    flow.next(&cart)?;
    output::cart(&cart);

    flow.details = DeliveryDetails {
        address: args.address_choice(),
        phone: args.phone.take().or(user.phone).unwrap_or_default(),
        payment_method: args.payment,
        special_instructions: args.notes.take().unwrap_or_default(),
    };
    flow.next(&cart)?;
    info!(step = %flow.step(), "Delivery details accepted");

    let receipt = flow.place_order(storefront.api(), storefront.cart()).await?;
    output::receipt(&receipt);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CheckoutArgs,
    }

    fn parse(argv: &[&str]) -> CheckoutArgs {
        Harness::try_parse_from(std::iter::once("checkout").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_saved_address() {
        let mut args = parse(&["--address-id", "4", "--payment", "cash"]);
        assert_eq!(args.address_choice(), AddressChoice::Saved(AddressId::new(4)));
        assert_eq!(args.payment, PaymentMethod::Cash);
    }

    #[test]
    fn test_partial_new_address_is_kept_for_validation() {
        let mut args = parse(&["--street", "12 High St", "--city", "Springfield"]);
        let AddressChoice::New(form) = args.address_choice() else {
            panic!("expected a new address");
        };
        assert_eq!(form.address_line1, "12 High St");
        assert!(form.state.is_empty());
        assert_eq!(form.label, AddressLabel::Home);
    }

    #[test]
    fn test_no_address() {
        let mut args = parse(&[]);
        assert_eq!(args.address_choice(), AddressChoice::None);
        assert_eq!(args.payment, PaymentMethod::Card);
    }

    #[test]
    fn test_saved_and_new_conflict() {
        let result = Harness::try_parse_from(["checkout", "--address-id", "4", "--city", "X"]);
        assert!(result.is_err());
    }
}
