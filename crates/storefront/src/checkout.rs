//! Checkout flow.
//!
//! A linear four-step wizard: review the cart, enter delivery details,
//! choose payment, confirmation. `next` and `back` move one step at a time;
//! the last forward transition is [`CheckoutFlow::place_order`], which
//! creates the address if needed and then the order.
//!
//! The confirmation step expires after the configured delay. Callers that
//! keep a flow alive across orders (an interactive shell, a UI) call
//! [`CheckoutFlow::expire`] on each tick or await
//! [`CheckoutFlow::wait_and_reset`]; a one-shot command can drop the flow
//! after printing the receipt.

use std::fmt;
use std::time::{Duration, Instant};

use food_delivery_core::{AddressId, Cart, PaymentMethod};
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, CreateOrderRequest, NewAddress, OrderReceipt};
use crate::cart::CartStore;
use crate::error::{AppError, add_breadcrumb};
use crate::validation::{FieldErrors, require, validate_address};

/// Checkout steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutStep {
    #[default]
    Reviewing,
    EnteringDelivery,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    /// Zero-based position.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Reviewing => 0,
            Self::EnteringDelivery => 1,
            Self::Payment => 2,
            Self::Confirmation => 3,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reviewing => "Review Order",
            Self::EnteringDelivery => "Delivery Details",
            Self::Payment => "Payment",
            Self::Confirmation => "Confirmation",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AddressChoice {
    #[default]
    None,
    /// A saved address.
    Saved(AddressId),
    /// A new address, created when the order is placed.
    New(NewAddress),
}

/// Everything entered on the delivery and payment steps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryDetails {
    pub address: AddressChoice,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub special_instructions: String,
}

/// Check the delivery step: an address must be chosen (a saved one, or a
/// new one with line 1, city, state and postal code) and a phone entered.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_delivery(details: &DeliveryDetails) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    match &details.address {
        AddressChoice::None => errors.insert("address", "Please select a delivery address"),
        AddressChoice::Saved(_) => {}
        AddressChoice::New(form) => {
            if let Err(address_errors) = validate_address(form) {
                for (field, message) in address_errors.iter() {
                    errors.insert(field, message);
                }
            }
        }
    }
    require(&details.phone, "phone", "Phone number is required", &mut errors);
    errors.into_result()
}

/// State of one checkout.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    /// Delivery and payment details; editable until the order is placed.
    pub details: DeliveryDetails,
    created_address: Option<(NewAddress, AddressId)>,
    receipt: Option<OrderReceipt>,
    last_error: Option<String>,
    reset_at: Option<Instant>,
    reset_delay: Duration,
}

impl CheckoutFlow {
    /// A fresh flow that resets `reset_delay` after confirmation.
    #[must_use]
    pub fn new(reset_delay: Duration) -> Self {
        Self {
            step: CheckoutStep::Reviewing,
            details: DeliveryDetails::default(),
            created_address: None,
            receipt: None,
            last_error: None,
            reset_at: None,
            reset_delay,
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Whether an order has been placed in this flow.
    #[must_use]
    pub const fn order_placed(&self) -> bool {
        self.receipt.is_some()
    }

    #[must_use]
    pub const fn receipt(&self) -> Option<&OrderReceipt> {
        self.receipt.as_ref()
    }

    /// Banner text from the last failed transition.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// When the confirmation step resets, if it is showing.
    #[must_use]
    pub const fn reset_at(&self) -> Option<Instant> {
        self.reset_at
    }

    /// Advance from review to delivery, or from delivery to payment.
    ///
    /// # Errors
    ///
    /// `InvalidState` for an empty cart or from the payment and
    /// confirmation steps (use [`Self::place_order`]); `Validation` when the
    /// delivery details are incomplete. The step is unchanged on error.
    pub fn next(&mut self, cart: &Cart) -> Result<CheckoutStep, AppError> {
        let result = match self.step {
            CheckoutStep::Reviewing if cart.is_empty() => {
                Err(AppError::InvalidState("Your cart is empty".to_string()))
            }
            CheckoutStep::Reviewing => Ok(CheckoutStep::EnteringDelivery),
            CheckoutStep::EnteringDelivery => validate_delivery(&self.details)
                .map(|()| CheckoutStep::Payment)
                .map_err(AppError::Validation),
            CheckoutStep::Payment => Err(AppError::InvalidState(
                "Place the order to continue".to_string(),
            )),
            CheckoutStep::Confirmation => Err(AppError::InvalidState(
                "The order has already been placed".to_string(),
            )),
        };

        self.settle(result)
    }

    /// Move one step back.
    ///
    /// # Errors
    ///
    /// `InvalidState` from the first and last steps.
    pub fn back(&mut self) -> Result<CheckoutStep, AppError> {
        let result = match self.step {
            CheckoutStep::Reviewing => Err(AppError::InvalidState(
                "Already at the first step".to_string(),
            )),
            CheckoutStep::Confirmation => Err(AppError::InvalidState(
                "The order has already been placed".to_string(),
            )),
            CheckoutStep::EnteringDelivery => Ok(CheckoutStep::Reviewing),
            CheckoutStep::Payment => Ok(CheckoutStep::EnteringDelivery),
        };

        self.settle(result)
    }

    fn settle(&mut self, result: Result<CheckoutStep, AppError>) -> Result<CheckoutStep, AppError> {
        match result {
            Ok(step) => {
                self.step = step;
                self.last_error = None;
                Ok(step)
            }
            Err(e) => {
                self.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Place the order: payment to confirmation.
    ///
    /// Creates the new address first if one was entered (at most once per
    /// distinct form, so a retry reuses it), then the order. On success the
    /// cart is cleared and the reset deadline is set. On failure the flow
    /// stays on the payment step and the cart is untouched.
    ///
    /// Taking `&mut self` rules out a second submission while one is in
    /// flight.
    ///
    /// # Errors
    ///
    /// `InvalidState` outside the payment step, `Validation` if the
    /// delivery details were edited into an invalid state, or the backend
    /// error from address or order creation.
    #[instrument(skip_all, fields(payment_method = %self.details.payment_method))]
    pub async fn place_order(
        &mut self,
        api: &ApiClient,
        cart: &CartStore,
    ) -> Result<OrderReceipt, AppError> {
        if self.step != CheckoutStep::Payment {
            return Err(AppError::InvalidState(format!(
                "Cannot place an order from the {} step",
                self.step
            )));
        }
        if let Err(errors) = validate_delivery(&self.details) {
            let err = AppError::Validation(errors);
            self.last_error = Some(err.user_message());
            return Err(err);
        }

        let address_id = match self.resolve_address(api).await {
            Ok(id) => id,
            Err(e) => {
                self.last_error = Some(e.user_message());
                return Err(e);
            }
        };

        let request = CreateOrderRequest {
            address_id,
            payment_method: self.details.payment_method,
            phone: self.details.phone.trim().to_string(),
            special_instructions: self.details.special_instructions.trim().to_string(),
        };

        let receipt = match api.create_order(&request).await {
            Ok(receipt) => receipt,
            Err(e) => {
                let err = AppError::request("Failed to place order. Please try again.", e);
                self.last_error = Some(err.user_message());
                return Err(err);
            }
        };

        info!(order_id = ?receipt.order_id, "Order placed");
        add_breadcrumb("checkout", "Order placed", None);

        self.receipt = Some(receipt.clone());
        self.last_error = None;
        self.step = CheckoutStep::Confirmation;
        self.reset_at = Some(Instant::now() + self.reset_delay);

        if let Err(e) = cart.clear().await {
            warn!(error = %e, "Order placed but the cart could not be cleared");
        }

        Ok(receipt)
    }

    async fn resolve_address(&mut self, api: &ApiClient) -> Result<AddressId, AppError> {
        match &self.details.address {
            AddressChoice::Saved(id) => Ok(*id),
            AddressChoice::New(form) => {
                if let Some((created_form, id)) = &self.created_address
                    && created_form == form
                {
                    return Ok(*id);
                }
                let form = form.clone();
                let id = api
                    .create_address(&form)
                    .await
                    .map_err(|e| AppError::request("Failed to save address. Please try again.", e))?;
                info!(address_id = %id, "Delivery address saved");
                self.created_address = Some((form, id));
                Ok(id)
            }
            AddressChoice::None => Err(AppError::InvalidState(
                "Please select a delivery address".to_string(),
            )),
        }
    }

    /// Reset the flow if the confirmation delay has elapsed at `now`.
    /// Returns whether it reset.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.reset_at {
            Some(at) if now >= at => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Wait out the confirmation delay, then reset. Returns immediately if
    /// no confirmation is showing.
    pub async fn wait_and_reset(&mut self) {
        if let Some(at) = self.reset_at {
            tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await;
            self.reset();
        }
    }

    /// Back to an empty review step.
    pub fn reset(&mut self) {
        *self = Self::new(self.reset_delay);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use food_delivery_core::{AddressLabel, CurrencyCode, MenuItemId, NewLineItem, Price};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::session::AuthContext;
    use crate::storage::MemoryTokenStore;

    fn cart_with_pizza() -> Cart {
        let mut cart = Cart::new();
        cart.add(NewLineItem {
            id: MenuItemId::new(1),
            name: "Margherita Pizza".to_string(),
            unit_price: Price::from_cents(1299, CurrencyCode::USD),
            source_label: "Pizza Palace".to_string(),
            image_ref: None,
        })
        .unwrap();
        cart
    }

    fn new_address() -> NewAddress {
        NewAddress {
            address_line1: "12 High St".to_string(),
            address_line2: None,
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            label: AddressLabel::Home,
        }
    }

    fn clients(server: &MockServer) -> (ApiClient, CartStore) {
        let config = StorefrontConfig::for_base_url(&format!("{}/api", server.uri())).unwrap();
        let auth = Arc::new(AuthContext::new(Arc::new(MemoryTokenStore::new())));
        let api = ApiClient::new(&config, auth).unwrap();
        let cart = CartStore::new(api.clone());
        (api, cart)
    }

    fn flow_at_payment(address: AddressChoice) -> CheckoutFlow {
        let mut flow = CheckoutFlow::new(Duration::from_millis(50));
        flow.next(&cart_with_pizza()).unwrap();
        flow.details.address = address;
        flow.details.phone = "5551234567".to_string();
        flow.next(&cart_with_pizza()).unwrap();
        assert_eq!(flow.step(), CheckoutStep::Payment);
        flow
    }

    #[test]
    fn test_empty_cart_cannot_start() {
        let mut flow = CheckoutFlow::new(Duration::from_secs(3));
        let err = flow.next(&Cart::new()).unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(flow.step(), CheckoutStep::Reviewing);
        assert_eq!(flow.last_error(), Some("Your cart is empty"));
    }

    #[test]
    fn test_delivery_gate_without_address() {
        let mut flow = CheckoutFlow::new(Duration::from_secs(3));
        flow.next(&cart_with_pizza()).unwrap();
        flow.details.phone = "5551234567".to_string();

        let err = flow.next(&cart_with_pizza()).unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().get("address"),
            Some("Please select a delivery address")
        );
        assert_eq!(flow.step(), CheckoutStep::EnteringDelivery);
    }

    #[test]
    fn test_delivery_gate_incomplete_new_address() {
        let mut details = DeliveryDetails {
            address: AddressChoice::New(NewAddress {
                city: String::new(),
                ..new_address()
            }),
            phone: String::new(),
            ..DeliveryDetails::default()
        };

        let errors = validate_delivery(&details).unwrap_err();
        assert_eq!(errors.get("city"), Some("City is required"));
        assert_eq!(errors.get("phone"), Some("Phone number is required"));

        details.address = AddressChoice::New(new_address());
        details.phone = "5551234567".to_string();
        assert!(validate_delivery(&details).is_ok());
    }

    #[test]
    fn test_saved_address_passes_gate() {
        let details = DeliveryDetails {
            address: AddressChoice::Saved(AddressId::new(4)),
            phone: "5551234567".to_string(),
            ..DeliveryDetails::default()
        };
        assert!(validate_delivery(&details).is_ok());
    }

    #[test]
    fn test_back_rules() {
        let mut flow = CheckoutFlow::new(Duration::from_secs(3));
        assert!(flow.back().is_err());

        flow.next(&cart_with_pizza()).unwrap();
        assert_eq!(flow.back().unwrap(), CheckoutStep::Reviewing);
    }

    #[test]
    fn test_next_from_payment_is_rejected() {
        let mut flow = flow_at_payment(AddressChoice::Saved(AddressId::new(1)));
        assert!(flow.next(&cart_with_pizza()).is_err());
        assert_eq!(flow.step(), CheckoutStep::Payment);
        assert_eq!(flow.back().unwrap(), CheckoutStep::EnteringDelivery);
    }

    #[tokio::test]
    async fn test_place_order_with_saved_address() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .and(body_json(json!({
                "addressId": 4,
                "paymentMethod": "cash",
                "phone": "5551234567",
                "specialInstructions": "Ring twice"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "orderId": 77 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let (api, cart) = clients(&server);
        let mut flow = flow_at_payment(AddressChoice::Saved(AddressId::new(4)));
        flow.details.payment_method = PaymentMethod::Cash;
        flow.details.special_instructions = "Ring twice".to_string();

        let receipt = flow.place_order(&api, &cart).await.unwrap();

        assert_eq!(receipt.order_id.unwrap().as_i64(), 77);
        assert_eq!(flow.step(), CheckoutStep::Confirmation);
        assert!(flow.order_placed());
        assert!(flow.reset_at().is_some());
    }

    #[tokio::test]
    async fn test_order_failure_stays_on_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (api, cart) = clients(&server);
        let before = cart.snapshot();
        let mut flow = flow_at_payment(AddressChoice::Saved(AddressId::new(4)));

        let err = flow.place_order(&api, &cart).await.unwrap_err();

        assert_eq!(err.user_message(), "Failed to place order. Please try again.");
        assert_eq!(flow.step(), CheckoutStep::Payment);
        assert!(!flow.order_placed());
        assert_eq!(cart.snapshot(), before);
        assert_eq!(
            flow.last_error(),
            Some("Failed to place order. Please try again.")
        );
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.method.as_str() != "DELETE"));
    }

    #[tokio::test]
    async fn test_address_failure_aborts_before_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/addresses"))
            .respond_with(ResponseTemplate::new(422))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let (api, cart) = clients(&server);
        let mut flow = flow_at_payment(AddressChoice::New(new_address()));

        let err = flow.place_order(&api, &cart).await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to save address. Please try again.");
        assert_eq!(flow.step(), CheckoutStep::Payment);
    }

    #[tokio::test]
    async fn test_retry_reuses_created_address() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/addresses"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "addressId": 9 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .and(body_json(json!({
                "addressId": 9,
                "paymentMethod": "card",
                "phone": "5551234567",
                "specialInstructions": ""
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 12 })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let (api, cart) = clients(&server);
        let mut flow = flow_at_payment(AddressChoice::New(new_address()));

        assert!(flow.place_order(&api, &cart).await.is_err());
        let receipt = flow.place_order(&api, &cart).await.unwrap();
        assert_eq!(receipt.order_id.unwrap().as_i64(), 12);
    }

    #[tokio::test]
    async fn test_place_order_outside_payment_step() {
        let server = MockServer::start().await;
        let (api, cart) = clients(&server);
        let mut flow = CheckoutFlow::new(Duration::from_secs(3));

        assert!(matches!(
            flow.place_order(&api, &cart).await,
            Err(AppError::InvalidState(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_expire_resets_after_delay() {
        let mut flow = flow_at_payment(AddressChoice::Saved(AddressId::new(1)));
        let now = Instant::now();
        flow.step = CheckoutStep::Confirmation;
        flow.reset_at = Some(now + Duration::from_secs(3));

        assert!(!flow.expire(now));
        assert_eq!(flow.step(), CheckoutStep::Confirmation);

        assert!(flow.expire(now + Duration::from_secs(3)));
        assert_eq!(flow.step(), CheckoutStep::Reviewing);
        assert_eq!(flow.details, DeliveryDetails::default());
    }

    #[tokio::test]
    async fn test_wait_and_reset() {
        let mut flow = flow_at_payment(AddressChoice::Saved(AddressId::new(1)));
        flow.step = CheckoutStep::Confirmation;
        flow.reset_at = Some(Instant::now() + Duration::from_millis(20));

        flow.wait_and_reset().await;
        assert_eq!(flow.step(), CheckoutStep::Reviewing);
        assert!(flow.reset_at().is_none());
    }
}
