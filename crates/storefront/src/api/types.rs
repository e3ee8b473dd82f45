//! Request and response shapes for the food delivery REST API.
//!
//! Responses are camelCase JSON; the backend also emits snake_case for some
//! fields, so multi-word fields accept both spellings. Requests are always
//! camelCase.

use chrono::{DateTime, NaiveDateTime, Utc};
use food_delivery_core::{
    AddressId, AddressLabel, MenuItemId, OrderId, OrderStatus, PaymentMethod, RestaurantId,
    ReviewId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

// =============================================================================
// Auth
// =============================================================================

/// The signed-in customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Profile update request body.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Token and profile returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// `GET auth/profile` answers either the bare profile or `{ user }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProfileBody {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

impl ProfileBody {
    pub(crate) fn into_profile(self) -> UserProfile {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

// =============================================================================
// Restaurants
// =============================================================================

/// A restaurant, optionally with its menu.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "image_url", alias = "imageUrl")]
    pub image: Option<String>,
    #[serde(default, alias = "delivery_time", deserialize_with = "lenient_string")]
    pub delivery_time: Option<String>,
    #[serde(default, alias = "delivery_fee")]
    pub delivery_fee: Option<Decimal>,
    #[serde(default, alias = "min_order", deserialize_with = "lenient_string")]
    pub min_order: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
}

/// A dish on a restaurant's menu.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "image_url", alias = "imageUrl")]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_available", alias = "is_available", alias = "isAvailable")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

/// One page of the restaurant listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPage {
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default, alias = "total_pages")]
    total_pages: Option<u32>,
}

impl RestaurantPage {
    /// Number of pages, never less than one.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages.unwrap_or(1).max(1)
    }
}

/// `GET restaurants/:id` answers either `{ restaurant }` or the bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RestaurantBody {
    Wrapped { restaurant: Restaurant },
    Bare(Restaurant),
}

impl RestaurantBody {
    pub(crate) fn into_restaurant(self) -> Restaurant {
        match self {
            Self::Wrapped { restaurant } | Self::Bare(restaurant) => restaurant,
        }
    }
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestaurantSort {
    Rating,
    DeliveryTime,
    Name,
}

impl RestaurantSort {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::DeliveryTime => "delivery_time",
            Self::Name => "name",
        }
    }
}

impl std::str::FromStr for RestaurantSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(Self::Rating),
            "delivery_time" | "delivery-time" => Ok(Self::DeliveryTime),
            "name" => Ok(Self::Name),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Default listing page size.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Filters for the restaurant listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantQuery {
    pub search: Option<String>,
    pub cuisine: Option<String>,
    pub sort: Option<RestaurantSort>,
    pub page: u32,
    pub limit: u32,
}

impl Default for RestaurantQuery {
    fn default() -> Self {
        Self {
            search: None,
            cuisine: None,
            sort: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RestaurantQuery {
    /// Append the query parameters to `url`. Blank filters are omitted.
    pub fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            pairs.append_pair("search", search);
        }
        if let Some(cuisine) = self.cuisine.as_deref().map(str::trim)
            && !cuisine.is_empty()
        {
            pairs.append_pair("cuisine", cuisine);
        }
        if let Some(sort) = self.sort {
            pairs.append_pair("sort", sort.as_str());
        }
        pairs.append_pair("page", &self.page.max(1).to_string());
        pairs.append_pair("limit", &self.limit.max(1).to_string());
    }
}

/// A customer review of a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, alias = "user_name")]
    pub user_name: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

/// Review submission body.
#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewsBody {
    #[serde(default)]
    pub reviews: Vec<Review>,
}

// =============================================================================
// Cart
// =============================================================================

/// Server-side cart.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub items: Vec<CartItemWire>,
    #[serde(default)]
    pub total: Option<Decimal>,
}

/// One line of the server-side cart.
///
/// Lines are identified by menu item id: `menuItemId` when present,
/// otherwise `id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemWire {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "menu_item_id")]
    pub menu_item_id: Option<MenuItemId>,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
    #[serde(default, alias = "image_url", alias = "imageUrl")]
    pub image: Option<String>,
    #[serde(default, alias = "restaurant_name")]
    pub restaurant_name: Option<String>,
}

/// `POST cart/items` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItem {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub price: Decimal,
}

/// `PUT cart/items/:id` body.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCartItem {
    pub quantity: u32,
}

// =============================================================================
// Addresses
// =============================================================================

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(alias = "address_line1", alias = "street")]
    pub address_line1: String,
    #[serde(default, alias = "address_line2")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(alias = "postal_code", alias = "pincode", alias = "zip_code")]
    pub postal_code: String,
    #[serde(default, alias = "type")]
    pub label: AddressLabel,
    #[serde(default, alias = "is_default")]
    pub is_default: bool,
}

impl Address {
    /// Single-line rendering, e.g. `12 High St, Apt 4, Springfield, IL 62701`.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.address_line1.clone()];
        if let Some(line2) = self.address_line2.as_deref().filter(|l| !l.trim().is_empty()) {
            parts.push(line2.to_string());
        }
        parts.push(self.city.clone());
        parts.push(format!("{} {}", self.state, self.postal_code));
        parts.join(", ")
    }
}

/// Address form, used both to create and to update an address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub label: AddressLabel,
}

/// Response to `POST addresses`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAddress {
    #[serde(alias = "id", alias = "address_id")]
    pub address_id: AddressId,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AddressesBody {
    #[serde(default)]
    pub addresses: Vec<Address>,
}

// =============================================================================
// Orders
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, alias = "total_amount", alias = "totalAmount")]
    pub total: Option<Decimal>,
    #[serde(default, alias = "delivery_fee")]
    pub delivery_fee: Option<Decimal>,
    #[serde(default, alias = "delivery_address", alias = "address")]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default, alias = "restaurant_name")]
    pub restaurant_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, alias = "payment_method")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, alias = "special_instructions", alias = "notes")]
    pub special_instructions: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

impl Order {
    /// Server total when supplied, otherwise the sum of the line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.total
            .unwrap_or_else(|| self.items.iter().map(OrderItem::line_total).sum())
    }

    /// Creation time, when the backend sent a parseable timestamp.
    #[must_use]
    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

/// Snapshot of a line item at the time the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, alias = "menu_item_id")]
    pub menu_item_id: Option<MenuItemId>,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Delivery address on an order: free text or a full address record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DeliveryAddress {
    Saved(Address),
    Text(String),
}

impl std::fmt::Display for DeliveryAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Saved(address) => f.write_str(&address.one_line()),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// `POST orders` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub address_id: AddressId,
    pub payment_method: PaymentMethod,
    pub phone: String,
    pub special_instructions: String,
}

/// Response to `POST orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    #[serde(default, alias = "id", alias = "order_id")]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `PUT orders/:id/status` body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrdersBody {
    #[serde(default)]
    pub orders: Vec<Order>,
}

// =============================================================================
// Health
// =============================================================================

/// Response to `GET health`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse an RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC) timestamp.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Accept a string, a number, or null for free-text fields.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_restaurant_accepts_snake_case() {
        let restaurant: Restaurant = serde_json::from_value(json!({
            "id": 1,
            "name": "Pizza Palace",
            "cuisine": "Italian",
            "rating": 4.5,
            "delivery_time": 30,
            "delivery_fee": "2.99",
            "menu": [{ "id": 1, "name": "Margherita Pizza", "price": 12.99 }]
        }))
        .unwrap();

        assert_eq!(restaurant.delivery_time.as_deref(), Some("30"));
        assert_eq!(restaurant.delivery_fee, Some(Decimal::new(299, 2)));
        assert_eq!(restaurant.menu.len(), 1);
        assert!(restaurant.menu.first().unwrap().available);
    }

    #[test]
    fn test_restaurant_body_wrapped_or_bare() {
        let wrapped: RestaurantBody =
            serde_json::from_value(json!({ "restaurant": { "id": 2, "name": "Burger House" } }))
                .unwrap();
        let bare: RestaurantBody =
            serde_json::from_value(json!({ "id": 2, "name": "Burger House" })).unwrap();

        assert_eq!(wrapped.into_restaurant().name, "Burger House");
        assert_eq!(bare.into_restaurant().id, RestaurantId::new(2));
    }

    #[test]
    fn test_query_omits_blank_filters() {
        let mut url = Url::parse("http://localhost/api/restaurants").unwrap();
        RestaurantQuery {
            search: Some("  ".to_string()),
            cuisine: Some("Italian".to_string()),
            sort: Some(RestaurantSort::DeliveryTime),
            ..RestaurantQuery::default()
        }
        .apply(&mut url);

        assert_eq!(
            url.query(),
            Some("cuisine=Italian&sort=delivery_time&page=1&limit=12")
        );
    }

    #[test]
    fn test_total_pages_never_zero() {
        let page: RestaurantPage = serde_json::from_value(json!({ "totalPages": 0 })).unwrap();
        assert_eq!(page.total_pages(), 1);
        let page: RestaurantPage = serde_json::from_value(json!({ "total_pages": 4 })).unwrap();
        assert_eq!(page.total_pages(), 4);
    }

    #[test]
    fn test_address_aliases() {
        let address: Address = serde_json::from_value(json!({
            "id": 7,
            "street": "12 High St",
            "city": "Springfield",
            "state": "IL",
            "zip_code": "62701",
            "label": "work",
            "is_default": true
        }))
        .unwrap();

        assert_eq!(address.label, AddressLabel::Work);
        assert!(address.is_default);
        assert_eq!(address.one_line(), "12 High St, Springfield, IL 62701");
    }

    #[test]
    fn test_new_address_wire_format() {
        let body = serde_json::to_value(NewAddress {
            address_line1: "12 High St".to_string(),
            address_line2: None,
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            label: AddressLabel::Home,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "addressLine1": "12 High St",
                "city": "Springfield",
                "state": "IL",
                "postalCode": "62701",
                "label": "home"
            })
        );
    }

    #[test]
    fn test_created_address_id_spellings() {
        let a: CreatedAddress = serde_json::from_value(json!({ "addressId": 5 })).unwrap();
        let b: CreatedAddress = serde_json::from_value(json!({ "id": 6 })).unwrap();
        assert_eq!(a.address_id, AddressId::new(5));
        assert_eq!(b.address_id, AddressId::new(6));
    }

    #[test]
    fn test_order_total_falls_back_to_items() {
        let order: Order = serde_json::from_value(json!({
            "id": 9,
            "status": "out_for_delivery",
            "items": [
                { "name": "Margherita Pizza", "price": 12.99, "quantity": 2 },
                { "name": "Coca Cola", "price": 2.99, "quantity": 1 }
            ],
            "created_at": "2026-03-01 18:30:00"
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.total(), Decimal::new(2897, 2));
        assert!(order.placed_at().is_some());
    }

    #[test]
    fn test_create_order_wire_format() {
        let body = serde_json::to_value(CreateOrderRequest {
            address_id: AddressId::new(3),
            payment_method: PaymentMethod::Card,
            phone: "5551234567".to_string(),
            special_instructions: String::new(),
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "addressId": 3,
                "paymentMethod": "card",
                "phone": "5551234567",
                "specialInstructions": ""
            })
        );
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2026-03-01T18:30:00Z").is_some());
        assert!(parse_timestamp("2026-03-01 18:30:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
