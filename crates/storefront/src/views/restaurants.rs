//! Restaurant listing and detail pages.

use food_delivery_core::{MenuItemId, RestaurantId};
use tracing::{instrument, warn};

use super::{Loadable, placeholder};
use crate::api::{ApiClient, MenuItem, NewReview, Restaurant, RestaurantQuery, Review};
use crate::cart::CartStore;
use crate::error::AppError;
use crate::validation::FieldErrors;

const LISTING_FAILED: &str = "Failed to load restaurants. Using demo data.";

/// Category heading used for dishes without one.
const UNCATEGORISED: &str = "Menu";

/// The restaurant listing.
///
/// When the backend is unreachable the listing falls back to the demo
/// restaurants, filtered by the same query, and keeps the error so the
/// caller can offer a retry.
#[derive(Debug, Clone, Default)]
pub struct RestaurantListing {
    query: RestaurantQuery,
    state: Loadable<Vec<Restaurant>>,
    total_pages: u32,
    using_placeholder: bool,
}

impl RestaurantListing {
    #[must_use]
    pub fn new(query: RestaurantQuery) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn query(&self) -> &RestaurantQuery {
        &self.query
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<Vec<Restaurant>> {
        &self.state
    }

    /// Restaurants on the current page, empty before the first load.
    #[must_use]
    pub fn restaurants(&self) -> &[Restaurant] {
        self.state.data().map_or(&[], Vec::as_slice)
    }

    /// Never less than one.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages.max(1)
    }

    /// Whether the demo restaurants are being shown.
    #[must_use]
    pub const fn using_placeholder(&self) -> bool {
        self.using_placeholder
    }

    /// Fetch the current page.
    #[instrument(skip(self, api), fields(page = self.query.page))]
    pub async fn load(&mut self, api: &ApiClient) {
        self.state.begin();
        match api.restaurants(&self.query).await {
            Ok(page) => {
                self.total_pages = page.total_pages();
                self.using_placeholder = false;
                let _ = self.state.settle(Ok(page.restaurants));
            }
            Err(e) => {
                warn!(error = %e, "Restaurant listing unavailable, showing demo data");
                self.total_pages = 1;
                self.using_placeholder = true;
                self.state
                    .degrade(placeholder::matching(&self.query), LISTING_FAILED.to_string());
            }
        }
    }

    /// Replace the filters and fetch from the first page.
    pub async fn search(&mut self, api: &ApiClient, query: RestaurantQuery) {
        self.query = RestaurantQuery { page: 1, ..query };
        self.load(api).await;
    }

    /// Jump to `page`, clamped to the known page range.
    pub async fn go_to_page(&mut self, api: &ApiClient, page: u32) {
        self.query.page = page.clamp(1, self.total_pages());
        self.load(api).await;
    }
}

/// Dishes under one category heading.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSection<'a> {
    pub category: &'a str,
    pub items: Vec<&'a MenuItem>,
}

/// A restaurant with its menu and reviews.
#[derive(Debug, Clone)]
pub struct RestaurantDetail {
    id: RestaurantId,
    state: Loadable<(Restaurant, Vec<Review>)>,
}

impl RestaurantDetail {
    #[must_use]
    pub fn new(id: RestaurantId) -> Self {
        Self {
            id,
            state: Loadable::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<(Restaurant, Vec<Review>)> {
        &self.state
    }

    #[must_use]
    pub fn restaurant(&self) -> Option<&Restaurant> {
        self.state.data().map(|(restaurant, _)| restaurant)
    }

    #[must_use]
    pub fn reviews(&self) -> &[Review] {
        self.state.data().map_or(&[], |(_, reviews)| reviews.as_slice())
    }

    /// Fetch the restaurant and its reviews concurrently. There is no
    /// fallback: a failure is reported as is.
    ///
    /// # Errors
    ///
    /// Returns the first failure of either request.
    #[instrument(skip(self, api), fields(restaurant_id = %self.id))]
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), AppError> {
        self.state.begin();
        let result = tokio::try_join!(api.restaurant(self.id), api.reviews(self.id))
            .map_err(|e| AppError::request("Failed to load restaurant. Please try again.", e));
        self.state.settle(result)
    }

    /// The menu grouped by category, in first-seen order.
    #[must_use]
    pub fn menu_sections(&self) -> Vec<MenuSection<'_>> {
        let mut sections: Vec<MenuSection<'_>> = Vec::new();
        let Some(restaurant) = self.restaurant() else {
            return sections;
        };

        for item in &restaurant.menu {
            let category = item.category.as_deref().unwrap_or(UNCATEGORISED);
            if let Some(section) = sections.iter_mut().find(|s| s.category == category) {
                section.items.push(item);
                continue;
            }
            sections.push(MenuSection {
                category,
                items: vec![item],
            });
        }
        sections
    }

    /// Put one of this restaurant's dishes in the cart.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the page is not loaded, the dish is not on the menu
    /// or is unavailable; otherwise the cart store's error.
    pub async fn add_to_cart(&self, cart: &CartStore, item_id: MenuItemId) -> Result<(), AppError> {
        let restaurant = self
            .restaurant()
            .ok_or_else(|| AppError::InvalidState("Restaurant is not loaded".to_string()))?;
        let item = restaurant.menu_item(item_id).ok_or_else(|| {
            AppError::InvalidState(format!("No item {item_id} on {}'s menu", restaurant.name))
        })?;
        if !item.available {
            return Err(AppError::InvalidState(format!(
                "{} is currently unavailable",
                item.name
            )));
        }

        cart.add(item.to_line_item(&restaurant.name)).await
    }

    /// Post a review, then reload the page.
    ///
    /// # Errors
    ///
    /// `Validation` for a rating outside 1 to 5; otherwise the backend error.
    #[instrument(skip(self, api, comment), fields(restaurant_id = %self.id))]
    pub async fn add_review(
        &mut self,
        api: &ApiClient,
        rating: u8,
        comment: &str,
    ) -> Result<(), AppError> {
        if !(1..=5).contains(&rating) {
            let mut errors = FieldErrors::new();
            errors.insert("rating", "Rating must be between 1 and 5");
            return Err(AppError::Validation(errors));
        }

        let review = NewReview {
            rating,
            comment: comment.trim().to_string(),
        };
        api.add_review(self.id, &review)
            .await
            .map_err(|e| AppError::request("Failed to submit review", e))?;

        self.load(api).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::session::AuthContext;
    use crate::storage::MemoryTokenStore;

    fn api(server: &MockServer) -> ApiClient {
        let config = StorefrontConfig::for_base_url(&format!("{}/api", server.uri())).unwrap();
        let auth = Arc::new(AuthContext::new(Arc::new(MemoryTokenStore::new())));
        ApiClient::new(&config, auth).unwrap()
    }

    async fn mount_detail(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/restaurants/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "restaurant": {
                    "id": 5,
                    "name": "Taco Stand",
                    "cuisine": "Mexican",
                    "menu": [
                        { "id": 50, "name": "Taco", "price": 3.5, "category": "Mains" },
                        { "id": 51, "name": "Horchata", "price": 2.0, "category": "Drinks" },
                        { "id": 52, "name": "Burrito", "price": 8.0, "category": "Mains" },
                        { "id": 53, "name": "Churro", "price": 2.5, "available": false }
                    ]
                }
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/restaurants/5/reviews"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reviews": [{ "id": 1, "rating": 5, "comment": "Great", "userName": "Ada" }]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_listing_loads_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/restaurants"))
            .and(query_param("cuisine", "Thai"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "restaurants": [{ "id": 9, "name": "Thai Garden", "cuisine": "Thai" }],
                "totalPages": 3
            })))
            .mount(&server)
            .await;

        let mut listing = RestaurantListing::new(RestaurantQuery {
            cuisine: Some("Thai".to_string()),
            page: 2,
            ..RestaurantQuery::default()
        });
        listing.load(&api(&server)).await;

        assert!(!listing.using_placeholder());
        assert!(listing.state().error().is_none());
        assert_eq!(listing.total_pages(), 3);
        assert_eq!(listing.restaurants()[0].name, "Thai Garden");
    }

    #[tokio::test]
    async fn test_listing_falls_back_to_demo_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/restaurants"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut listing = RestaurantListing::new(RestaurantQuery {
            search: Some("burger".to_string()),
            ..RestaurantQuery::default()
        });
        listing.load(&api(&server)).await;

        assert!(listing.using_placeholder());
        assert_eq!(listing.state().error(), Some(LISTING_FAILED));
        assert_eq!(listing.restaurants().len(), 1);
        assert_eq!(listing.restaurants()[0].name, "Burger House");
        assert_eq!(listing.total_pages(), 1);
    }

    #[tokio::test]
    async fn test_detail_groups_menu() {
        let server = MockServer::start().await;
        mount_detail(&server).await;

        let mut detail = RestaurantDetail::new(RestaurantId::new(5));
        detail.load(&api(&server)).await.unwrap();

        assert_eq!(detail.restaurant().unwrap().name, "Taco Stand");
        assert_eq!(detail.reviews().len(), 1);

        let sections = detail.menu_sections();
        let categories: Vec<&str> = sections.iter().map(|s| s.category).collect();
        assert_eq!(categories, ["Mains", "Drinks", UNCATEGORISED]);
        assert_eq!(sections[0].items.len(), 2);
    }

    #[tokio::test]
    async fn test_detail_failure_has_no_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/restaurants/5/reviews"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reviews": [] })))
            .mount(&server)
            .await;

        let mut detail = RestaurantDetail::new(RestaurantId::new(5));
        let err = detail.load(&api(&server)).await.unwrap_err();

        assert!(matches!(
            err.api_error(),
            Some(crate::api::ApiError::NotFound(_))
        ));
        assert!(detail.restaurant().is_none());
        assert!(detail.state().error().is_some());
    }

    #[tokio::test]
    async fn test_unavailable_item_is_not_added() {
        let server = MockServer::start().await;
        mount_detail(&server).await;
        let api = api(&server);
        let cart = CartStore::new(api.clone());

        let mut detail = RestaurantDetail::new(RestaurantId::new(5));
        detail.load(&api).await.unwrap();

        let err = detail
            .add_to_cart(&cart, MenuItemId::new(53))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Churro is currently unavailable");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_review_rating_range() {
        let server = MockServer::start().await;
        mount_detail(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/restaurants/5/reviews"))
            .and(body_json(json!({ "rating": 4, "comment": "Tasty" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        let api = api(&server);

        let mut detail = RestaurantDetail::new(RestaurantId::new(5));
        let err = detail.add_review(&api, 0, "meh").await.unwrap_err();
        assert!(err.field_errors().unwrap().get("rating").is_some());

        detail.add_review(&api, 4, " Tasty ").await.unwrap();
        assert!(detail.restaurant().is_some());
    }
}
