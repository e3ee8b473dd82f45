//! Demo restaurants shown when the listing cannot be fetched.

use food_delivery_core::{MenuItemId, RestaurantId};
use rust_decimal::Decimal;

use crate::api::{MenuItem, Restaurant, RestaurantQuery, RestaurantSort};

struct Dish {
    id: i64,
    name: &'static str,
    cents: i64,
    category: &'static str,
    description: &'static str,
}

struct Listing {
    id: i64,
    name: &'static str,
    cuisine: &'static str,
    rating: f64,
    delivery_time: &'static str,
    min_order: &'static str,
    address: &'static str,
    phone: &'static str,
    description: &'static str,
    menu: &'static [Dish],
}

const fn dish(
    id: i64,
    name: &'static str,
    cents: i64,
    category: &'static str,
    description: &'static str,
) -> Dish {
    Dish {
        id,
        name,
        cents,
        category,
        description,
    }
}

const LISTINGS: [Listing; 3] = [
    Listing {
        id: 1,
        name: "Pizza Palace",
        cuisine: "Italian",
        rating: 4.5,
        delivery_time: "25-35 min",
        min_order: "$15",
        address: "123 Main St, Downtown",
        phone: "+1 (555) 123-4567",
        description: "Authentic Italian pizza with fresh ingredients and traditional recipes.",
        menu: &[
            dish(1, "Margherita Pizza", 1299, "Pizzas", "Fresh mozzarella, tomato sauce, and basil"),
            dish(2, "Pepperoni Pizza", 1499, "Pizzas", "Spicy pepperoni with melted cheese"),
            dish(3, "BBQ Chicken Pizza", 1699, "Pizzas", "BBQ sauce, grilled chicken, red onions"),
            dish(4, "Garlic Bread", 499, "Sides", "Fresh baked garlic bread"),
            dish(5, "Caesar Salad", 699, "Sides", "Fresh romaine lettuce with caesar dressing"),
            dish(6, "Coca Cola", 299, "Beverages", "Refreshing cola drink"),
            dish(7, "Lemonade", 399, "Beverages", "Fresh squeezed lemonade"),
        ],
    },
    Listing {
        id: 2,
        name: "Burger House",
        cuisine: "American",
        rating: 4.2,
        delivery_time: "20-30 min",
        min_order: "$12",
        address: "456 Oak Ave, Midtown",
        phone: "+1 (555) 234-5678",
        description: "Juicy burgers and crispy fries made with premium beef and fresh vegetables.",
        menu: &[
            dish(8, "Classic Cheeseburger", 899, "Burgers", "Beef patty with cheese, lettuce, tomato"),
            dish(9, "Bacon Deluxe", 1199, "Burgers", "Beef patty with bacon, cheese, special sauce"),
            dish(10, "Veggie Burger", 999, "Burgers", "Plant-based patty with fresh vegetables"),
            dish(11, "French Fries", 399, "Sides", "Crispy golden fries"),
            dish(12, "Onion Rings", 499, "Sides", "Crispy battered onion rings"),
            dish(13, "Milkshake", 499, "Beverages", "Creamy vanilla milkshake"),
            dish(14, "Iced Tea", 299, "Beverages", "Refreshing iced tea"),
        ],
    },
    Listing {
        id: 3,
        name: "Sushi Express",
        cuisine: "Japanese",
        rating: 4.7,
        delivery_time: "30-45 min",
        min_order: "$20",
        address: "789 Pine St, Uptown",
        phone: "+1 (555) 345-6789",
        description: "Fresh sushi and sashimi prepared by expert chefs with the finest ingredients.",
        menu: &[
            dish(15, "California Roll", 899, "Sushi Rolls", "Crab, avocado, cucumber"),
            dish(16, "Spicy Tuna Roll", 1099, "Sushi Rolls", "Spicy tuna with spicy mayo"),
            dish(17, "Dragon Roll", 1499, "Sushi Rolls", "Eel, avocado, cucumber"),
            dish(18, "Salmon Sashimi", 1299, "Sashimi", "Fresh salmon sashimi"),
            dish(19, "Tuna Sashimi", 1399, "Sashimi", "Fresh tuna sashimi"),
            dish(20, "Green Tea", 299, "Beverages", "Traditional Japanese green tea"),
            dish(21, "Miso Soup", 399, "Beverages", "Warm miso soup"),
        ],
    },
];

impl Listing {
    fn to_restaurant(&self) -> Restaurant {
        Restaurant {
            id: RestaurantId::new(self.id),
            name: self.name.to_string(),
            cuisine: self.cuisine.to_string(),
            rating: Some(self.rating),
            description: Some(self.description.to_string()),
            image: None,
            delivery_time: Some(self.delivery_time.to_string()),
            delivery_fee: None,
            min_order: Some(self.min_order.to_string()),
            address: Some(self.address.to_string()),
            phone: Some(self.phone.to_string()),
            menu: self.menu.iter().map(Dish::to_menu_item).collect(),
        }
    }
}

impl Dish {
    fn to_menu_item(&self) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(self.id),
            name: self.name.to_string(),
            price: Decimal::new(self.cents, 2),
            description: Some(self.description.to_string()),
            image: None,
            category: Some(self.category.to_string()),
            available: true,
        }
    }
}

/// All demo restaurants with their menus.
#[must_use]
pub fn restaurants() -> Vec<Restaurant> {
    LISTINGS.iter().map(Listing::to_restaurant).collect()
}

/// One demo restaurant.
#[must_use]
pub fn restaurant(id: RestaurantId) -> Option<Restaurant> {
    LISTINGS
        .iter()
        .find(|l| l.id == id.as_i64())
        .map(Listing::to_restaurant)
}

/// Demo restaurants narrowed by the query's search, cuisine and sort.
/// Pagination is ignored; the whole set fits on one page.
#[must_use]
pub fn matching(query: &RestaurantQuery) -> Vec<Restaurant> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let cuisine = query
        .cuisine
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut found: Vec<Restaurant> = restaurants()
        .into_iter()
        .filter(|r| {
            search.as_deref().is_none_or(|s| {
                r.name.to_lowercase().contains(s) || r.cuisine.to_lowercase().contains(s)
            })
        })
        .filter(|r| cuisine.is_none_or(|c| r.cuisine.eq_ignore_ascii_case(c)))
        .collect();

    match query.sort {
        Some(RestaurantSort::Rating) => found.sort_by(|a, b| {
            b.rating
                .unwrap_or_default()
                .total_cmp(&a.rating.unwrap_or_default())
        }),
        Some(RestaurantSort::DeliveryTime) => {
            found.sort_by_key(|r| r.delivery_time.as_deref().map(leading_minutes));
        }
        Some(RestaurantSort::Name) => found.sort_by(|a, b| a.name.cmp(&b.name)),
        None => {}
    }

    found
}

/// `"25-35 min"` -> 25.
fn leading_minutes(text: &str) -> u32 {
    text.chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_three_restaurants_with_menus() {
        let all = restaurants();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|r| r.menu.len() == 7));

        let burger = restaurant(RestaurantId::new(2)).unwrap();
        assert_eq!(burger.name, "Burger House");
        let fries = burger.menu_item(MenuItemId::new(11)).unwrap();
        assert_eq!(fries.price, Decimal::new(399, 2));
    }

    #[test]
    fn test_matching_search_and_cuisine() {
        let query = RestaurantQuery {
            search: Some("SUSHI".to_string()),
            ..RestaurantQuery::default()
        };
        let found = matching(&query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Sushi Express");

        let query = RestaurantQuery {
            cuisine: Some("american".to_string()),
            ..RestaurantQuery::default()
        };
        assert_eq!(matching(&query)[0].name, "Burger House");
    }

    #[test]
    fn test_matching_sorts() {
        let by = |sort| {
            matching(&RestaurantQuery {
                sort: Some(sort),
                ..RestaurantQuery::default()
            })
            .into_iter()
            .map(|r| r.name)
            .collect::<Vec<_>>()
        };

        assert_eq!(
            by(RestaurantSort::Rating),
            ["Sushi Express", "Pizza Palace", "Burger House"]
        );
        assert_eq!(
            by(RestaurantSort::DeliveryTime),
            ["Burger House", "Pizza Palace", "Sushi Express"]
        );
        assert_eq!(
            by(RestaurantSort::Name),
            ["Burger House", "Pizza Palace", "Sushi Express"]
        );
    }

    #[test]
    fn test_unknown_restaurant() {
        assert!(restaurant(RestaurantId::new(99)).is_none());
    }
}
