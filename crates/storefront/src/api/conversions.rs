//! Conversions from wire types into core domain types.

use food_delivery_core::{Cart, CurrencyCode, MenuItemId, NewLineItem, Price};

use super::types::{CartItemWire, CartResponse, MenuItem, Restaurant};

/// Build a cart from the server response.
///
/// Lines without any id are skipped; duplicate ids and non-positive
/// quantities are normalised by [`Cart::from_lines`].
#[must_use]
pub fn convert_cart(response: CartResponse) -> Cart {
    Cart::from_lines(response.items.into_iter().filter_map(convert_cart_item))
}

fn convert_cart_item(item: CartItemWire) -> Option<(NewLineItem, i64)> {
    let id = item.menu_item_id.or_else(|| item.id.map(MenuItemId::new))?;
    let line = NewLineItem {
        id,
        name: item.name,
        unit_price: Price::new(item.price, CurrencyCode::USD),
        source_label: item.restaurant_name.unwrap_or_default(),
        image_ref: item.image,
    };
    Some((line, item.quantity))
}

impl MenuItem {
    /// The cart line this dish would create, labelled with its restaurant.
    #[must_use]
    pub fn to_line_item(&self, restaurant_name: &str) -> NewLineItem {
        NewLineItem {
            id: self.id,
            name: self.name.clone(),
            unit_price: Price::new(self.price, CurrencyCode::USD),
            source_label: restaurant_name.to_string(),
            image_ref: self.image.clone(),
        }
    }
}

impl Restaurant {
    /// Find a dish on this restaurant's menu.
    #[must_use]
    pub fn menu_item(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_cart_prefers_menu_item_id() {
        let response: CartResponse = serde_json::from_value(json!({
            "items": [
                { "id": 100, "menuItemId": 1, "name": "Margherita Pizza", "price": 12.99,
                  "quantity": 2, "restaurant_name": "Pizza Palace" },
                { "id": 4, "name": "Garlic Bread", "price": "4.99", "quantity": 1 }
            ],
            "total": 30.97
        }))
        .unwrap();

        let cart = convert_cart(response);
        assert_eq!(cart.items().len(), 2);
        let pizza = cart.get(MenuItemId::new(1)).unwrap();
        assert_eq!(pizza.quantity(), 2);
        assert_eq!(pizza.source_label, "Pizza Palace");
        assert!(cart.get(MenuItemId::new(4)).is_some());
        assert_eq!(cart.total().to_string(), "$30.97");
    }

    #[test]
    fn test_convert_cart_normalises_bad_lines() {
        let response: CartResponse = serde_json::from_value(json!({
            "items": [
                { "id": 1, "name": "A", "price": 1, "quantity": 1 },
                { "id": 1, "name": "A", "price": 1, "quantity": 2 },
                { "id": 2, "name": "B", "price": 1, "quantity": 0 },
                { "name": "C", "price": 1, "quantity": 3 }
            ]
        }))
        .unwrap();

        let cart = convert_cart(response);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_menu_item_to_line_item() {
        let item: MenuItem =
            serde_json::from_value(json!({ "id": 15, "name": "California Roll", "price": 8.99 }))
                .unwrap();
        let line = item.to_line_item("Sushi Express");

        assert_eq!(line.id, MenuItemId::new(15));
        assert_eq!(line.source_label, "Sushi Express");
        assert_eq!(line.unit_price.to_string(), "$8.99");
    }
}
