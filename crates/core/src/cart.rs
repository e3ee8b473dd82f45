//! Cart model.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s, unique by menu item id.
//! Quantities are always at least one: any update that would take a
//! quantity to zero or below removes the line instead. Every line is priced
//! in the same currency. Totals are derived on every read and never cached.

use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, MenuItemId, Price, PriceError};

/// A menu item as offered to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    /// Menu item id; the line's identity.
    pub id: MenuItemId,
    /// Display name.
    pub name: String,
    /// Price of a single unit.
    pub unit_price: Price,
    /// Where the item comes from, usually the restaurant name.
    pub source_label: String,
    /// Image URL, if any.
    pub image_ref: Option<String>,
}

/// One product-and-quantity entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Menu item id; the line's identity.
    pub id: MenuItemId,
    /// Display name.
    pub name: String,
    /// Price of a single unit.
    pub unit_price: Price,
    /// Where the item comes from, usually the restaurant name.
    pub source_label: String,
    /// Image URL, if any.
    pub image_ref: Option<String>,
    quantity: u32,
}

impl LineItem {
    /// Build a line with the given quantity.
    ///
    /// Returns `None` if `quantity` is not a positive number that fits in
    /// a `u32`.
    #[must_use]
    pub fn with_quantity(item: NewLineItem, quantity: i64) -> Option<Self> {
        let quantity = u32::try_from(quantity).ok().filter(|q| *q > 0)?;
        Some(Self {
            id: item.id,
            name: item.name,
            unit_price: item.unit_price,
            source_label: item.source_label,
            image_ref: item.image_ref,
            quantity,
        })
    }

    /// Number of units; always at least one.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Ordered collection of line items, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from untrusted lines (e.g. a backend response).
    ///
    /// Lines with a non-positive quantity are dropped and repeated ids are
    /// merged by summing their quantities, keeping the first occurrence's
    /// position and details. Lines priced in a currency other than the first
    /// kept line's are dropped.
    #[must_use]
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (NewLineItem, i64)>,
    {
        let mut cart = Self::new();
        for (item, quantity) in lines {
            if quantity <= 0 || cart.check_currency(&item.unit_price).is_err() {
                continue;
            }
            if let Some(existing) = cart.find_mut(item.id) {
                let extra = u32::try_from(quantity).unwrap_or(u32::MAX);
                existing.quantity = existing.quantity.saturating_add(extra);
            } else if let Some(line) = LineItem::with_quantity(item, quantity) {
                cart.items.push(line);
            }
        }
        cart
    }

    /// Add one unit of `item`.
    ///
    /// Increments the existing line if the id is already present, otherwise
    /// appends a new line with quantity one.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` if `item` is priced in a
    /// different currency from the lines already in the cart; the cart is
    /// unchanged.
    pub fn add(&mut self, item: NewLineItem) -> Result<(), PriceError> {
        self.check_currency(&item.unit_price)?;
        if let Some(existing) = self.find_mut(item.id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return Ok(());
        }
        self.items.push(LineItem {
            id: item.id,
            name: item.name,
            unit_price: item.unit_price,
            source_label: item.source_label,
            image_ref: item.image_ref,
            quantity: 1,
        });
        Ok(())
    }

    /// Overwrite the quantity of line `id`.
    ///
    /// A quantity of zero or below removes the line. Unknown ids are ignored.
    pub fn set_quantity(&mut self, id: MenuItemId, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        if let Some(existing) = self.find_mut(id) {
            existing.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Drop line `id` if present.
    pub fn remove(&mut self, id: MenuItemId) {
        self.items.retain(|line| line.id != id);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by id.
    #[must_use]
    pub fn get(&self, id: MenuItemId) -> Option<&LineItem> {
        self.items.iter().find(|line| line.id == id)
    }

    /// Currency every line is priced in; `None` for an empty cart.
    #[must_use]
    pub fn currency(&self) -> Option<CurrencyCode> {
        self.items.first().map(|line| line.unit_price.currency_code)
    }

    /// Check that a line priced at `price` may join this cart.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` if the cart already holds lines
    /// in another currency.
    pub fn check_currency(&self, price: &Price) -> Result<(), PriceError> {
        match self.currency() {
            Some(currency) if currency != price.currency_code => Err(PriceError::CurrencyMismatch {
                left: currency,
                right: price.currency_code,
            }),
            _ => Ok(()),
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of unit price times quantity, in the cart's currency.
    #[must_use]
    pub fn total(&self) -> Price {
        let currency = self.currency().unwrap_or_default();

        let amount = self
            .items
            .iter()
            .map(|line| line.line_total().amount)
            .sum();

        Price::new(amount, currency)
    }

    fn find_mut(&mut self, id: MenuItemId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|line| line.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: i64, cents: i64) -> NewLineItem {
        NewLineItem {
            id: MenuItemId::new(id),
            name: format!("Item {id}"),
            unit_price: Price::from_cents(cents, CurrencyCode::USD),
            source_label: "Pizza Palace".to_string(),
            image_ref: None,
        }
    }

    #[test]
    fn test_add_existing_increments_quantity() {
        let mut cart = Cart::new();
        cart.add(item(1, 1299)).unwrap();
        cart.add(item(1, 1299)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(MenuItemId::new(1)).unwrap().quantity(), 2);
        assert_eq!(cart.total(), Price::from_cents(2598, CurrencyCode::USD));
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add(item(3, 100)).unwrap();
        cart.add(item(1, 100)).unwrap();
        cart.add(item(3, 100)).unwrap();

        let ids: Vec<i64> = cart.items().iter().map(|l| l.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.add(item(1, 499)).unwrap();
        cart.set_quantity(MenuItemId::new(1), 5);

        assert_eq!(cart.count(), 5);
        assert_eq!(cart.total().to_string(), "$24.95");
    }

    #[test]
    fn test_set_quantity_non_positive_removes() {
        for quantity in [0, -1, -40] {
            let mut cart = Cart::new();
            cart.add(item(1, 499)).unwrap();
            cart.add(item(2, 299)).unwrap();
            cart.set_quantity(MenuItemId::new(1), quantity);

            let mut expected = Cart::new();
            expected.add(item(1, 499)).unwrap();
            expected.add(item(2, 299)).unwrap();
            expected.remove(MenuItemId::new(1));

            assert_eq!(cart, expected);
        }
    }

    #[test]
    fn test_set_quantity_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(item(1, 499)).unwrap();
        cart.set_quantity(MenuItemId::new(9), 3);
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(item(1, 499)).unwrap();
        cart.remove(MenuItemId::new(2));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_from_lines_merges_and_drops() {
        let cart = Cart::from_lines(vec![
            (item(1, 100), 2),
            (item(2, 100), 0),
            (item(1, 100), 3),
            (item(3, 100), -2),
        ]);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(MenuItemId::new(1)).unwrap().quantity(), 5);
    }

    #[test]
    fn test_add_rejects_other_currency() {
        let mut cart = Cart::new();
        cart.add(item(1, 1299)).unwrap();
        let mut euro = item(2, 500);
        euro.unit_price = Price::from_cents(500, CurrencyCode::EUR);

        let err = cart.add(euro).unwrap_err();

        assert_eq!(
            err,
            PriceError::CurrencyMismatch {
                left: CurrencyCode::USD,
                right: CurrencyCode::EUR,
            }
        );
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total(), Price::from_cents(1299, CurrencyCode::USD));
    }

    #[test]
    fn test_from_lines_keeps_first_currency() {
        let mut euro = item(2, 500);
        euro.unit_price = Price::from_cents(500, CurrencyCode::EUR);

        let cart = Cart::from_lines(vec![(item(1, 100), 1), (euro, 3)]);

        assert_eq!(cart.currency(), Some(CurrencyCode::USD));
        assert_eq!(cart.count(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i64),
        Set(i64, i64),
        Remove(i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1i64..6).prop_map(Op::Add),
            (1i64..6, -3i64..10).prop_map(|(id, q)| Op::Set(id, q)),
            (1i64..6).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_totals_match_contents(ops in prop::collection::vec(op(), 0..60)) {
            let mut cart = Cart::new();
            let mut model: BTreeMap<i64, i64> = BTreeMap::new();
            for op in ops {
                match op {
                    Op::Add(id) => {
                        cart.add(item(id, 100 * id + 99)).unwrap();
                        *model.entry(id).or_insert(0) += 1;
                    }
                    Op::Set(id, q) => {
                        cart.set_quantity(MenuItemId::new(id), q);
                        if q <= 0 {
                            model.remove(&id);
                        } else if let Some(existing) = model.get_mut(&id) {
                            *existing = q;
                        }
                    }
                    Op::Remove(id) => {
                        cart.remove(MenuItemId::new(id));
                        model.remove(&id);
                    }
                }
            }

            let expected_total: Decimal = model
                .iter()
                .map(|(id, q)| Decimal::new(100 * id + 99, 2) * Decimal::from(*q))
                .sum();
            let expected_count: i64 = model.values().sum();

            prop_assert_eq!(cart.total().amount, expected_total);
            prop_assert_eq!(i64::try_from(cart.count()).unwrap(), expected_count);
        }

        #[test]
        fn prop_ids_unique_and_quantities_positive(ops in prop::collection::vec(op(), 0..60)) {
            let mut cart = Cart::new();
            for op in ops {
                match op {
                    Op::Add(id) => cart.add(item(id, 250)).unwrap(),
                    Op::Set(id, q) => cart.set_quantity(MenuItemId::new(id), q),
                    Op::Remove(id) => cart.remove(MenuItemId::new(id)),
                }
            }

            let mut ids: Vec<i64> = cart.items().iter().map(|l| l.id.as_i64()).collect();
            let before = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), before);
            prop_assert!(cart.items().iter().all(|l| l.quantity() >= 1));
        }
    }
}
