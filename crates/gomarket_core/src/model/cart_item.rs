//! Cart line-item model.
//!
//! # Responsibility
//! - Define `CartItem` (product reference + quantity) and `ProductDescriptor`.
//! - Validate collections loaded from storage before they reach the store.
//!
//! # Invariants
//! - `id` is the only identity key; two items with the same `id` never
//!   coexist in one collection.
//! - `price` round-trips through JSON as a number, matching the blob layout
//!   the mobile app already writes. The number is written digit for digit,
//!   never through `f64`.
//! - Line totals saturate at the `Decimal` bounds instead of panicking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Product fields supplied by the catalog when a shopper taps "add to cart".
///
/// Same shape as `CartItem` minus `quantity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDescriptor {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: Decimal,
}

impl ProductDescriptor {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog product id; unique within a cart.
    pub id: String,
    pub title: String,
    pub image_url: String,
    /// Unit price. Serialized as an exact JSON number.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    /// Starts at 1. `decrement` has no floor, so persisted carts may carry
    /// zero or negative values.
    pub quantity: i64,
}

impl CartItem {
    /// Builds the first line for a product, with quantity 1.
    pub fn from_descriptor(descriptor: ProductDescriptor) -> Self {
        Self {
            id: descriptor.id,
            title: descriptor.title,
            image_url: descriptor.image_url,
            price: descriptor.price,
            quantity: 1,
        }
    }

    /// Line total: `price * quantity`, saturating at the `Decimal` bounds.
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Collection-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartItemValidationError {
    DuplicateId(String),
}

impl Display for CartItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "cart contains more than one item with id `{id}`"),
        }
    }
}

impl Error for CartItemValidationError {}

/// Checks the one-item-per-id invariant over a whole collection.
pub fn validate_collection(items: &[CartItem]) -> Result<(), CartItemValidationError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(CartItemValidationError::DuplicateId(item.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_collection, CartItem, CartItemValidationError, ProductDescriptor};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn shoe() -> ProductDescriptor {
        ProductDescriptor::new("1", "Shoe", "x", Decimal::new(10, 0))
    }

    #[test]
    fn from_descriptor_starts_at_quantity_one() {
        let item = CartItem::from_descriptor(shoe());
        assert_eq!(item.id, "1");
        assert_eq!(item.title, "Shoe");
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let mut item = CartItem::from_descriptor(ProductDescriptor::new(
            "2",
            "Sock",
            "y",
            Decimal::new(250, 2),
        ));
        item.quantity = 3;
        assert_eq!(item.line_total(), Decimal::new(750, 2));
    }

    #[test]
    fn line_total_saturates_instead_of_overflowing() {
        let mut item = CartItem::from_descriptor(ProductDescriptor::new(
            "3",
            "Yacht",
            "z",
            Decimal::from_str("50000000000000000000000000000").unwrap(),
        ));
        item.quantity = 2;
        assert_eq!(item.line_total(), Decimal::MAX);

        item.quantity = -2;
        assert_eq!(item.line_total(), Decimal::MIN);
    }

    #[test]
    fn high_precision_price_survives_json() {
        let price = Decimal::from_str("12345678901234567.89").unwrap();
        let item = CartItem::from_descriptor(ProductDescriptor::new("4", "Ring", "w", price));

        let raw = serde_json::to_string(&item).unwrap();
        assert!(raw.contains(r#""price":12345678901234567.89"#), "{raw}");

        let back: CartItem = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.price, price);
        assert_eq!(back, item);
    }

    #[test]
    fn serializes_price_as_json_number() {
        let item = CartItem::from_descriptor(shoe());
        let value = serde_json::to_value(&item).unwrap();
        assert!(value["price"].is_number());
        assert_eq!(value["quantity"], 1);
        assert_eq!(value["image_url"], "x");
    }

    #[test]
    fn deserializes_integer_and_fractional_prices() {
        let items: Vec<CartItem> = serde_json::from_str(
            r#"[{"id":"1","title":"Shoe","image_url":"x","price":10,"quantity":2},
                {"id":"2","title":"Hat","image_url":"y","price":19.9,"quantity":1}]"#,
        )
        .unwrap();
        assert_eq!(items[0].price, Decimal::new(10, 0));
        assert_eq!(items[1].price, Decimal::new(199, 1));
    }

    #[test]
    fn validate_collection_rejects_duplicate_ids() {
        let items = vec![
            CartItem::from_descriptor(shoe()),
            CartItem::from_descriptor(shoe()),
        ];
        let err = validate_collection(&items).unwrap_err();
        assert_eq!(err, CartItemValidationError::DuplicateId("1".to_string()));
    }
}
