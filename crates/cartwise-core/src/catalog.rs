//! # Catalog
//!
//! The fixed price list. Loaded once at startup, read-only afterwards.
//!
//! ```text
//! ┌──────────────┬──────────┐
//! │  productId   │  price   │
//! ├──────────────┼──────────┤
//! │  T_SHIRT     │  $35.99  │
//! │  JEANS       │  $65.50  │
//! │  DRESS       │  $80.75  │
//! └──────────────┴──────────┘
//! ```

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::ProductId;
use crate::validation::{validate_price_cents, ValidationResult};

/// Product id → unit price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    prices: BTreeMap<ProductId, Money>,
}

impl Catalog {
    /// The standard three-product catalog.
    pub fn standard() -> Self {
        let prices = [("T_SHIRT", 3599), ("JEANS", 6550), ("DRESS", 8075)]
            .into_iter()
            .map(|(id, cents)| (ProductId::from_trusted(id), Money::from_cents(cents)))
            .collect();

        Catalog { prices }
    }

    /// Builds a catalog from `(id, cents)` pairs.
    ///
    /// ## Errors
    /// - `EmptyCatalog` if no entries are given
    /// - `Validation` if an id is malformed
    /// - `PriceOutOfRange` if a price is negative or above
    ///   [`MAX_PRICE_CENTS`](crate::MAX_PRICE_CENTS)
    pub fn from_entries<I, S>(entries: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let mut prices = BTreeMap::new();

        for (raw_id, cents) in entries {
            let product_id = ProductId::parse(raw_id.as_ref())?;
            if validate_price_cents(cents).is_err() {
                return Err(CoreError::PriceOutOfRange {
                    product_id: product_id.to_string(),
                    cents,
                });
            }
            prices.insert(product_id, Money::from_cents(cents));
        }

        if prices.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }

        Ok(Catalog { prices })
    }

    /// Returns the unit price for a product id.
    pub fn price_of(&self, product_id: &ProductId) -> Option<Money> {
        self.prices.get(product_id).copied()
    }

    /// Resolves a raw id into a catalog key and its price.
    ///
    /// ## Errors
    /// - `NotAllowed` listing the known ids when the id is well-formed but
    ///   not in the catalog
    /// - `Required` / `TooLong` / `InvalidFormat` when the id is malformed
    pub fn lookup(&self, raw_id: &str) -> ValidationResult<(ProductId, Money)> {
        let product_id = ProductId::parse(raw_id)?;

        match self.price_of(&product_id) {
            Some(price) => Ok((product_id, price)),
            None => Err(ValidationError::NotAllowed {
                field: "productId".to_string(),
                allowed: self.ids().map(|id| id.to_string()).collect(),
            }),
        }
    }

    /// Checks if the catalog lists the product.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.prices.contains_key(product_id)
    }

    /// Iterates over known ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &ProductId> {
        self.prices.keys()
    }

    /// Iterates over `(id, price)` entries in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (&ProductId, Money)> {
        self.prices.iter().map(|(id, price)| (id, *price))
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Checks if the catalog is empty. Never true for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::standard()
    }
}
