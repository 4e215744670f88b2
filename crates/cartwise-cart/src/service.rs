//! # Cart Service
//!
//! Validates requests, freezes catalog prices into lines, and prices carts.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Service Operations                           │
//! │                                                                         │
//! │  insert_product ──► validate user + name ──► Catalog::lookup            │
//! │                      └──► ProductLine (price frozen) ──► store.insert   │
//! │                            └──► None? MutationFailure                   │
//! │                                                                         │
//! │  delete_product ──► store.find ── None? NotFound ──► ProductId::parse   │
//! │                      └──► store.delete ── false? ProductNotInCart       │
//! │                            └──► "1x <id> removed successfully."         │
//! │                                                                         │
//! │  clear_cart ─────► store.clear ──► "Cart cleared successfully."         │
//! │                                                                         │
//! │  find_cart ──────► store.find ── None? NotFound                         │
//! │                                                                         │
//! │  calculate_price ► find_cart ──► pricing::calculate_price(lines, role)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use cartwise_core::validation::{validate_product_name, validate_user_id};
use cartwise_core::{
    calculate_price, Cart, Catalog, PriceQuote, PricingRules, ProductId, ProductLine, User,
};
use cartwise_db::{Database, DbConfig};

use crate::config::{CartConfig, StoreBackend};
use crate::error::{CartError, CartResult, ConfigResult};
use crate::store::{CartStore, InMemoryCartStore, SqliteCartStore};

/// Confirmation returned by [`CartService::clear_cart`].
pub const CART_CLEARED_MESSAGE: &str = "Cart cleared successfully.";

// =============================================================================
// Requests
// =============================================================================

/// Body of an insert request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertProduct {
    pub product_id: String,
    pub name: String,
}

impl InsertProduct {
    pub fn new(product_id: impl Into<String>, name: impl Into<String>) -> Self {
        InsertProduct {
            product_id: product_id.into(),
            name: name.into(),
        }
    }
}

/// Body of a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProduct {
    pub product_id: String,
}

impl DeleteProduct {
    pub fn new(product_id: impl Into<String>) -> Self {
        DeleteProduct {
            product_id: product_id.into(),
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// The cart mutation service.
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn CartStore>,
    catalog: Catalog,
    rules: PricingRules,
}

impl std::fmt::Debug for CartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService")
            .field("catalog", &self.catalog)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl CartService {
    /// Creates a service over any store.
    pub fn new(store: Arc<dyn CartStore>, catalog: Catalog, rules: PricingRules) -> Self {
        CartService {
            store,
            catalog,
            rules,
        }
    }

    /// In-memory store, standard catalog, default promotions.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCartStore::new()),
            Catalog::standard(),
            PricingRules::default(),
        )
    }

    /// Builds the store, catalog and rules described by `config`.
    ///
    /// The SQLite backend opens (and migrates) the database before returning.
    pub async fn from_config(config: &CartConfig) -> ConfigResult<Self> {
        config.validate()?;

        let store: Arc<dyn CartStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(InMemoryCartStore::new()),
            StoreBackend::Sqlite => {
                let mut db_config = DbConfig::new(&config.store.database_path);
                if db_config.is_in_memory() {
                    db_config = DbConfig::in_memory();
                }
                let db = Database::new(db_config).await?;
                Arc::new(SqliteCartStore::new(db))
            }
        };

        info!(
            backend = %config.store.backend,
            products = config.catalog.len(),
            vip_discount_bps = config.pricing.vip_discount_bps,
            "Cart service ready"
        );

        Ok(Self::new(store, config.catalog()?, config.pricing_rules()?))
    }

    /// The catalog prices are frozen from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The promotion parameters in force.
    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Returns the user's cart.
    ///
    /// ## Errors
    /// `NotFound` when the user has no cart (never inserted, or cleared).
    pub async fn find_cart(&self, user: &User) -> CartResult<Cart> {
        validate_user_id(&user.id)?;

        self.store
            .find(&user.id)
            .await?
            .ok_or(CartError::NotFound)
    }

    /// Adds one unit of a catalog product to the user's cart.
    ///
    /// ## Returns
    /// The cart id (stable across inserts until the cart is cleared).
    ///
    /// ## Errors
    /// - `Validation` for an unknown product id or a blank name
    /// - `MutationFailure` if the store returned no cart id
    /// - `Store` if the backend failed
    pub async fn insert_product(&self, user: &User, request: InsertProduct) -> CartResult<String> {
        validate_user_id(&user.id)?;

        let (product_id, price) = self.catalog.lookup(&request.product_id).map_err(|e| {
            warn!(user_id = %user.id, product_id = %request.product_id, "Rejected insert: {}", e);
            e
        })?;
        validate_product_name(&request.name)?;

        let line = ProductLine::new(product_id, request.name.trim(), price);
        debug!(user_id = %user.id, product_id = %line.id, price = %price, "Inserting product");

        match self.store.insert(&user.id, line).await? {
            Some(cart_id) => Ok(cart_id),
            None => {
                warn!(user_id = %user.id, "Cart store returned no cart id");
                Err(CartError::MutationFailure)
            }
        }
    }

    /// Removes one unit (the earliest) of a product from the user's cart.
    ///
    /// ## Returns
    /// `"1x <productId> removed successfully."`
    ///
    /// The id only has to be well-formed, not listed in the current
    /// catalog, so lines frozen under an older catalog stay removable.
    ///
    /// ## Errors
    /// - `NotFound` when the user has no cart
    /// - `Validation` for a malformed product id
    /// - `ProductNotInCart` when no line matches
    pub async fn delete_product(&self, user: &User, request: DeleteProduct) -> CartResult<String> {
        self.find_cart(user).await?;
        let product_id = ProductId::parse(&request.product_id)?;

        if !self.store.delete(&user.id, &product_id).await? {
            debug!(user_id = %user.id, product_id = %product_id, "Nothing to remove");
            return Err(CartError::ProductNotInCart);
        }

        debug!(user_id = %user.id, product_id = %product_id, "Removed product");
        Ok(format!("1x {} removed successfully.", product_id))
    }

    /// Empties the user's cart. Succeeds whether or not a cart existed.
    pub async fn clear_cart(&self, user: &User) -> CartResult<String> {
        validate_user_id(&user.id)?;
        self.store.clear(&user.id).await?;

        debug!(user_id = %user.id, "Cart cleared");
        Ok(CART_CLEARED_MESSAGE.to_string())
    }

    /// Prices the user's cart for the user's role.
    ///
    /// ## Errors
    /// `NotFound` when the user has no cart. An existing empty cart prices
    /// to zero.
    pub async fn calculate_price(&self, user: &User) -> CartResult<PriceQuote> {
        let cart = self.find_cart(user).await?;
        let quote = calculate_price(&cart.products, user.role, &self.rules);

        debug!(
            user_id = %user.id,
            role = %user.role,
            lines = cart.line_count(),
            total = %quote.cart_total_price,
            final_price = %quote.final_price,
            "Priced cart"
        );

        Ok(quote)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use async_trait::async_trait;
    use cartwise_core::{AppliedDiscount, UserRole, ValidationError};
    use std::collections::HashSet;

    fn vip() -> User {
        User::new("1", "Vera", UserRole::Vip)
    }

    fn common() -> User {
        User::new("2", "Carl", UserRole::Common)
    }

    async fn fill(service: &CartService, user: &User, ids: &[&str]) {
        for id in ids {
            service
                .insert_product(user, InsertProduct::new(*id, format!("{id} item")))
                .await
                .unwrap();
        }
    }

    async fn final_cents(ids: &[&str], user: &User) -> i64 {
        let service = CartService::in_memory();
        fill(&service, user, ids).await;
        service.calculate_price(user).await.unwrap().final_price.cents()
    }

    // -------------------------------------------------------------------------
    // Stub stores
    // -------------------------------------------------------------------------

    /// Accepts inserts but never hands back a cart id.
    struct NoTokenStore;

    #[async_trait]
    impl CartStore for NoTokenStore {
        async fn find(&self, _: &str) -> StoreResult<Option<Cart>> {
            Ok(None)
        }
        async fn insert(&self, _: &str, _: ProductLine) -> StoreResult<Option<String>> {
            Ok(None)
        }
        async fn delete(&self, _: &str, _: &ProductId) -> StoreResult<bool> {
            Ok(false)
        }
        async fn clear(&self, _: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    /// Fails every call.
    struct DownStore;

    #[async_trait]
    impl CartStore for DownStore {
        async fn find(&self, _: &str) -> StoreResult<Option<Cart>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn insert(&self, _: &str, _: ProductLine) -> StoreResult<Option<String>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn delete(&self, _: &str, _: &ProductId) -> StoreResult<bool> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn clear(&self, _: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    fn with_store(store: impl CartStore + 'static) -> CartService {
        CartService::new(Arc::new(store), Catalog::standard(), PricingRules::default())
    }

    // -------------------------------------------------------------------------
    // Insert
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_insert_freezes_catalog_price() {
        let service = CartService::in_memory();
        let user = common();

        let cart_id = service
            .insert_product(&user, InsertProduct::new("JEANS", "  Slim jeans "))
            .await
            .unwrap();

        let cart = service.find_cart(&user).await.unwrap();
        assert_eq!(cart.cart_id, cart_id);
        assert_eq!(cart.products.len(), 1);
        assert_eq!(cart.products[0].id.as_str(), "JEANS");
        assert_eq!(cart.products[0].name, "Slim jeans");
        assert_eq!(cart.products[0].price_cents, 6550);
    }

    #[tokio::test]
    async fn test_insert_three_distinct_products() {
        let service = CartService::in_memory();
        let user = common();
        fill(&service, &user, &["T_SHIRT", "JEANS", "DRESS"]).await;

        let cart = service.find_cart(&user).await.unwrap();
        let ids: HashSet<&str> = cart.products.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(cart.products.len(), 3);
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_product() {
        let service = CartService::in_memory();
        let user = common();

        let err = service
            .insert_product(&user, InsertProduct::new("HAT", "Hat"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::Validation(ValidationError::NotAllowed { .. })
        ));

        // nothing reached the store
        assert!(matches!(
            service.find_cart(&user).await,
            Err(CartError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_name_and_user() {
        let service = CartService::in_memory();

        let err = service
            .insert_product(&common(), InsertProduct::new("DRESS", "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Validation(ValidationError::Required { .. })));

        let anonymous = User::new("", "Nobody", UserRole::Common);
        let err = service
            .insert_product(&anonymous, InsertProduct::new("DRESS", "Dress"))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Validation(_)));
    }

    #[tokio::test]
    async fn test_insert_without_token_is_mutation_failure() {
        let service = with_store(NoTokenStore);
        let err = service
            .insert_product(&common(), InsertProduct::new("T_SHIRT", "Tee"))
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::MutationFailure));
        assert_eq!(
            err.to_string(),
            "An error has occurred while trying to insert the product."
        );
    }

    // -------------------------------------------------------------------------
    // Delete / clear / find
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let service = CartService::in_memory();
        let user = common();
        fill(&service, &user, &["T_SHIRT"]).await;

        let message = service
            .delete_product(&user, DeleteProduct::new("T_SHIRT"))
            .await
            .unwrap();
        assert_eq!(message, "1x T_SHIRT removed successfully.");

        let err = service
            .delete_product(&user, DeleteProduct::new("T_SHIRT"))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProductNotInCart));
        assert_eq!(
            err.to_string(),
            "No product were found to be removed from the cart."
        );
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one_duplicate() {
        let service = CartService::in_memory();
        let user = common();
        fill(&service, &user, &["DRESS", "DRESS", "DRESS"]).await;

        service
            .delete_product(&user, DeleteProduct::new("DRESS"))
            .await
            .unwrap();

        let cart = service.find_cart(&user).await.unwrap();
        assert_eq!(cart.count_of(&ProductId::parse("DRESS").unwrap()), 2);
    }

    #[tokio::test]
    async fn test_delete_without_cart_is_not_found() {
        let service = CartService::in_memory();
        let err = service
            .delete_product(&common(), DeleteProduct::new("JEANS"))
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::NotFound));
        assert_eq!(err.to_string(), "Cart not found! Try add some products.");
    }

    #[tokio::test]
    async fn test_delete_unknown_product_without_cart_is_not_found() {
        let service = CartService::in_memory();
        for id in ["HAT", "hat"] {
            let err = service
                .delete_product(&common(), DeleteProduct::new(id))
                .await
                .unwrap_err();
            assert!(matches!(err, CartError::NotFound), "{id}: {err:?}");
        }
    }

    #[tokio::test]
    async fn test_delete_checks_id_format_once_cart_exists() {
        let service = CartService::in_memory();
        let user = common();
        fill(&service, &user, &["JEANS"]).await;

        let err = service
            .delete_product(&user, DeleteProduct::new("jeans"))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Validation(ValidationError::InvalidFormat { .. })));

        let err = service
            .delete_product(&user, DeleteProduct::new("HAT"))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProductNotInCart));
    }

    #[tokio::test]
    async fn test_delete_product_dropped_from_catalog() {
        let store: Arc<dyn CartStore> = Arc::new(InMemoryCartStore::new());
        let user = common();

        let seasonal = CartService::new(
            Arc::clone(&store),
            Catalog::from_entries([("HAT", 1999), ("JEANS", 6550)]).unwrap(),
            PricingRules::default(),
        );
        seasonal
            .insert_product(&user, InsertProduct::new("HAT", "Winter hat"))
            .await
            .unwrap();

        // same carts, catalog no longer lists HAT
        let current = CartService::new(store, Catalog::standard(), PricingRules::default());
        assert!(matches!(
            current.insert_product(&user, InsertProduct::new("HAT", "Winter hat")).await,
            Err(CartError::Validation(ValidationError::NotAllowed { .. }))
        ));

        let message = current
            .delete_product(&user, DeleteProduct::new("HAT"))
            .await
            .unwrap();
        assert_eq!(message, "1x HAT removed successfully.");
        assert!(current.find_cart(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_product_missing_from_cart() {
        let service = CartService::in_memory();
        let user = common();
        fill(&service, &user, &["JEANS"]).await;

        let err = service
            .delete_product(&user, DeleteProduct::new("DRESS"))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProductNotInCart));
    }

    #[tokio::test]
    async fn test_clear_then_find_is_not_found() {
        let service = CartService::in_memory();
        let user = vip();
        fill(&service, &user, &["T_SHIRT", "JEANS"]).await;

        assert_eq!(service.clear_cart(&user).await.unwrap(), "Cart cleared successfully.");
        assert!(matches!(service.find_cart(&user).await, Err(CartError::NotFound)));
        assert!(matches!(
            service.calculate_price(&user).await,
            Err(CartError::NotFound)
        ));

        // clearing again still acknowledges
        assert_eq!(service.clear_cart(&user).await.unwrap(), CART_CLEARED_MESSAGE);
    }

    #[tokio::test]
    async fn test_users_do_not_share_carts() {
        let service = CartService::in_memory();
        fill(&service, &vip(), &["DRESS"]).await;

        assert!(matches!(
            service.find_cart(&common()).await,
            Err(CartError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = with_store(DownStore);
        let user = common();

        assert!(matches!(
            service.insert_product(&user, InsertProduct::new("DRESS", "Dress")).await,
            Err(CartError::Store(_))
        ));
        assert!(matches!(service.clear_cart(&user).await, Err(CartError::Store(_))));
        assert!(matches!(service.find_cart(&user).await, Err(CartError::Store(_))));
    }

    // -------------------------------------------------------------------------
    // Pricing
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_price_unknown_cart_is_not_found() {
        let service = CartService::in_memory();
        let err = service.calculate_price(&vip()).await.unwrap_err();
        assert_eq!(err.to_string(), "Cart not found! Try add some products.");
    }

    #[tokio::test]
    async fn test_price_emptied_cart_is_zero() {
        let service = CartService::in_memory();
        let user = vip();
        fill(&service, &user, &["JEANS"]).await;
        service
            .delete_product(&user, DeleteProduct::new("JEANS"))
            .await
            .unwrap();

        let quote = service.calculate_price(&user).await.unwrap();
        assert_eq!(quote, PriceQuote::empty());
    }

    #[tokio::test]
    async fn test_price_scenarios() {
        assert_eq!(final_cents(&["T_SHIRT", "DRESS"], &vip()).await, 9923);
        assert_eq!(
            final_cents(
                &["T_SHIRT", "T_SHIRT", "T_SHIRT", "T_SHIRT", "JEANS", "DRESS"],
                &vip()
            )
            .await,
            24668
        );
        assert_eq!(final_cents(&["T_SHIRT", "T_SHIRT", "T_SHIRT"], &common()).await, 7198);
        assert_eq!(
            final_cents(&["T_SHIRT", "T_SHIRT", "JEANS", "JEANS"], &common()).await,
            16699
        );
        assert_eq!(final_cents(&["DRESS", "DRESS", "DRESS"], &vip()).await, 16150);
        assert_eq!(
            final_cents(&["JEANS", "JEANS", "DRESS", "DRESS"], &common()).await,
            22700
        );
        assert_eq!(
            final_cents(&["T_SHIRT", "T_SHIRT", "T_SHIRT", "T_SHIRT", "JEANS"], &common()).await,
            17347
        );
    }

    #[tokio::test]
    async fn test_price_uses_caller_role() {
        let service = CartService::in_memory();
        let user = common();
        fill(&service, &user, &["DRESS"]).await;

        let as_common = service.calculate_price(&user).await.unwrap();
        let as_vip = service
            .calculate_price(&User::new(user.id.clone(), user.name.clone(), UserRole::Vip))
            .await
            .unwrap();

        assert_eq!(as_common.final_price.cents(), 8075);
        assert_eq!(as_common.applied_discount, AppliedDiscount::None);
        assert_eq!(as_vip.final_price.cents(), 6864);
    }

    // -------------------------------------------------------------------------
    // Wiring
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_from_config_sqlite() {
        let mut config = CartConfig::default();
        config.store.backend = StoreBackend::Sqlite;
        config.store.database_path = ":memory:".into();
        config.pricing.vip_discount_bps = 1000;

        let service = CartService::from_config(&config).await.unwrap();
        assert_eq!(service.rules().vip_discount.bps(), 1000);

        let user = vip();
        fill(&service, &user, &["T_SHIRT", "DRESS"]).await;
        // 11674 × 0.90 = 10506.6 → 10507
        let quote = service.calculate_price(&user).await.unwrap();
        assert_eq!(quote.final_price.cents(), 10507);
    }

    #[tokio::test]
    async fn test_from_config_rejects_invalid() {
        let mut config = CartConfig::default();
        config.catalog.clear();
        assert!(CartService::from_config(&config).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_insert_and_delete() {
        let service = CartService::in_memory();
        let user = common();
        fill(&service, &user, &["JEANS"; 10]).await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let service = service.clone();
            let user = user.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    service
                        .insert_product(&user, InsertProduct::new("T_SHIRT", "Tee"))
                        .await
                        .map(|_| ())
                } else {
                    service
                        .delete_product(&user, DeleteProduct::new("JEANS"))
                        .await
                        .map(|_| ())
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let cart = service.find_cart(&user).await.unwrap();
        assert_eq!(cart.count_of(&ProductId::parse("T_SHIRT").unwrap()), 10);
        assert_eq!(cart.count_of(&ProductId::parse("JEANS").unwrap()), 0);
    }
}
