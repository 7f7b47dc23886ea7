//! The cart engine.
//!
//! The engine is the single source of truth for cart contents. It starts
//! uninitialized and loads the stored snapshot the first time anything reads
//! or mutates the cart, so callers always see a ready cart.
//!
//! Every mutation builds the next cart, persists the whole snapshot, and only
//! then swaps it in. A failed write therefore leaves the in-memory cart as it
//! was. Operations are synchronous and the engine is not `Sync`; concurrent
//! writers sharing one store follow last-writer-wins.

use std::cell::OnceCell;
use std::num::NonZeroU32;

use estore_core::{ProductId, Quantity, QuantityError};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::{CartLine, snapshot};
use crate::auth::AuthState;
use crate::error::{CartError, Result};
use crate::notify::{
    ADDED_DURATION, CONFIRMATION_DURATION, ERROR_DURATION, LOGIN_REDIRECT_DELAY, Notification,
    NotificationAction, Notifier,
};
use crate::pricing::{self, CartTotals, PricingConfig};
use crate::product::Product;
use crate::storage::KeyValueStore;

/// Default storage key for the cart snapshot.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Owner of the shopping cart.
pub struct CartEngine<S, N> {
    store: S,
    notifier: N,
    pricing: PricingConfig,
    key: String,
    lines: OnceCell<Vec<CartLine>>,
}

impl<S: KeyValueStore, N: Notifier> CartEngine<S, N> {
    /// Create an engine persisting under [`DEFAULT_CART_KEY`].
    ///
    /// Nothing is read until the cart is first used.
    pub fn new(store: S, notifier: N, pricing: PricingConfig) -> Self {
        Self::with_key(store, notifier, pricing, DEFAULT_CART_KEY)
    }

    /// Create an engine persisting under `key`.
    pub fn with_key(store: S, notifier: N, pricing: PricingConfig, key: impl Into<String>) -> Self {
        Self {
            store,
            notifier,
            pricing,
            key: key.into(),
            lines: OnceCell::new(),
        }
    }

    /// Whether the snapshot has been read yet.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.lines.get().is_some()
    }

    /// Pricing rules used for totals.
    #[must_use]
    pub const fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Storage key of the snapshot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current lines in the order they were added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.lines.get_or_init(|| self.read_snapshot())
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines().iter().find(|l| &l.product_id == product_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines()
            .iter()
            .map(|l| u64::from(l.quantity.get()))
            .sum()
    }

    /// Sum of `price * quantity`, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        pricing::subtotal(self.lines())
    }

    /// Subtotal, tax, shipping and total.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.pricing.totals(self.subtotal())
    }

    /// Subtotal plus tax plus shipping.
    #[must_use]
    pub fn total_with_surcharges(&self) -> Decimal {
        self.totals().total
    }

    /// Copy of the lines to hand to checkout.
    #[must_use]
    pub fn checkout_lines(&self) -> Vec<CartLine> {
        self.lines().to_vec()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Re-read the stored snapshot, replacing the in-memory cart.
    ///
    /// A missing or malformed snapshot loads as an empty cart.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn load(&mut self) -> &[CartLine] {
        let lines = self.read_snapshot();
        debug!(lines = lines.len(), "Loaded cart");
        self.lines = OnceCell::from(lines);
        self.lines()
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line for the product, or appends a new line
    /// copying its name, price and image. Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// - `CartError::AuthenticationRequired` if `auth` reports no user; the
    ///   cart is unchanged and nothing is written
    /// - `CartError::ProductNotFound` if `product` is `None`
    /// - `CartError::Storage` if the snapshot can't be written
    #[instrument(skip_all, fields(product_id))]
    pub fn add_item(&mut self, product: Option<&Product>, auth: &impl AuthState) -> Result<Quantity> {
        if !auth.is_authenticated() {
            self.notifier.notify(
                Notification::error(
                    CartError::AuthenticationRequired.user_message(),
                    CONFIRMATION_DURATION,
                )
                .with_action(NotificationAction::RedirectToLogin {
                    after: LOGIN_REDIRECT_DELAY,
                }),
            );
            debug!("Rejected add: not authenticated");
            return Err(CartError::AuthenticationRequired);
        }
        let Some(product) = product else {
            self.notifier.notify(Notification::error(
                CartError::ProductNotFound.user_message(),
                ERROR_DURATION,
            ));
            debug!("Rejected add: no product");
            return Err(CartError::ProductNotFound);
        };
        tracing::Span::current().record("product_id", product.product_id.as_str());

        let mut lines = self.lines().to_vec();
        let quantity = if let Some(line) = lines
            .iter_mut()
            .find(|l| l.product_id == product.product_id)
        {
            line.quantity = line.quantity.incremented();
            line.quantity
        } else {
            lines.push(CartLine::from_product(product));
            Quantity::ONE
        };
        self.commit(lines)?;

        debug!(quantity = quantity.get(), "Added to cart");
        self.notifier.notify(
            Notification::success("Added to cart!", ADDED_DURATION)
                .with_action(NotificationAction::ViewCart),
        );
        Ok(quantity)
    }

    /// Remove the line for `product_id`.
    ///
    /// Removing an absent product is not an error; the snapshot is still
    /// rewritten. Returns the removed line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the snapshot can't be written.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<Option<CartLine>> {
        let mut lines = self.lines().to_vec();
        let removed = lines
            .iter()
            .position(|l| &l.product_id == product_id)
            .map(|index| lines.remove(index));
        self.commit(lines)?;

        let name = removed.as_ref().map_or("Item", |line| line.name.as_str());
        debug!(found = removed.is_some(), "Removed from cart");
        self.notifier.notify(Notification::success(
            format!("{name} removed from cart"),
            CONFIRMATION_DURATION,
        ));
        Ok(removed)
    }

    /// Set the quantity of the line for `product_id` to exactly `quantity`.
    ///
    /// A quantity below one removes the line. An absent product is left
    /// absent. Returns the line's quantity afterwards, `None` if there is no
    /// such line. Quantities above `u32::MAX` are capped.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the snapshot can't be written.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<Option<Quantity>> {
        let quantity = match Quantity::try_from(quantity) {
            Ok(quantity) => quantity,
            Err(QuantityError::TooLarge(_)) => Quantity::new(NonZeroU32::MAX),
            Err(QuantityError::BelowOne(_)) => {
                self.remove_item(product_id)?;
                return Ok(None);
            }
        };

        let mut lines = self.lines().to_vec();
        let updated = lines
            .iter_mut()
            .find(|l| &l.product_id == product_id)
            .map(|line| {
                line.quantity = quantity;
                quantity
            });
        self.commit(lines)?;

        debug!(found = updated.is_some(), quantity = quantity.get(), "Updated quantity");
        Ok(updated)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the snapshot can't be written.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())?;
        debug!("Cleared cart");
        self.notifier
            .notify(Notification::success("Cart cleared", CONFIRMATION_DURATION));
        Ok(())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn read_snapshot(&self) -> Vec<CartLine> {
        match self.store.get(&self.key) {
            Ok(raw) => snapshot::decode(raw.as_deref()),
            Err(e) => {
                tracing::warn!(error = %e, key = %self.key, "Failed to read cart, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist `lines`, then make them the current cart.
    fn commit(&mut self, lines: Vec<CartLine>) -> Result<()> {
        let raw = snapshot::encode(&lines)?;
        self.store.set(&self.key, &raw)?;
        self.lines = OnceCell::from(lines);
        Ok(())
    }
}

impl<S, N> std::fmt::Debug for CartEngine<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEngine")
            .field("key", &self.key)
            .field("pricing", &self.pricing)
            .field("lines", &self.lines.get())
            .finish_non_exhaustive()
    }
}
