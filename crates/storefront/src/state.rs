//! Application state passed to every front-end action.

use std::sync::Arc;

use estore_core::Quantity;

use crate::auth::{AuthState, CurrentUser, StoredSession};
use crate::cart::CartEngine;
use crate::checkout::{self, CheckoutForm, OrderPayload};
use crate::config::StorefrontConfig;
use crate::display::{CartSummaryView, ImageResolver};
use crate::error::{CheckoutError, Result};
use crate::notify::Notifier;
use crate::product::Product;
use crate::storage::KeyValueStore;

/// Application state created once at start-up.
///
/// Owns the cart engine and the session, both backed by the same store.
/// There is exactly one per front end; pass it explicitly instead of
/// reaching for a global.
pub struct AppState<S, N> {
    config: StorefrontConfig,
    store: Arc<S>,
    cart: CartEngine<Arc<S>, N>,
    session: StoredSession<Arc<S>>,
    images: ImageResolver,
}

impl<S: KeyValueStore, N: Notifier> AppState<S, N> {
    /// Create a new application state.
    ///
    /// The cart is not read until first used.
    pub fn new(config: StorefrontConfig, store: S, notifier: N) -> Self {
        let store = Arc::new(store);
        let cart = CartEngine::with_key(
            Arc::clone(&store),
            notifier,
            config.pricing.clone(),
            config.cart_key.clone(),
        );
        let session = StoredSession::new(Arc::clone(&store), config.user_key.clone());
        let images = ImageResolver::new(config.asset_base_url.clone());

        Self {
            config,
            store,
            cart,
            session,
            images,
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Get a reference to the backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the cart engine.
    #[must_use]
    pub const fn cart(&self) -> &CartEngine<Arc<S>, N> {
        &self.cart
    }

    /// Get a mutable reference to the cart engine.
    pub const fn cart_mut(&mut self) -> &mut CartEngine<Arc<S>, N> {
        &mut self.cart
    }

    /// Get a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &StoredSession<Arc<S>> {
        &self.session
    }

    /// Get a reference to the image resolver.
    #[must_use]
    pub const fn images(&self) -> &ImageResolver {
        &self.images
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.session.current_user()
    }

    /// Add one unit of `product`, gated on the stored session.
    ///
    /// # Errors
    ///
    /// See [`CartEngine::add_item`].
    pub fn add_to_cart(&mut self, product: Option<&Product>) -> Result<Quantity> {
        self.cart.add_item(product, &self.session)
    }

    /// Display data for the cart page.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummaryView {
        CartSummaryView::new(self.cart.lines(), &self.config.pricing, &self.images)
    }

    /// A checkout form pre-filled for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::AuthenticationRequired` when nobody is signed in.
    pub fn checkout_form(&self) -> std::result::Result<CheckoutForm, CheckoutError> {
        self.current_user()
            .map(|user| CheckoutForm::prefilled(&user))
            .ok_or(CheckoutError::AuthenticationRequired)
    }

    /// Build the order for the current cart.
    ///
    /// The cart is left as it is; call [`CartEngine::clear`] once the order
    /// has been accepted.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` when nobody is signed in, the cart is empty,
    /// or the form is incomplete.
    pub fn checkout(&self, form: &CheckoutForm) -> std::result::Result<OrderPayload, CheckoutError> {
        if !self.session.is_authenticated() {
            return Err(CheckoutError::AuthenticationRequired);
        }
        let order = checkout::build_order(form, &self.cart.checkout_lines(), &self.config.pricing)?;
        tracing::info!(
            items = order.items.len(),
            total = %order.order_summary.total,
            "Order assembled"
        );
        Ok(order)
    }

    /// Build an order for `quantity` units of `product` without touching the cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` when nobody is signed in or the form is incomplete.
    pub fn buy_now(
        &self,
        form: &CheckoutForm,
        product: &Product,
        quantity: Quantity,
    ) -> std::result::Result<OrderPayload, CheckoutError> {
        if !self.session.is_authenticated() {
            return Err(CheckoutError::AuthenticationRequired);
        }
        checkout::build_buy_now_order(form, product, quantity, &self.config.pricing)
    }
}

impl<S, N> std::fmt::Debug for AppState<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}
