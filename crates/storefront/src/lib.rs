//! E-Computer Store storefront library.
//!
//! The cart engine and everything around it that a front end needs: the
//! key-value store it persists to, the session that gates mutations,
//! pricing, display formatting and checkout payloads.
//!
//! ```
//! use estore_storefront::cart::CartEngine;
//! use estore_storefront::notify::RecordingNotifier;
//! use estore_storefront::pricing::PricingConfig;
//! use estore_storefront::product::Product;
//! use estore_storefront::storage::MemoryStore;
//! use estore_core::ProductId;
//! use rust_decimal::Decimal;
//!
//! let store = MemoryStore::new();
//! let notifier = RecordingNotifier::new();
//! let mut cart = CartEngine::new(&store, &notifier, PricingConfig::default());
//!
//! let product = Product::new(ProductId::parse("A").unwrap(), "Mouse", Decimal::new(1000, 0));
//! cart.add_item(Some(&product), &true).unwrap();
//! cart.update_quantity(&product.product_id, 3).unwrap();
//!
//! assert_eq!(cart.total_with_surcharges(), Decimal::new(3800, 0));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod display;
pub mod error;
pub mod notify;
pub mod pricing;
pub mod product;
pub mod state;
pub mod storage;
