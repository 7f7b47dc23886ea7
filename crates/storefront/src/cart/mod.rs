//! Client-side shopping cart.
//!
//! - [`CartLine`] - one product and its quantity, with name, price and image
//!   copied from the catalog at add time
//! - [`snapshot`] - the persisted JSON form and its tolerant decoder
//! - [`CartEngine`] - the single owner of the cart; every mutation goes
//!   through it and is persisted before it returns

mod engine;
mod line;
pub mod snapshot;

pub use engine::{CartEngine, DEFAULT_CART_KEY};
pub use line::CartLine;
