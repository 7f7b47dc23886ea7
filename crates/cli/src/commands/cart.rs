//! Cart inspection and editing.

use estore_core::ProductId;

use super::{CliError, parse_product, print_json, say};
use crate::CliState;

/// Print the cart.
///
/// # Errors
///
/// Returns an error if stdout can't be written.
pub fn show(state: &CliState, json: bool) -> Result<(), CliError> {
    if json {
        return print_json(&state.cart().lines());
    }

    let summary = state.cart_summary();
    if summary.items.is_empty() {
        return say("Your cart is empty");
    }

    for item in &summary.items {
        say(format!(
            "{:<12} {:<32} {:>5} x {:>12} = {:>12}",
            item.product_id, item.name, item.quantity, item.price, item.line_price
        ))?;
    }
    say(format!("Items:    {}", summary.item_count))?;
    say(format!("Subtotal: {}", summary.subtotal))?;
    say(format!("Tax:      {}", summary.tax))?;
    say(format!("Shipping: {}", summary.shipping))?;
    say(format!("Total:    {}", summary.total))?;
    if let Some(hint) = summary.free_shipping_hint {
        say(hint)?;
    }
    Ok(())
}

/// Add one unit of the product described by `product_json`.
///
/// # Errors
///
/// Returns an error if the document is not a valid product, nobody is signed
/// in, or the cart can't be saved.
pub fn add(state: &mut CliState, product_json: &str) -> Result<(), CliError> {
    let product = parse_product(product_json)?;
    let quantity = state.add_to_cart(Some(&product))?;
    say(format!("{} x {}", quantity, product.name))
}

/// Remove a product from the cart.
///
/// # Errors
///
/// Returns an error if the id is blank or the cart can't be saved.
pub fn remove(state: &mut CliState, product_id: &str) -> Result<(), CliError> {
    let product_id = ProductId::parse(product_id)?;
    if state.cart_mut().remove_item(&product_id)?.is_none() {
        tracing::debug!(%product_id, "Product was not in the cart");
    }
    Ok(())
}

/// Set the quantity of a product already in the cart.
///
/// # Errors
///
/// Returns an error if the id is blank or the cart can't be saved.
pub fn set(state: &mut CliState, product_id: &str, quantity: i64) -> Result<(), CliError> {
    let product_id = ProductId::parse(product_id)?;
    match state.cart_mut().update_quantity(&product_id, quantity)? {
        Some(quantity) => say(format!("{product_id}: {quantity}")),
        None if quantity >= 1 => say(format!("{product_id} is not in the cart")),
        None => Ok(()),
    }
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart can't be saved.
pub fn clear(state: &mut CliState) -> Result<(), CliError> {
    state.cart_mut().clear()?;
    Ok(())
}
