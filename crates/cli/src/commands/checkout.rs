//! Order payloads.

use estore_core::Quantity;
use estore_storefront::checkout::{CheckoutForm, PaymentMethod};

use super::{CliError, parse_product, print_json};
use crate::CliState;

/// Shipping and payment details from the command line.
pub struct OrderDetails {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: Option<String>,
    pub payment: String,
}

impl OrderDetails {
    /// Complete the signed-in user's pre-filled form with these details.
    fn fill(&self, state: &CliState) -> Result<CheckoutForm, CliError> {
        let mut form = state.checkout_form()?;
        form.shipping_address.street.clone_from(&self.street);
        form.shipping_address.city.clone_from(&self.city);
        form.shipping_address.state.clone_from(&self.state);
        form.shipping_address.zip_code.clone_from(&self.zip_code);
        if let Some(country) = &self.country {
            form.shipping_address.country.clone_from(country);
        }
        form.payment_method = self
            .payment
            .parse::<PaymentMethod>()
            .map_err(|_| CliError::Rejected {
                message: "Unknown payment method",
                hint: Some("use cash_on_delivery or bank_transfer"),
            })?;
        Ok(form)
    }
}

/// Print the order payload for the whole cart.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the cart is empty, or a field
/// is missing.
pub fn cart(state: &mut CliState, details: &OrderDetails, clear_cart: bool) -> Result<(), CliError> {
    let form = details.fill(state)?;
    let order = state.checkout(&form)?;
    print_json(&order)?;
    if clear_cart {
        state.cart_mut().clear()?;
    }
    Ok(())
}

/// Print the order payload for `quantity` units of one product.
///
/// # Errors
///
/// Returns an error if the product document is invalid, the quantity is
/// below one, nobody is signed in, or a field is missing.
pub fn buy_now(
    state: &CliState,
    product_json: &str,
    quantity: i64,
    details: &OrderDetails,
) -> Result<(), CliError> {
    let product = parse_product(product_json)?;
    let quantity = Quantity::try_from(quantity).map_err(|_| CliError::Rejected {
        message: "Invalid quantity",
        hint: None,
    })?;
    let form = details.fill(state)?;
    let order = state.buy_now(&form, &product, quantity)?;
    print_json(&order)
}
