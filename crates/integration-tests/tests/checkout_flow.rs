//! From an empty cart to an order payload.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use estore_core::Quantity;
use estore_integration_tests::{TestContext, api_product, id};
use estore_storefront::checkout::{CheckoutForm, PaymentMethod};
use estore_storefront::error::{CartError, CheckoutError};
use estore_storefront::notify::{NotificationAction, NotificationKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn complete(mut form: CheckoutForm) -> CheckoutForm {
    form.shipping_address.street = "12 Galle Road".to_string();
    form.shipping_address.city = "Colombo".to_string();
    form.shipping_address.state = "Western".to_string();
    form.shipping_address.zip_code = "00300".to_string();
    form
}

#[test]
fn test_anonymous_shopper_is_sent_to_login() {
    let ctx = TestContext::new();
    let mut state = ctx.state();

    let err = state
        .add_to_cart(Some(&api_product("P1", "Mouse", 1000.0)))
        .unwrap_err();
    assert!(matches!(err, CartError::AuthenticationRequired));
    assert_eq!(err.redirect(), Some("/login"));
    assert!(!ctx.dir.path().join("cart.json").exists());

    let note = ctx.notifier.last().unwrap();
    assert_eq!(note.kind, NotificationKind::Error);
    assert!(matches!(
        note.action,
        Some(NotificationAction::RedirectToLogin { .. })
    ));
}

#[test]
fn test_full_cart_checkout() {
    let ctx = TestContext::new();
    let mut state = ctx.signed_in_state();
    let mouse = api_product("P1", "Mouse", 1000.0);

    state.add_to_cart(Some(&mouse)).unwrap();
    state.cart_mut().update_quantity(&id("P1"), 3).unwrap();

    let summary = state.cart_summary();
    assert_eq!(summary.subtotal, "Rs.3000.00");
    assert_eq!(summary.tax, "Rs.300.00");
    assert_eq!(summary.shipping, "Rs.500.00");
    assert_eq!(summary.total, "Rs.3800.00");
    assert_eq!(
        summary.items[0].image_url,
        "http://localhost:3000/images/P1.png"
    );

    let mut form = complete(state.checkout_form().unwrap());
    form.payment_method = PaymentMethod::BankTransfer;
    let order = state.checkout(&form).unwrap();
    assert_eq!(order.order_summary.total, dec!(3800));

    let value = serde_json::to_value(&order).unwrap();
    assert_eq!(value["items"][0]["productName"], "Mouse");
    assert_eq!(value["items"][0]["image"], "/images/P1.png");
    assert_eq!(value["items"][0]["totalPrice"], json!(3000.0));
    assert_eq!(value["paymentInfo"]["method"], "bank_transfer");
    assert_eq!(value["shippingAddress"]["country"], "Sri Lanka");
    assert_eq!(value["customerInfo"]["email"], "nimal@example.lk");

    state.cart_mut().clear().unwrap();
    assert!(ctx.state().cart().is_empty());
}

#[test]
fn test_checkout_uses_price_at_add_time() {
    let ctx = TestContext::new();
    let mut state = ctx.signed_in_state();
    state.add_to_cart(Some(&api_product("P1", "Mouse", 1000.0))).unwrap();
    // catalog price changes afterwards
    state.add_to_cart(Some(&api_product("P1", "Mouse", 1500.0))).unwrap();

    let order = state.checkout(&complete(state.checkout_form().unwrap())).unwrap();
    assert_eq!(order.items[0].price, dec!(1000));
    assert_eq!(order.order_summary.subtotal, dec!(2000));
}

#[test]
fn test_free_shipping_above_threshold() {
    let ctx = TestContext::new();
    let mut state = ctx.signed_in_state();
    state.add_to_cart(Some(&api_product("P1", "Monitor", 6000.0))).unwrap();

    let order = state.checkout(&complete(state.checkout_form().unwrap())).unwrap();
    assert_eq!(order.order_summary.shipping, Decimal::ZERO);
    assert_eq!(order.order_summary.total, dec!(6600));
    assert_eq!(state.cart_summary().shipping, "Free");
}

#[test]
fn test_empty_cart_and_incomplete_form_are_rejected() {
    let ctx = TestContext::new();
    let mut state = ctx.signed_in_state();
    let form = complete(state.checkout_form().unwrap());
    assert!(matches!(state.checkout(&form), Err(CheckoutError::EmptyCart)));

    state.add_to_cart(Some(&api_product("P1", "Mouse", 10.0))).unwrap();
    let incomplete = state.checkout_form().unwrap();
    let err = state.checkout(&incomplete).unwrap_err();
    assert_eq!(err.user_message(), "Please fill in all shipping address fields");
}

#[test]
fn test_checkout_after_logout_is_rejected() {
    let ctx = TestContext::new();
    let mut state = ctx.signed_in_state();
    state.add_to_cart(Some(&api_product("P1", "Mouse", 10.0))).unwrap();
    let form = complete(state.checkout_form().unwrap());

    state.session().sign_out().unwrap();
    assert!(matches!(
        state.checkout(&form),
        Err(CheckoutError::AuthenticationRequired)
    ));
}

#[test]
fn test_buy_now_leaves_cart_untouched() {
    let ctx = TestContext::new();
    let mut state = ctx.signed_in_state();
    state.add_to_cart(Some(&api_product("P1", "Mouse", 10.0))).unwrap();
    let form = complete(state.checkout_form().unwrap());

    let order = state
        .buy_now(
            &form,
            &api_product("P9", "Laptop", 250_000.0),
            Quantity::try_from(2).unwrap(),
        )
        .unwrap();
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.order_summary.subtotal, dec!(500000));
    assert_eq!(ctx.state().cart().checkout_lines().len(), 1);
}
