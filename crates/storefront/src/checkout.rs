//! Checkout: the order form and the order payload sent to the orders API.
//!
//! Orders are built from the cart lines exactly as stored, including the
//! prices captured when each product was added. Totals come from
//! [`PricingConfig::totals`] so the summary matches what the cart showed.

use std::str::FromStr;

use estore_core::{Email, ProductId, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::cart::CartLine;
use crate::display::DEFAULT_PRODUCT_IMAGE;
use crate::error::CheckoutError;
use crate::pricing::{self, PricingConfig};
use crate::product::Product;

/// Country pre-selected on the shipping form.
pub const DEFAULT_COUNTRY: &str = "Sri Lanka";

/// Contact details of the person placing the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<&CurrentUser> for CustomerInfo {
    fn from(user: &CurrentUser) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

/// Where the order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    BankTransfer,
}

impl PaymentMethod {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cash_on_delivery" | "cod" => Ok(Self::CashOnDelivery),
            "bank_transfer" => Ok(Self::BankTransfer),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the shopper fills in on the checkout page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub customer_info: CustomerInfo,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// A blank form with the customer details taken from `user`.
    #[must_use]
    pub fn prefilled(user: &CurrentUser) -> Self {
        Self {
            customer_info: CustomerInfo::from(user),
            ..Self::default()
        }
    }

    /// Check that every required field is filled in.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: customer fields are checked before
    /// the shipping address.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let customer = &self.customer_info;
        for (field, value) in [
            ("firstName", &customer.first_name),
            ("lastName", &customer.last_name),
            ("email", &customer.email),
            ("phone", &customer.phone),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingCustomerInfo(field));
            }
        }
        Email::parse(&customer.email)?;

        let address = &self.shipping_address;
        for (field, value) in [
            ("street", &address.street),
            ("city", &address.city),
            ("state", &address.state),
            ("zipCode", &address.zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingShippingAddress(field));
            }
        }
        Ok(())
    }
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: Quantity,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    /// Stored image path, not a resolved URL.
    pub image: String,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            product_name: line.name.clone(),
            quantity: line.quantity,
            price: line.price,
            total_price: line.line_total(),
            image: line
                .image
                .first()
                .unwrap_or(DEFAULT_PRODUCT_IMAGE)
                .to_string(),
        }
    }
}

/// Money summary of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    /// Always zero; the store has no coupons.
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
}

/// Body of the create-order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub customer_info: CustomerInfo,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub order_summary: OrderSummary,
    pub payment_info: PaymentInfo,
}

/// Build the order for the whole cart.
///
/// # Errors
///
/// - `CheckoutError::EmptyCart` if `lines` is empty
/// - any validation error from [`CheckoutForm::validate`]
pub fn build_order(
    form: &CheckoutForm,
    lines: &[CartLine],
    pricing: &PricingConfig,
) -> Result<OrderPayload, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    form.validate()?;

    let items: Vec<OrderItem> = lines.iter().map(OrderItem::from).collect();
    Ok(assemble(form, items, pricing.totals(pricing::subtotal(lines))))
}

/// Build an order for `quantity` units of a single product, bypassing the cart.
///
/// # Errors
///
/// Returns any validation error from [`CheckoutForm::validate`].
pub fn build_buy_now_order(
    form: &CheckoutForm,
    product: &Product,
    quantity: Quantity,
    pricing: &PricingConfig,
) -> Result<OrderPayload, CheckoutError> {
    form.validate()?;

    let mut line = CartLine::from_product(product);
    line.quantity = quantity;
    let item = OrderItem::from(&line);
    let totals = pricing.totals(item.total_price);
    Ok(assemble(form, vec![item], totals))
}

fn assemble(
    form: &CheckoutForm,
    items: Vec<OrderItem>,
    totals: pricing::CartTotals,
) -> OrderPayload {
    OrderPayload {
        customer_info: form.customer_info.clone(),
        shipping_address: form.shipping_address.clone(),
        items,
        order_summary: OrderSummary {
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            discount: Decimal::ZERO,
            total: totals.total,
        },
        payment_info: PaymentInfo {
            method: form.payment_method,
        },
    }
}
