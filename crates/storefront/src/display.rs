//! Display data for the cart UI.
//!
//! Turns engine state into ready-to-render strings. Nothing here touches the
//! store; front ends call these after every engine operation.

use estore_core::Price;
use rust_decimal::Decimal;
use url::Url;

use crate::cart::CartLine;
use crate::pricing::{CartTotals, PricingConfig};
use crate::product::ProductImage;

/// Image shown when a product has none.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/images/default-product.png";

/// Highest count the cart badge shows before switching to `99+`.
const BADGE_MAX: u64 = 99;

/// Prefix of image paths served by the storefront backend.
const ASSET_PREFIX: &str = "/images";

/// Label for the cart icon badge, `None` when the badge is hidden.
#[must_use]
pub fn badge_label(item_count: u64) -> Option<String> {
    match item_count {
        0 => None,
        n if n > BADGE_MAX => Some(format!("{BADGE_MAX}+")),
        n => Some(n.to_string()),
    }
}

/// Shipping cell text: `Free` when waived, otherwise the formatted fee.
#[must_use]
pub fn shipping_label(shipping: Price) -> String {
    if shipping.amount.is_zero() {
        "Free".to_string()
    } else {
        shipping.display()
    }
}

/// "Add Rs.X more for free shipping!" while the cart doesn't qualify yet.
#[must_use]
pub fn free_shipping_hint(pricing: &PricingConfig, subtotal: Decimal) -> Option<String> {
    pricing.amount_until_free_shipping(subtotal).map(|shortfall| {
        format!(
            "Add {} more for free shipping!",
            pricing.price(shortfall).display()
        )
    })
}

/// Resolves stored image paths to URLs the browser can load.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base: Url,
}

impl ImageResolver {
    /// Resolve `/images/...` paths against `base`.
    #[must_use]
    pub const fn new(base: Url) -> Self {
        Self { base }
    }

    /// URL of the first image, or of the default image when there is none.
    #[must_use]
    pub fn primary(&self, image: &ProductImage) -> String {
        self.resolve(image.first().unwrap_or(DEFAULT_PRODUCT_IMAGE))
    }

    /// URL for a single stored path.
    ///
    /// Paths under `/images` are served by the backend and get the base URL
    /// prepended; anything else (absolute URLs, data URIs) passes through.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        let path = path.trim();
        if path.is_empty() {
            return self.resolve(DEFAULT_PRODUCT_IMAGE);
        }
        if !path.starts_with(ASSET_PREFIX) {
            return path.to_string();
        }
        let joined = format!("{}{path}", self.base.as_str().trim_end_matches('/'));
        match Url::parse(&joined) {
            Ok(url) => url.into(),
            Err(e) => {
                tracing::warn!(error = %e, path, "Unresolvable image path");
                path.to_string()
            }
        }
    }
}

/// One row of the cart page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: String,
}

/// The cart page and order summary panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummaryView {
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    pub badge: Option<String>,
    pub subtotal: String,
    pub tax: String,
    pub shipping: String,
    pub total: String,
    pub free_shipping_hint: Option<String>,
}

impl CartSummaryView {
    /// Build the view for `lines` priced under `pricing`.
    #[must_use]
    pub fn new(lines: &[CartLine], pricing: &PricingConfig, images: &ImageResolver) -> Self {
        let totals: CartTotals = pricing.totals_for_lines(lines);
        let item_count = lines.iter().map(|l| u64::from(l.quantity.get())).sum();

        Self {
            items: lines
                .iter()
                .map(|line| CartLineView::new(line, pricing, images))
                .collect(),
            item_count,
            badge: badge_label(item_count),
            subtotal: pricing.price(totals.subtotal).display(),
            tax: pricing.price(totals.tax).display(),
            shipping: shipping_label(pricing.price(totals.shipping)),
            total: pricing.price(totals.total).display(),
            free_shipping_hint: free_shipping_hint(pricing, totals.subtotal),
        }
    }
}

impl CartLineView {
    fn new(line: &CartLine, pricing: &PricingConfig, images: &ImageResolver) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            quantity: line.quantity.get(),
            price: pricing.price(line.price).display(),
            line_price: pricing.price(line.line_total()).display(),
            image_url: images.primary(&line.image),
        }
    }
}
