//! Order totals.
//!
//! Every view that shows money (cart badge, cart summary, checkout, the order
//! payload) goes through [`PricingConfig::totals`], so the tax and shipping
//! formulas exist exactly once.
//!
//! ```text
//! tax      = subtotal * tax_rate
//! shipping = 0 if subtotal qualifies for free shipping, else shipping_fee
//! total    = subtotal + tax + shipping
//! ```
//!
//! Sums and products saturate at [`Decimal::MAX`] instead of overflowing.

use estore_core::{CurrencyCode, Price};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;

/// Smallest amount the store charges (one cent).
const MINOR_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest unit price a product or cart line may carry (one trillion).
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Bring `amount` into the form every cart line price takes: clamped to
/// `0..=MAX_UNIT_PRICE` and rounded half away from zero to whole cents.
///
/// Prices in this form read back unchanged from the JSON number stored in
/// the cart snapshot.
#[must_use]
pub fn unit_price(amount: Decimal) -> Decimal {
    amount
        .clamp(Decimal::ZERO, MAX_UNIT_PRICE)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Which side of the threshold ships free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeShippingBoundary {
    /// `subtotal > threshold` ships free; exactly the threshold pays.
    #[default]
    Above,
    /// `subtotal >= threshold` ships free.
    AtOrAbove,
}

/// Tax and shipping rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Fraction of the subtotal charged as tax.
    pub tax_rate: Decimal,
    /// Subtotal from which shipping is waived.
    pub free_shipping_threshold: Decimal,
    /// Flat fee charged when shipping is not waived.
    pub shipping_fee: Decimal,
    /// How the threshold itself is treated.
    pub free_shipping_boundary: FreeShippingBoundary,
    /// Currency all amounts are expressed in.
    pub currency: CurrencyCode,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2),
            free_shipping_threshold: Decimal::new(5000, 0),
            shipping_fee: Decimal::new(500, 0),
            free_shipping_boundary: FreeShippingBoundary::Above,
            currency: CurrencyCode::LKR,
        }
    }
}

impl PricingConfig {
    /// Whether `subtotal` ships free.
    #[must_use]
    pub fn ships_free(&self, subtotal: Decimal) -> bool {
        match self.free_shipping_boundary {
            FreeShippingBoundary::Above => subtotal > self.free_shipping_threshold,
            FreeShippingBoundary::AtOrAbove => subtotal >= self.free_shipping_threshold,
        }
    }

    /// Shipping charged on `subtotal`.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if self.ships_free(subtotal) {
            Decimal::ZERO
        } else {
            self.shipping_fee
        }
    }

    /// Tax, shipping and grand total for `subtotal`.
    #[must_use]
    pub fn totals(&self, subtotal: Decimal) -> CartTotals {
        let tax = subtotal.saturating_mul(self.tax_rate);
        let shipping = self.shipping_for(subtotal);
        CartTotals {
            subtotal,
            tax,
            shipping,
            total: subtotal.saturating_add(tax).saturating_add(shipping),
            currency: self.currency,
        }
    }

    /// Totals for a list of cart lines.
    #[must_use]
    pub fn totals_for_lines(&self, lines: &[CartLine]) -> CartTotals {
        self.totals(subtotal(lines))
    }

    /// How much more the shopper must spend for free shipping.
    ///
    /// `None` for an empty cart or once shipping is already free. With the
    /// [`FreeShippingBoundary::Above`] rule the threshold itself still pays,
    /// so the shortfall includes one extra cent.
    #[must_use]
    pub fn amount_until_free_shipping(&self, subtotal: Decimal) -> Option<Decimal> {
        if subtotal <= Decimal::ZERO || self.ships_free(subtotal) {
            return None;
        }
        let shortfall = self.free_shipping_threshold - subtotal;
        Some(match self.free_shipping_boundary {
            FreeShippingBoundary::Above => shortfall + MINOR_UNIT,
            FreeShippingBoundary::AtOrAbove => shortfall,
        })
    }

    /// Wrap an amount in this configuration's currency.
    #[must_use]
    pub const fn price(&self, amount: Decimal) -> Price {
        Price::new(amount, self.currency)
    }
}

/// Sum of `price * quantity` over `lines`, unrounded.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .map(CartLine::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Derived money amounts for a cart or a single-product checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use estore_core::{ProductId, Quantity};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::product::ProductImage;

    fn line(id: &str, price: Decimal, quantity: i64) -> CartLine {
        CartLine {
            product_id: ProductId::parse(id).unwrap(),
            name: id.to_string(),
            price,
            image: ProductImage::default(),
            quantity: Quantity::try_from(quantity).unwrap(),
        }
    }

    #[test]
    fn test_totals_scenario() {
        let pricing = PricingConfig::default();
        let totals = pricing.totals_for_lines(&[line("P1", dec!(1000), 3)]);

        assert_eq!(totals.subtotal, dec!(3000));
        assert_eq!(totals.tax, dec!(300));
        assert_eq!(totals.shipping, dec!(500));
        assert_eq!(totals.total, dec!(3800));
    }

    #[test]
    fn test_empty_cart_still_charges_shipping() {
        let totals = PricingConfig::default().totals_for_lines(&[]);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, dec!(500));
    }

    #[test]
    fn test_free_shipping_boundary_above() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.shipping_for(dec!(4999.99)), dec!(500));
        assert_eq!(pricing.shipping_for(dec!(5000)), dec!(500));
        assert_eq!(pricing.shipping_for(dec!(5000.01)), Decimal::ZERO);
    }

    #[test]
    fn test_free_shipping_boundary_at_or_above() {
        let pricing = PricingConfig {
            free_shipping_boundary: FreeShippingBoundary::AtOrAbove,
            ..PricingConfig::default()
        };
        assert_eq!(pricing.shipping_for(dec!(4999.99)), dec!(500));
        assert_eq!(pricing.shipping_for(dec!(5000)), Decimal::ZERO);
        assert_eq!(pricing.shipping_for(dec!(5000.01)), Decimal::ZERO);
    }

    #[test]
    fn test_totals_above_threshold() {
        let totals = PricingConfig::default().totals(dec!(6000));
        assert_eq!(totals.tax, dec!(600));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, dec!(6600));
    }

    #[test]
    fn test_subtotal_keeps_precision() {
        let lines = [line("A", dec!(0.1), 3), line("B", dec!(19.99), 2)];
        assert_eq!(subtotal(&lines), dec!(40.28));
    }

    #[test]
    fn test_amount_until_free_shipping() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.amount_until_free_shipping(Decimal::ZERO), None);
        assert_eq!(pricing.amount_until_free_shipping(dec!(3000)), Some(dec!(2000.01)));
        assert_eq!(pricing.amount_until_free_shipping(dec!(5000)), Some(dec!(0.01)));
        assert_eq!(pricing.amount_until_free_shipping(dec!(5000.01)), None);

        let inclusive = PricingConfig {
            free_shipping_boundary: FreeShippingBoundary::AtOrAbove,
            ..PricingConfig::default()
        };
        assert_eq!(inclusive.amount_until_free_shipping(dec!(3000)), Some(dec!(2000)));
        assert_eq!(inclusive.amount_until_free_shipping(dec!(5000)), None);
    }

    #[test]
    fn test_unit_price_rounds_and_clamps() {
        assert_eq!(unit_price(dec!(19.99)), dec!(19.99));
        assert_eq!(unit_price(dec!(987654321.987654321)), dec!(987654321.99));
        assert_eq!(unit_price(dec!(0.125)), dec!(0.13));
        assert_eq!(unit_price(dec!(-4)), Decimal::ZERO);
        assert_eq!(unit_price(Decimal::MAX), MAX_UNIT_PRICE);
        assert_eq!(MAX_UNIT_PRICE, Decimal::new(1_000_000_000_000, 0));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let lines = [
            line("A", Decimal::MAX, 1000),
            line("B", Decimal::MAX, 1),
        ];
        assert_eq!(lines[0].line_total(), Decimal::MAX);
        assert_eq!(subtotal(&lines), Decimal::MAX);

        let totals = PricingConfig::default().totals_for_lines(&lines);
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::MAX);
    }

    #[test]
    fn test_largest_cart_line_fits() {
        let lines = [line("A", MAX_UNIT_PRICE, i64::from(u32::MAX))];
        let expected = MAX_UNIT_PRICE * Decimal::from(u32::MAX);
        assert_eq!(subtotal(&lines), expected);
        assert_eq!(
            PricingConfig::default().totals_for_lines(&lines).total,
            expected + expected * dec!(0.1)
        );
    }
}
