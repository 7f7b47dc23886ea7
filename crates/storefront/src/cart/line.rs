//! Cart line type.

use estore_core::{ProductId, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing;
use crate::product::{Product, ProductImage, image_or_default};

/// One product in the cart.
///
/// `name`, `price` and `image` are copies taken when the product was first
/// added; later catalog changes do not reach lines already in the cart.
/// Serialized with the field names of the stored cart
/// (`productId, name, price, image, quantity`), price as a JSON number.
/// Prices are kept in the form produced by [`pricing::unit_price`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "image_or_default")]
    pub image: ProductImage,
    pub quantity: Quantity,
}

impl CartLine {
    /// A new line holding one unit of `product`.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            price: pricing::unit_price(product.price),
            image: product.image.clone(),
            quantity: Quantity::ONE,
        }
    }

    /// `price * quantity`, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity.get()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_product_copies_fields() {
        let product = Product::new(ProductId::parse("PRD-1").unwrap(), "Keyboard", dec!(2500))
            .with_image(ProductImage::Single("/images/kb.png".to_string()));
        let line = CartLine::from_product(&product);

        assert_eq!(line.product_id, product.product_id);
        assert_eq!(line.name, "Keyboard");
        assert_eq!(line.price, dec!(2500));
        assert_eq!(line.image, product.image);
        assert_eq!(line.quantity, Quantity::ONE);
    }

    #[test]
    fn test_from_product_normalizes_price() {
        let id = ProductId::parse("P").unwrap();
        let line = CartLine::from_product(&Product::new(id.clone(), "Cable", dec!(19.987)));
        assert_eq!(line.price, dec!(19.99));

        let line = CartLine::from_product(&Product::new(id, "Server", dec!(100000000000000000000)));
        assert_eq!(line.price, pricing::MAX_UNIT_PRICE);
    }

    #[test]
    fn test_line_total() {
        let mut line = CartLine::from_product(&Product::new(
            ProductId::parse("P").unwrap(),
            "Cable",
            dec!(19.99),
        ));
        line.quantity = Quantity::try_from(3).unwrap();
        assert_eq!(line.line_total(), dec!(59.97));
    }

    #[test]
    fn test_serialized_shape() {
        let product = Product::new(ProductId::parse("PRD-1").unwrap(), "Mouse", dec!(1000))
            .with_image(ProductImage::Gallery(vec!["/images/m.png".to_string()]));
        let value = serde_json::to_value(CartLine::from_product(&product)).unwrap();

        assert_eq!(
            value,
            json!({
                "productId": "PRD-1",
                "name": "Mouse",
                "price": 1000.0,
                "image": ["/images/m.png"],
                "quantity": 1
            })
        );
    }

    #[test]
    fn test_deserialize_tolerates_missing_image() {
        let line: CartLine = serde_json::from_value(json!({
            "productId": "PRD-1",
            "name": "Mouse",
            "price": 1000,
            "quantity": 2
        }))
        .unwrap();
        assert_eq!(line.image, ProductImage::default());

        let line: CartLine = serde_json::from_value(json!({
            "productId": "PRD-1",
            "name": "Mouse",
            "price": 1000,
            "image": null,
            "quantity": 2
        }))
        .unwrap();
        assert_eq!(line.quantity.get(), 2);
    }
}
