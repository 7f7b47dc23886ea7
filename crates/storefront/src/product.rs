//! Typed catalog products.
//!
//! The products API returns loosely-shaped JSON: ids may arrive as
//! `productId`, `_id` or `id`, prices as numbers or strings, images as a
//! single URL or a gallery. [`Product::from_api`] normalizes all of that once,
//! at the boundary, so the cart only ever sees validated values.

use std::str::FromStr;

use estore_core::{IdError, ProductId};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::pricing::{self, MAX_UNIT_PRICE};

/// Errors raised while normalizing an API product.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// The payload is not a JSON object.
    #[error("product payload must be a JSON object")]
    NotAnObject,

    /// A required field is absent or null.
    #[error("product field `{0}` is missing")]
    MissingField(&'static str),

    /// The identifier is blank.
    #[error("invalid product id: {0}")]
    InvalidId(#[from] IdError),

    /// A price field is neither a number nor a numeric string.
    #[error("product field `{field}` is not a valid amount: {value}")]
    InvalidAmount { field: &'static str, value: String },

    /// A price field is below zero.
    #[error("product field `{field}` cannot be negative: {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    /// A price field is above [`MAX_UNIT_PRICE`].
    #[error("product field `{field}` exceeds the maximum price: {value}")]
    AmountTooLarge { field: &'static str, value: Decimal },

    /// The image field is neither a string nor a list of strings.
    #[error("product image must be a string or a list of strings")]
    InvalidImage,
}

/// Product imagery: one URL or a gallery, kept in the shape it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductImage {
    Single(String),
    Gallery(Vec<String>),
}

impl Default for ProductImage {
    fn default() -> Self {
        Self::Gallery(Vec::new())
    }
}

impl ProductImage {
    /// The first non-blank image, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(url) => Some(url.as_str()),
            Self::Gallery(urls) => urls.first().map(String::as_str),
        }
        .filter(|url| !url.trim().is_empty())
    }

    fn from_value(value: Option<&Value>) -> Result<Self, ProductError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::String(url)) => Ok(Self::Single(url.clone())),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .map(Self::Gallery)
                .ok_or(ProductError::InvalidImage),
            Some(_) => Err(ProductError::InvalidImage),
        }
    }
}

/// Deserialize an image that may be absent or `null`.
pub(crate) fn image_or_default<'de, D>(deserializer: D) -> Result<ProductImage, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ProductImage>::deserialize(deserializer)?.unwrap_or_default())
}

/// A catalog product as the cart sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    /// Current selling price, at most [`MAX_UNIT_PRICE`].
    pub price: Decimal,
    /// Pre-discount "was" price, when the catalog shows one.
    pub labelled_price: Option<Decimal>,
    pub image: ProductImage,
}

impl Product {
    /// Create a product without a labelled price or images.
    #[must_use]
    pub fn new(product_id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            product_id,
            name: name.into(),
            price,
            labelled_price: None,
            image: ProductImage::default(),
        }
    }

    /// Set the images.
    #[must_use]
    pub fn with_image(mut self, image: ProductImage) -> Self {
        self.image = image;
        self
    }

    /// Set the labelled ("was") price.
    #[must_use]
    pub const fn with_labelled_price(mut self, labelled_price: Decimal) -> Self {
        self.labelled_price = Some(labelled_price);
        self
    }

    /// Normalize a product document from the products API.
    ///
    /// # Errors
    ///
    /// Returns `ProductError` when the id, name or price is missing or
    /// invalid, or when the image field has an unexpected shape.
    pub fn from_api(value: &Value) -> Result<Self, ProductError> {
        let fields = value.as_object().ok_or(ProductError::NotAnObject)?;
        let field = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| fields.get(*name).filter(|v| !v.is_null()))
        };

        let product_id = match field(&["productId", "_id", "id"]) {
            Some(Value::String(id)) => ProductId::parse(id)?,
            Some(Value::Number(n)) => ProductId::parse(&n.to_string())?,
            _ => return Err(ProductError::MissingField("productId")),
        };
        let name = field(&["name", "title"])
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ProductError::MissingField("name"))?
            .to_owned();
        let price = field(&["price"])
            .ok_or(ProductError::MissingField("price"))
            .and_then(|v| parse_amount("price", v))?;
        let labelled_price = field(&["labelledPrice"])
            .map(|v| parse_amount("labelledPrice", v))
            .transpose()?;
        let image = ProductImage::from_value(field(&["image", "images"]))?;

        Ok(Self {
            product_id,
            name,
            price,
            labelled_price,
            image,
        })
    }

    /// Whole-percent discount against the labelled price, 0 when there is none.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        let Some(labelled) = self.labelled_price else {
            return 0;
        };
        if labelled <= self.price || labelled.is_zero() {
            return 0;
        }
        let percent = (labelled - self.price) / labelled * Decimal::ONE_HUNDRED;
        percent
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    }
}

fn parse_amount(field: &'static str, value: &Value) -> Result<Decimal, ProductError> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        other => other.to_string(),
    };
    let amount = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| ProductError::InvalidAmount { field, value: raw })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ProductError::NegativeAmount {
            field,
            value: amount,
        });
    }
    if amount > MAX_UNIT_PRICE {
        return Err(ProductError::AmountTooLarge {
            field,
            value: amount,
        });
    }
    Ok(pricing::unit_price(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_api_full_document() {
        let product = Product::from_api(&json!({
            "productId": "PRD-1",
            "name": "Gaming Laptop",
            "price": 1299.5,
            "labelledPrice": 1500,
            "image": ["/images/laptop.png", "/images/laptop-2.png"]
        }))
        .unwrap();

        assert_eq!(product.product_id.as_str(), "PRD-1");
        assert_eq!(product.name, "Gaming Laptop");
        assert_eq!(product.price, dec!(1299.5));
        assert_eq!(product.labelled_price, Some(dec!(1500)));
        assert_eq!(product.image.first(), Some("/images/laptop.png"));
    }

    #[test]
    fn test_from_api_id_fallbacks() {
        let product = Product::from_api(&json!({"_id": "abc", "name": "Mouse", "price": 10})).unwrap();
        assert_eq!(product.product_id.as_str(), "abc");

        let product = Product::from_api(&json!({"id": 42, "name": "Mouse", "price": 10})).unwrap();
        assert_eq!(product.product_id.as_str(), "42");
    }

    #[test]
    fn test_from_api_string_price() {
        let product =
            Product::from_api(&json!({"productId": "P", "name": "Cable", "price": " 19.99 "})).unwrap();
        assert_eq!(product.price, dec!(19.99));
    }

    #[test]
    fn test_from_api_rounds_to_cents() {
        let product = Product::from_api(&json!({
            "productId": "P",
            "name": "Workstation",
            "price": "987654321.987654321",
            "labelledPrice": 1e12
        }))
        .unwrap();
        assert_eq!(product.price, dec!(987654321.99));
        assert_eq!(product.labelled_price, Some(MAX_UNIT_PRICE));
    }

    #[test]
    fn test_from_api_missing_fields() {
        assert_eq!(
            Product::from_api(&json!({"name": "X", "price": 1})),
            Err(ProductError::MissingField("productId"))
        );
        assert_eq!(
            Product::from_api(&json!({"productId": "P", "name": "  ", "price": 1})),
            Err(ProductError::MissingField("name"))
        );
        assert_eq!(
            Product::from_api(&json!({"productId": "P", "name": "X", "price": null})),
            Err(ProductError::MissingField("price"))
        );
        assert_eq!(Product::from_api(&json!([1, 2])), Err(ProductError::NotAnObject));
    }

    #[test]
    fn test_from_api_rejects_bad_values() {
        assert!(matches!(
            Product::from_api(&json!({"productId": "", "name": "X", "price": 1})),
            Err(ProductError::InvalidId(_))
        ));
        assert!(matches!(
            Product::from_api(&json!({"productId": "P", "name": "X", "price": "free"})),
            Err(ProductError::InvalidAmount { field: "price", .. })
        ));
        assert!(matches!(
            Product::from_api(&json!({"productId": "P", "name": "X", "price": -5})),
            Err(ProductError::NegativeAmount { field: "price", .. })
        ));
        assert!(matches!(
            Product::from_api(&json!({"productId": "P", "name": "X", "price": "1e20"})),
            Err(ProductError::AmountTooLarge { field: "price", .. })
        ));
        assert!(matches!(
            Product::from_api(&json!({"productId": "P", "name": "X", "price": "12345678901234567.89"})),
            Err(ProductError::AmountTooLarge { field: "price", .. })
        ));
        assert_eq!(
            Product::from_api(&json!({"productId": "P", "name": "X", "price": 1, "image": 7})),
            Err(ProductError::InvalidImage)
        );
    }

    #[test]
    fn test_image_shapes() {
        let single = Product::from_api(&json!({"productId": "P", "name": "X", "price": 1, "image": "a.png"}))
            .unwrap();
        assert_eq!(single.image, ProductImage::Single("a.png".to_string()));

        let none = Product::from_api(&json!({"productId": "P", "name": "X", "price": 1})).unwrap();
        assert_eq!(none.image, ProductImage::default());
        assert_eq!(none.image.first(), None);
    }

    #[test]
    fn test_image_serde_keeps_shape() {
        let single = ProductImage::Single("a.png".to_string());
        assert_eq!(serde_json::to_string(&single).unwrap(), "\"a.png\"");

        let gallery: ProductImage = serde_json::from_str("[\"a.png\",\"b.png\"]").unwrap();
        assert_eq!(
            gallery,
            ProductImage::Gallery(vec!["a.png".to_string(), "b.png".to_string()])
        );
    }

    #[test]
    fn test_discount_percent() {
        let id = ProductId::parse("P").unwrap();
        let product = Product::new(id.clone(), "X", dec!(750)).with_labelled_price(dec!(1000));
        assert_eq!(product.discount_percent(), 25);

        let product = Product::new(id.clone(), "X", dec!(2000)).with_labelled_price(dec!(3000));
        assert_eq!(product.discount_percent(), 33);

        let product = Product::new(id.clone(), "X", dec!(1000)).with_labelled_price(dec!(900));
        assert_eq!(product.discount_percent(), 0);

        assert_eq!(Product::new(id, "X", dec!(1)).discount_percent(), 0);
    }
}
