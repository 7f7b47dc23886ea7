//! Subcommand implementations.

pub mod cart;
pub mod checkout;
pub mod session;

use std::io::Write;

use estore_core::{EmailError, IdError};
use estore_storefront::error::{CartError, CheckoutError, StorageError};
use estore_storefront::product::{Product, ProductError};

/// Errors reported by the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("product document is not valid JSON: {0}")]
    ProductJson(#[source] serde_json::Error),

    #[error("invalid product: {0}")]
    Product(#[from] ProductError),

    #[error("invalid product id: {0}")]
    ProductId(#[from] IdError),

    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("session error: {0}")]
    Session(#[from] StorageError),

    #[error("{message}")]
    Rejected {
        message: &'static str,
        hint: Option<&'static str>,
    },

    #[error(transparent)]
    Cart(CartError),

    #[error("could not write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("could not serialize output: {0}")]
    Serialize(#[source] serde_json::Error),
}

const LOGIN_HINT: &str = "run `estore login` first";

impl From<CartError> for CliError {
    fn from(err: CartError) -> Self {
        if err.is_rejection() {
            Self::Rejected {
                message: err.user_message(),
                hint: err.redirect().map(|_| LOGIN_HINT),
            }
        } else {
            Self::Cart(err)
        }
    }
}

impl From<CheckoutError> for CliError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Cart(err) => err.into(),
            err => Self::Rejected {
                message: err.user_message(),
                hint: err.redirect().map(|_| LOGIN_HINT),
            },
        }
    }
}

impl CliError {
    /// Follow-up suggestion for the user, if any.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Rejected { hint, .. } => *hint,
            _ => None,
        }
    }
}

/// Parse a product document as returned by the products API.
fn parse_product(raw: &str) -> Result<Product, CliError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(CliError::ProductJson)?;
    Ok(Product::from_api(&value)?)
}

/// Write one line to stdout.
fn say(line: impl std::fmt::Display) -> Result<(), CliError> {
    writeln!(std::io::stdout().lock(), "{line}")?;
    Ok(())
}

/// Pretty-print `value` as JSON to stdout.
fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::Serialize)?;
    say(json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_carry_login_hint() {
        let err = CliError::from(CartError::AuthenticationRequired);
        assert_eq!(err.to_string(), "Please login to add items to cart");
        assert_eq!(err.hint(), Some(LOGIN_HINT));

        let err = CliError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Your cart is empty");
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn test_storage_failures_are_not_rejections() {
        let err = CliError::from(CartError::from(StorageError::InvalidKey("a/b".into())));
        assert!(matches!(err, CliError::Cart(_)));
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn test_parse_product() {
        let product =
            parse_product(r#"{"productId":"P1","name":"Keyboard","price":"2500"}"#).unwrap();
        assert_eq!(product.product_id.as_str(), "P1");

        assert!(matches!(parse_product("{"), Err(CliError::ProductJson(_))));
        assert!(matches!(
            parse_product(r#"{"name":"No id","price":1}"#),
            Err(CliError::Product(_))
        ));
    }
}
