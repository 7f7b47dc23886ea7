//! Unified error handling for cart operations.
//!
//! Nothing in the cart is fatal. Rejections (`AuthenticationRequired`,
//! `ProductNotFound`) are expected outcomes the caller turns into a prompt or
//! a redirect; storage failures are reported so the caller can retry, and the
//! in-memory cart is left exactly as it was before the failed operation.

use std::path::PathBuf;

use estore_core::EmailError;
use thiserror::Error;

/// Path the UI should send the user to when a mutation needs a login.
pub const LOGIN_PATH: &str = "/login";

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters the backend can't store.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A value could not be encoded for storage.
    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error type for cart engine operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No user is signed in; the UI should redirect to [`LOGIN_PATH`].
    #[error("authentication required")]
    AuthenticationRequired,

    /// The product to add was missing.
    #[error("product not found")]
    ProductNotFound,

    /// The cart snapshot could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CartError {
    /// Whether this is a precondition rejection rather than an I/O failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::AuthenticationRequired | Self::ProductNotFound)
    }

    /// Where the UI should navigate in response, if anywhere.
    #[must_use]
    pub const fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::AuthenticationRequired => Some(LOGIN_PATH),
            _ => None,
        }
    }

    /// Message safe to show to the shopper.
    ///
    /// Storage and serialization details stay in the logs.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "Please login to add items to cart",
            Self::ProductNotFound => "Product not found",
            Self::Storage(_) | Self::Serialization(_) => "Could not save your cart, please try again",
        }
    }
}

/// Why an order could not be assembled.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No user is signed in.
    #[error("authentication required")]
    AuthenticationRequired,

    /// A customer information field is blank.
    #[error("missing customer field: {0}")]
    MissingCustomerInfo(&'static str),

    /// The customer email does not parse.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A required shipping address field is blank.
    #[error("missing shipping field: {0}")]
    MissingShippingAddress(&'static str),

    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Clearing the cart after the order failed.
    #[error(transparent)]
    Cart(#[from] CartError),
}

impl CheckoutError {
    /// Where the UI should navigate in response, if anywhere.
    #[must_use]
    pub const fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::AuthenticationRequired => Some(LOGIN_PATH),
            Self::Cart(err) => err.redirect(),
            _ => None,
        }
    }

    /// Message safe to show to the shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "Please login to place an order",
            Self::MissingCustomerInfo(_) => "Please fill in all customer information",
            Self::InvalidEmail(_) => "Please enter a valid email address",
            Self::MissingShippingAddress(_) => "Please fill in all shipping address fields",
            Self::EmptyCart => "Your cart is empty",
            Self::Cart(err) => err.user_message(),
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        assert_eq!(
            CartError::AuthenticationRequired.to_string(),
            "authentication required"
        );
        assert_eq!(CartError::ProductNotFound.to_string(), "product not found");

        let err = CartError::from(StorageError::InvalidKey("a/b".to_string()));
        assert_eq!(err.to_string(), "storage error: invalid storage key: \"a/b\"");
    }

    #[test]
    fn test_encode_failure_is_a_storage_error() {
        let json_err = serde_json::from_str::<u8>("x").unwrap_err();
        let err = StorageError::from(json_err);
        assert!(err.to_string().starts_with("failed to encode stored value: "));
        assert!(!CartError::from(err).is_rejection());
    }

    #[test]
    fn test_rejections_are_discriminated() {
        assert!(CartError::AuthenticationRequired.is_rejection());
        assert!(CartError::ProductNotFound.is_rejection());
        assert!(!CartError::from(StorageError::InvalidKey(String::new())).is_rejection());

        assert_eq!(CartError::AuthenticationRequired.redirect(), Some(LOGIN_PATH));
        assert_eq!(CartError::ProductNotFound.redirect(), None);
    }

    #[test]
    fn test_checkout_messages() {
        assert_eq!(
            CheckoutError::MissingCustomerInfo("phone").user_message(),
            "Please fill in all customer information"
        );
        assert_eq!(
            CheckoutError::MissingShippingAddress("city").user_message(),
            "Please fill in all shipping address fields"
        );
        assert_eq!(CheckoutError::EmptyCart.user_message(), "Your cart is empty");
        assert_eq!(
            CheckoutError::AuthenticationRequired.redirect(),
            Some(LOGIN_PATH)
        );
        assert_eq!(
            CheckoutError::from(EmailError::Malformed).to_string(),
            "invalid email: email must have the form local@domain"
        );
    }

    #[test]
    fn test_user_message_hides_storage_details() {
        let err = CartError::from(StorageError::io(
            "/tmp/cart.json",
            std::io::Error::other("disk full"),
        ));
        assert!(!err.user_message().contains("disk full"));
    }
}
