//! Persisted cart snapshot.
//!
//! The cart is stored as a JSON array of [`CartLine`] objects in insertion
//! order. Decoding never fails: an absent or unparseable snapshot is an empty
//! cart, individual lines that break the line invariants are dropped, and
//! repeated product ids are folded into the first occurrence. Prices outside
//! `0..=MAX_UNIT_PRICE` drop the line; the rest are rounded to whole cents.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use super::CartLine;
use crate::pricing::{self, MAX_UNIT_PRICE};

/// Serialize `lines` for storage.
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn encode(lines: &[CartLine]) -> Result<String, serde_json::Error> {
    serde_json::to_string(lines)
}

/// Decode a stored snapshot, degrading to an empty cart.
#[must_use]
pub fn decode(raw: Option<&str>) -> Vec<CartLine> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let entries = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Discarding malformed cart snapshot");
            return Vec::new();
        }
    };

    let mut lines: Vec<CartLine> = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let mut line = match serde_json::from_value::<CartLine>(entry) {
            Ok(line) if (Decimal::ZERO..=MAX_UNIT_PRICE).contains(&line.price) => line,
            Ok(line) => {
                warn!(
                    index,
                    product_id = %line.product_id,
                    price = %line.price,
                    "Dropping cart line with out-of-range price"
                );
                continue;
            }
            Err(e) => {
                warn!(index, error = %e, "Dropping malformed cart line");
                continue;
            }
        };
        line.price = pricing::unit_price(line.price);

        if let Some(existing) = lines.iter_mut().find(|l| l.product_id == line.product_id) {
            warn!(product_id = %line.product_id, "Merging duplicate cart line");
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            lines.push(line);
        }
    }
    lines
}
