//! Checkout Handoff
//!
//! Turns a quoted cart into the line items handed to the commerce backend.
//! The backend prices the order itself; the totals here are advisory.

use serde::Serialize;
use thiserror::Error;

use crate::{cart::Cart, quote::Quote};

/// Errors that can occur while preparing a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to check out.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// Serialising the draft failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One line of the checkout payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    /// Commerce platform variant id.
    pub merchandise_id: String,

    /// Units of this variant.
    pub quantity: u32,
}

/// Checkout payload with the advisory pricing shown to the customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    /// Lines in cart order.
    pub lines: Vec<CheckoutLine>,

    /// Total displayed to the customer, in minor units.
    pub advisory_total: i64,

    /// ISO code of the currency.
    pub currency: &'static str,

    /// Complete bundles in the quote.
    pub bundle_count: u64,

    /// Whether shipping is waived.
    pub shipping_waived: bool,

    /// Order note for the backend, set when a bundle applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CheckoutDraft {
    /// Build a draft from a cart and the quote computed for it.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError::EmptyCart`] if the cart has no lines.
    pub fn from_quote(cart: &Cart<'_>, quote: &Quote<'_>) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let lines = cart
            .iter()
            .map(|item| CheckoutLine {
                merchandise_id: item.id().to_string(),
                quantity: item.quantity(),
            })
            .collect();

        let (bundle_count, note) = match quote.pricing() {
            Some(result) if result.has_bundle() => (
                result.bundle_count,
                Some(format!(
                    "Pack x{}: {} units bundled, {} priced individually",
                    result.bundle_count,
                    result.bundle_count * u64::from(result.bundle_size),
                    result.leftover_unit_count,
                )),
            ),
            _ => (0, None),
        };

        Ok(CheckoutDraft {
            lines,
            advisory_total: quote.total().to_minor_units(),
            currency: cart.currency().iso_alpha_code,
            bundle_count,
            shipping_waived: quote.shipping_waived(),
            note,
        })
    }

    /// Serialise the draft as JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError::Json`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, CheckoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
