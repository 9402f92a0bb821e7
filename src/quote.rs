//! Quotes
//!
//! What the storefront shows for a cart. When bundle pricing fails the cart is
//! quoted at its naive subtotal so checkout is never blocked.

use rusty_money::{Money, iso::Currency};

use crate::{
    cart::{Cart, CartError},
    pricing::{PricingResult, compute_pricing},
    rules::BundleRule,
};

/// Displayed price for a cart snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Quote<'a> {
    /// The bundle rule priced the cart.
    Bundled(PricingResult<'a>),

    /// Bundle pricing failed; the cart is shown at full price.
    Naive {
        /// Cart subtotal with no bundling applied.
        subtotal: Money<'a, Currency>,

        /// Why bundle pricing was skipped.
        reason: String,
    },
}

impl<'a> Quote<'a> {
    /// Quote the current cart under a bundle rule.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] only when the naive subtotal cannot be
    /// computed either.
    pub fn for_cart(cart: &Cart<'a>, rule: &BundleRule<'a>) -> Result<Self, CartError> {
        match compute_pricing(cart.items(), rule) {
            Ok(result) => Ok(Quote::Bundled(result)),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    lines = cart.len(),
                    "bundle pricing failed, quoting naive subtotal"
                );

                Ok(Quote::Naive {
                    subtotal: cart.subtotal()?,
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Amount to display as the cart total.
    pub fn total(&self) -> Money<'a, Currency> {
        match self {
            Quote::Bundled(result) => result.total_price,
            Quote::Naive { subtotal, .. } => *subtotal,
        }
    }

    /// Cart total with no bundling applied.
    pub fn naive_subtotal(&self) -> Money<'a, Currency> {
        match self {
            Quote::Bundled(result) => result.naive_subtotal,
            Quote::Naive { subtotal, .. } => *subtotal,
        }
    }

    /// Savings shown to the customer; zero for a naive quote.
    pub fn savings(&self) -> Money<'a, Currency> {
        match self {
            Quote::Bundled(result) => result.savings,
            Quote::Naive { subtotal, .. } => Money::from_minor(0, subtotal.currency()),
        }
    }

    /// Whether shipping is waived.
    pub fn shipping_waived(&self) -> bool {
        matches!(self, Quote::Bundled(result) if result.shipping_waived)
    }

    /// Bundle pricing details, if bundle pricing succeeded.
    pub fn pricing(&self) -> Option<&PricingResult<'a>> {
        match self {
            Quote::Bundled(result) => Some(result),
            Quote::Naive { .. } => None,
        }
    }

    /// Whether this quote fell back to the naive subtotal.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Quote::Naive { .. })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{ARS, USD};
    use testresult::TestResult;

    use crate::{items::LineItem, rules::Eligibility};

    use super::*;

    fn cart<'a>() -> Result<Cart<'a>, CartError> {
        Cart::with_items(
            [
                LineItem::new("a", Money::from_minor(15_000, ARS), 3),
                LineItem::new("b", Money::from_minor(10_000, ARS), 1),
            ],
            ARS,
        )
    }

    #[test]
    fn bundled_quote_uses_pricing_total() -> TestResult {
        let rule = BundleRule::new(4, Money::from_minor(50_000, ARS), Eligibility::Any)
            .with_free_shipping(true);

        let quote = Quote::for_cart(&cart()?, &rule)?;

        assert!(!quote.is_fallback());
        assert_eq!(quote.total(), Money::from_minor(50_000, ARS));
        assert_eq!(quote.naive_subtotal(), Money::from_minor(55_000, ARS));
        assert_eq!(quote.savings(), Money::from_minor(5_000, ARS));
        assert!(quote.shipping_waived());
        assert!(quote.pricing().is_some());

        Ok(())
    }

    #[test]
    fn invalid_rule_falls_back_to_naive_subtotal() -> TestResult {
        let rule = BundleRule::new(0, Money::from_minor(50_000, ARS), Eligibility::Any)
            .with_free_shipping(true);

        let quote = Quote::for_cart(&cart()?, &rule)?;

        assert!(quote.is_fallback());
        assert_eq!(quote.total(), Money::from_minor(55_000, ARS));
        assert_eq!(quote.savings(), Money::from_minor(0, ARS));
        assert!(!quote.shipping_waived());
        assert!(quote.pricing().is_none());

        Ok(())
    }

    #[test]
    fn rule_in_another_currency_falls_back() -> TestResult {
        let rule = BundleRule::new(4, Money::from_minor(500, USD), Eligibility::Any);

        let quote = Quote::for_cart(&cart()?, &rule)?;

        match quote {
            Quote::Naive { subtotal, reason } => {
                assert_eq!(subtotal, Money::from_minor(55_000, ARS));
                assert!(reason.contains("USD"), "reason should name the currency: {reason}");
            }
            Quote::Bundled(_) => return Err("expected a naive quote".into()),
        }

        Ok(())
    }
}
