//! Bundle Rules
//!
//! A bundle rule sells a fixed number of eligible units together at a fixed
//! price, regardless of which units fill the bundle.

use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::items::Category;

/// Errors raised when a bundle rule cannot be applied.
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    /// A bundle needs at least one unit.
    #[error("bundle size must be at least 1")]
    ZeroBundleSize,

    /// Bundle price in minor units was negative.
    #[error("bundle price must not be negative, got {0} minor units")]
    NegativeBundlePrice(i64),
}

/// Which line items count toward bundle formation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Eligibility {
    /// Every line item is eligible.
    #[default]
    Any,

    /// Only line items tagged with one of these categories.
    Only(SmallVec<[Category; 2]>),

    /// Every line item except those tagged with one of these categories.
    /// Untagged line items are eligible.
    Except(SmallVec<[Category; 2]>),
}

impl Eligibility {
    /// Return whether a line item with the given category counts toward bundles.
    pub fn matches(&self, category: Option<Category>) -> bool {
        match self {
            Eligibility::Any => true,
            Eligibility::Only(categories) => category.is_some_and(|c| categories.contains(&c)),
            Eligibility::Except(categories) => category.is_none_or(|c| !categories.contains(&c)),
        }
    }
}

/// Fixed-price bundle rule.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleRule<'a> {
    bundle_size: u32,
    bundle_price: Money<'a, Currency>,
    eligibility: Eligibility,
    free_shipping: bool,
}

impl<'a> BundleRule<'a> {
    /// Create a new rule without free shipping.
    #[must_use]
    pub fn new(
        bundle_size: u32,
        bundle_price: Money<'a, Currency>,
        eligibility: Eligibility,
    ) -> Self {
        Self {
            bundle_size,
            bundle_price,
            eligibility,
            free_shipping: false,
        }
    }

    /// The storefront's "Pack Black": any 4 jerseys for 59 900, mystery boxes
    /// excluded, shipping waived.
    #[must_use]
    pub fn pack_black(currency: &'a Currency) -> Self {
        Self::new(
            4,
            Money::from_minor(5_990_000, currency),
            Eligibility::Except(smallvec![Category::MysteryBox]),
        )
        .with_free_shipping(true)
    }

    /// Set whether completing a bundle waives shipping.
    #[must_use]
    pub fn with_free_shipping(mut self, free_shipping: bool) -> Self {
        self.free_shipping = free_shipping;
        self
    }

    /// Check the rule can be applied.
    ///
    /// # Errors
    ///
    /// - [`RuleError::ZeroBundleSize`]: the bundle size is zero.
    /// - [`RuleError::NegativeBundlePrice`]: the bundle price is below zero.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.bundle_size == 0 {
            return Err(RuleError::ZeroBundleSize);
        }

        let price = self.bundle_price.to_minor_units();

        if price < 0 {
            return Err(RuleError::NegativeBundlePrice(price));
        }

        Ok(())
    }

    /// Number of units that form one bundle.
    #[must_use]
    pub const fn bundle_size(&self) -> u32 {
        self.bundle_size
    }

    /// Price charged for one complete bundle.
    #[must_use]
    pub fn bundle_price(&self) -> &Money<'a, Currency> {
        &self.bundle_price
    }

    /// Eligibility filter.
    #[must_use]
    pub fn eligibility(&self) -> &Eligibility {
        &self.eligibility
    }

    /// Whether completing a bundle waives shipping.
    #[must_use]
    pub const fn free_shipping(&self) -> bool {
        self.free_shipping
    }

    /// Currency the rule is priced in.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.bundle_price.currency()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::ARS;

    use super::*;

    #[test]
    fn any_matches_everything() {
        let eligibility = Eligibility::Any;

        assert!(eligibility.matches(None));
        assert!(eligibility.matches(Some(Category::Jersey)));
        assert!(eligibility.matches(Some(Category::MysteryBox)));
    }

    #[test]
    fn only_rejects_untagged_items() {
        let eligibility = Eligibility::Only(smallvec![Category::Jersey]);

        assert!(eligibility.matches(Some(Category::Jersey)));
        assert!(!eligibility.matches(Some(Category::MysteryBox)));
        assert!(!eligibility.matches(None));
    }

    #[test]
    fn except_accepts_untagged_items() {
        let eligibility = Eligibility::Except(smallvec![Category::MysteryBox]);

        assert!(eligibility.matches(None));
        assert!(eligibility.matches(Some(Category::Jersey)));
        assert!(!eligibility.matches(Some(Category::MysteryBox)));
    }

    #[test]
    fn validate_rejects_zero_bundle_size() {
        let rule = BundleRule::new(0, Money::from_minor(100, ARS), Eligibility::Any);

        assert_eq!(rule.validate(), Err(RuleError::ZeroBundleSize));
    }

    #[test]
    fn validate_rejects_negative_bundle_price() {
        let rule = BundleRule::new(4, Money::from_minor(-1, ARS), Eligibility::Any);

        assert_eq!(rule.validate(), Err(RuleError::NegativeBundlePrice(-1)));
    }

    #[test]
    fn validate_accepts_free_bundle() {
        let rule = BundleRule::new(2, Money::from_minor(0, ARS), Eligibility::Any);

        assert_eq!(rule.validate(), Ok(()));
    }

    #[test]
    fn pack_black_defaults() {
        let rule = BundleRule::pack_black(ARS);

        assert_eq!(rule.bundle_size(), 4);
        assert_eq!(rule.bundle_price().to_minor_units(), 5_990_000);
        assert!(rule.free_shipping());
        assert!(!rule.eligibility().matches(Some(Category::MysteryBox)));
        assert_eq!(rule.currency(), ARS);
    }
}
