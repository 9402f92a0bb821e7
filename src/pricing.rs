//! Bundle Pricing
//!
//! Prices a cart snapshot under a [`BundleRule`]: eligible units are grouped
//! into fixed-price bundles, the units that do not complete a bundle are
//! priced individually, and excluded lines are charged at their own price.
//!
//! Leftover units are taken from the most expensive eligible lines first,
//! matching what the storefront has always charged. Note this is not the
//! cheapest split for the customer.

use decimal_percentage::Percentage;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    items::LineItem,
    rules::{BundleRule, RuleError},
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The bundle rule cannot be applied.
    #[error("invalid bundle rule: {0}")]
    InvalidConfiguration(#[from] RuleError),

    /// A line item cannot be priced (index, id, reason).
    #[error("line item {0} ({1}) is malformed: {2}")]
    MalformedLineItem(usize, String, &'static str),

    /// A line item's currency differs from the rule currency (index, item currency, rule currency).
    #[error("Item {0} has currency {1}, but rule has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// Minor unit arithmetic overflowed.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// How the units of one line item were priced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitAllocation<'a> {
    /// Index of the line item in the priced snapshot.
    pub item_idx: usize,

    /// Price of a single unit.
    pub unit_price: Money<'a, Currency>,

    /// Total units on the line.
    pub quantity: u32,

    /// Whether the line counts toward bundles.
    pub eligible: bool,

    /// Units placed into bundles.
    pub bundled: u32,

    /// Eligible units priced individually because they did not complete a bundle.
    pub individual: u32,
}

impl UnitAllocation<'_> {
    /// Units outside the bundle rule, charged at their own price.
    pub fn excluded(&self) -> u32 {
        if self.eligible { 0 } else { self.quantity }
    }
}

/// Outcome of applying a bundle rule to a cart snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult<'a> {
    /// Units that make up one bundle under the applied rule.
    pub bundle_size: u32,

    /// Total quantity across eligible line items.
    pub eligible_unit_count: u64,

    /// Complete bundles formed.
    pub bundle_count: u64,

    /// Eligible units that did not complete a bundle.
    pub leftover_unit_count: u64,

    /// Units still missing before the first bundle applies, `None` once it does.
    pub units_needed_for_next_bundle: Option<u64>,

    /// Per line item split between bundled, individual and excluded units.
    pub allocations: SmallVec<[UnitAllocation<'a>; 10]>,

    /// Price of all complete bundles.
    pub bundle_total: Money<'a, Currency>,

    /// Price of the leftover units.
    pub leftover_price: Money<'a, Currency>,

    /// Price of the line items outside the bundle rule.
    pub non_eligible_subtotal: Money<'a, Currency>,

    /// Amount to display as the cart total.
    pub total_price: Money<'a, Currency>,

    /// Cart total with no bundling applied.
    pub naive_subtotal: Money<'a, Currency>,

    /// `naive_subtotal - total_price`. Not clamped; negative when the bundle
    /// costs more than its units.
    pub savings: Money<'a, Currency>,

    /// Whether shipping is waived: the rule offers it and a bundle applied.
    pub shipping_waived: bool,
}

impl PricingResult<'_> {
    /// Savings relative to the naive subtotal.
    pub fn savings_percent(&self) -> Percentage {
        let subtotal_minor = self.naive_subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Percentage::from(0.0);
        }

        // Ratio in decimal space to avoid integer truncation.
        let savings_dec = Decimal::from_i64(self.savings.to_minor_units()).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Percentage::from(savings_dec / subtotal_dec)
    }

    /// Whether at least one bundle applied.
    pub fn has_bundle(&self) -> bool {
        self.bundle_count > 0
    }
}

/// Price a cart snapshot under a bundle rule.
///
/// Line items with a quantity of zero are treated as absent.
///
/// # Errors
///
/// - [`PricingError::InvalidConfiguration`]: the rule has a zero bundle size or a negative price.
/// - [`PricingError::MalformedLineItem`]: a line item has a negative unit price.
/// - [`PricingError::CurrencyMismatch`]: a line item is priced in another currency.
/// - [`PricingError::Overflow`]: a total does not fit in minor units.
pub fn compute_pricing<'a>(
    items: &[LineItem<'a>],
    rule: &BundleRule<'a>,
) -> Result<PricingResult<'a>, PricingError> {
    rule.validate()?;

    let currency = rule.currency();

    validate_items(items, currency)?;

    let eligibility = rule.eligibility();

    let mut allocations: SmallVec<[UnitAllocation<'a>; 10]> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.quantity() > 0)
        .map(|(item_idx, item)| UnitAllocation {
            item_idx,
            unit_price: *item.unit_price(),
            quantity: item.quantity(),
            eligible: eligibility.matches(item.category()),
            bundled: 0,
            individual: 0,
        })
        .collect();

    let eligible_unit_count: u64 = allocations
        .iter()
        .filter(|alloc| alloc.eligible)
        .map(|alloc| u64::from(alloc.quantity))
        .sum();

    let bundle_size = u64::from(rule.bundle_size());
    let bundle_count = eligible_unit_count / bundle_size;
    let leftover_unit_count = eligible_unit_count % bundle_size;

    let units_needed_for_next_bundle =
        (bundle_count == 0).then(|| bundle_size - eligible_unit_count);

    let leftover_minor = allocate_leftovers(&mut allocations, leftover_unit_count)?;

    let non_eligible_minor = allocations
        .iter()
        .filter(|alloc| !alloc.eligible)
        .try_fold(0i64, |acc, alloc| {
            units_price(alloc, alloc.quantity).and_then(|price| acc.checked_add(price))
        })
        .ok_or(PricingError::Overflow)?;

    let naive_minor = naive_subtotal_minor(items)?;

    let bundle_total_minor = i64::try_from(bundle_count)
        .ok()
        .and_then(|count| rule.bundle_price().to_minor_units().checked_mul(count))
        .ok_or(PricingError::Overflow)?;

    let total_minor = bundle_total_minor
        .checked_add(leftover_minor)
        .and_then(|sum| sum.checked_add(non_eligible_minor))
        .ok_or(PricingError::Overflow)?;

    let savings_minor = naive_minor
        .checked_sub(total_minor)
        .ok_or(PricingError::Overflow)?;

    tracing::debug!(
        eligible_unit_count,
        bundle_count,
        leftover_unit_count,
        total = total_minor,
        savings = savings_minor,
        "priced cart under bundle rule"
    );

    Ok(PricingResult {
        bundle_size: rule.bundle_size(),
        eligible_unit_count,
        bundle_count,
        leftover_unit_count,
        units_needed_for_next_bundle,
        allocations,
        bundle_total: Money::from_minor(bundle_total_minor, currency),
        leftover_price: Money::from_minor(leftover_minor, currency),
        non_eligible_subtotal: Money::from_minor(non_eligible_minor, currency),
        total_price: Money::from_minor(total_minor, currency),
        naive_subtotal: Money::from_minor(naive_minor, currency),
        savings: Money::from_minor(savings_minor, currency),
        shipping_waived: rule.free_shipping() && bundle_count > 0,
    })
}

/// Calculates the subtotal of a list of line items with no bundling applied.
///
/// # Errors
///
/// - [`PricingError::CurrencyMismatch`]: a line item is priced in another currency.
/// - [`PricingError::Overflow`]: the subtotal does not fit in minor units.
pub fn subtotal<'a>(
    items: &[LineItem<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    ensure_currency(items, currency)?;

    Ok(Money::from_minor(naive_subtotal_minor(items)?, currency))
}

/// Mark the `leftover` most expensive eligible units as individually priced,
/// bundle the rest, and return the price of the individual units.
///
/// Ties keep cart order.
fn allocate_leftovers(
    allocations: &mut [UnitAllocation<'_>],
    leftover: u64,
) -> Result<i64, PricingError> {
    let mut eligible: SmallVec<[&mut UnitAllocation<'_>; 10]> = allocations
        .iter_mut()
        .filter(|alloc| alloc.eligible)
        .collect();

    eligible.sort_by(|a, b| {
        b.unit_price
            .to_minor_units()
            .cmp(&a.unit_price.to_minor_units())
    });

    let mut remaining = leftover;
    let mut price = 0i64;

    for alloc in eligible {
        let take = alloc
            .quantity
            .min(u32::try_from(remaining).unwrap_or(u32::MAX));

        alloc.individual = take;
        alloc.bundled = alloc.quantity - take;
        remaining -= u64::from(take);

        price = units_price(alloc, take)
            .and_then(|units| price.checked_add(units))
            .ok_or(PricingError::Overflow)?;
    }

    Ok(price)
}

fn units_price(alloc: &UnitAllocation<'_>, units: u32) -> Option<i64> {
    alloc.unit_price.to_minor_units().checked_mul(i64::from(units))
}

fn naive_subtotal_minor(items: &[LineItem<'_>]) -> Result<i64, PricingError> {
    items
        .iter()
        .try_fold(0i64, |acc, item| {
            item.line_total_minor()
                .and_then(|line| acc.checked_add(line))
        })
        .ok_or(PricingError::Overflow)
}

fn ensure_currency(items: &[LineItem<'_>], currency: &Currency) -> Result<(), PricingError> {
    items.iter().enumerate().try_for_each(|(i, item)| {
        let item_currency = item.unit_price().currency();

        if item_currency == currency {
            Ok(())
        } else {
            Err(PricingError::CurrencyMismatch(
                i,
                item_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ))
        }
    })
}

/// Checks the lines that will be priced. Zero-quantity lines are absent and skipped.
fn validate_items(items: &[LineItem<'_>], currency: &Currency) -> Result<(), PricingError> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.quantity() > 0)
        .try_for_each(|(i, item)| {
            let item_currency = item.unit_price().currency();

            if item_currency != currency {
                return Err(PricingError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if item.unit_price().to_minor_units() < 0 {
                return Err(PricingError::MalformedLineItem(
                    i,
                    item.id().to_string(),
                    "unit price is negative",
                ));
            }

            Ok(())
        })
}
