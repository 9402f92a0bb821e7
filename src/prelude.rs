//! Retrobox Pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    checkout::{CheckoutDraft, CheckoutError, CheckoutLine},
    fixtures::{Fixture, FixtureError},
    items::{Category, LineItem},
    pricing::{PricingError, PricingResult, UnitAllocation, compute_pricing},
    quote::Quote,
    receipt::{Receipt, ReceiptError},
    rules::{BundleRule, Eligibility, RuleError},
};
