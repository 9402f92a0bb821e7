//! Retrobox Pricing
//!
//! Bundle ("pack") pricing for the Retrobox storefront cart: a pure pricing
//! engine, the cart store it reads from, and the quote, receipt and checkout
//! layers built on top of it.

pub mod cart;
pub mod checkout;
pub mod fixtures;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod quote;
pub mod receipt;
pub mod rules;
pub mod utils;
