//! Cart

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    items::LineItem,
    pricing::{PricingError, subtotal},
};

/// Errors related to cart construction or updates.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// An item's currency differs from the cart currency (item id, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// No line item with this id is in the cart.
    #[error("Item {0} not found")]
    ItemNotFound(String),

    /// A line item was added with no units.
    #[error("Item {0} was added with a quantity of zero")]
    ZeroQuantity(String),

    /// Merging quantities for this line item overflowed.
    #[error("Quantity overflow for item {0}")]
    QuantityOverflow(String),

    /// Errors bubbled up from subtotal calculation.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Client-side cart: line items keyed by variant id, in the order they were
/// first added.
///
/// Every stored line has a quantity of at least one.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given items, merging repeated ids.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if any item is rejected by [`Cart::add`].
    pub fn with_items(
        items: impl IntoIterator<Item = LineItem<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let mut cart = Cart::new(currency);

        for item in items {
            cart.add(item)?;
        }

        Ok(cart)
    }

    /// Add a line item. If the id is already in the cart the quantities are
    /// summed and the existing price, name and category are kept.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`]: the item has no units.
    /// - [`CartError::CurrencyMismatch`]: the item is priced in another currency.
    /// - [`CartError::QuantityOverflow`]: the merged quantity does not fit.
    pub fn add(&mut self, item: LineItem<'a>) -> Result<(), CartError> {
        if item.quantity() == 0 {
            return Err(CartError::ZeroQuantity(item.id().to_string()));
        }

        let item_currency = item.unit_price().currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                item.id().to_string(),
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => {
                let quantity = existing
                    .quantity()
                    .checked_add(item.quantity())
                    .ok_or_else(|| CartError::QuantityOverflow(item.id().to_string()))?;

                existing.set_quantity(quantity);
            }
            None => self.items.push(item),
        }

        Ok(())
    }

    /// Set the quantity of a line item. A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the id is not in the cart.
    pub fn set_quantity(&mut self, id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(id).map(|_removed| ());
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;

        item.set_quantity(quantity);

        Ok(())
    }

    /// Remove a line item, returning it.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the id is not in the cart.
    pub fn remove(&mut self, id: &str) -> Result<LineItem<'a>, CartError> {
        let pos = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;

        Ok(self.items.remove(pos))
    }

    /// Get a line item by id.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the id is not in the cart.
    pub fn get(&self, id: &str) -> Result<&LineItem<'a>, CartError> {
        self.items
            .iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| CartError::ItemNotFound(id.to_string()))
    }

    /// Snapshot of the line items, for pricing.
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// Iterate over the line items in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.items.iter()
    }

    /// Calculate the subtotal of the cart with no bundling applied.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::Pricing` if the subtotal overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        Ok(subtotal(&self.items, self.currency)?)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Get the number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
