//! Items
//!
//! Cart line items and the category tag that decides whether a line can be
//! bundled.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Product line a cart entry belongs to.
///
/// Set when the item enters the cart, never inferred from product slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Standard retro jersey.
    Jersey,

    /// Mystery box, sold under its own pricing.
    MysteryBox,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Jersey => f.write_str("jersey"),
            Category::MysteryBox => f.write_str("mystery box"),
        }
    }
}

/// One distinct product variant in a cart, with the number of identical units.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    id: String,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    category: Option<Category>,
}

impl<'a> LineItem<'a> {
    /// Creates a new untagged line item. The display name defaults to the id.
    pub fn new(id: impl Into<String>, unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        let id = id.into();

        Self {
            name: id.clone(),
            id,
            unit_price,
            quantity,
            category: None,
        }
    }

    /// Creates a new line item tagged with a category.
    pub fn with_category(
        id: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
        category: Category,
    ) -> Self {
        Self::new(id, unit_price, quantity).categorised(Some(category))
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets (or clears) the category tag.
    #[must_use]
    pub fn categorised(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    /// Variant identifier, unique within a cart.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of a single unit.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Number of identical units.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Category tag, if any.
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Price of every unit on this line in minor units, `None` on overflow.
    pub fn line_total_minor(&self) -> Option<i64> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::ARS;

    use super::*;

    #[test]
    fn new_defaults_name_to_id_and_leaves_category_empty() {
        let item = LineItem::new("variant-1", Money::from_minor(15_000, ARS), 2);

        assert_eq!(item.id(), "variant-1");
        assert_eq!(item.name(), "variant-1");
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.category(), None);
    }

    #[test]
    fn builder_methods_set_name_and_category() {
        let item = LineItem::with_category(
            "variant-2",
            Money::from_minor(30_000, ARS),
            1,
            Category::MysteryBox,
        )
        .named("Mystery Box Clásica");

        assert_eq!(item.name(), "Mystery Box Clásica");
        assert_eq!(item.category(), Some(Category::MysteryBox));
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let item = LineItem::new("variant-3", Money::from_minor(15_000, ARS), 4);

        assert_eq!(item.line_total_minor(), Some(60_000));
    }

    #[test]
    fn line_total_reports_overflow() {
        let item = LineItem::new("variant-4", Money::from_minor(i64::MAX, ARS), 2);

        assert_eq!(item.line_total_minor(), None);
    }

    #[test]
    fn category_display_is_human_readable() {
        assert_eq!(Category::Jersey.to_string(), "jersey");
        assert_eq!(Category::MysteryBox.to_string(), "mystery box");
    }
}
