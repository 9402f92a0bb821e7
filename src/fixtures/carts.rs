//! Cart Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, prices::parse_price},
    items::{Category, LineItem},
};

/// Wrapper for cart line items in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Line items in cart order
    pub items: Vec<LineItemFixture>,
}

/// Line item fixture from YAML
#[derive(Debug, Deserialize)]
pub struct LineItemFixture {
    /// Variant id
    pub id: String,

    /// Display name, defaults to the id
    #[serde(default)]
    pub name: Option<String>,

    /// Unit price (e.g., "15000.00 ARS")
    pub price: String,

    /// Units, defaults to 1
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Category tag
    #[serde(default)]
    pub category: Option<Category>,
}

fn default_quantity() -> u32 {
    1
}

impl TryFrom<LineItemFixture> for LineItem<'static> {
    type Error = FixtureError;

    fn try_from(fixture: LineItemFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        let item = LineItem::new(
            fixture.id,
            Money::from_minor(minor_units, currency),
            fixture.quantity,
        )
        .categorised(fixture.category);

        Ok(match fixture.name {
            Some(name) => item.named(name),
            None => item,
        })
    }
}
