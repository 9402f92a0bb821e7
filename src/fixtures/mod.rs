//! Fixtures
//!
//! Bundle rules and carts loaded from YAML files under a base directory:
//!
//! - `rules/<name>.yml`: named bundle rules
//! - `carts/<name>.yml`: cart line items

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    fixtures::{carts::CartFixture, rules::RulesFixture},
    items::LineItem,
    rules::{BundleRule, RuleError},
};

pub mod carts;
pub mod prices;
pub mod rules;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between fixture entries
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Rule not found
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    /// Invalid rule data
    #[error("Invalid rule {0}: {1}")]
    InvalidRule(String, String),

    /// Rule failed validation
    #[error("Rule rejected: {0}")]
    Rule(#[from] RuleError),

    /// No prices loaded yet
    #[error("No prices loaded yet; currency unknown")]
    NoCurrency,

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Rules by fixture key
    rules: FxHashMap<String, BundleRule<'static>>,

    /// Cart line items in file order
    items: Vec<LineItem<'static>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            rules: FxHashMap::default(),
            items: Vec::new(),
            currency: None,
        }
    }

    /// Load bundle rules from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a rule is
    /// invalid, or if its currency differs from what is already loaded.
    pub fn load_rules(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("rules").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: RulesFixture = serde_norway::from_str(&contents)?;

        for (key, rule_fixture) in fixture.rules {
            let rule = rule_fixture.try_into_rule(&key)?;

            self.track_currency(rule.currency())?;
            self.rules.insert(key, rule);
        }

        Ok(self)
    }

    /// Load cart line items from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// currency differs from what is already loaded.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for item_fixture in fixture.items {
            let item: LineItem<'static> = item_fixture.try_into()?;

            self.track_currency(item.unit_price().currency())?;
            self.items.push(item);
        }

        Ok(self)
    }

    /// Load a complete fixture set (rules and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_rules(name)?.load_cart(name)?;

        Ok(fixture)
    }

    /// Get a rule by its fixture key
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is not found.
    pub fn rule(&self, key: &str) -> Result<&BundleRule<'static>, FixtureError> {
        self.rules
            .get(key)
            .ok_or_else(|| FixtureError::RuleNotFound(key.to_string()))
    }

    /// Fixture keys of all loaded rules, sorted
    pub fn rule_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Get all loaded line items
    pub fn items(&self) -> &[LineItem<'static>] {
        &self.items
    }

    /// Create a cart from the loaded line items
    ///
    /// # Errors
    ///
    /// Returns an error if no prices are loaded or if cart creation fails.
    pub fn cart(&self) -> Result<Cart<'static>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        Ok(Cart::with_items(self.items.iter().cloned(), currency)?)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if nothing priced has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    fn track_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);
                Ok(())
            }
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
