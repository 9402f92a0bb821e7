//! Rule Fixtures

use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    fixtures::{FixtureError, prices::parse_price},
    items::Category,
    rules::{BundleRule, Eligibility},
};

/// Wrapper for rules in YAML
#[derive(Debug, Deserialize)]
pub struct RulesFixture {
    /// Map of rule key -> rule fixture
    pub rules: FxHashMap<String, RuleFixture>,
}

/// Rule fixture from YAML
#[derive(Debug, Deserialize)]
pub struct RuleFixture {
    /// Rule name
    pub name: String,

    /// Units per bundle
    pub bundle_size: u32,

    /// Bundle price (e.g., "59900.00 ARS")
    pub bundle_price: String,

    /// Eligibility filter; every line is eligible when omitted
    #[serde(default)]
    pub eligibility: EligibilityFixture,

    /// Whether completing a bundle waives shipping
    #[serde(default)]
    pub free_shipping: bool,
}

/// Eligibility filter from YAML. At most one of the lists may be set.
#[derive(Debug, Default, Deserialize)]
pub struct EligibilityFixture {
    /// Only these categories are eligible
    #[serde(default)]
    pub only: Vec<Category>,

    /// These categories are excluded
    #[serde(default)]
    pub exclude: Vec<Category>,
}

impl RuleFixture {
    /// Convert to a validated `BundleRule`
    ///
    /// # Errors
    ///
    /// Returns an error if the price or eligibility is invalid, or if the rule
    /// fails validation.
    pub fn try_into_rule(self, key: &str) -> Result<BundleRule<'static>, FixtureError> {
        let (minor_units, currency) = parse_price(&self.bundle_price)?;

        let eligibility = match (self.eligibility.only, self.eligibility.exclude) {
            (only, exclude) if only.is_empty() && exclude.is_empty() => Eligibility::Any,
            (only, exclude) if exclude.is_empty() => Eligibility::Only(SmallVec::from_vec(only)),
            (only, exclude) if only.is_empty() => Eligibility::Except(SmallVec::from_vec(exclude)),
            _ => {
                return Err(FixtureError::InvalidRule(
                    key.to_string(),
                    format!("{}: set either `only` or `exclude`, not both", self.name),
                ));
            }
        };

        let rule = BundleRule::new(
            self.bundle_size,
            Money::from_minor(minor_units, currency),
            eligibility,
        )
        .with_free_shipping(self.free_shipping);

        rule.validate()?;

        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::ARS;
    use testresult::TestResult;

    use super::*;

    fn fixture(only: Vec<Category>, exclude: Vec<Category>) -> RuleFixture {
        RuleFixture {
            name: "Pack".to_string(),
            bundle_size: 4,
            bundle_price: "599.00 ARS".to_string(),
            eligibility: EligibilityFixture { only, exclude },
            free_shipping: false,
        }
    }

    #[test]
    fn only_list_becomes_only_eligibility() -> TestResult {
        let rule = fixture(vec![Category::Jersey], vec![]).try_into_rule("pack")?;

        assert_eq!(rule.bundle_price(), &Money::from_minor(59_900, ARS));
        assert!(!rule.eligibility().matches(None));

        Ok(())
    }

    #[test]
    fn both_lists_are_rejected() {
        let result =
            fixture(vec![Category::Jersey], vec![Category::MysteryBox]).try_into_rule("pack");

        assert!(matches!(
            result,
            Err(FixtureError::InvalidRule(key, _)) if key == "pack"
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut rule = fixture(vec![], vec![]);
        rule.bundle_price = "-1 ARS".to_string();

        assert!(matches!(rule.try_into_rule("pack"), Err(FixtureError::Rule(_))));
    }
}
