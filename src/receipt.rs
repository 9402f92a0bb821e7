//! Receipt
//!
//! Renders the pricing breakdown of a quoted cart as a table followed by a
//! subtotal/total/savings summary.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::Cart, items::LineItem, quote::Quote};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// An allocation pointed at a line the cart does not have.
    #[error("Missing cart line {0}")]
    MissingLine(usize),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One rendered cart line.
#[derive(Debug, Clone)]
pub struct ReceiptLine<'a> {
    /// Display name of the line item.
    pub name: String,

    /// Category label, empty when untagged.
    pub category: String,

    /// Price of a single unit.
    pub unit_price: Money<'a, Currency>,

    /// Units on the line.
    pub quantity: u32,

    /// Units placed into bundles.
    pub bundled: u32,

    /// Eligible units priced individually.
    pub individual: u32,

    /// Units outside the bundle rule.
    pub excluded: u32,
}

/// Pricing breakdown for a quoted cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 10]>,
    bundle_count: u64,
    bundle_total: Money<'a, Currency>,
    subtotal: Money<'a, Currency>,
    total: Money<'a, Currency>,
    savings: Money<'a, Currency>,
    savings_percent_points: Decimal,
    shipping_waived: bool,
    fallback_reason: Option<String>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a cart and the quote computed for it.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError::MissingLine`] if the quote was computed for a
    /// different cart snapshot.
    pub fn from_quote(cart: &Cart<'a>, quote: &Quote<'a>) -> Result<Self, ReceiptError> {
        let currency = cart.currency();

        let (lines, bundle_count, bundle_total, savings_percent_points, fallback_reason) =
            match quote {
                Quote::Bundled(result) => {
                    let lines = result
                        .allocations
                        .iter()
                        .map(|alloc| {
                            let item = cart
                                .items()
                                .get(alloc.item_idx)
                                .ok_or(ReceiptError::MissingLine(alloc.item_idx))?;

                            Ok(ReceiptLine {
                                name: item.name().to_string(),
                                category: category_label(item),
                                unit_price: alloc.unit_price,
                                quantity: alloc.quantity,
                                bundled: alloc.bundled,
                                individual: alloc.individual,
                                excluded: alloc.excluded(),
                            })
                        })
                        .collect::<Result<SmallVec<[ReceiptLine<'a>; 10]>, ReceiptError>>()?;

                    (
                        lines,
                        result.bundle_count,
                        result.bundle_total,
                        percent_points(result.savings_percent()),
                        None,
                    )
                }
                Quote::Naive { reason, .. } => {
                    let lines = cart
                        .iter()
                        .map(|item| ReceiptLine {
                            name: item.name().to_string(),
                            category: category_label(item),
                            unit_price: *item.unit_price(),
                            quantity: item.quantity(),
                            bundled: 0,
                            individual: item.quantity(),
                            excluded: 0,
                        })
                        .collect();

                    (
                        lines,
                        0,
                        Money::from_minor(0, currency),
                        Decimal::ZERO,
                        Some(reason.clone()),
                    )
                }
            };

        Ok(Receipt {
            lines,
            bundle_count,
            bundle_total,
            subtotal: quote.naive_subtotal(),
            total: quote.total(),
            savings: quote.savings(),
            savings_percent_points,
            shipping_waived: quote.shipping_waived(),
            fallback_reason,
        })
    }

    /// Rendered lines in cart order.
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Total cost before bundling.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total amount displayed to the customer.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Savings made by bundling.
    #[must_use]
    pub fn savings(&self) -> Money<'a, Currency> {
        self.savings
    }

    /// Writes the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Item",
            "Category",
            "Unit Price",
            "Qty",
            "In Pack",
            "Individual",
            "Excluded",
        ]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.name.clone(),
                line.category.clone(),
                format!("{}", line.unit_price),
                line.quantity.to_string(),
                count_cell(line.bundled),
                count_cell(line.individual),
                count_cell(line.excluded),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..8), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut rows: SmallVec<[(&str, String); 6]> = SmallVec::new();

        rows.push((" Subtotal:", format!("{}  ", self.subtotal)));

        if self.bundle_count > 0 {
            rows.push((
                " Pack:",
                format!("x{} {}  ", self.bundle_count, self.bundle_total),
            ));
        }

        rows.push((" \x1b[1mTotal:\x1b[0m", format!("\x1b[1m{}\x1b[0m  ", self.total)));
        rows.push((
            " Savings:",
            format!("({:.2}%) {}  ", self.savings_percent_points, self.savings),
        ));
        rows.push((
            " Shipping:",
            if self.shipping_waived {
                "free  ".to_string()
            } else {
                "standard  ".to_string()
            },
        ));

        let label_width = rows
            .iter()
            .map(|(label, _)| visible_width(label))
            .max()
            .unwrap_or_default();

        let value_width = rows
            .iter()
            .map(|(_, value)| visible_width(value))
            .max()
            .unwrap_or_default();

        for (label, value) in &rows {
            write_summary_line(out, label, value, label_width, value_width)?;
        }

        if let Some(reason) = &self.fallback_reason {
            writeln!(out, " Pack pricing unavailable: {reason}").map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

fn category_label(item: &LineItem<'_>) -> String {
    item.category()
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Empty cell for zero counts so the table reads at a glance.
fn count_cell(count: u32) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::from_i64(100).unwrap_or(Decimal::ZERO)).round_dp(2)
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {}{value}",
        "",
        " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{ARS, USD};
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{
        items::Category,
        rules::{BundleRule, Eligibility},
    };

    use super::*;

    fn cart<'a>() -> Result<Cart<'a>, crate::cart::CartError> {
        Cart::with_items(
            [
                LineItem::with_category("arg", Money::from_minor(20_000, ARS), 2, Category::Jersey)
                    .named("Argentina 1986"),
                LineItem::with_category("boca", Money::from_minor(15_000, ARS), 3, Category::Jersey)
                    .named("Boca 1981"),
                LineItem::with_category(
                    "box",
                    Money::from_minor(30_000, ARS),
                    1,
                    Category::MysteryBox,
                )
                .named("Mystery Box"),
            ],
            ARS,
        )
    }

    fn rule<'a>() -> BundleRule<'a> {
        BundleRule::new(
            4,
            Money::from_minor(59_900, ARS),
            Eligibility::Except(smallvec![Category::MysteryBox]),
        )
        .with_free_shipping(true)
    }

    #[test]
    fn lines_follow_allocations() -> TestResult {
        let cart = cart()?;
        let quote = Quote::for_cart(&cart, &rule())?;

        let receipt = Receipt::from_quote(&cart, &quote)?;

        let splits: Vec<(&str, u32, u32, u32)> = receipt
            .lines()
            .iter()
            .map(|line| (line.name.as_str(), line.bundled, line.individual, line.excluded))
            .collect();

        // 5 jerseys: one pack, the leftover unit comes from the dearest line.
        assert_eq!(
            splits,
            vec![
                ("Argentina 1986", 1, 1, 0),
                ("Boca 1981", 3, 0, 0),
                ("Mystery Box", 0, 0, 1),
            ]
        );
        assert_eq!(receipt.total(), Money::from_minor(59_900 + 20_000 + 30_000, ARS));

        Ok(())
    }

    #[test]
    fn write_to_renders_names_and_summary() -> TestResult {
        let cart = cart()?;
        let quote = Quote::for_cart(&cart, &rule())?;
        let receipt = Receipt::from_quote(&cart, &quote)?;

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Argentina 1986"), "missing line name");
        assert!(rendered.contains("mystery box"), "missing category label");
        assert!(rendered.contains("Subtotal:"), "missing subtotal");
        assert!(rendered.contains("Pack:"), "missing pack line");
        assert!(rendered.contains("Total:"), "missing total");
        assert!(rendered.contains("free"), "missing shipping waiver");

        Ok(())
    }

    #[test]
    fn fallback_receipt_prices_everything_individually() -> TestResult {
        let cart = cart()?;
        let rule = BundleRule::new(4, Money::from_minor(59_900, USD), Eligibility::Any);
        let quote = Quote::for_cart(&cart, &rule)?;

        let receipt = Receipt::from_quote(&cart, &quote)?;

        assert!(receipt.lines().iter().all(|line| line.individual == line.quantity));
        assert_eq!(receipt.total(), receipt.subtotal());

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Pack pricing unavailable"), "missing fallback note");
        assert!(!rendered.contains("Pack:"), "fallback should not show a pack line");

        Ok(())
    }

    #[test]
    fn allocation_for_unknown_line_is_an_error() -> TestResult {
        let cart = cart()?;
        let quote = Quote::for_cart(&cart, &rule())?;
        let other = Cart::new(ARS);

        assert!(matches!(
            Receipt::from_quote(&other, &quote),
            Err(ReceiptError::MissingLine(0))
        ));

        Ok(())
    }

    #[test]
    fn visible_width_ignores_ansi_sequences() {
        assert_eq!(visible_width("\x1b[1mTotal:\x1b[0m"), 6);
    }

    #[test]
    fn count_cell_hides_zero() {
        assert_eq!(count_cell(0), "");
        assert_eq!(count_cell(3), "3");
    }
}
