//! Cart Quote Example
//!
//! Prices a fixture cart under a fixture bundle rule and prints the receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-r` to pick the rule to apply
//! Use `-j` to also print the checkout draft as JSON
//!
//! Set `RUST_LOG=retrobox_pricing=debug` to see the engine's pricing events.

use std::{io, io::Write, time::Instant};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing_subscriber::EnvFilter;

use retrobox_pricing::{
    checkout::CheckoutDraft, fixtures::Fixture, quote::Quote, receipt::Receipt, utils::QuoteArgs,
};

/// Cart Quote Example
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(true)
        .compact()
        .init();

    let args = QuoteArgs::parse();

    let mut fixture = Fixture::with_base_path(&args.base_path);
    fixture.load_rules(&args.fixture)?.load_cart(&args.fixture)?;

    let cart = fixture.cart()?;
    let rule = fixture.rule(&args.rule)?;

    let start = Instant::now();
    let quote = Quote::for_cart(&cart, rule)?;
    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::from_quote(&cart, &quote)?.write_to(&mut handle)?;

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    if args.json {
        writeln!(handle, "\n{}", CheckoutDraft::from_quote(&cart, &quote)?.to_json()?)?;
    }

    Ok(())
}
