//! Utils

use clap::Parser;

/// Arguments for the quote demo
#[derive(Debug, Parser)]
pub struct QuoteArgs {
    /// Fixture set to load the rules and cart from
    #[clap(short, long, default_value = "pack-black")]
    pub fixture: String,

    /// Key of the rule to apply
    #[clap(short, long, default_value = "pack_black")]
    pub rule: String,

    /// Base directory of the fixture files
    #[clap(short, long, default_value = "./fixtures")]
    pub base_path: String,

    /// Print the checkout draft as JSON after the receipt
    #[clap(short, long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_to_pack_black() -> Result<(), clap::Error> {
        let args = QuoteArgs::try_parse_from(["quote"])?;

        assert_eq!(args.fixture, "pack-black");
        assert_eq!(args.rule, "pack_black");
        assert_eq!(args.base_path, "./fixtures");
        assert!(!args.json);

        Ok(())
    }

    #[test]
    fn short_flags_override_defaults() -> Result<(), clap::Error> {
        let args = QuoteArgs::try_parse_from(["quote", "-f", "mixed", "-r", "trio", "-j"])?;

        assert_eq!(args.fixture, "mixed");
        assert_eq!(args.rule, "trio");
        assert!(args.json);

        Ok(())
    }
}
