//! CLI argument parsing with clap derive macros.

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use findby_core::Strategy;

/// Selector shorthand resolution for element lookups.
///
/// Turns compact selectors like `#submit`, `=Sign in`, `h1=Welcome` or
/// `button *= Save` into the `{using, value}` pairs WebDriver and Appium
/// endpoints expect.
#[derive(Debug, Parser)]
#[command(name = "findby", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a selector shorthand into a locator
    #[command(after_help = "\
Examples:
  findby resolve '#submit'                 # id: submit
  findby resolve '=Sign in'                # link text: Sign in
  findby resolve 'h1=Welcome'              # xpath: //h1[normalize-space() = \"Welcome\"]
  findby resolve -r 'div*=foo'             # xpath: ./div[contains(., \"foo\")]
  findby resolve 'button.primary *= Save'  # xpath built from a CSS selector
  findby resolve --explain '~login'        # show which rule matched
  findby resolve --using name q            # skip inference entirely")]
    Resolve(ResolveArgs),

    /// Encode text as an XPath 1.0 string literal
    Encode(EncodeArgs),

    /// Translate a CSS selector into an XPath location path
    #[command(name = "css-to-xpath")]
    CssToXpath(CssToXpathArgs),

    /// List the lookup strategies findby can emit
    Strategies(StrategiesArgs),

    /// Answer JSON-line requests on stdin until EOF
    #[command(after_help = "\
Each input line is a request, each output line its response:
  {\"id\":\"1\",\"command\":{\"action\":\"resolve\",\"selector\":\"#submit\"}}
  {\"id\":\"2\",\"command\":{\"action\":\"encode\",\"text\":\"it's\"}}
  {\"id\":\"3\",\"command\":{\"action\":\"css_to_xpath\",\"selector\":\"ul > li\"}}
  {\"id\":\"4\",\"command\":{\"action\":\"list_strategies\"}}")]
    Serve(ServeArgs),

    /// Show the shorthand grammar with examples
    Examples,
}

#[derive(Debug, clap::Args)]
pub struct ResolveArgs {
    /// Selector shorthand to resolve
    #[arg(allow_hyphen_values = true)]
    pub selector: String,

    /// Build XPath relative to the current element (./ instead of //)
    #[arg(short, long)]
    pub relative: bool,

    /// Build document-wide XPath (//) even when FINDBY_RELATIVE is set
    #[arg(long, conflicts_with = "relative")]
    pub absolute: bool,

    /// Use this strategy as-is instead of inferring one
    #[arg(short, long, value_name = "STRATEGY")]
    pub using: Option<Strategy>,

    /// Disable the android=, ios= and ~ shorthands
    #[arg(long)]
    pub no_platform: bool,

    /// Print the rule that matched
    #[arg(long)]
    pub explain: bool,

    /// Print the locator as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct EncodeArgs {
    /// Text to encode
    #[arg(allow_hyphen_values = true)]
    pub text: String,
}

#[derive(Debug, clap::Args)]
pub struct CssToXpathArgs {
    /// CSS selector to translate
    pub selector: String,
}

#[derive(Debug, clap::Args)]
pub struct StrategiesArgs {
    /// Mark the android=, ios= and ~ strategies as disabled
    #[arg(long)]
    pub no_platform: bool,
}

#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    /// Disable the android=, ios= and ~ shorthands
    #[arg(long)]
    pub no_platform: bool,

    /// Maximum size of one request line in bytes
    #[arg(
        long,
        value_name = "BYTES",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_request_size: Option<usize>,
}

/// Grammar reference for the `examples` command.
pub const EXAMPLES_TEXT: &str = r#"Selector shorthands, in priority order (first match wins)

#submit                  id                 submit
//div, (//a)[1], ./p     xpath              unchanged
=Sign in                 link text          Sign in
button *= Save           xpath              //button[contains(., "Save")]
form * *= Save           xpath              last descendant of form containing "Save"
 *= Save                 xpath              last element anywhere containing "Save"
*=Sign                   partial link text  Sign
android=new UiSelector() -android uiautomator
ios=.buttons()           -ios uiautomation
~login                   accessibility id   login
<div />                  tag name           div
[name="q"]               name               q
h1=Welcome               xpath              //h1[normalize-space() = "Welcome"]
div*=foo                 xpath              //div[contains(., "foo")]
.cls=Hi                  xpath              //*[contains(@class, "cls") and normalize-space() = "Hi"]
span#total*=42           xpath              //span[contains(@id, "total") and contains(., "42")]
.., .                    xpath              unchanged
anything else            css selector       unchanged

Use --relative to start generated XPath with ./ instead of //.
Use --using <STRATEGY> to skip inference.
"#;

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;
    use findby_core::Strategy;

    #[test]
    fn test_resolve_parses_flags() {
        let cli = Cli::parse_from(["findby", "resolve", "-r", "--explain", "h1=Welcome"]);

        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.selector, "h1=Welcome");
                assert!(args.relative);
                assert!(!args.absolute);
                assert!(args.explain);
                assert!(!args.json);
                assert_eq!(args.using, None);
            }
            _ => panic!("Expected resolve command"),
        }
    }

    #[test]
    fn test_resolve_parses_strategy_wire_name() {
        let cli = Cli::parse_from(["findby", "resolve", "--using", "link text", "Home"]);

        match cli.command {
            Commands::Resolve(args) => assert_eq!(args.using, Some(Strategy::LinkText)),
            _ => panic!("Expected resolve command"),
        }
    }

    #[test]
    fn test_resolve_rejects_unknown_strategy() {
        let result = Cli::try_parse_from(["findby", "resolve", "--using", "label", "Home"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_relative_and_absolute_conflict() {
        let result = Cli::try_parse_from(["findby", "resolve", "-r", "--absolute", "h1=Hi"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_accepts_leading_hyphen() {
        let cli = Cli::parse_from(["findby", "encode", "-5 \"degrees\""]);

        match cli.command {
            Commands::Encode(args) => assert_eq!(args.text, "-5 \"degrees\""),
            _ => panic!("Expected encode command"),
        }
    }

    #[test]
    fn test_serve_parses_limit() {
        let cli = Cli::parse_from(["findby", "serve", "--max-request-size", "2048"]);

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.max_request_size, Some(2048));
                assert!(!args.no_platform);
            }
            _ => panic!("Expected serve command"),
        }
    }

    #[test]
    fn test_serve_rejects_zero_limit() {
        let result = Cli::try_parse_from(["findby", "serve", "--max-request-size", "0"]);
        assert!(result.is_err());
    }
}
