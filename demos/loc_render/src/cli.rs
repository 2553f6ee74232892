//! Command-line surface of `loc-render`.

use std::str::FromStr;

use camino::Utf8PathBuf;
use clap::Parser;
use content_loc::LocValue;

/// Renders one localised message, optionally switching language afterwards.
#[derive(Debug, Parser)]
#[command(
    name = "loc-render",
    bin_name = "loc-render",
    about = "Render a localised message through the content_loc manager",
    version
)]
pub struct Cli {
    /// Optional TOML settings file layered under `CONTENT_LOC_*` variables.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config_path: Option<Utf8PathBuf>,
    /// Overrides the catalogue root (`<dir>/<tag>/*.ftl`).
    #[arg(long, value_name = "DIR")]
    pub catalog_dir: Option<Utf8PathBuf>,
    /// Overrides the initial value of `loc.server_language`.
    #[arg(long, short = 'l', value_name = "TAG")]
    pub language: Option<String>,
    /// Renders the message again after switching to this language.
    #[arg(long, value_name = "TAG")]
    pub switch_to: Option<String>,
    /// Named message argument; finite numeric values are passed as numbers.
    #[arg(long = "arg", short = 'a', value_name = "NAME=VALUE")]
    pub args: Vec<MessageArg>,
    /// Message identifier to render.
    pub id: String,
}

/// A `NAME=VALUE` pair supplied with `--arg`.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageArg {
    /// Variable name as used in the template.
    pub name: String,
    /// Parsed value.
    pub value: LocValue,
}

impl FromStr for MessageArg {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
        if name.is_empty() {
            return Err(format!("missing argument name in {raw:?}"));
        }
        let parsed = value
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map_or_else(|| LocValue::from(value), LocValue::Number);
        Ok(Self {
            name: name.to_owned(),
            value: parsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("count=3", "count", LocValue::Number(3.0))]
    #[case("word=hotel", "word", LocValue::from("hotel"))]
    #[case("note=a=b", "note", LocValue::from("a=b"))]
    #[case("word=nan", "word", LocValue::from("nan"))]
    #[case("word=inf", "word", LocValue::from("inf"))]
    #[case("word=-infinity", "word", LocValue::from("-infinity"))]
    fn parses_message_args(#[case] raw: &str, #[case] name: &str, #[case] value: LocValue) {
        let arg: MessageArg = raw.parse().expect("argument is well formed");
        assert_eq!(arg, MessageArg { name: name.to_owned(), value });
    }

    #[rstest]
    #[case("count")]
    #[case("=3")]
    fn rejects_malformed_args(#[case] raw: &str) {
        assert!(raw.parse::<MessageArg>().is_err());
    }

    #[rstest]
    fn parses_full_command_line() {
        let cli = Cli::try_parse_from([
            "loc-render",
            "--language",
            "en-US",
            "--switch-to",
            "pt-BR",
            "-a",
            "count=2",
            "cargo-summary",
        ])
        .expect("arguments are valid");
        assert_eq!(cli.id, "cargo-summary");
        assert_eq!(cli.language.as_deref(), Some("en-US"));
        assert_eq!(cli.switch_to.as_deref(), Some("pt-BR"));
        assert_eq!(cli.args.len(), 1);
    }
}
