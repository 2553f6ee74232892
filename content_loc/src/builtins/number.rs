//! Culture-specific numeric conventions and the numeric built-ins.

use unic_langid::LanguageIdentifier;

use crate::error::LocError;
use crate::registry::FunctionEnv;
use crate::value::{LocArgs, LocValue};

use super::{NATURALFIXED, NATURALPERCENT, TOSTRING};

/// Upper bound on requested decimal digits.
const MAX_PRECISION: usize = 20;

/// Fractional digits needed to write any `f64` exactly.
const EXACT_DIGITS: usize = 1074;

/// Decimal and digit-grouping separators for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberConventions {
    /// Separator between integer and fractional digits.
    pub decimal_separator: char,
    /// Separator inserted between groups of three integer digits.
    pub group_separator: char,
}

impl NumberConventions {
    /// `1,234.5`
    pub const ENGLISH: Self = Self {
        decimal_separator: '.',
        group_separator: ',',
    };

    /// `1.234,5`
    pub const CONTINENTAL: Self = Self {
        decimal_separator: ',',
        group_separator: '.',
    };

    /// `1 234,5` with a no-break space.
    pub const FRENCH: Self = Self {
        decimal_separator: ',',
        group_separator: '\u{a0}',
    };

    /// Conventions for `culture`'s language; unknown languages use English.
    #[must_use]
    pub fn for_culture(culture: &LanguageIdentifier) -> Self {
        match culture.language.as_str() {
            "pt" | "de" | "es" | "it" | "nl" | "ru" | "tr" | "id" => Self::CONTINENTAL,
            "fr" => Self::FRENCH,
            _ => Self::ENGLISH,
        }
    }

    /// Formats `value` with `decimals` fractional digits and grouped integer
    /// digits.
    #[must_use]
    pub fn format_grouped(self, value: f64, decimals: usize) -> String {
        self.format_decimal(value, decimals, true)
    }

    /// Formats `value` with `decimals` fractional digits and no grouping.
    #[must_use]
    pub fn format_fixed(self, value: f64, decimals: usize) -> String {
        self.format_decimal(value, decimals, false)
    }

    /// Shortest round-trip representation using this culture's decimal
    /// separator.
    #[must_use]
    pub fn format_generic(self, value: f64) -> String {
        let text = value.to_string();
        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', &self.decimal_separator.to_string())
        }
    }

    fn format_decimal(self, value: f64, decimals: usize, grouped: bool) -> String {
        if !value.is_finite() {
            return self.format_generic(value);
        }
        let (integer, fraction) =
            round_half_away_from_zero(value.abs(), decimals.min(MAX_PRECISION));
        let negative = value.is_sign_negative()
            && integer
                .bytes()
                .chain(fraction.bytes())
                .any(|digit| matches!(digit, b'1'..=b'9'));

        let mut out = String::with_capacity((integer.len() + fraction.len()) * 2);
        if negative {
            out.push('-');
        }
        if grouped {
            out.push_str(&group_digits(&integer, self.group_separator));
        } else {
            out.push_str(&integer);
        }
        if !fraction.is_empty() {
            out.push(self.decimal_separator);
            out.push_str(&fraction);
        }
        out
    }
}

/// Rounds a finite, non-negative `magnitude` to `decimals` fractional digits,
/// with midpoints going away from zero. Returns the integer and fractional
/// digit strings.
///
/// `magnitude` is first written out in full, so a digit of 5 or more after
/// the cut means the value is at or past the midpoint.
fn round_half_away_from_zero(magnitude: f64, decimals: usize) -> (String, String) {
    let exact = format!("{:.*}", EXACT_DIGITS, magnitude);
    let (integer, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let round_up = fraction.as_bytes().get(decimals).is_some_and(|digit| *digit >= b'5');

    let mut digits: Vec<u8> = integer
        .bytes()
        .chain(fraction.bytes().take(decimals))
        .collect();
    let mut carry = round_up;
    for digit in digits.iter_mut().rev() {
        if !carry {
            break;
        }
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
        }
    }
    if carry {
        digits.insert(0, b'1');
    }

    let (kept_integer, kept_fraction) = digits.split_at(digits.len().saturating_sub(decimals));
    let to_text = |part: &[u8]| part.iter().copied().map(char::from).collect::<String>();
    (to_text(kept_integer), to_text(kept_fraction))
}

fn group_digits(digits: &str, separator: char) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let groups: Vec<String> = chars
        .rchunks(3)
        .rev()
        .map(|group| group.iter().collect())
        .collect();
    groups.join(&separator.to_string())
}

/// Drops trailing zeros from the fractional part, then a bare separator.
fn trim_fraction(text: &str, decimal_separator: char) -> String {
    match text.rsplit_once(decimal_separator) {
        Some((integer, fraction)) => {
            let kept = fraction.trim_end_matches('0');
            if kept.is_empty() {
                integer.to_owned()
            } else {
                format!("{integer}{decimal_separator}{kept}")
            }
        }
        None => text.to_owned(),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "the value is floored, clamped to 0..=MAX_PRECISION, and non-negative"
)]
fn decimal_digits(max_decimals: f64) -> usize {
    let floored = max_decimals.floor();
    if floored.is_nan() || floored <= 0.0 {
        0
    } else {
        floored.min(MAX_PRECISION as f64) as usize
    }
}

/// Formats `value` with at most `max_decimals` fractional digits, trimming
/// trailing zeros: `12.50` → `12.5`, `12.00` → `12`.
#[must_use]
pub fn natural_fixed(value: f64, max_decimals: f64, conventions: NumberConventions) -> String {
    let formatted = conventions.format_grouped(value, decimal_digits(max_decimals));
    trim_fraction(&formatted, conventions.decimal_separator)
}

/// As [`natural_fixed`] after scaling by 100, with a trailing `%`.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "percent scaling")]
pub fn natural_percent(value: f64, max_decimals: f64, conventions: NumberConventions) -> String {
    format!("{}%", natural_fixed(value * 100.0, max_decimals, conventions))
}

/// Applies a format specifier (`N2`, `F1`, `P0`, `D3`, `G`, or empty) to
/// `value`. Returns `None` for specifiers the formatter does not recognise.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "percent scaling")]
pub fn format_with_specifier(
    value: f64,
    specifier: &str,
    conventions: NumberConventions,
) -> Option<String> {
    let mut chars = specifier.chars();
    let Some(kind) = chars.next() else {
        return Some(conventions.format_generic(value));
    };
    let precision = chars.as_str();
    let digits = if precision.is_empty() {
        None
    } else {
        Some(precision.parse::<usize>().ok()?.min(MAX_PRECISION))
    };

    match kind.to_ascii_uppercase() {
        'N' => Some(conventions.format_grouped(value, digits.unwrap_or(2))),
        'F' => Some(conventions.format_fixed(value, digits.unwrap_or(2))),
        'P' => Some(format!(
            "{}%",
            conventions.format_grouped(value * 100.0, digits.unwrap_or(2))
        )),
        'D' => format_integer_padded(value, digits.unwrap_or(0)),
        'G' if digits.is_none() => Some(conventions.format_generic(value)),
        _ => None,
    }
}

fn format_integer_padded(value: f64, width: usize) -> Option<String> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    let magnitude = format!("{:.0}", value.abs());
    let sign = if value < 0.0 { "-" } else { "" };
    Some(format!("{sign}{magnitude:0>width$}"))
}

/// `NATURALFIXED(number, maxDecimals)`.
pub(super) fn natural_fixed_fn(args: &LocArgs, env: &dyn FunctionEnv) -> Result<LocValue, LocError> {
    let [number, max_decimals] = args.positional::<2>(NATURALFIXED)?;
    let conventions = NumberConventions::for_culture(env.configured_culture());
    Ok(LocValue::String(natural_fixed(
        number.as_number()?,
        max_decimals.as_number()?,
        conventions,
    )))
}

/// `NATURALPERCENT(number, maxDecimals)`.
pub(super) fn natural_percent_fn(
    args: &LocArgs,
    env: &dyn FunctionEnv,
) -> Result<LocValue, LocError> {
    let [number, max_decimals] = args.positional::<2>(NATURALPERCENT)?;
    let conventions = NumberConventions::for_culture(env.configured_culture());
    Ok(LocValue::String(natural_percent(
        number.as_number()?,
        max_decimals.as_number()?,
        conventions,
    )))
}

/// `TOSTRING(value, format)` under `culture`'s conventions. Text values,
/// non-text formats, and unsupported specifiers degrade to the generic
/// representation.
pub(super) fn to_string_fn(
    args: &LocArgs,
    culture: &LanguageIdentifier,
) -> Result<LocValue, LocError> {
    let [value, format] = args.positional::<2>(TOSTRING)?;
    let specifier = format.as_str().unwrap_or_default();
    let text = match value {
        LocValue::Number(number) => {
            format_with_specifier(*number, specifier, NumberConventions::for_culture(culture))
                .unwrap_or_else(|| value.to_string())
        }
        LocValue::String(text) => text.clone(),
    };
    Ok(LocValue::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{NamedArgs, ValueKind};
    use rstest::rstest;
    use unic_langid::langid;

    const EN: NumberConventions = NumberConventions::ENGLISH;
    const PT: NumberConventions = NumberConventions::CONTINENTAL;

    #[rstest]
    #[case(12.50, 2.0, "12.5")]
    #[case(12.00, 2.0, "12")]
    #[case(12.346, 2.0, "12.35")]
    #[case(12.346, 2.9, "12.35")]
    #[case(100.0, 0.0, "100")]
    #[case(1234.5, 1.0, "1,234.5")]
    #[case(1_234_567.0, 2.0, "1,234,567")]
    #[case(-0.001, 2.0, "0")]
    #[case(-5.26, 1.0, "-5.3")]
    #[case(3.0, -1.0, "3")]
    #[case(2.5, 0.0, "3")]
    #[case(-2.5, 0.0, "-3")]
    #[case(0.125, 2.0, "0.13")]
    #[case(99.5, 0.0, "100")]
    #[case(9.995, 2.0, "9.99")]
    fn natural_fixed_trims_fraction(
        #[case] value: f64,
        #[case] max_decimals: f64,
        #[case] expected: &str,
    ) {
        assert_eq!(natural_fixed(value, max_decimals, EN), expected);
    }

    #[rstest]
    #[case(1234.5, 2.0, "1.234,5")]
    #[case(0.75, 2.0, "0,75")]
    #[case(1000.0, 2.0, "1.000")]
    fn natural_fixed_uses_culture_separators(
        #[case] value: f64,
        #[case] max_decimals: f64,
        #[case] expected: &str,
    ) {
        assert_eq!(natural_fixed(value, max_decimals, PT), expected);
    }

    #[rstest]
    #[case(0.125, 1.0, EN, "12.5%")]
    #[case(0.5, 2.0, EN, "50%")]
    #[case(0.125, 1.0, PT, "12,5%")]
    #[case(0.125, 0.0, EN, "13%")]
    fn natural_percent_scales_and_suffixes(
        #[case] value: f64,
        #[case] max_decimals: f64,
        #[case] conventions: NumberConventions,
        #[case] expected: &str,
    ) {
        assert_eq!(natural_percent(value, max_decimals, conventions), expected);
    }

    #[rstest]
    #[case(1234.5, "N2", EN, Some("1,234.50"))]
    #[case(1234.5, "N", PT, Some("1.234,50"))]
    #[case(1234.5, "F1", PT, Some("1234,5"))]
    #[case(0.256, "P1", EN, Some("25.6%"))]
    #[case(42.0, "D4", EN, Some("0042"))]
    #[case(-42.0, "D4", EN, Some("-0042"))]
    #[case(42.5, "D", EN, None)]
    #[case(2.5, "G", PT, Some("2,5"))]
    #[case(2.5, "", EN, Some("2.5"))]
    #[case(2.5, "yyyy", EN, None)]
    #[case(2.5, "Nx", EN, None)]
    fn specifiers_follow_culture(
        #[case] value: f64,
        #[case] specifier: &str,
        #[case] conventions: NumberConventions,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(
            format_with_specifier(value, specifier, conventions).as_deref(),
            expected
        );
    }

    #[rstest]
    #[case(langid!("en-US"), EN)]
    #[case(langid!("pt-BR"), PT)]
    #[case(langid!("de"), PT)]
    #[case(langid!("fr-FR"), NumberConventions::FRENCH)]
    #[case(langid!("ja"), EN)]
    fn conventions_follow_language(
        #[case] culture: LanguageIdentifier,
        #[case] expected: NumberConventions,
    ) {
        assert_eq!(NumberConventions::for_culture(&culture), expected);
    }

    type Builtin = fn(&LocArgs, &dyn FunctionEnv) -> Result<LocValue, LocError>;

    struct ConfiguredEnv(LanguageIdentifier);

    impl FunctionEnv for ConfiguredEnv {
        fn resolve_message(&self, id: &str, _options: &NamedArgs) -> Result<String, LocError> {
            Err(LocError::MessageNotFound { id: id.to_owned() })
        }

        fn configured_culture(&self) -> &LanguageIdentifier {
            &self.0
        }
    }

    #[rstest]
    #[case(natural_fixed_fn as Builtin, NATURALFIXED, vec![LocValue::from(1.5)])]
    #[case(natural_percent_fn as Builtin, NATURALPERCENT, vec![LocValue::from(0.5)])]
    #[case(
        natural_fixed_fn as Builtin,
        NATURALFIXED,
        vec![LocValue::from(1.5), LocValue::from(2.0), LocValue::from(3.0)]
    )]
    fn numeric_builtins_reject_wrong_arity(
        #[case] builtin: Builtin,
        #[case] name: &str,
        #[case] positional: Vec<LocValue>,
    ) {
        let found_count = positional.len();
        let err = builtin(&LocArgs::new(positional), &ConfiguredEnv(langid!("en-US")))
            .expect_err("arity is checked");
        assert!(matches!(
            err,
            LocError::ArityMismatch { ref function, found, .. }
                if function == name && found == found_count
        ));
    }

    #[rstest]
    #[case(natural_fixed_fn as Builtin, LocValue::from("12.5"), LocValue::from(2.0))]
    #[case(natural_percent_fn as Builtin, LocValue::from("0.5"), LocValue::from(1.0))]
    #[case(natural_fixed_fn as Builtin, LocValue::from(12.5), LocValue::from("2"))]
    fn numeric_builtins_reject_text(
        #[case] builtin: Builtin,
        #[case] number: LocValue,
        #[case] max_decimals: LocValue,
    ) {
        let args = LocArgs::new(vec![number, max_decimals]);
        let err = builtin(&args, &ConfiguredEnv(langid!("en-US")))
            .expect_err("text is not a number");
        assert!(matches!(
            err,
            LocError::TypeMismatch {
                expected: ValueKind::Number,
                found: ValueKind::String,
            }
        ));
    }

    #[rstest]
    #[case(natural_fixed_fn as Builtin, "1.234,5")]
    #[case(natural_percent_fn as Builtin, "123.450%")]
    fn numeric_builtins_read_the_configured_culture(
        #[case] builtin: Builtin,
        #[case] expected: &str,
    ) {
        let args = LocArgs::new(vec![LocValue::from(1234.5), LocValue::from(2.0)]);
        let value = builtin(&args, &ConfiguredEnv(langid!("pt-BR"))).expect("numbers format");
        assert_eq!(value, LocValue::from(expected));
    }

    #[rstest]
    #[case(vec![LocValue::from(1234.5), LocValue::from(7.0)], "1234,5")]
    #[case(vec![LocValue::from("crate"), LocValue::from(2.0)], "crate")]
    fn to_string_degrades_for_non_text_formats(
        #[case] positional: Vec<LocValue>,
        #[case] expected: &str,
    ) {
        let value = to_string_fn(&LocArgs::new(positional), &langid!("pt-BR"))
            .expect("TOSTRING never rejects a format");
        assert_eq!(value, LocValue::from(expected));
    }

    #[rstest]
    fn to_string_checks_arity() {
        let err = to_string_fn(&LocArgs::new(vec![LocValue::from(1.0)]), &langid!("en-US"))
            .expect_err("TOSTRING takes two arguments");
        assert!(matches!(
            err,
            LocError::ArityMismatch { ref function, found: 1, .. } if function == TOSTRING
        ));
    }

    #[rstest]
    fn to_string_degrades_for_text_and_unknown_specifiers() {
        let culture = langid!("pt-BR");
        let text = LocArgs::new(vec![LocValue::from("crowbar"), LocValue::from("N2")]);
        assert_eq!(
            to_string_fn(&text, &culture).expect("text is never rejected"),
            LocValue::from("crowbar")
        );

        let unknown = LocArgs::new(vec![LocValue::from(2.5), LocValue::from("yyyy")]);
        assert_eq!(
            to_string_fn(&unknown, &culture).expect("unknown specifiers degrade"),
            LocValue::from("2.5")
        );

        let grouped = LocArgs::new(vec![LocValue::from(1234.5), LocValue::from("N1")]);
        assert_eq!(
            to_string_fn(&grouped, &culture).expect("N1 is supported"),
            LocValue::from("1.234,5")
        );
    }
}
