//! Pluralisation rules behind `MAKEPLURAL` and `MANY`.

use crate::error::LocError;
use crate::value::{LocArgs, LocValue};

use super::{MAKEPLURAL, MANY};

/// Counts within this distance of one are treated as singular.
pub const SINGULAR_EPSILON: f64 = 1e-4;

const ES_SUFFIXES: [&str; 5] = ["s", "sh", "ch", "x", "z"];

/// Pluraliser variant baked into a culture's `MAKEPLURAL` and `MANY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// English suffix rule used by the fallback culture.
    Default,
    /// Portuguese rule cascade used by every other culture.
    Custom,
}

impl PluralRule {
    /// Pluralises the leading word of `text`, leaving anything after the
    /// first whitespace character untouched.
    #[must_use]
    pub fn pluralize(self, text: &str) -> String {
        let (word, rest) = text
            .find(char::is_whitespace)
            .map_or((text, ""), |index| text.split_at(index));
        let plural = match self {
            Self::Default => pluralize_default(word),
            Self::Custom => pluralize_custom(word),
        };
        format!("{plural}{rest}")
    }
}

fn takes_es(word: &str) -> bool {
    ES_SUFFIXES.iter().any(|suffix| word.ends_with(suffix))
}

fn pluralize_default(word: &str) -> String {
    if takes_es(word) {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

/// First matching rule wins: `ão` → `oẽs`, `[aeo]l` → `is`, `m` → `ns`,
/// sibilants → `es`, otherwise `s`.
fn pluralize_custom(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ão") {
        return format!("{stem}oẽs");
    }
    if ["al", "el", "ol"].iter().any(|suffix| word.ends_with(suffix)) {
        if let Some(stem) = word.strip_suffix('l') {
            return format!("{stem}is");
        }
    }
    if let Some(stem) = word.strip_suffix('m') {
        return format!("{stem}ns");
    }
    pluralize_default(word)
}

/// `MAKEPLURAL(word)`.
pub(super) fn make_plural(args: &LocArgs, rule: PluralRule) -> Result<LocValue, LocError> {
    let [word] = args.positional::<1>(MAKEPLURAL)?;
    Ok(LocValue::String(rule.pluralize(word.as_str()?)))
}

/// `MANY(word, count)`: the word itself for a count of one, its plural
/// otherwise.
pub(super) fn many(args: &LocArgs, rule: PluralRule) -> Result<LocValue, LocError> {
    let [word_value, count_value] = args.positional::<2>(MANY)?;
    let word = word_value.as_str()?;
    let count = count_value.as_number()?;
    if is_singular(count) {
        Ok(LocValue::String(word.to_owned()))
    } else {
        Ok(LocValue::String(rule.pluralize(word)))
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "counts arrive as floats and are compared with a tolerance"
)]
pub(crate) fn is_singular(count: f64) -> bool {
    (count - 1.0).abs() < SINGULAR_EPSILON
}
