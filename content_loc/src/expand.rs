//! Template expansion.
//!
//! A [`Resolver`] borrows the culture store and catalogue for the duration of
//! one lookup. Templates are searched in the active culture and then in the
//! fallback culture; a template is expanded in the culture that supplied it,
//! so its function calls dispatch through that culture's registry first.

use std::borrow::Cow;
use std::cell::Cell;

use fluent_syntax::ast::{
    CallArguments, Expression, InlineExpression, PatternElement, Variant, VariantKey,
};
use fluent_syntax::unicode::unescape_unicode_to_string;
use intl_pluralrules::{PluralCategory, PluralRuleType, PluralRules};
use unic_langid::{LanguageIdentifier, langid};

use crate::catalog::{LookupCatalog, Template};
use crate::culture::CultureStore;
use crate::error::LocError;
use crate::registry::FunctionEnv;
use crate::value::{LocArgs, LocValue, NamedArgs, ValueKind};

/// Deepest chain of message references, terms, and `LOC` calls followed
/// before giving up.
pub(crate) const MAX_DEPTH: usize = 32;

/// Most message, term, and `LOC` expansions one lookup may perform.
pub(crate) const MAX_EXPANSIONS: usize = 4096;

pub(crate) struct Resolver<'a> {
    store: &'a CultureStore,
    catalog: &'a dyn LookupCatalog,
    configured: &'a LanguageIdentifier,
    expansions: Cell<usize>,
}

/// What is being expanded, where, and how deep.
struct Frame<'f> {
    id: &'f str,
    culture: &'f LanguageIdentifier,
    args: &'f NamedArgs,
    depth: usize,
}

/// [`FunctionEnv`] handed to functions called from a template.
struct CallEnv<'r, 'a> {
    resolver: &'r Resolver<'a>,
    depth: usize,
}

impl FunctionEnv for CallEnv<'_, '_> {
    fn resolve_message(&self, id: &str, options: &NamedArgs) -> Result<String, LocError> {
        self.resolver.resolve_at(id, options, self.depth)
    }

    fn configured_culture(&self) -> &LanguageIdentifier {
        self.resolver.configured
    }
}

impl<'a> Resolver<'a> {
    pub(crate) const fn new(
        store: &'a CultureStore,
        catalog: &'a dyn LookupCatalog,
        configured: &'a LanguageIdentifier,
    ) -> Self {
        Self {
            store,
            catalog,
            configured,
            expansions: Cell::new(0),
        }
    }

    /// Resolves `id` with `args` bound as its variables.
    pub(crate) fn resolve(&self, id: &str, args: &NamedArgs) -> Result<String, LocError> {
        self.resolve_at(id, args, 0)
    }

    /// Tries each culture in the lookup chain. A template that fails to
    /// expand yields to the next culture's template; the first failure is
    /// reported when none succeeds.
    fn resolve_at(&self, id: &str, args: &NamedArgs, depth: usize) -> Result<String, LocError> {
        if depth > MAX_DEPTH {
            return Err(LocError::RecursionLimit {
                id: id.to_owned(),
                depth: MAX_DEPTH,
            });
        }

        let mut first_error = None;
        for culture in self.lookup_chain() {
            let Some(template) = self.catalog.resolve(id, culture) else {
                continue;
            };
            self.spend_expansion(id)?;
            let frame = Frame {
                id,
                culture,
                args,
                depth,
            };
            match self.expand(template, &frame) {
                Ok(text) => return Ok(text),
                Err(err @ (LocError::RecursionLimit { .. } | LocError::ExpansionLimit { .. })) => {
                    return Err(err);
                }
                Err(err) => {
                    tracing::debug!(id, culture = %culture, error = %err, "template failed to expand");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        Err(first_error.unwrap_or_else(|| LocError::MessageNotFound { id: id.to_owned() }))
    }

    fn spend_expansion(&self, id: &str) -> Result<(), LocError> {
        let spent = self.expansions.get();
        if spent >= MAX_EXPANSIONS {
            return Err(LocError::ExpansionLimit {
                id: id.to_owned(),
                limit: MAX_EXPANSIONS,
            });
        }
        self.expansions.set(spent + 1);
        Ok(())
    }

    fn lookup_chain(&self) -> impl Iterator<Item = &'a LanguageIdentifier> {
        let active = self.store.active();
        let fallback = self.store.fallback().filter(|fallback| Some(*fallback) != active);
        active.into_iter().chain(fallback)
    }

    fn expand(&self, template: &Template, frame: &Frame<'_>) -> Result<String, LocError> {
        let mut text = String::new();
        for element in &template.elements {
            match element {
                PatternElement::TextElement { value } => text.push_str(value),
                PatternElement::Placeable { expression } => {
                    match self.expression(expression, frame)? {
                        LocValue::String(value) => text.push_str(&value),
                        number @ LocValue::Number(_) => text.push_str(&number.to_string()),
                    }
                }
            }
        }
        Ok(text)
    }

    fn expression(
        &self,
        expression: &Expression<String>,
        frame: &Frame<'_>,
    ) -> Result<LocValue, LocError> {
        match expression {
            Expression::Inline(inline) => self.inline(inline, frame),
            Expression::Select { selector, variants } => {
                let value = self
                    .inline(selector, frame)
                    .inspect_err(|err| {
                        tracing::debug!(id = frame.id, error = %err, "selector failed; using default variant");
                    })
                    .ok();
                select_variant(variants, value.as_ref(), frame.culture)
                    .map_or_else(
                        || Ok(String::new()),
                        |template| self.expand(template, frame),
                    )
                    .map(LocValue::String)
            }
        }
    }

    fn inline(
        &self,
        expression: &InlineExpression<String>,
        frame: &Frame<'_>,
    ) -> Result<LocValue, LocError> {
        match expression {
            InlineExpression::StringLiteral { value } => {
                Ok(LocValue::String(unescape_unicode_to_string(value).into_owned()))
            }
            InlineExpression::NumberLiteral { value } => value
                .parse::<f64>()
                .map(LocValue::Number)
                .map_err(|_| LocError::TypeMismatch {
                    expected: ValueKind::Number,
                    found: ValueKind::String,
                }),
            InlineExpression::VariableReference { id } => frame
                .args
                .get(&id.name)
                .cloned()
                .ok_or_else(|| LocError::UnknownVariable {
                    id: frame.id.to_owned(),
                    name: id.name.clone(),
                }),
            InlineExpression::FunctionReference { id, arguments } => {
                let args = self.call_arguments(arguments, frame)?;
                let function = self.store.find_function(frame.culture, &id.name)?;
                let env = CallEnv {
                    resolver: self,
                    depth: frame.depth + 1,
                };
                function(&args, &env)
            }
            InlineExpression::MessageReference { id, attribute } => {
                let target = entry_key(&id.name, attribute.as_ref().map(|attr| attr.name.as_str()));
                self.resolve_at(&target, frame.args, frame.depth + 1)
                    .map(LocValue::String)
            }
            InlineExpression::TermReference {
                id,
                attribute,
                arguments,
            } => {
                let term = format!("-{}", id.name);
                let target = entry_key(&term, attribute.as_ref().map(|attr| attr.name.as_str()));
                let named = match arguments {
                    Some(arguments) => self.call_arguments(arguments, frame)?.options,
                    None => NamedArgs::new(),
                };
                self.resolve_at(&target, &named, frame.depth + 1)
                    .map(LocValue::String)
            }
            InlineExpression::Placeable { expression } => self.expression(expression, frame),
        }
    }

    fn call_arguments(
        &self,
        arguments: &CallArguments<String>,
        frame: &Frame<'_>,
    ) -> Result<LocArgs, LocError> {
        let positional = arguments
            .positional
            .iter()
            .map(|argument| self.inline(argument, frame))
            .collect::<Result<Vec<_>, _>>()?;
        let mut args = LocArgs::new(positional);
        for named in &arguments.named {
            let value = self.inline(&named.value, frame)?;
            args.options.insert(named.name.name.clone(), value);
        }
        Ok(args)
    }
}

fn entry_key<'k>(id: &'k str, attribute: Option<&str>) -> Cow<'k, str> {
    attribute.map_or(Cow::Borrowed(id), |attribute| {
        Cow::Owned(format!("{id}.{attribute}"))
    })
}

/// Picks the first variant whose key matches `selector`, else the default.
/// A selector that failed to evaluate always takes the default.
fn select_variant<'t>(
    variants: &'t [Variant<String>],
    selector: Option<&LocValue>,
    culture: &LanguageIdentifier,
) -> Option<&'t Template> {
    let category = match selector {
        Some(LocValue::Number(number)) => Some(plural_category(*number, culture)),
        _ => None,
    };
    variants
        .iter()
        .find(|variant| selector.is_some_and(|value| key_matches(&variant.key, value, category)))
        .or_else(|| variants.iter().find(|variant| variant.default))
        .or_else(|| variants.first())
        .map(|variant| &variant.value)
}

fn key_matches(key: &VariantKey<String>, selector: &LocValue, category: Option<&str>) -> bool {
    match (key, selector) {
        (VariantKey::NumberLiteral { value }, LocValue::Number(number)) => value
            .parse::<f64>()
            .is_ok_and(|literal| literal.total_cmp(number).is_eq()),
        (VariantKey::Identifier { name }, LocValue::Number(_)) => category == Some(name.as_str()),
        (VariantKey::Identifier { name }, LocValue::String(text)) => name == text,
        (VariantKey::NumberLiteral { .. }, LocValue::String(_)) => false,
    }
}

/// CLDR cardinal plural category of `number` in `culture`.
///
/// Rules are looked up for the full tag, then its language alone, then
/// English.
fn plural_category(number: f64, culture: &LanguageIdentifier) -> &'static str {
    let language = LanguageIdentifier::from_parts(culture.language, None, None, &[]);
    let category = [culture.clone(), language, langid!("en")]
        .into_iter()
        .find_map(|candidate| PluralRules::create(candidate, PluralRuleType::CARDINAL).ok())
        .and_then(|rules| rules.select(number).ok())
        .unwrap_or(PluralCategory::OTHER);
    match category {
        PluralCategory::ZERO => "zero",
        PluralCategory::ONE => "one",
        PluralCategory::TWO => "two",
        PluralCategory::FEW => "few",
        PluralCategory::MANY => "many",
        PluralCategory::OTHER => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{PluralRule, register_builtins};
    use crate::catalog::FluentCatalog;
    use rstest::rstest;

    struct Fixture {
        store: CultureStore,
        catalog: FluentCatalog,
        configured: LanguageIdentifier,
    }

    impl Fixture {
        fn new(en: &str, pt: &str, active: &LanguageIdentifier) -> Self {
            let en_id = langid!("en-US");
            let pt_id = langid!("pt-BR");
            let mut store = CultureStore::new();
            let mut catalog = FluentCatalog::new()
                .with_resource(en_id.clone(), en)
                .with_resource(pt_id.clone(), pt);
            for (id, rule) in [(&en_id, PluralRule::Default), (&pt_id, PluralRule::Custom)] {
                store.load_culture(id);
                register_builtins(store.culture_mut(id).expect("loaded"), rule);
                catalog.load_culture(id).expect("sources parse");
            }
            store.set_fallback(&en_id).expect("loaded");
            store.set_active(active).expect("loaded");
            Self {
                store,
                catalog,
                configured: active.clone(),
            }
        }

        fn resolve(&self, id: &str, args: &[(&str, LocValue)]) -> Result<String, LocError> {
            let args: NamedArgs = args
                .iter()
                .map(|(name, value)| ((*name).to_owned(), value.clone()))
                .collect();
            Resolver::new(&self.store, &self.catalog, &self.configured).resolve(id, &args)
        }
    }

    fn english(source: &str) -> Fixture {
        Fixture::new(source, "", &langid!("en-US"))
    }

    #[rstest]
    fn interpolates_variables_and_literals() {
        let fixture = english(r#"line = { $who } has { $count } { "A" }{ 7 }"#);
        let text = fixture
            .resolve(
                "line",
                &[("who", LocValue::from("Ana")), ("count", LocValue::from(2.5))],
            )
            .expect("line resolves");
        assert_eq!(text, "Ana has 2.5 A7");
    }

    #[rstest]
    fn missing_variable_is_an_error() {
        let fixture = english("line = { $who }");
        let err = fixture.resolve("line", &[]).expect_err("who is missing");
        assert!(matches!(err, LocError::UnknownVariable { ref name, .. } if name == "who"));
    }

    #[rstest]
    fn follows_message_attribute_and_term_references() {
        let fixture = english(concat!(
            "-ship = { $case ->\n    [upper] SHUTTLE\n   *[lower] shuttle\n}\n",
            "door = Door\n    .locked = locked\n",
            "status = The { door.locked } { -ship } and the { -ship(case: \"upper\") }\n",
            "outer = { status }\n",
        ));
        let text = fixture.resolve("outer", &[]).expect("outer resolves");
        assert_eq!(text, "The locked shuttle and the SHUTTLE");
    }

    #[rstest]
    #[case(1.0, "one item")]
    #[case(0.0, "no items")]
    #[case(4.0, "4 items")]
    fn selects_on_numbers(#[case] count: f64, #[case] expected: &str) {
        let fixture = english(concat!(
            "items = { $n ->\n",
            "    [0] no items\n",
            "    [one] one item\n",
            "   *[other] { $n } items\n",
            "}\n",
        ));
        let text = fixture
            .resolve("items", &[("n", LocValue::from(count))])
            .expect("items resolves");
        assert_eq!(text, expected);
    }

    #[rstest]
    #[case(langid!("en-US"), 1.0, "one")]
    #[case(langid!("en-US"), 1.5, "other")]
    #[case(langid!("pt-BR"), 0.0, "one")]
    #[case(langid!("pt-BR"), 1.5, "one")]
    #[case(langid!("pt-BR"), 2.0, "other")]
    #[case(langid!("pt-PT"), 1.0, "one")]
    #[case(langid!("pt-PT"), 1.5, "other")]
    #[case(langid!("fr-FR"), 0.0, "one")]
    #[case(langid!("ja"), 1.0, "other")]
    #[case(langid!("ru"), 1.0, "one")]
    #[case(langid!("ru"), 3.0, "few")]
    #[case(langid!("ru"), 5.0, "many")]
    #[case(langid!("ru"), 21.0, "one")]
    #[case(langid!("pl"), 22.0, "few")]
    #[case(langid!("ar"), 0.0, "zero")]
    #[case(langid!("ar"), 2.0, "two")]
    fn plural_categories_follow_cldr(
        #[case] culture: LanguageIdentifier,
        #[case] count: f64,
        #[case] expected: &str,
    ) {
        assert_eq!(plural_category(count, &culture), expected);
    }

    #[rstest]
    fn selects_on_strings_then_default() {
        let fixture = english("g = { $gender ->\n    [female] she\n   *[other] they\n}");
        let she = fixture
            .resolve("g", &[("gender", LocValue::from("female"))])
            .expect("g resolves");
        let other = fixture
            .resolve("g", &[("gender", LocValue::from("unknown"))])
            .expect("g resolves");
        assert_eq!((she.as_str(), other.as_str()), ("she", "they"));
    }

    #[rstest]
    fn functions_dispatch_through_the_template_culture() {
        let fixture = Fixture::new(
            "fallback-only = { MAKEPLURAL(\"hotel\") }",
            "word = { MAKEPLURAL(\"hotel\") }",
            &langid!("pt-BR"),
        );
        assert_eq!(fixture.resolve("word", &[]).expect("pt template"), "hoteis");
        assert_eq!(
            fixture.resolve("fallback-only", &[]).expect("en template"),
            "hotels"
        );
    }

    #[rstest]
    fn failing_active_template_yields_to_fallback() {
        let fixture = Fixture::new(
            "title = Cargo bay",
            "title = { NOSUCHFN() }",
            &langid!("pt-BR"),
        );
        assert_eq!(fixture.resolve("title", &[]).expect("fallback"), "Cargo bay");
    }

    #[rstest]
    fn loc_forwards_named_options() {
        let fixture = english("inner = { $who } waves\nouter = { LOC(\"inner\", who: \"Bo\") }");
        assert_eq!(fixture.resolve("outer", &[]).expect("outer"), "Bo waves");
    }

    #[rstest]
    fn self_reference_hits_the_depth_limit() {
        let fixture = english("loop = { loop }");
        let err = fixture.resolve("loop", &[]).expect_err("loop never terminates");
        assert!(matches!(err, LocError::RecursionLimit { depth: MAX_DEPTH, .. }));
    }

    #[rstest]
    fn doubling_references_exhaust_the_expansion_budget() {
        let mut source = String::from("leaf = x\n");
        let mut previous = String::from("leaf");
        for level in 0..20 {
            let name = format!("level{level}");
            source.push_str(&format!("{name} = {{ {previous} }}{{ {previous} }}\n"));
            previous = name;
        }
        let fixture = english(&source);
        let err = fixture
            .resolve(&previous, &[])
            .expect_err("two million expansions exceed the budget");
        assert!(matches!(
            err,
            LocError::ExpansionLimit { limit: MAX_EXPANSIONS, .. }
        ));
        assert_eq!(
            fixture.resolve("level9", &[]).expect("level9 fits the budget").len(),
            1024
        );
    }

    #[rstest]
    fn unknown_id_is_not_found() {
        let fixture = english("title = Hi");
        let err = fixture.resolve("nope", &[]).expect_err("nope is absent");
        assert!(matches!(err, LocError::MessageNotFound { ref id } if id == "nope"));
    }
}
