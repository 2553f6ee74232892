//! Built-in formatting functions and the routine that registers them.
//!
//! Every culture receives the same set of functions. The only difference
//! between cultures is the pluraliser baked into `MAKEPLURAL` and `MANY`:
//! the fallback culture always uses [`PluralRule::Default`], every other
//! culture uses [`PluralRule::Custom`]. `TOSTRING` captures the culture it
//! was registered for; `NATURALFIXED` and `NATURALPERCENT` read the
//! configured culture at call time.

pub mod number;
pub mod plural;

use unic_langid::LanguageIdentifier;

use crate::culture::Culture;
use crate::error::LocError;
use crate::registry::FunctionEnv;
use crate::value::{Arity, LocArgs, LocValue};

pub use number::NumberConventions;
pub use plural::{PluralRule, SINGULAR_EPSILON};

/// `MAKEPLURAL(word)`
pub const MAKEPLURAL: &str = "MAKEPLURAL";
/// `MANY(word, count)`
pub const MANY: &str = "MANY";
/// `NATURALFIXED(number, maxDecimals)`
pub const NATURALFIXED: &str = "NATURALFIXED";
/// `NATURALPERCENT(number, maxDecimals)`
pub const NATURALPERCENT: &str = "NATURALPERCENT";
/// `LOC(id, ...options)`
pub const LOC: &str = "LOC";
/// `TOSTRING(value, format)`
pub const TOSTRING: &str = "TOSTRING";

/// Names of every built-in, in registration order.
pub const BUILTIN_NAMES: [&str; 6] = [MAKEPLURAL, MANY, NATURALFIXED, NATURALPERCENT, LOC, TOSTRING];

/// Registers every built-in on `culture` with the given pluraliser,
/// replacing earlier registrations of the same names.
pub fn register_builtins(culture: &mut Culture, rule: PluralRule) {
    let culture_id: LanguageIdentifier = culture.id().clone();
    tracing::debug!(culture = %culture_id, ?rule, "registering built-in functions");

    let functions = culture.functions_mut();
    functions.register(MAKEPLURAL, move |args, _| {
        plural::make_plural(args, rule)
    });
    functions.register(MANY, move |args, _| {
        plural::many(args, rule)
    });
    functions.register(NATURALFIXED, number::natural_fixed_fn);
    functions.register(NATURALPERCENT, number::natural_percent_fn);
    functions.register(LOC, loc);
    functions.register(TOSTRING, move |args, _| {
        number::to_string_fn(args, &culture_id)
    });
}

/// `LOC(id, ...)`: resolves another message, forwarding the call's named
/// options as its arguments. Extra positional arguments are ignored.
fn loc(args: &LocArgs, env: &dyn FunctionEnv) -> Result<LocValue, LocError> {
    args.check_arity(LOC, Arity::AtLeast(1))?;
    let Some(id) = args.args.first() else {
        return Err(LocError::ArityMismatch {
            function: LOC.to_owned(),
            expected: Arity::AtLeast(1),
            found: 0,
        });
    };
    env.resolve_message(id.as_str()?, &args.options)
        .map(LocValue::String)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::CultureStore;
    use crate::value::NamedArgs;
    use rstest::rstest;
    use unic_langid::langid;

    struct EchoEnv(LanguageIdentifier);

    impl FunctionEnv for EchoEnv {
        fn resolve_message(&self, id: &str, options: &NamedArgs) -> Result<String, LocError> {
            let subject = options
                .get("subject")
                .map_or_else(|| String::from("<none>"), ToString::to_string);
            Ok(format!("{id}:{subject}"))
        }

        fn configured_culture(&self) -> &LanguageIdentifier {
            &self.0
        }
    }

    fn call(
        store: &CultureStore,
        culture: &LanguageIdentifier,
        name: &str,
        args: &LocArgs,
    ) -> Result<LocValue, LocError> {
        let env = EchoEnv(culture.clone());
        let function = store.find_function(culture, name)?;
        function(args, &env)
    }

    #[rstest]
    fn registers_every_builtin() {
        let mut store = CultureStore::new();
        let en = langid!("en-US");
        store.load_culture(&en);
        register_builtins(store.culture_mut(&en).expect("loaded"), PluralRule::Default);
        let culture = store.culture(&en).expect("loaded");
        for name in BUILTIN_NAMES {
            assert!(culture.functions().contains(name), "{name} missing");
        }
    }

    #[rstest]
    fn reregistration_swaps_the_pluraliser() {
        let mut store = CultureStore::new();
        let pt = langid!("pt-BR");
        store.load_culture(&pt);
        register_builtins(store.culture_mut(&pt).expect("loaded"), PluralRule::Default);
        register_builtins(store.culture_mut(&pt).expect("loaded"), PluralRule::Custom);

        let args = LocArgs::new(vec![LocValue::from("hotel")]);
        let value = call(&store, &pt, MAKEPLURAL, &args).expect("MAKEPLURAL succeeds");
        assert_eq!(value, LocValue::from("hoteis"));
    }

    #[rstest]
    fn loc_forwards_options() {
        let mut store = CultureStore::new();
        let en = langid!("en-US");
        store.load_culture(&en);
        register_builtins(store.culture_mut(&en).expect("loaded"), PluralRule::Default);

        let args = LocArgs::new(vec![LocValue::from("greeting")]).with_option("subject", "crew");
        let value = call(&store, &en, LOC, &args).expect("LOC succeeds");
        assert_eq!(value, LocValue::from("greeting:crew"));
    }

    #[rstest]
    fn loc_requires_an_identifier() {
        let mut store = CultureStore::new();
        let en = langid!("en-US");
        store.load_culture(&en);
        register_builtins(store.culture_mut(&en).expect("loaded"), PluralRule::Default);

        let err = call(&store, &en, LOC, &LocArgs::default()).expect_err("LOC needs an id");
        assert!(matches!(err, LocError::ArityMismatch { .. }));
    }

    #[rstest]
    fn natural_fixed_reads_configured_culture() {
        let mut store = CultureStore::new();
        let en = langid!("en-US");
        store.load_culture(&en);
        register_builtins(store.culture_mut(&en).expect("loaded"), PluralRule::Default);

        let env = EchoEnv(langid!("pt-BR"));
        let function = store.find_function(&en, NATURALFIXED).expect("registered");
        let args = LocArgs::new(vec![LocValue::from(1234.5), LocValue::from(2.0)]);
        let value = function(&args, &env).expect("NATURALFIXED succeeds");
        assert_eq!(value, LocValue::from("1.234,5"));
    }
}
