//! Per-culture registry mapping function names to callables.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use unic_langid::LanguageIdentifier;

use crate::error::LocError;
use crate::value::{LocArgs, LocValue, NamedArgs};

/// Read-only view of the resolution environment offered to functions.
///
/// Functions never mutate configuration or culture state; they may only
/// recurse into message lookup and read the configured culture.
pub trait FunctionEnv {
    /// Resolves another message through the same lookup and expansion path,
    /// passing `options` as its named arguments.
    ///
    /// # Errors
    ///
    /// Propagates any [`LocError`] raised while resolving the nested message.
    fn resolve_message(&self, id: &str, options: &NamedArgs) -> Result<String, LocError>;

    /// Culture named by the current configuration. Numeric formatting reads
    /// its separators from this culture.
    fn configured_culture(&self) -> &LanguageIdentifier;
}

/// A registered formatting function.
pub type LocFunction =
    Arc<dyn Fn(&LocArgs, &dyn FunctionEnv) -> Result<LocValue, LocError> + Send + Sync>;

/// Mapping from case-sensitive function names to callables.
///
/// Registering a name twice replaces the earlier function, which lets a
/// culture be re-registered whenever the configured language changes.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, LocFunction>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function` under `name`, returning `true` when an earlier
    /// registration was replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> bool
    where
        F: Fn(&LocArgs, &dyn FunctionEnv) -> Result<LocValue, LocError> + Send + Sync + 'static,
    {
        self.functions
            .insert(name.into(), Arc::new(function))
            .is_some()
    }

    /// Looks up a function by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LocFunction> {
        self.functions.get(name)
    }

    /// Returns `true` when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no functions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names in lexical order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
