//! Loaded cultures and the active/fallback designation.

use std::collections::HashMap;

use unic_langid::LanguageIdentifier;

use crate::error::LocError;
use crate::registry::{FunctionRegistry, LocFunction};

/// Parses a BCP-47 style tag such as `"pt-BR"`.
///
/// # Errors
///
/// Returns [`LocError::InvalidCultureTag`] when the tag does not parse.
pub fn parse_culture_tag(tag: &str) -> Result<LanguageIdentifier, LocError> {
    tag.parse::<LanguageIdentifier>()
        .map_err(|err| LocError::InvalidCultureTag {
            tag: tag.to_owned(),
            reason: err.to_string(),
        })
}

/// A loaded locale and the formatting functions registered for it.
#[derive(Debug)]
pub struct Culture {
    id: LanguageIdentifier,
    functions: FunctionRegistry,
}

impl Culture {
    fn new(id: LanguageIdentifier) -> Self {
        Self {
            id,
            functions: FunctionRegistry::new(),
        }
    }

    /// Locale identifier of this culture.
    #[must_use]
    pub const fn id(&self) -> &LanguageIdentifier {
        &self.id
    }

    /// Functions registered for this culture.
    #[must_use]
    pub const fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Mutable access for (re-)registering functions.
    pub const fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }
}

/// Lightweight reference to a culture held by a [`CultureStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CultureHandle(LanguageIdentifier);

impl CultureHandle {
    /// Locale identifier the handle refers to.
    #[must_use]
    pub const fn id(&self) -> &LanguageIdentifier {
        &self.0
    }
}

/// Set of loaded cultures plus the active and fallback designations.
///
/// Cultures are created once per distinct identifier and never torn down;
/// switching the active culture leaves every other culture's registrations
/// untouched. The store does not register functions itself: callers (the
/// [`crate::LocalizationManager`]) run the built-in registration routine
/// before activating a culture.
#[derive(Debug, Default)]
pub struct CultureStore {
    cultures: HashMap<LanguageIdentifier, Culture>,
    active: Option<LanguageIdentifier>,
    fallback: Option<LanguageIdentifier>,
}

impl CultureStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `id`, reusing the existing culture when it is already present.
    pub fn load_culture(&mut self, id: &LanguageIdentifier) -> CultureHandle {
        if !self.cultures.contains_key(id) {
            tracing::debug!(culture = %id, "loading culture");
            self.cultures.insert(id.clone(), Culture::new(id.clone()));
        }
        CultureHandle(id.clone())
    }

    /// Returns `true` when `id` has been loaded.
    #[must_use]
    pub fn has_culture(&self, id: &LanguageIdentifier) -> bool {
        self.cultures.contains_key(id)
    }

    /// Borrows a loaded culture.
    #[must_use]
    pub fn culture(&self, id: &LanguageIdentifier) -> Option<&Culture> {
        self.cultures.get(id)
    }

    /// Mutably borrows a loaded culture.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::CultureNotLoaded`] when `id` is unknown.
    pub fn culture_mut(&mut self, id: &LanguageIdentifier) -> Result<&mut Culture, LocError> {
        self.cultures
            .get_mut(id)
            .ok_or_else(|| LocError::CultureNotLoaded { culture: id.clone() })
    }

    /// Identifiers of every loaded culture, in no particular order.
    pub fn loaded(&self) -> impl Iterator<Item = &LanguageIdentifier> {
        self.cultures.keys()
    }

    /// Makes `id` the active culture.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::CultureNotLoaded`] when `id` has not been loaded.
    pub fn set_active(&mut self, id: &LanguageIdentifier) -> Result<CultureHandle, LocError> {
        self.require_loaded(id)?;
        self.active = Some(id.clone());
        Ok(CultureHandle(id.clone()))
    }

    /// Designates `id` as the fallback culture.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::CultureNotLoaded`] when `id` has not been loaded.
    pub fn set_fallback(&mut self, id: &LanguageIdentifier) -> Result<CultureHandle, LocError> {
        self.require_loaded(id)?;
        if let Some(previous) = self.fallback.as_ref().filter(|previous| *previous != id) {
            tracing::warn!(previous = %previous, culture = %id, "replacing fallback culture");
        }
        self.fallback = Some(id.clone());
        Ok(CultureHandle(id.clone()))
    }

    /// The active culture, if one has been set.
    #[must_use]
    pub const fn active(&self) -> Option<&LanguageIdentifier> {
        self.active.as_ref()
    }

    /// The fallback culture, if one has been designated.
    #[must_use]
    pub const fn fallback(&self) -> Option<&LanguageIdentifier> {
        self.fallback.as_ref()
    }

    /// Returns `true` when `id` is the fallback culture.
    #[must_use]
    pub fn is_fallback(&self, id: &LanguageIdentifier) -> bool {
        self.fallback.as_ref() == Some(id)
    }

    /// Finds `name` in `culture`'s registry, then in the fallback culture's.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::FunctionNotFound`] when neither registry has it.
    pub fn find_function(
        &self,
        culture: &LanguageIdentifier,
        name: &str,
    ) -> Result<&LocFunction, LocError> {
        let own = self
            .cultures
            .get(culture)
            .and_then(|entry| entry.functions().get(name));
        if let Some(function) = own {
            return Ok(function);
        }

        let fallback = self
            .fallback
            .as_ref()
            .filter(|fallback| *fallback != culture)
            .and_then(|fallback| self.cultures.get(fallback))
            .and_then(|entry| entry.functions().get(name));
        if let Some(function) = fallback {
            tracing::debug!(culture = %culture, function = name, "using fallback culture function");
            return Ok(function);
        }

        Err(LocError::FunctionNotFound {
            name: name.to_owned(),
            culture: culture.clone(),
        })
    }

    fn require_loaded(&self, id: &LanguageIdentifier) -> Result<(), LocError> {
        if self.has_culture(id) {
            Ok(())
        } else {
            Err(LocError::CultureNotLoaded { culture: id.clone() })
        }
    }
}
