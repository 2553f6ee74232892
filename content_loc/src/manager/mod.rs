//! The localisation facade: culture lifecycle and message resolution.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use unic_langid::LanguageIdentifier;

use crate::builtins::{PluralRule, register_builtins};
use crate::catalog::LookupCatalog;
use crate::config::{ConfigSource, LANGUAGE_CVAR, SettingsError};
use crate::culture::{CultureHandle, CultureStore, parse_culture_tag};
use crate::direction::Direction;
use crate::error::LocError;
use crate::expand::Resolver;
use crate::registry::FunctionEnv;
use crate::value::{LocArgs, LocValue, NamedArgs};


/// Where the manager is in its culture lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CulturePhase {
    /// No fallback culture has been designated yet.
    Uninitialized,
    /// The fallback culture is loaded and doubles as the active culture.
    FallbackOnly {
        /// The fallback culture.
        fallback: LanguageIdentifier,
    },
    /// A configured culture has been activated at least once.
    Active {
        /// Culture templates are resolved in first.
        active: LanguageIdentifier,
        /// Culture consulted when the active one cannot satisfy a lookup.
        fallback: LanguageIdentifier,
    },
}

/// A message that could not be resolved and was replaced by its id.
#[derive(Debug)]
pub struct FormattingIssue {
    /// Identifier that failed to resolve.
    pub id: String,
    /// Active culture at the time of the failure.
    pub locale: Option<LanguageIdentifier>,
    /// Why resolution failed.
    pub error: LocError,
}

/// Reporter invoked whenever [`LocalizationManager::get_string`] degrades to
/// a placeholder.
pub type FormattingIssueReporter = Arc<dyn Fn(&FormattingIssue) + Send + Sync>;

struct ManagerState {
    store: CultureStore,
    catalog: Box<dyn LookupCatalog>,
    phase: CulturePhase,
    generation: u64,
}

impl ManagerState {
    fn require_initialized(&self) -> Result<&LanguageIdentifier, LocError> {
        match &self.phase {
            CulturePhase::Uninitialized => Err(LocError::NotInitialized),
            CulturePhase::FallbackOnly { fallback } | CulturePhase::Active { fallback, .. } => {
                Ok(fallback)
            }
        }
    }

    /// Register, reload, then activate. The fallback culture keeps the
    /// default pluraliser; any other culture gets the custom one.
    ///
    /// A failed reload leaves the active culture, phase, and generation as
    /// they were.
    fn activate(&mut self, culture: &LanguageIdentifier) -> Result<(), LocError> {
        let fallback = self.require_initialized()?.clone();
        let rule = if self.store.is_fallback(culture) {
            PluralRule::Default
        } else {
            PluralRule::Custom
        };
        register_builtins(self.store.culture_mut(culture)?, rule);
        self.catalog.reload_all()?;
        self.store.set_active(culture)?;
        self.generation = self.generation.wrapping_add(1);
        self.phase = CulturePhase::Active {
            active: culture.clone(),
            fallback,
        };
        tracing::info!(culture = %culture, generation = self.generation, "activated culture");
        Ok(())
    }
}

/// Resolves message ids to display text and owns the culture lifecycle.
///
/// Cloning is cheap and every clone drives the same state, which is how the
/// configuration subscription installed by [`Self::attach_config`] reaches
/// the manager. Culture mutations take an exclusive lock; resolution takes a
/// shared one and never re-enters the lock, so `LOC` recursion is safe.
#[derive(Clone)]
pub struct LocalizationManager {
    state: Arc<RwLock<ManagerState>>,
    report_issue: FormattingIssueReporter,
}

impl LocalizationManager {
    /// Creates an uninitialised manager over `catalog`.
    #[must_use]
    pub fn new(catalog: impl LookupCatalog + 'static) -> Self {
        Self {
            state: Arc::new(RwLock::new(ManagerState {
                store: CultureStore::new(),
                catalog: Box::new(catalog),
                phase: CulturePhase::Uninitialized,
                generation: 0,
            })),
            report_issue: default_reporter(),
        }
    }

    /// Overrides how placeholder substitutions are reported.
    #[must_use]
    pub fn with_error_reporter(mut self, reporter: FormattingIssueReporter) -> Self {
        self.report_issue = reporter;
        self
    }

    /// Loads `fallback_tag`, registers the default built-ins on it, and
    /// makes it both the fallback and the active culture.
    ///
    /// Calling this again after a successful initialisation does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::InvalidCultureTag`] for a malformed tag, or
    /// [`LocError::Catalog`] when the fallback catalogue fails to load.
    pub fn initialize(&self, fallback_tag: &str) -> Result<(), LocError> {
        let fallback = parse_culture_tag(fallback_tag)?;
        let mut state = self.state.write();
        if let Ok(existing) = state.require_initialized() {
            tracing::debug!(fallback = %existing, requested = %fallback, "already initialised");
            return Ok(());
        }

        state.catalog.load_culture(&fallback)?;
        state.store.load_culture(&fallback);
        register_builtins(state.store.culture_mut(&fallback)?, PluralRule::Default);
        state.store.set_fallback(&fallback)?;
        state.store.set_active(&fallback)?;
        tracing::info!(culture = %fallback, "initialised fallback culture");
        state.phase = CulturePhase::FallbackOnly { fallback };
        Ok(())
    }

    /// Subscribes to [`LANGUAGE_CVAR`] on `config` and immediately applies
    /// its current value. Every later change triggers
    /// [`Self::on_culture_update`]; failures are logged and leave the
    /// previous culture active.
    ///
    /// Call after [`Self::initialize`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownVariable`] when `config` does not
    /// define [`LANGUAGE_CVAR`].
    pub fn attach_config(&self, config: &dyn ConfigSource) -> Result<(), SettingsError> {
        let manager = self.clone();
        config.on_value_changed(
            LANGUAGE_CVAR.name,
            Arc::new(move |tag: &str| {
                if let Err(err) = manager.on_culture_update(tag) {
                    tracing::error!(culture = tag, error = %err, "failed to switch culture");
                }
            }),
            true,
        )
    }

    /// Switches to the culture named by `tag`: load it if needed, register
    /// its built-ins, activate it, then reload every cached template.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::NotInitialized`] before [`Self::initialize`],
    /// [`LocError::InvalidCultureTag`] for a malformed tag, or
    /// [`LocError::Catalog`] when loading or reloading templates fails.
    pub fn on_culture_update(&self, tag: &str) -> Result<(), LocError> {
        let culture = parse_culture_tag(tag)?;
        let mut state = self.state.write();
        state.require_initialized()?;
        state.catalog.load_culture(&culture)?;
        state.store.load_culture(&culture);
        state.activate(&culture)
    }

    /// Loads `tag` without activating it. Loading is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::InvalidCultureTag`] for a malformed tag or
    /// [`LocError::Catalog`] when its templates fail to load.
    pub fn load_culture(&self, tag: &str) -> Result<CultureHandle, LocError> {
        let culture = parse_culture_tag(tag)?;
        let mut state = self.state.write();
        state.catalog.load_culture(&culture)?;
        Ok(state.store.load_culture(&culture))
    }

    /// Activates an already loaded culture, re-running its built-in
    /// registration and reloading templates.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::CultureNotLoaded`] when `tag` was never loaded,
    /// plus the errors of [`Self::on_culture_update`].
    pub fn set_active_culture(&self, tag: &str) -> Result<(), LocError> {
        let culture = parse_culture_tag(tag)?;
        let mut state = self.state.write();
        state.require_initialized()?;
        if !state.store.has_culture(&culture) {
            return Err(LocError::CultureNotLoaded { culture });
        }
        state.activate(&culture)
    }

    /// Registers a host-provided function on a loaded culture. Registrations
    /// survive culture switches unless they share a built-in's name.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::CultureNotLoaded`] when `tag` was never loaded.
    pub fn add_function<F>(&self, tag: &str, name: &str, function: F) -> Result<(), LocError>
    where
        F: Fn(&LocArgs, &dyn FunctionEnv) -> Result<LocValue, LocError> + Send + Sync + 'static,
    {
        let culture = parse_culture_tag(tag)?;
        let mut state = self.state.write();
        if state.store.culture_mut(&culture)?.functions_mut().register(name, function) {
            tracing::debug!(culture = %culture, function = name, "replaced function");
        }
        Ok(())
    }

    /// Resolves `id`, substituting the id itself when resolution fails.
    ///
    /// Failures are passed to the configured [`FormattingIssueReporter`] and
    /// never reach the caller.
    #[must_use]
    pub fn get_string(&self, id: &str, args: &[(&str, LocValue)]) -> String {
        self.try_get_string(id, args).unwrap_or_else(|error| {
            let issue = FormattingIssue {
                id: id.to_owned(),
                locale: self.active_culture(),
                error,
            };
            (self.report_issue)(&issue);
            id.to_owned()
        })
    }

    /// Resolves `id`, returning the failure instead of a placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::NotInitialized`] before [`Self::initialize`],
    /// [`LocError::MessageNotFound`] when neither culture has `id`, or any
    /// error raised while expanding the template.
    pub fn try_get_string(&self, id: &str, args: &[(&str, LocValue)]) -> Result<String, LocError> {
        let named: NamedArgs = args
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect();
        let state = self.state.read();
        state.require_initialized()?;
        let active = state.store.active().ok_or(LocError::NotInitialized)?;
        Resolver::new(&state.store, &*state.catalog, active).resolve(id, &named)
    }

    /// Localised name of a compass direction.
    #[must_use]
    pub fn format_direction(&self, direction: Direction) -> String {
        self.get_string(&format!("zzzz-fmt-direction-{direction}"), &[])
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> CulturePhase {
        self.state.read().phase.clone()
    }

    /// The active culture, once initialised.
    #[must_use]
    pub fn active_culture(&self) -> Option<LanguageIdentifier> {
        self.state.read().store.active().cloned()
    }

    /// The fallback culture, once initialised.
    #[must_use]
    pub fn fallback_culture(&self) -> Option<LanguageIdentifier> {
        self.state.read().store.fallback().cloned()
    }

    /// Number of culture activations so far; text cached under an older
    /// generation may be stale.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }
}

impl fmt::Debug for LocalizationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("LocalizationManager")
            .field("phase", &state.phase)
            .field("generation", &state.generation)
            .field("report_issue", &"<reporter>")
            .finish_non_exhaustive()
    }
}

#[must_use]
fn default_reporter() -> FormattingIssueReporter {
    Arc::new(|issue: &FormattingIssue| {
        tracing::warn!(
            id = %issue.id,
            locale = ?issue.locale,
            error = %issue.error,
            "failed to resolve message; using placeholder"
        );
    })
}
