//! Configuration: the variable store the manager subscribes to, and the
//! layered settings used to seed it.
//!
//! [`ConfigVars`] is a minimal named-variable store with change
//! subscriptions. Subscribers run after the store's lock has been released,
//! so a callback may read or write configuration without deadlocking.
//! [`LocalizationSettings`] are loaded with `figment` from built-in
//! defaults, an optional TOML file, and `CONTENT_LOC_*` environment
//! variables, in that order of precedence.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix read by [`LocalizationSettings::load`].
pub const ENV_PREFIX: &str = "CONTENT_LOC_";

/// Callback invoked with the new value of a configuration variable.
pub type ChangeCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Declaration of a named configuration variable and its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CVarDef {
    /// Variable name, e.g. `loc.server_language`.
    pub name: &'static str,
    /// Value the variable holds until it is first set.
    pub default: &'static str,
}

/// Culture tag the manager activates; changing it switches cultures.
pub const LANGUAGE_CVAR: CVarDef = CVarDef {
    name: "loc.server_language",
    default: "pt-BR",
};

/// Errors raised by the configuration layer.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Layered settings failed to merge or deserialise.
    #[error("failed to load localisation settings: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// A variable was read from or written to before being registered.
    #[error("configuration variable {name} is not registered")]
    UnknownVariable {
        /// Name that was looked up.
        name: String,
    },
}

/// Source of named configuration values with change notification.
///
/// [`crate::LocalizationManager::attach_config`] subscribes to
/// [`LANGUAGE_CVAR`] through this trait.
pub trait ConfigSource: Send + Sync {
    /// Current value of `name`, if registered.
    fn get(&self, name: &str) -> Option<String>;

    /// Sets `name` to `value`, notifying subscribers when the value changes.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownVariable`] when `name` is not
    /// registered.
    fn set(&self, name: &str, value: &str) -> Result<(), SettingsError>;

    /// Subscribes `callback` to changes of `name`. When `invoke_immediately`
    /// is `true` the callback also runs once with the current value.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownVariable`] when `name` is not
    /// registered.
    fn on_value_changed(
        &self,
        name: &str,
        callback: ChangeCallback,
        invoke_immediately: bool,
    ) -> Result<(), SettingsError>;
}

#[derive(Default)]
struct VarTable {
    values: HashMap<String, String>,
    subscribers: HashMap<String, Vec<ChangeCallback>>,
}

/// In-process [`ConfigSource`].
#[derive(Default)]
pub struct ConfigVars {
    table: Mutex<VarTable>,
}

impl ConfigVars {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with [`LANGUAGE_CVAR`] registered and set to
    /// `settings.language`.
    #[must_use]
    pub fn from_settings(settings: &LocalizationSettings) -> Self {
        let vars = Self::new();
        vars.register(LANGUAGE_CVAR);
        vars.table
            .lock()
            .values
            .insert(LANGUAGE_CVAR.name.to_owned(), settings.language.clone());
        vars
    }

    /// Registers `def`. Registering an existing variable keeps its value.
    pub fn register(&self, def: CVarDef) {
        self.table
            .lock()
            .values
            .entry(def.name.to_owned())
            .or_insert_with(|| def.default.to_owned());
    }
}

impl ConfigSource for ConfigVars {
    fn get(&self, name: &str) -> Option<String> {
        self.table.lock().values.get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<(), SettingsError> {
        let subscribers = {
            let mut table = self.table.lock();
            let Some(current) = table.values.get_mut(name) else {
                return Err(SettingsError::UnknownVariable {
                    name: name.to_owned(),
                });
            };
            if current == value {
                return Ok(());
            }
            value.clone_into(current);
            table.subscribers.get(name).cloned().unwrap_or_default()
        };
        tracing::debug!(name, value, subscribers = subscribers.len(), "configuration variable changed");
        for callback in subscribers {
            callback(value);
        }
        Ok(())
    }

    fn on_value_changed(
        &self,
        name: &str,
        callback: ChangeCallback,
        invoke_immediately: bool,
    ) -> Result<(), SettingsError> {
        let current = {
            let mut table = self.table.lock();
            let Some(current) = table.values.get(name).cloned() else {
                return Err(SettingsError::UnknownVariable {
                    name: name.to_owned(),
                });
            };
            table
                .subscribers
                .entry(name.to_owned())
                .or_default()
                .push(Arc::clone(&callback));
            current
        };
        if invoke_immediately {
            callback(&current);
        }
        Ok(())
    }
}

impl fmt::Debug for ConfigVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.lock();
        f.debug_struct("ConfigVars")
            .field("values", &table.values)
            .field(
                "subscribers",
                &table.subscribers.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

/// Start-up settings for the localisation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationSettings {
    /// Initial value of [`LANGUAGE_CVAR`].
    pub language: String,
    /// Culture every lookup falls back to.
    pub fallback_language: String,
    /// Root of the `<tag>/*.ftl` catalogue tree, if any.
    pub catalog_dir: Option<Utf8PathBuf>,
}

impl Default for LocalizationSettings {
    fn default() -> Self {
        Self {
            language: LANGUAGE_CVAR.default.to_owned(),
            fallback_language: String::from("en-US"),
            catalog_dir: None,
        }
    }
}

impl LocalizationSettings {
    /// Layered provider: defaults, then `config_file` (ignored when
    /// missing), then `CONTENT_LOC_*` environment variables.
    #[must_use]
    pub fn figment(config_file: Option<&Utf8Path>) -> Figment {
        let base = Figment::from(Serialized::defaults(Self::default()));
        let with_file = match config_file {
            Some(path) => base.merge(Toml::file(path.as_std_path())),
            None => base,
        };
        with_file.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads settings from [`Self::figment`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Extract`] when a layer is malformed or a
    /// value has the wrong type.
    pub fn load(config_file: Option<&Utf8Path>) -> Result<Self, SettingsError> {
        Self::figment(config_file)
            .extract()
            .map_err(|err| SettingsError::Extract(Box::new(err)))
    }
}
