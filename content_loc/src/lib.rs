//! Culture-aware message resolution for game content.
//!
//! The crate resolves message identifiers to display text through a
//! [`LocalizationManager`]. Each loaded [`Culture`] owns a
//! [`FunctionRegistry`] of formatting functions (pluralisation, numeric
//! formatting, recursive lookups) that templates invoke by name. Lookups that
//! the active culture cannot satisfy fall back to a designated fallback
//! culture, and the active culture can be switched at runtime by updating the
//! `loc.server_language` configuration variable.
//!
//! Message templates use the Fluent syntax and are supplied by a
//! [`LookupCatalog`]; [`FluentCatalog`] is the bundled implementation backed
//! by embedded strings or a directory of `.ftl` files.
//!
//! ```rust
//! use content_loc::{FluentCatalog, LocValue, LocalizationManager, langid};
//!
//! let catalog = FluentCatalog::new().with_resource(
//!     langid!("en-US"),
//!     "crates = { $count } { MANY(\"crate\", $count) }",
//! );
//! let manager = LocalizationManager::new(catalog);
//! manager.initialize("en-US").expect("fallback culture should load");
//!
//! let text = manager.get_string("crates", &[("count", LocValue::from(3.0))]);
//! assert_eq!(text, "3 crates");
//! ```

pub mod builtins;
pub mod catalog;
pub mod config;
mod culture;
mod direction;
mod error;
mod expand;
pub mod list;
mod manager;
mod registry;
mod timespan;
mod value;

pub use catalog::{CatalogError, FluentCatalog, LookupCatalog, Template};
pub use config::{
    CVarDef, ChangeCallback, ConfigSource, ConfigVars, LANGUAGE_CVAR, LocalizationSettings,
    SettingsError,
};
pub use culture::{Culture, CultureHandle, CultureStore, parse_culture_tag};
pub use direction::Direction;
pub use error::LocError;
pub use list::{format_list, format_list_custom, format_list_to_or, format_list_to_or_custom};
pub use manager::{
    CulturePhase, FormattingIssue, FormattingIssueReporter, LocalizationManager,
};
pub use registry::{FunctionEnv, FunctionRegistry, LocFunction};
pub use timespan::{
    TIMESPAN_MINUTES_FORMATS, format_minutes_timespan, parse_minutes_timespan,
};
pub use unic_langid::{LanguageIdentifier, langid};
pub use value::{Arity, LocArgs, LocValue, NamedArgs, ValueKind};
