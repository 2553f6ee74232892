//! Message catalogue capability consumed by the resolver.
//!
//! `LookupCatalog` abstracts the component that turns translation files into
//! an addressable mapping from message identifier to template, so the
//! resolver can be exercised against embedded strings in tests, a directory
//! of `.ftl` files at runtime, or any other source an application provides.
//! Templates are Fluent patterns; parsing stays on the catalogue side.

use camino::Utf8PathBuf;
use fluent_syntax::ast::Pattern;
use fluent_syntax::parser::ParserError;
use thiserror::Error;
use unic_langid::LanguageIdentifier;

mod fluent;

pub use fluent::FluentCatalog;

/// A parsed message template.
pub type Template = Pattern<String>;

/// Addressable store of message templates per culture.
///
/// Implementations are driven by a single owner (the
/// [`crate::LocalizationManager`]); mutation happens only through
/// `load_culture` and `reload_all`.
pub trait LookupCatalog: Send + Sync {
    /// Loads the templates for `culture`. Loading an already loaded culture
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when a source cannot be read or parsed.
    fn load_culture(&mut self, culture: &LanguageIdentifier) -> Result<(), CatalogError>;

    /// Returns `true` when `culture` has been loaded.
    fn has_culture(&self, culture: &LanguageIdentifier) -> bool;

    /// Re-reads the templates of every loaded culture.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when a source cannot be read or parsed.
    fn reload_all(&mut self) -> Result<(), CatalogError>;

    /// Looks up the template for `id` in `culture`.
    fn resolve(&self, id: &str, culture: &LanguageIdentifier) -> Option<&Template>;
}

/// Errors surfaced while loading catalogue sources.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A catalogue file or directory could not be read.
    #[error("failed to read catalogue source {path}")]
    Io {
        /// Path that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Fluent text failed to parse.
    #[error("failed to parse {} catalogue source for {locale}: {} error(s)", .origin, .errors.len())]
    Parser {
        /// Culture the source belongs to.
        locale: LanguageIdentifier,
        /// File path, or `<embedded>` for in-memory sources.
        origin: String,
        /// Parser errors emitted by Fluent.
        errors: Vec<ParserError>,
    },
}
