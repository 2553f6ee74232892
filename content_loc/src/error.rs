//! Error taxonomy for message resolution and culture management.

use thiserror::Error;
use unic_langid::LanguageIdentifier;

use crate::catalog::CatalogError;
use crate::value::{Arity, ValueKind};

/// Errors raised while resolving messages or managing cultures.
///
/// [`crate::LocalizationManager::get_string`] converts every variant into a
/// placeholder string; only explicit culture loads and switches surface them
/// to callers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LocError {
    /// A function consumed the wrong [`crate::LocValue`] variant.
    #[error("expected a {expected} value but found a {found} value")]
    TypeMismatch {
        /// Variant the function required.
        expected: ValueKind,
        /// Variant actually supplied.
        found: ValueKind,
    },

    /// A function was called with the wrong number of positional arguments.
    #[error("function {function} expects {expected} argument(s) but received {found}")]
    ArityMismatch {
        /// Name of the function that rejected the call.
        function: String,
        /// Accepted argument count.
        expected: Arity,
        /// Supplied argument count.
        found: usize,
    },

    /// A template called a function that neither the culture nor the
    /// fallback culture registers.
    #[error("function {name} is not registered for {culture} or the fallback culture")]
    FunctionNotFound {
        /// Function name as written in the template.
        name: String,
        /// Culture whose template made the call.
        culture: LanguageIdentifier,
    },

    /// The identifier is absent from both the active and fallback catalogues.
    #[error("message {id} is not present in the active or fallback catalogue")]
    MessageNotFound {
        /// Requested message identifier.
        id: String,
    },

    /// A culture was activated or designated before being loaded.
    #[error("culture {culture} has not been loaded")]
    CultureNotLoaded {
        /// Culture that was requested.
        culture: LanguageIdentifier,
    },

    /// A culture tag failed to parse as a language identifier.
    #[error("{tag:?} is not a valid culture tag: {reason}")]
    InvalidCultureTag {
        /// Tag as supplied by the caller.
        tag: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A template referenced a variable the caller did not supply.
    #[error("message {id} references unknown variable ${name}")]
    UnknownVariable {
        /// Message whose template referenced the variable.
        id: String,
        /// Variable name without the `$` sigil.
        name: String,
    },

    /// Message references nested beyond the supported depth.
    #[error("message {id} exceeded the reference depth limit of {depth}")]
    RecursionLimit {
        /// Message being resolved when the limit was hit.
        id: String,
        /// Depth limit.
        depth: usize,
    },

    /// A single lookup expanded more messages than allowed.
    #[error("message {id} exceeded the expansion limit of {limit}")]
    ExpansionLimit {
        /// Message being resolved when the limit was hit.
        id: String,
        /// Expansion limit.
        limit: usize,
    },

    /// The manager was used before a fallback culture was designated.
    #[error("the localisation manager has not been initialised")]
    NotInitialized,

    /// The message catalogue failed to load or reload.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
