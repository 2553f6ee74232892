//! Tagged values and call arguments exchanged between templates and
//! formatting functions.

use std::collections::HashMap;
use std::fmt;

use crate::error::LocError;

/// Named arguments supplied to a message or forwarded as function options.
pub type NamedArgs = HashMap<String, LocValue>;

/// Discriminant of a [`LocValue`], reported by type-mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A floating-point number.
    Number,
    /// Free-form text.
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
        }
    }
}

/// Uniform argument and return type of formatting functions.
///
/// The two variants never convert into each other implicitly: consumers must
/// use [`LocValue::as_number`] or [`LocValue::as_str`], which report a
/// [`LocError::TypeMismatch`] when the wrong variant is supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum LocValue {
    /// A numeric value.
    Number(f64),
    /// A textual value.
    String(String),
}

impl LocValue {
    /// Returns the variant tag of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
        }
    }

    /// Returns the wrapped number.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::TypeMismatch`] when the value holds text.
    pub fn as_number(&self) -> Result<f64, LocError> {
        match self {
            Self::Number(number) => Ok(*number),
            Self::String(_) => Err(self.mismatch(ValueKind::Number)),
        }
    }

    /// Returns the wrapped text.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::TypeMismatch`] when the value holds a number.
    pub fn as_str(&self) -> Result<&str, LocError> {
        match self {
            Self::String(text) => Ok(text),
            Self::Number(_) => Err(self.mismatch(ValueKind::String)),
        }
    }

    const fn mismatch(&self, expected: ValueKind) -> LocError {
        LocError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

/// Renders the generic textual representation: text verbatim, numbers in
/// their shortest round-trip form (`2`, `2.5`).
impl fmt::Display for LocValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::String(text) => f.write_str(text),
        }
    }
}

impl From<f64> for LocValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for LocValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for LocValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for LocValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for LocValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Number of positional arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments.
    Exactly(usize),
    /// This many arguments or more.
    AtLeast(usize),
}

impl Arity {
    /// Returns `true` when `count` arguments satisfy this arity.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exactly(expected) => count == expected,
            Self::AtLeast(minimum) => count >= minimum,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(expected) => write!(f, "exactly {expected}"),
            Self::AtLeast(minimum) => write!(f, "at least {minimum}"),
        }
    }
}

/// Arguments passed to a formatting function: ordered positional values plus
/// named options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocArgs {
    /// Positional arguments, in call order.
    pub args: Vec<LocValue>,
    /// Named options, forwarded to nested lookups by `LOC`.
    pub options: NamedArgs,
}

impl LocArgs {
    /// Builds arguments from positional values with no options.
    #[must_use]
    pub fn new(args: Vec<LocValue>) -> Self {
        Self {
            args,
            options: HashMap::new(),
        }
    }

    /// Adds a named option, replacing any previous value under `name`.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<LocValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Verifies that the positional argument count satisfies `arity`.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::ArityMismatch`] naming `function` otherwise.
    pub fn check_arity(&self, function: &str, arity: Arity) -> Result<(), LocError> {
        if arity.accepts(self.args.len()) {
            Ok(())
        } else {
            Err(LocError::ArityMismatch {
                function: function.to_owned(),
                expected: arity,
                found: self.args.len(),
            })
        }
    }

    /// Borrows exactly `N` positional arguments as an array.
    ///
    /// # Errors
    ///
    /// Returns [`LocError::ArityMismatch`] when the call supplied a different
    /// number of positional arguments.
    pub fn positional<const N: usize>(&self, function: &str) -> Result<&[LocValue; N], LocError> {
        self.check_arity(function, Arity::Exactly(N))?;
        <&[LocValue; N]>::try_from(self.args.as_slice()).map_err(|_| LocError::ArityMismatch {
            function: function.to_owned(),
            expected: Arity::Exactly(N),
            found: self.args.len(),
        })
    }
}
