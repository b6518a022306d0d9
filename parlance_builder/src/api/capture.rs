use std::any::Any;
use thiserror::Error;

use crate::model::{ArgumentKind, CancelMode, Culture, Nargs};

/// A type erased value travelling between the typed fields and the parsing engine.
#[doc(hidden)]
pub type AnyValue = Box<dyn Any>;

/// Marker trait for fields that can formulate a named argument (an option) in the Cli.
pub trait CliOption {}

/// Marker trait for fields that can formulate a positional argument in the Cli.
pub trait CliArgument {}

/// Behaviour to capture values of an explicit generic type from input `&str` tokens, exposed anonymously.
///
/// We use this at the bottom of the object graph so the compiler can maintain each field's type.
/// The engine only ever sees `dyn Capturable`, so arguments of varying types live in one descriptor list.
/// Methods that do not apply to a field's [`ArgumentKind`] are never called for it.
#[doc(hidden)]
pub trait Capturable: Send + Sync {
    /// The accumulation semantics of this field.
    fn kind(&self) -> ArgumentKind;

    /// The name of the element type, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Whether mere presence sets a value (no value token is consumed).
    fn is_switch(&self) -> bool {
        false
    }

    /// Whether an explicitly empty value maps to "no value".
    fn allows_null(&self) -> bool {
        false
    }

    /// The cardinality constraint of a collection.
    fn nargs(&self) -> Option<Nargs> {
        None
    }

    /// The names accepted by a choices converter.
    fn choices(&self) -> Vec<String> {
        Vec::default()
    }

    /// The explicitly declared default value, rendered for usage output.
    fn default_text(&self) -> Option<String> {
        None
    }

    /// Convert one value token for a single value field.
    fn capture(&self, _token: &str, _culture: &Culture) -> Result<AnyValue, InvalidCapture> {
        unreachable!("internal error - must not capture a single value outside of a single value field");
    }

    /// The value a switch takes when present without an explicit value.
    fn present(&self) -> AnyValue {
        unreachable!("internal error - must not mark presence on a non-switch");
    }

    /// The value for an explicitly empty token, when [`Capturable::allows_null`].
    fn null(&self) -> AnyValue {
        unreachable!("internal error - must not capture null when null is not allowed");
    }

    /// A fresh container for a multi-value or dictionary field.
    fn empty(&self) -> AnyValue {
        unreachable!("internal error - must not create a container for a single value");
    }

    /// Convert one value token and append it to a container from [`Capturable::empty`].
    fn add(
        &self,
        _container: &mut AnyValue,
        _token: &str,
        _culture: &Culture,
    ) -> Result<(), InvalidCapture> {
        unreachable!("internal error - must not add outside of a Collection");
    }

    /// Convert one key/value pair and insert it into a container from [`Capturable::empty`].
    fn insert(
        &self,
        _container: &mut AnyValue,
        _key: &str,
        _value: &str,
        _culture: &Culture,
        _overwrite: bool,
    ) -> Result<(), InvalidCapture> {
        unreachable!("internal error - must not insert outside of a Dictionary");
    }

    /// The value assembled when the argument never appears.
    fn initial(&self) -> Option<AnyValue>;

    /// Run a method field's callback, converting the value token first (when there is one).
    fn invoke(&self, _token: Option<&str>, _culture: &Culture) -> Result<CancelMode, InvalidCapture> {
        unreachable!("internal error - must not invoke a non-method");
    }
}

/// The typed layer's reason for rejecting a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[doc(hidden)]
pub enum InvalidCapture {
    /// The converter rejected the token.
    #[error("cannot convert '{token}' to {type_name}: {message}.")]
    InvalidConversion {
        /// The offending token.
        token: String,
        /// The target type.
        type_name: &'static str,
        /// The converter's explanation.
        message: String,
    },

    /// A validator rejected the converted value.
    #[error("'{token}' {message}.")]
    FailedValidation {
        /// The offending token.
        token: String,
        /// The validator's explanation.
        message: String,
    },

    /// A dictionary entry has no key/value separator.
    #[error("'{token}' is not a key/value pair separated by '{separator}'.")]
    MalformedEntry {
        /// The offending token.
        token: String,
        /// The expected separator.
        separator: String,
    },

    /// A dictionary key was supplied twice.
    #[error("the key '{token}' was already supplied.")]
    DuplicateKey {
        /// The offending key token.
        token: String,
    },

    /// The converter asked for the whole parse to stop.
    #[error("conversion of '{token}' was canceled.")]
    Canceled {
        /// The token being converted.
        token: String,
    },
}

pub(crate) fn downcast_mut<C: 'static>(container: &mut AnyValue) -> &mut C {
    container
        .downcast_mut::<C>()
        .expect("internal error - container type must match its field")
}
