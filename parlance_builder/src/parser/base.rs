use thiserror::Error;

use crate::parser::printer::Usage;

/// A malformed parser configuration (ex: a repeated argument name).
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

/// The category of a [`ParseError`], for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorCategory {
    UnknownArgument,
    AmbiguousName,
    InvalidValue,
    DuplicateArgument,
    TooManyPositionalArguments,
    MissingRequiredArgument,
    ValidationFailed,
    Tokenization,
    MissingValue,
    CombinedShortNonSwitch,
    DuplicateKey,
    DependencyFailed,
    CreateFailed,
    UnknownCommand,
    MissingCommand,
}

fn subject(name: &Option<String>) -> String {
    match name {
        Some(n) => format!(" for '{n}'"),
        None => "".to_string(),
    }
}

/// A categorized parse failure.
///
/// Each variant carries the argument name and the index of the offending token, where known.
/// The index is relative to the full token slice handed to the parser (not the start offset).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A named token matched no argument.
    #[error("Parse error: unknown argument '{name}'.")]
    UnknownArgument {
        /// The name as written.
        name: String,
        /// The offending token.
        index: usize,
    },

    /// A name prefix matched more than one argument.
    #[error("Parse error: argument '{name}' is ambiguous, could be any of: {}.", .candidates.join(", "))]
    AmbiguousName {
        /// The name as written.
        name: String,
        /// The primary names of the matching arguments.
        candidates: Vec<String>,
        /// The offending token.
        index: usize,
    },

    /// A converter rejected the value.
    #[error("Parse error: invalid value for '{name}': {message}")]
    InvalidValue {
        /// The argument.
        name: String,
        /// The rejected text.
        token: String,
        /// The converter's explanation.
        message: String,
        /// The offending token.
        index: usize,
    },

    /// A single value argument was supplied again under [`DuplicateArguments::Error`](crate::DuplicateArguments::Error).
    #[error("Parse error: argument '{name}' was supplied more than once.")]
    DuplicateArgument {
        /// The argument.
        name: String,
        /// The repeated occurrence.
        index: usize,
    },

    /// A positional value arrived with no positional argument left to bind it to.
    #[error("Parse error: unexpected positional argument '{token}'.")]
    TooManyPositionalArguments {
        /// The surplus value.
        token: String,
        /// The offending token.
        index: usize,
    },

    /// A required argument never appeared.
    #[error("Parse error: missing required argument '{name}'.")]
    MissingRequiredArgument {
        /// The argument.
        name: String,
    },

    /// A value, collection or cross-argument validator failed.
    #[error("Parse error: validation failed{}: {message}", subject(.name))]
    ValidationFailed {
        /// The argument, unless a class validator failed.
        name: Option<String>,
        /// The validator's explanation.
        message: String,
        /// The offending token, when one is to blame.
        index: Option<usize>,
    },

    /// A token could not be classified (ex: `--=value`).
    #[error("Parse error: malformed token '{token}': {message}.")]
    Tokenization {
        /// The malformed token.
        token: String,
        /// What is wrong with it.
        message: String,
        /// The offending token.
        index: usize,
    },

    /// A named argument that takes a value was given none.
    #[error("Parse error: argument '{name}' requires a value.")]
    MissingValue {
        /// The argument.
        name: String,
        /// The named token.
        index: usize,
    },

    /// A short name inside a combined run (ex: `-abc`) is not a switch.
    #[error("Parse error: '{name}' in '{token}' takes a value, so it must come last.")]
    CombinedShortNonSwitch {
        /// The argument.
        name: String,
        /// The combined token.
        token: String,
        /// The offending token.
        index: usize,
    },

    /// A dictionary key was supplied twice without `allow_duplicate_keys`.
    #[error("Parse error: key '{key}' was supplied more than once to '{name}'.")]
    DuplicateKey {
        /// The argument.
        name: String,
        /// The repeated key.
        key: String,
        /// The offending token.
        index: usize,
    },

    /// A `requires` or `prohibits` constraint was violated.
    #[error("Parse error: {message}")]
    DependencyFailed {
        /// The argument declaring the constraint.
        name: String,
        /// The violated constraint.
        message: String,
    },

    /// The result factory rejected the assembled values.
    #[error("Parse error: cannot create the result: {message}")]
    CreateFailed {
        /// The factory's explanation.
        message: String,
    },

    /// The command position held no known command.
    #[error("Parse error: unknown command '{name}'.")]
    UnknownCommand {
        /// The command as written.
        name: String,
        /// The offending token.
        index: usize,
    },

    /// No command was given.
    #[error("Parse error: a command is required.")]
    MissingCommand,
}

impl ParseError {
    /// The category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ParseError::UnknownArgument { .. } => ErrorCategory::UnknownArgument,
            ParseError::AmbiguousName { .. } => ErrorCategory::AmbiguousName,
            ParseError::InvalidValue { .. } => ErrorCategory::InvalidValue,
            ParseError::DuplicateArgument { .. } => ErrorCategory::DuplicateArgument,
            ParseError::TooManyPositionalArguments { .. } => {
                ErrorCategory::TooManyPositionalArguments
            }
            ParseError::MissingRequiredArgument { .. } => ErrorCategory::MissingRequiredArgument,
            ParseError::ValidationFailed { .. } => ErrorCategory::ValidationFailed,
            ParseError::Tokenization { .. } => ErrorCategory::Tokenization,
            ParseError::MissingValue { .. } => ErrorCategory::MissingValue,
            ParseError::CombinedShortNonSwitch { .. } => ErrorCategory::CombinedShortNonSwitch,
            ParseError::DuplicateKey { .. } => ErrorCategory::DuplicateKey,
            ParseError::DependencyFailed { .. } => ErrorCategory::DependencyFailed,
            ParseError::CreateFailed { .. } => ErrorCategory::CreateFailed,
            ParseError::UnknownCommand { .. } => ErrorCategory::UnknownCommand,
            ParseError::MissingCommand => ErrorCategory::MissingCommand,
        }
    }

    /// The offending argument (or command) name, when known.
    pub fn argument_name(&self) -> Option<&str> {
        match self {
            ParseError::UnknownArgument { name, .. }
            | ParseError::AmbiguousName { name, .. }
            | ParseError::InvalidValue { name, .. }
            | ParseError::DuplicateArgument { name, .. }
            | ParseError::MissingRequiredArgument { name }
            | ParseError::MissingValue { name, .. }
            | ParseError::CombinedShortNonSwitch { name, .. }
            | ParseError::DuplicateKey { name, .. }
            | ParseError::DependencyFailed { name, .. }
            | ParseError::UnknownCommand { name, .. } => Some(name),
            ParseError::ValidationFailed { name, .. } => name.as_deref(),
            ParseError::TooManyPositionalArguments { .. }
            | ParseError::Tokenization { .. }
            | ParseError::CreateFailed { .. }
            | ParseError::MissingCommand => None,
        }
    }

    /// The index of the offending token, when one is to blame.
    pub fn token_index(&self) -> Option<usize> {
        match self {
            ParseError::UnknownArgument { index, .. }
            | ParseError::AmbiguousName { index, .. }
            | ParseError::InvalidValue { index, .. }
            | ParseError::DuplicateArgument { index, .. }
            | ParseError::TooManyPositionalArguments { index, .. }
            | ParseError::Tokenization { index, .. }
            | ParseError::MissingValue { index, .. }
            | ParseError::CombinedShortNonSwitch { index, .. }
            | ParseError::DuplicateKey { index, .. }
            | ParseError::UnknownCommand { index, .. } => Some(*index),
            ParseError::ValidationFailed { index, .. } => *index,
            ParseError::MissingRequiredArgument { .. }
            | ParseError::DependencyFailed { .. }
            | ParseError::CreateFailed { .. }
            | ParseError::MissingCommand => None,
        }
    }

    /// The "did you mean" candidates of an [`ErrorCategory::AmbiguousName`] error (empty otherwise).
    pub fn candidates(&self) -> &[String] {
        match self {
            ParseError::AmbiguousName { candidates, .. } => candidates,
            _ => &[],
        }
    }
}

/// A repeated single value argument, as reported to the duplicate handler under
/// [`DuplicateArguments::Warning`](crate::DuplicateArguments::Warning).
///
/// Values are the raw texts; `None` means the argument was a switch given without a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateArgument {
    /// The argument's primary name.
    pub name: String,
    /// The text of the value currently held.
    pub old_value: Option<String>,
    /// The text of the repeated occurrence.
    pub new_value: Option<String>,
}

/// The reason a result factory could not produce its value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// No value was supplied and no default applies.
    #[error("no value for '{0}'.")]
    Missing(String),

    /// The value is not of the requested type.
    #[error("the value for '{name}' is not a {expected}.")]
    WrongType {
        /// The argument.
        name: String,
        /// The requested type.
        expected: &'static str,
    },

    /// Any other reason.
    #[error("{0}")]
    Invalid(String),
}

/// Which of the four outcomes a [`ParseResult`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ParseStatus {
    Success,
    Error,
    HelpRequested,
    Canceled,
}

/// A successful parse.
#[derive(Debug)]
pub struct Parsed<T> {
    /// The value built by the result factory.
    pub value: T,
    /// Tokens left unconsumed because an argument stopped the parse with [`CancelMode::Success`](crate::CancelMode::Success).
    pub remaining: Vec<String>,
    /// Every duplicate reported under [`DuplicateArguments::Warning`](crate::DuplicateArguments::Warning).
    pub warnings: Vec<DuplicateArgument>,
}

/// The outcome of one parse.
///
/// `HelpRequested` and `Canceled` are not errors; check for them before treating a result as a failure.
#[derive(Debug)]
pub enum ParseResult<T> {
    /// The tokens were parsed and the result built.
    Success(Parsed<T>),
    /// The parse failed.
    Error(ParseError),
    /// A help trigger was encountered; no value was built.
    HelpRequested {
        /// The primary name of the help trigger.
        argument: String,
        /// The usage of the parser the help was requested from.
        usage: Usage,
    },
    /// An argument (or converter) stopped the parse; no value was built.
    Canceled {
        /// The primary name of the canceling argument.
        argument: String,
        /// The tokens after the canceling one.
        remaining: Vec<String>,
    },
}

impl<T> ParseResult<T> {
    /// Which outcome this is.
    pub fn status(&self) -> ParseStatus {
        match self {
            ParseResult::Success(_) => ParseStatus::Success,
            ParseResult::Error(_) => ParseStatus::Error,
            ParseResult::HelpRequested { .. } => ParseStatus::HelpRequested,
            ParseResult::Canceled { .. } => ParseStatus::Canceled,
        }
    }

    /// The built value, if the parse succeeded.
    pub fn ok(self) -> Option<T> {
        match self {
            ParseResult::Success(parsed) => Some(parsed.value),
            _ => None,
        }
    }

    /// The error, if the parse failed.
    pub fn error(&self) -> Option<&ParseError> {
        match self {
            ParseResult::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Transform the built value, keeping every other outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<U> {
        match self {
            ParseResult::Success(Parsed {
                value,
                remaining,
                warnings,
            }) => ParseResult::Success(Parsed {
                value: f(value),
                remaining,
                warnings,
            }),
            ParseResult::Error(error) => ParseResult::Error(error),
            ParseResult::HelpRequested { argument, usage } => {
                ParseResult::HelpRequested { argument, usage }
            }
            ParseResult::Canceled {
                argument,
                remaining,
            } => ParseResult::Canceled {
                argument,
                remaining,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        ParseError::UnknownArgument { name: "--x".to_string(), index: 2 },
        ErrorCategory::UnknownArgument, Some("--x"), Some(2),
        "Parse error: unknown argument '--x'."
    )]
    #[case(
        ParseError::AmbiguousName { name: "fo".to_string(), candidates: vec!["foo".to_string(), "foobar".to_string()], index: 0 },
        ErrorCategory::AmbiguousName, Some("fo"), Some(0),
        "Parse error: argument 'fo' is ambiguous, could be any of: foo, foobar."
    )]
    #[case(
        ParseError::ValidationFailed { name: Some("port".to_string()), message: "'0' must be between 1 and 9.".to_string(), index: Some(1) },
        ErrorCategory::ValidationFailed, Some("port"), Some(1),
        "Parse error: validation failed for 'port': '0' must be between 1 and 9."
    )]
    #[case(
        ParseError::ValidationFailed { name: None, message: "pick one".to_string(), index: None },
        ErrorCategory::ValidationFailed, None, None,
        "Parse error: validation failed: pick one"
    )]
    #[case(
        ParseError::MissingRequiredArgument { name: "file".to_string() },
        ErrorCategory::MissingRequiredArgument, Some("file"), None,
        "Parse error: missing required argument 'file'."
    )]
    #[case(
        ParseError::TooManyPositionalArguments { token: "extra".to_string(), index: 4 },
        ErrorCategory::TooManyPositionalArguments, None, Some(4),
        "Parse error: unexpected positional argument 'extra'."
    )]
    #[case(
        ParseError::MissingCommand,
        ErrorCategory::MissingCommand, None, None,
        "Parse error: a command is required."
    )]
    fn accessors(
        #[case] error: ParseError,
        #[case] category: ErrorCategory,
        #[case] name: Option<&str>,
        #[case] index: Option<usize>,
        #[case] message: &str,
    ) {
        assert_eq!(error.category(), category);
        assert_eq!(error.argument_name(), name);
        assert_eq!(error.token_index(), index);
        assert_eq!(error.to_string(), message);
    }

    #[test]
    fn candidates() {
        let error = ParseError::AmbiguousName {
            name: "fo".to_string(),
            candidates: vec!["foo".to_string(), "foobar".to_string()],
            index: 0,
        };
        assert_eq!(error.candidates(), &["foo".to_string(), "foobar".to_string()]);
        assert!(ParseError::MissingCommand.candidates().is_empty());
    }

    #[test]
    fn result_status() {
        let success: ParseResult<u32> = ParseResult::Success(Parsed {
            value: 1,
            remaining: Vec::default(),
            warnings: Vec::default(),
        });
        assert_eq!(success.status(), ParseStatus::Success);
        assert_eq!(success.map(|v| v + 1).ok(), Some(2));

        let error: ParseResult<u32> = ParseResult::Error(ParseError::MissingCommand);
        assert_eq!(error.status(), ParseStatus::Error);
        assert_eq!(error.error(), Some(&ParseError::MissingCommand));
        assert_eq!(error.ok(), None);

        let canceled: ParseResult<u32> = ParseResult::Canceled {
            argument: "version".to_string(),
            remaining: vec!["x".to_string()],
        };
        assert_eq!(canceled.status(), ParseStatus::Canceled);
        assert!(canceled.error().is_none());
    }
}
