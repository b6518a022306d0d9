use std::borrow::Cow;

/// The cardinality of values a [`Collection`](crate::Collection) must end up with.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `N`: Precisely `N` values.
    Precisely(u8),
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
}

impl Nargs {
    pub(crate) fn admits(&self, count: usize) -> bool {
        match self {
            Nargs::Precisely(n) => count == *n as usize,
            Nargs::Any => true,
            Nargs::AtLeastOne => count >= 1,
        }
    }
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Nargs::Precisely(n) => write!(f, "precisely {n}"),
            Nargs::Any => write!(f, "any number of"),
            Nargs::AtLeastOne => write!(f, "at least one"),
        }
    }
}

/// How repeated occurrences of an argument accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    /// One value; repeats are governed by [`DuplicateArguments`].
    SingleValue,
    /// An ordered sequence; every occurrence appends.
    MultiValue,
    /// Key/value entries; every occurrence inserts.
    Dictionary,
    /// A callback invoked as soon as the argument is encountered.
    Method,
}

impl ArgumentKind {
    pub(crate) fn is_accumulating(&self) -> bool {
        matches!(self, ArgumentKind::MultiValue | ArgumentKind::Dictionary)
    }
}

/// The command line syntax to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `--long` names and `-s` short names use separate prefixes.
    LongShort,
    /// A single prefix set (ex: `-name` or `/name`) serves every name.
    Legacy,
}

/// The policy for a single value argument supplied more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateArguments {
    /// Fail the parse with `DuplicateArgument`.
    Error,
    /// Notify the duplicate handler and continue.
    Warning,
    /// Silently keep the newest value.
    Allow,
}

/// The policy for a named token that matches no argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownArguments {
    /// Fail the parse with `UnknownArgument`.
    Error,
    /// Skip the token and keep scanning.
    Ignore,
}

/// Which outcome wins when a help trigger and a fatal error both occur in one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpPrecedence {
    /// A help trigger anywhere in the tokens yields `HelpRequested`, even after an earlier error.
    Always,
    /// Whichever comes first in token order wins.
    FirstError,
}

/// What happens to the parse once an argument has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelMode {
    /// Keep parsing.
    None,
    /// Stop and report `Canceled`.
    Abort,
    /// Stop scanning and assemble what has been parsed, handing back the remaining tokens.
    Success,
}

/// The answer from a duplicate handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateAction {
    /// Discard the new occurrence.
    KeepOld,
    /// Replace the previous value.
    KeepNew,
}

/// Number formatting conventions handed to every value converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Culture {
    name: String,
    decimal_separator: char,
    group_separator: Option<char>,
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl Culture {
    /// The culture independent conventions (`.` decimal separator, no grouping).
    pub fn invariant() -> Self {
        Self {
            name: String::default(),
            decimal_separator: '.',
            group_separator: None,
        }
    }

    /// Describe a culture by its number separators.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::Culture;
    ///
    /// let german = Culture::new("de-DE", ',', Some('.'));
    /// assert_eq!(german.name(), "de-DE");
    /// ```
    pub fn new(name: impl Into<String>, decimal_separator: char, group_separator: Option<char>) -> Self {
        Self {
            name: name.into(),
            decimal_separator,
            group_separator,
        }
    }

    /// The culture identifier (empty for the invariant culture).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The character separating the integral and fractional parts.
    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// The thousands grouping character, if any.
    pub fn group_separator(&self) -> Option<char> {
        self.group_separator
    }

    /// Rewrite a number in this culture into the form `FromStr` expects.
    pub(crate) fn normalize_number<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let grouped = self
            .group_separator
            .map(|g| text.contains(g))
            .unwrap_or(false);

        if self.decimal_separator == '.' && !grouped {
            return Cow::Borrowed(text);
        }

        let normalized = text
            .chars()
            .filter(|c| Some(*c) != self.group_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();
        Cow::Owned(normalized)
    }
}
