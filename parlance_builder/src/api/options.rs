use crate::constant::*;
use crate::model::*;

/// Settings shared by every parse a [`Parser`](crate::Parser) performs.
///
/// The value is immutable once handed to a parser, so the same options may be reused across
/// parsers (ex: every command of a [`CommandManager`](crate::CommandManager)).
///
/// ### Example
/// ```
/// # use parlance_builder as parlance;
/// use parlance::{DuplicateArguments, Mode, ParseOptions};
///
/// let options = ParseOptions::default()
///     .mode(Mode::Legacy)
///     .case_sensitive(true)
///     .duplicate_arguments(DuplicateArguments::Allow);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    mode: Mode,
    case_sensitive: bool,
    prefixes: Vec<String>,
    long_prefix: String,
    name_value_separators: Vec<char>,
    allow_white_space_value_separator: bool,
    auto_prefix: bool,
    duplicate_arguments: DuplicateArguments,
    unknown_arguments: UnknownArguments,
    help_precedence: HelpPrecedence,
    culture: Culture,
    key_value_separator: String,
    multi_value_separator: Option<char>,
    auto_help: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: Mode::LongShort,
            case_sensitive: false,
            prefixes: vec![SHORT_PREFIX.to_string()],
            long_prefix: LONG_PREFIX.to_string(),
            name_value_separators: NAME_VALUE_SEPARATORS.to_vec(),
            allow_white_space_value_separator: true,
            auto_prefix: true,
            duplicate_arguments: DuplicateArguments::Error,
            unknown_arguments: UnknownArguments::Error,
            help_precedence: HelpPrecedence::Always,
            culture: Culture::invariant(),
            key_value_separator: KEY_VALUE_SEPARATOR.to_string(),
            multi_value_separator: None,
            auto_help: true,
        }
    }
}

impl ParseOptions {
    /// Select the command line syntax.
    /// Switching modes resets the argument name prefixes to the mode's defaults.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self.prefixes = match mode {
            Mode::LongShort => vec![SHORT_PREFIX.to_string()],
            Mode::Legacy => LEGACY_PREFIXES.iter().map(|p| p.to_string()).collect(),
        };
        self
    }

    /// Whether argument names are compared case sensitively (default: `false`).
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Replace the argument name prefixes.
    /// In [`Mode::LongShort`] these introduce short names; in [`Mode::Legacy`] they introduce every name.
    pub fn prefixes<S: Into<String>>(mut self, prefixes: impl IntoIterator<Item = S>) -> Self {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        // Longest first, so that `--` is tried before `-`.
        self.prefixes.sort_by(|a, b| b.len().cmp(&a.len()));
        self
    }

    /// Replace the long name prefix used in [`Mode::LongShort`] (default: `--`).
    pub fn long_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.long_prefix = prefix.into();
        self
    }

    /// Replace the characters separating a name from an inline value (default: `=` and `:`).
    pub fn name_value_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.name_value_separators = separators.into_iter().collect();
        self
    }

    /// Whether `--name value` is accepted in addition to `--name=value` (default: `true`).
    pub fn allow_white_space_value_separator(mut self, allow: bool) -> Self {
        self.allow_white_space_value_separator = allow;
        self
    }

    /// Whether a unique prefix of a long name resolves to that argument (default: `true`).
    pub fn auto_prefix(mut self, auto_prefix: bool) -> Self {
        self.auto_prefix = auto_prefix;
        self
    }

    /// How to treat repeats of single value arguments (default: [`DuplicateArguments::Error`]).
    pub fn duplicate_arguments(mut self, policy: DuplicateArguments) -> Self {
        self.duplicate_arguments = policy;
        self
    }

    /// How to treat named tokens matching no argument (default: [`UnknownArguments::Error`]).
    pub fn unknown_arguments(mut self, policy: UnknownArguments) -> Self {
        self.unknown_arguments = policy;
        self
    }

    /// Whether a help trigger outranks an earlier error (default: [`HelpPrecedence::Always`]).
    pub fn help_precedence(mut self, precedence: HelpPrecedence) -> Self {
        self.help_precedence = precedence;
        self
    }

    /// The culture handed to value converters (default: [`Culture::invariant`]).
    pub fn culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    /// The separator between dictionary keys and values, unless the argument sets its own (default: `=`).
    pub fn key_value_separator(mut self, separator: impl Into<String>) -> Self {
        self.key_value_separator = separator.into();
        self
    }

    /// A separator splitting one token into many values for every multi-value argument
    /// that does not set its own (default: none).
    pub fn multi_value_separator(mut self, separator: Option<char>) -> Self {
        self.multi_value_separator = separator;
        self
    }

    /// Whether the `--help`/`-h`/`-?` argument is added automatically (default: `true`).
    pub fn auto_help(mut self, auto_help: bool) -> Self {
        self.auto_help = auto_help;
        self
    }

    pub(crate) fn syntax(&self) -> Mode {
        self.mode
    }

    pub(crate) fn name_prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub(crate) fn long_name_prefix(&self) -> &str {
        &self.long_prefix
    }

    pub(crate) fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub(crate) fn separators(&self) -> &[char] {
        &self.name_value_separators
    }

    pub(crate) fn white_space_values(&self) -> bool {
        self.allow_white_space_value_separator
    }

    pub(crate) fn prefix_matching(&self) -> bool {
        self.auto_prefix
    }

    pub(crate) fn duplicates(&self) -> DuplicateArguments {
        self.duplicate_arguments
    }

    pub(crate) fn unknowns(&self) -> UnknownArguments {
        self.unknown_arguments
    }

    pub(crate) fn precedence(&self) -> HelpPrecedence {
        self.help_precedence
    }

    pub(crate) fn culture_ref(&self) -> &Culture {
        &self.culture
    }

    pub(crate) fn default_key_value_separator(&self) -> &str {
        &self.key_value_separator
    }

    pub(crate) fn default_multi_value_separator(&self) -> Option<char> {
        self.multi_value_separator
    }

    pub(crate) fn has_auto_help(&self) -> bool {
        self.auto_help
    }
}
