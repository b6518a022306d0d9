pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_ALIAS: char = '?';
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";

pub(crate) const LONG_PREFIX: &str = "--";
pub(crate) const SHORT_PREFIX: &str = "-";
#[cfg(windows)]
pub(crate) const LEGACY_PREFIXES: &[&str] = &["-", "/"];
#[cfg(not(windows))]
pub(crate) const LEGACY_PREFIXES: &[&str] = &["-"];
pub(crate) const TERMINATOR: &str = "--";

pub(crate) const NAME_VALUE_SEPARATORS: &[char] = &['=', ':'];
pub(crate) const KEY_VALUE_SEPARATOR: &str = "=";
