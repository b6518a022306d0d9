use crate::api::Capturable;
use crate::model::{ArgumentKind, CancelMode, Nargs};

/// The normalized, immutable description of one accepted argument.
///
/// Descriptors are produced by the builder (see [`CommandLineParser::add`](crate::CommandLineParser::add)),
/// validated once when the parser is built, and shared read-only by every parse thereafter.
pub struct ArgumentDescriptor {
    pub(crate) name: String,
    pub(crate) short_name: Option<char>,
    pub(crate) aliases: Vec<String>,
    pub(crate) short_aliases: Vec<char>,
    pub(crate) position: Option<usize>,
    pub(crate) named: bool,
    pub(crate) required: bool,
    pub(crate) multi_value_separator: Option<char>,
    pub(crate) key_value_separator: Option<String>,
    pub(crate) allow_duplicate_keys: bool,
    pub(crate) cancel: CancelMode,
    pub(crate) help_trigger: bool,
    pub(crate) requires: Vec<String>,
    pub(crate) prohibits: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) value_description: Option<String>,
    pub(crate) capture: Box<dyn Capturable>,
}

impl std::fmt::Debug for ArgumentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short = match &self.short_name {
            Some(s) => format!(" -{s},"),
            None => "".to_string(),
        };
        let position = match &self.position {
            Some(p) => format!(" @{p}"),
            None => "".to_string(),
        };

        write!(
            f,
            "{kind:?}[{t}, {name},{short}{position}{required}]",
            kind = self.kind(),
            t = self.type_name(),
            name = self.name,
            required = if self.required { " required" } else { "" },
        )
    }
}

impl ArgumentDescriptor {
    /// The primary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The single character name, if any.
    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    /// Additional names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Additional single character names.
    pub fn short_aliases(&self) -> &[char] {
        &self.short_aliases
    }

    /// The ordinal for positional binding; `None` for named-only arguments.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Whether the argument is reachable by name (positional arguments are, unless hidden).
    pub fn is_named(&self) -> bool {
        self.named
    }

    /// Whether the parse fails when the argument is absent.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The accumulation semantics.
    pub fn kind(&self) -> ArgumentKind {
        self.capture.kind()
    }

    /// The element type (for dictionaries, the map type).
    pub fn type_name(&self) -> &'static str {
        self.capture.type_name()
    }

    /// Whether presence alone sets the value.
    pub fn is_switch(&self) -> bool {
        self.capture.is_switch()
    }

    /// Whether an explicitly empty value means "no value".
    pub fn allows_null(&self) -> bool {
        self.capture.allows_null()
    }

    /// The cardinality constraint of a multi-value argument.
    pub fn nargs(&self) -> Option<Nargs> {
        self.capture.nargs()
    }

    /// The names accepted by a choices converter.
    pub fn choices(&self) -> Vec<String> {
        self.capture.choices()
    }

    /// The declared default, rendered as text.
    pub fn default_text(&self) -> Option<String> {
        self.capture.default_text()
    }

    /// The separator splitting one token into many values.
    pub fn multi_value_separator(&self) -> Option<char> {
        self.multi_value_separator
    }

    /// The separator between a dictionary entry's key and value.
    pub fn key_value_separator(&self) -> Option<&str> {
        self.key_value_separator.as_deref()
    }

    /// Whether a repeated dictionary key overwrites rather than fails.
    pub fn allows_duplicate_keys(&self) -> bool {
        self.allow_duplicate_keys
    }

    /// What happens to the parse once this argument is processed.
    pub fn cancel_mode(&self) -> CancelMode {
        self.cancel
    }

    /// Whether encountering this argument requests help.
    pub fn is_help_trigger(&self) -> bool {
        self.help_trigger
    }

    /// Arguments which must also be supplied whenever this one is.
    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    /// Arguments which must not be supplied whenever this one is.
    pub fn prohibits(&self) -> &[String] {
        &self.prohibits
    }

    /// The help text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The placeholder for the value in usage output.
    pub fn value_description(&self) -> Option<&str> {
        self.value_description.as_deref()
    }

    pub(crate) fn is_accumulating(&self) -> bool {
        self.kind().is_accumulating()
    }

    pub(crate) fn all_names(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.name).chain(self.aliases.iter())
    }

    pub(crate) fn all_shorts(&self) -> impl Iterator<Item = &char> {
        self.short_name.iter().chain(self.short_aliases.iter())
    }
}
