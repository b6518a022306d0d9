use crate::api::{Capturable, CliArgument, CliOption};
use crate::matcher::ArgumentDescriptor;
use crate::model::CancelMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParameterClass {
    Opt,
    Arg,
}

pub(super) struct ParameterInner {
    class: ParameterClass,
    capture: Box<dyn Capturable>,
    name: String,
    short: Option<char>,
    aliases: Vec<String>,
    short_aliases: Vec<char>,
    description: Option<String>,
    meta: Option<String>,
    required: bool,
    position: Option<usize>,
    positional_only: bool,
    separator: Option<char>,
    key_value_separator: Option<String>,
    allow_duplicate_keys: bool,
    cancel: CancelMode,
    help_trigger: bool,
    requires: Vec<String>,
    prohibits: Vec<String>,
}

impl ParameterInner {
    pub(super) fn class(&self) -> ParameterClass {
        self.class
    }

    pub(super) fn name(&self) -> &str {
        &self.name
    }

    /// The explicitly requested position, if any.
    pub(super) fn position(&self) -> Option<usize> {
        self.position
    }

    /// Normalize into a descriptor; `position` is the final ordinal of an argument parameter.
    pub(super) fn descriptor(self, position: Option<usize>) -> ArgumentDescriptor {
        let ParameterInner {
            class,
            capture,
            name,
            short,
            aliases,
            short_aliases,
            description,
            meta,
            required,
            positional_only,
            separator,
            key_value_separator,
            allow_duplicate_keys,
            cancel,
            help_trigger,
            requires,
            prohibits,
            ..
        } = self;

        ArgumentDescriptor {
            name,
            short_name: short,
            aliases,
            short_aliases,
            position: match class {
                ParameterClass::Opt => None,
                ParameterClass::Arg => position,
            },
            named: class == ParameterClass::Opt || !positional_only,
            required,
            multi_value_separator: separator,
            key_value_separator,
            allow_duplicate_keys,
            cancel,
            help_trigger,
            requires,
            prohibits,
            description,
            value_description: meta,
            capture,
        }
    }
}

impl std::fmt::Debug for ParameterInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let class = match &self.class {
            ParameterClass::Opt => "Opt",
            ParameterClass::Arg => "Arg",
        };
        let name = match &self.class {
            ParameterClass::Opt => format!("--{n}", n = self.name),
            ParameterClass::Arg => self.name.clone(),
        };
        let short = match &self.short {
            Some(s) => format!(", -{s}"),
            None => "".to_string(),
        };
        let description = if let Some(d) = &self.description {
            format!(", {d}")
        } else {
            "".to_string()
        };

        write!(
            f,
            "{class}[{t}, {kind:?}, {name}{short}{description}]",
            t = self.capture.type_name(),
            kind = self.capture.kind(),
        )
    }
}

/// A named option or positional argument of the command line parser.
///
/// Construct with [`Parameter::option`] or [`Parameter::argument`], then refine with the chained setters.
#[derive(Debug)]
pub struct Parameter(ParameterInner);

impl Parameter {
    fn new(class: ParameterClass, capture: Box<dyn Capturable>, name: String) -> Self {
        Parameter(ParameterInner {
            class,
            capture,
            name,
            short: None,
            aliases: Vec::default(),
            short_aliases: Vec::default(),
            description: None,
            meta: None,
            required: false,
            position: None,
            positional_only: false,
            separator: None,
            key_value_separator: None,
            allow_duplicate_keys: false,
            cancel: CancelMode::None,
            help_trigger: false,
            requires: Vec::default(),
            prohibits: Vec::default(),
        })
    }

    /// Create a named option parameter.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{Parameter, Scalar, Switch};
    ///
    /// Parameter::option(Scalar::<u32>::new(), "count").short('c');
    /// Parameter::option(Switch::new(), "verbose").short('v');
    /// ```
    pub fn option(field: impl Capturable + CliOption + 'static, name: impl Into<String>) -> Self {
        Self::new(ParameterClass::Opt, Box::new(field), name.into())
    }

    /// Create a positional argument parameter.
    ///
    /// Positions follow declaration order unless [`Parameter::position`] is given.
    /// The argument can also be supplied by name, unless [`Parameter::positional_only`].
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{Collection, Nargs, Parameter, Scalar};
    ///
    /// Parameter::argument(Scalar::<String>::new(), "source").required();
    /// Parameter::argument(Collection::<Vec<String>, String>::new(Nargs::AtLeastOne), "targets");
    /// ```
    pub fn argument(field: impl Capturable + CliArgument + 'static, name: impl Into<String>) -> Self {
        Self::new(ParameterClass::Arg, Box::new(field), name.into())
    }

    /// Specify the short name, matched as `-s` (or `-s` / `/s` in [`Mode::Legacy`](crate::Mode::Legacy)).
    /// If repeated, only the final short name will apply.
    pub fn short(mut self, short: char) -> Self {
        self.0.short.replace(short);
        self
    }

    /// Add another name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.0.aliases.push(alias.into());
        self
    }

    /// Add another short name.
    pub fn short_alias(mut self, short: char) -> Self {
        self.0.short_aliases.push(short);
        self
    }

    /// Document the parameter.
    /// If repeated, only the final help message will apply.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.0.description.replace(description.into());
        self
    }

    /// Name the value in usage output (ex: `FILE` in `--output FILE`).
    pub fn meta(mut self, meta: impl Into<String>) -> Self {
        self.0.meta.replace(meta.into());
        self
    }

    /// Fail the parse when the parameter is absent.
    pub fn required(mut self) -> Self {
        self.0.required = true;
        self
    }

    /// Bind the argument at this position instead of its declaration order.
    /// Applies only to [`Parameter::argument`]; building a parser with a positioned option is a [`ConfigError`](crate::ConfigError).
    pub fn position(mut self, position: usize) -> Self {
        self.0.position.replace(position);
        self
    }

    /// Do not accept the argument by name.
    pub fn positional_only(mut self) -> Self {
        self.0.positional_only = true;
        self
    }

    /// Split each value token of a collection or dictionary at `separator`.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{Collection, CommandLineParser, Nargs, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::option(Collection::<Vec<u32>, u32>::new(Nargs::Any), "id").separator(','))
    ///     .build_parser(|arguments| arguments.take::<Vec<u32>>("id"))
    ///     .unwrap();
    ///
    /// assert_eq!(parser.parse_tokens(&["--id", "1,2", "--id", "3"]).ok(), Some(vec![1, 2, 3]));
    /// ```
    pub fn separator(mut self, separator: char) -> Self {
        self.0.separator.replace(separator);
        self
    }

    /// Split dictionary entries at `separator` rather than the configured default.
    pub fn key_value_separator(mut self, separator: impl Into<String>) -> Self {
        self.0.key_value_separator.replace(separator.into());
        self
    }

    /// Let a repeated dictionary key overwrite the earlier value rather than fail.
    pub fn allow_duplicate_keys(mut self) -> Self {
        self.0.allow_duplicate_keys = true;
        self
    }

    /// Stop the parse once this parameter is processed.
    pub fn cancel(mut self, cancel: CancelMode) -> Self {
        self.0.cancel = cancel;
        self
    }

    /// Treat this option as a help request.
    pub fn help_trigger(mut self) -> Self {
        self.0.help_trigger = true;
        self
    }

    /// Whenever this parameter is supplied, `name` must be too.
    pub fn requires(mut self, name: impl Into<String>) -> Self {
        self.0.requires.push(name.into());
        self
    }

    /// Whenever this parameter is supplied, `name` must not be.
    pub fn prohibits(mut self, name: impl Into<String>) -> Self {
        self.0.prohibits.push(name.into());
        self
    }

    pub(super) fn consume(self) -> ParameterInner {
        self.0
    }
}
