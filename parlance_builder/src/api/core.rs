use crate::api::parameter::{Parameter, ParameterClass, ParameterInner};
use crate::api::ParseOptions;
use crate::matcher::{ArgumentDescriptor, DuplicateHandler, Schema};
use crate::model::DuplicateAction;
use crate::parser::{
    ClassValidator, ConfigError, DuplicateArgument, Factory, ParsedArguments, Parser, Usage,
    ValueError,
};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The base command line parser.
///
/// ### Example
/// ```
/// # use parlance_builder as parlance;
/// use parlance::{CommandLineParser};
///
/// let parser = CommandLineParser::new("program")
///     // Configure with CommandLineParser::add.
///     .build(|_| Ok(()));
/// assert_eq!(parser.parse_tokens(empty::slice()).ok(), Some(()));
/// ```
pub struct CommandLineParser {
    program: String,
    about: Option<String>,
    options: ParseOptions,
    parameters: Vec<ParameterInner>,
    validators: Vec<Box<ClassValidator>>,
    on_duplicate: Option<Box<DuplicateHandler>>,
}

impl CommandLineParser {
    /// Create a command line parser.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::CommandLineParser;
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .build(|_| Ok(()));
    ///
    /// parser.parse_tokens(vec![].as_slice()).ok().unwrap();
    /// ```
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            options: ParseOptions::default(),
            parameters: Vec::default(),
            validators: Vec::default(),
            on_duplicate: None,
        }
    }

    /// Document the about message for this command line parser.
    /// If repeated, only the final help message will apply.
    ///
    /// An about message documents the command line parser in full sentence/paragraph format.
    /// We recommend allowing `parlance` to format this field (ex: it is not recommended to use line breaks `'\n'`).
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Replace the parse options (syntax, name matching, duplicate and unknown policies, culture, ...).
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{CommandLineParser, DuplicateArguments, Parameter, ParseOptions, Scalar};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .options(ParseOptions::default().duplicate_arguments(DuplicateArguments::Allow))
    ///     .add(Parameter::option(Scalar::<u32>::new(), "count"))
    ///     .build(|arguments| arguments.take::<u32>("count"));
    ///
    /// assert_eq!(parser.parse_tokens(&["--count", "1", "--count", "2"]).ok(), Some(2));
    /// ```
    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Add an argument/option to the command line parser.
    ///
    /// The order of argument parameters corresponds to their positional order during parsing (unless given an explicit [`Parameter::position`]).
    /// The order of option parameters does not affect the command parser semantics.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{CommandLineParser, Parameter, Scalar};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::argument(Scalar::<u32>::new(), "a"))
    ///     .add(Parameter::argument(Scalar::<u32>::new(), "b"))
    ///     .build(|arguments| Ok((arguments.take::<u32>("a")?, arguments.take::<u32>("b")?)));
    ///
    /// assert_eq!(parser.parse_tokens(&["1", "2"]).ok(), Some((1, 2)));
    /// ```
    pub fn add(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter.consume());
        self
    }

    /// Add a check across the assembled values, run after every per-argument check.
    /// An `Err` message fails the parse with [`ParseError::ValidationFailed`](crate::ParseError::ValidationFailed).
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{CommandLineParser, Parameter, ParseStatus, Scalar};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::option(Scalar::<u32>::new().default(0), "low"))
    ///     .add(Parameter::option(Scalar::<u32>::new().default(9), "high"))
    ///     .validate(|arguments| match (arguments.get::<u32>("low"), arguments.get::<u32>("high")) {
    ///         (Some(low), Some(high)) if low > high => Err("low must not exceed high.".to_string()),
    ///         _ => Ok(()),
    ///     })
    ///     .build(|_| Ok(()));
    ///
    /// assert_eq!(parser.parse_tokens(&["--low", "10"]).status(), ParseStatus::Error);
    /// ```
    pub fn validate(
        mut self,
        validator: impl Fn(&ParsedArguments) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Decide repeated single value arguments under [`DuplicateArguments::Warning`](crate::DuplicateArguments::Warning).
    /// Without a handler the later value wins.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{CommandLineParser, DuplicateAction, DuplicateArguments, Parameter, ParseOptions, Scalar};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .options(ParseOptions::default().duplicate_arguments(DuplicateArguments::Warning))
    ///     .on_duplicate(|duplicate| {
    ///         eprintln!("'{}' given twice, keeping the first.", duplicate.name);
    ///         DuplicateAction::KeepOld
    ///     })
    ///     .add(Parameter::option(Scalar::<u32>::new(), "count"))
    ///     .build(|arguments| arguments.take::<u32>("count"));
    ///
    /// assert_eq!(parser.parse_tokens(&["--count", "1", "--count", "2"]).ok(), Some(1));
    /// ```
    pub fn on_duplicate(
        mut self,
        handler: impl Fn(&DuplicateArgument) -> DuplicateAction + Send + Sync + 'static,
    ) -> Self {
        self.on_duplicate.replace(Box::new(handler));
        self
    }

    /// Build the command line parser as a Result.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    ///
    /// `factory` turns the assembled values into the result of each successful parse.
    pub fn build_parser<T>(
        self,
        factory: impl Fn(&mut ParsedArguments) -> Result<T, ValueError> + Send + Sync + 'static,
    ) -> Result<Parser<T>, ConfigError> {
        let CommandLineParser {
            program,
            about,
            options,
            parameters,
            validators,
            on_duplicate,
        } = self;

        if let Some(parameter) = parameters
            .iter()
            .find(|p| p.class() == ParameterClass::Opt && p.position().is_some())
        {
            return Err(ConfigError(format!(
                "option '{}' cannot take a position.",
                parameter.name()
            )));
        }

        let descriptors = normalize(parameters);
        let schema = Schema::new(descriptors, &options)?;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Built schema for '{program}': {:?}.", schema.descriptors());
        }

        let usage = Usage::describe(&program, about.as_deref(), &schema, &options);
        let factory: Box<Factory<T>> = Box::new(factory);

        Ok(Parser::new(
            schema,
            options,
            validators,
            on_duplicate,
            factory,
            usage,
        ))
    }

    /// Build the command line parser.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build<T>(
        self,
        factory: impl Fn(&mut ParsedArguments) -> Result<T, ValueError> + Send + Sync + 'static,
    ) -> Parser<T> {
        match self.build_parser(factory) {
            Ok(parser) => parser,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

/// Turn the parameters into descriptors, in declaration order.
///
/// Argument parameters without an explicit position take the lowest free positions, in declaration order.
fn normalize(parameters: Vec<ParameterInner>) -> Vec<ArgumentDescriptor> {
    let taken: Vec<usize> = parameters
        .iter()
        .filter(|p| p.class() == ParameterClass::Arg)
        .filter_map(ParameterInner::position)
        .collect();
    let mut next = 0;

    parameters
        .into_iter()
        .map(|parameter| match parameter.class() {
            ParameterClass::Opt => parameter.descriptor(None),
            ParameterClass::Arg => {
                let position = match parameter.position() {
                    Some(position) => position,
                    None => {
                        while taken.contains(&next) {
                            next += 1;
                        }

                        next += 1;
                        next - 1
                    }
                };
                parameter.descriptor(Some(position))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Collection, Scalar, Switch};
    use crate::model::Nargs;
    use crate::parser::{ParseError, ParseResult};
    use crate::test::assert_contains;
    use rstest::rstest;

    #[test]
    fn empty() {
        // Setup
        let parser = CommandLineParser::new("program").build(|_| Ok(()));

        // Execute
        let result = parser.parse_tokens(empty::slice());

        // Verify
        assert_eq!(result.ok(), Some(()));
        assert_eq!(parser.descriptors().len(), 1);
        assert_eq!(parser.usage().program, "program");
    }

    #[test]
    fn about() {
        let parser = CommandLineParser::new("program")
            .about("first")
            .about("second")
            .build(|_| Ok(()));
        assert_eq!(parser.usage().about, Some("second".to_string()));
    }

    #[rstest]
    #[case(vec![None, None, None], vec![0, 1, 2])]
    #[case(vec![Some(0), None, None], vec![0, 1, 2])]
    #[case(vec![None, Some(0), None], vec![1, 0, 2])]
    #[case(vec![None, None, Some(0)], vec![1, 2, 0])]
    #[case(vec![Some(2), None, Some(0)], vec![2, 1, 0])]
    #[case(vec![None, Some(5), None], vec![0, 5, 1])]
    fn positions(#[case] explicit: Vec<Option<usize>>, #[case] expected: Vec<usize>) {
        // Setup
        let mut builder = CommandLineParser::new("program")
            .options(ParseOptions::default().auto_help(false));

        for (i, position) in explicit.into_iter().enumerate() {
            let mut parameter = Parameter::argument(Scalar::<u32>::new(), format!("arg{i}"));

            if let Some(position) = position {
                parameter = parameter.position(position);
            }

            builder = builder.add(parameter);
        }

        // Execute
        let parser = builder.build_parser(|_| Ok(())).unwrap();

        // Verify
        let positions: Vec<usize> = parser
            .descriptors()
            .iter()
            .map(|d| d.position().unwrap())
            .collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn options_are_not_positional() {
        let parser = CommandLineParser::new("program")
            .add(Parameter::option(Scalar::<u32>::new(), "count"))
            .add(Parameter::argument(Scalar::<u32>::new(), "item"))
            .build(|_| Ok(()));
        let positions: Vec<Option<usize>> = parser
            .descriptors()
            .iter()
            .map(|d| d.position())
            .collect();
        assert_eq!(positions, vec![None, None, Some(0)]);
    }

    #[rstest]
    #[case(
        Parameter::option(Scalar::<u32>::new(), "count").position(0),
        Parameter::argument(Scalar::<u32>::new(), "item"),
        "Config error: option 'count' cannot take a position."
    )]
    #[case(
        Parameter::option(Scalar::<u32>::new(), "count"),
        Parameter::option(Scalar::<u32>::new(), "COUNT"),
        "Config error: the name 'COUNT' is declared more than once."
    )]
    #[case(
        Parameter::option(Switch::new(), "a").short('x'),
        Parameter::option(Switch::new(), "b").short('x'),
        "Config error: the short name 'x' is declared more than once."
    )]
    #[case(
        Parameter::argument(Scalar::<u32>::new(), "a"),
        Parameter::argument(Scalar::<u32>::new(), "b").required(),
        "Config error: required positional argument 'b' cannot follow optional positional argument 'a'."
    )]
    #[case(
        Parameter::argument(Collection::<Vec<u32>, u32>::new(Nargs::Any), "a"),
        Parameter::argument(Scalar::<u32>::new(), "b"),
        "Config error: positional argument 'a' takes many values, so it must be the last positional argument."
    )]
    #[case(
        Parameter::option(Scalar::<u32>::new(), "a").requires("c"),
        Parameter::option(Scalar::<u32>::new(), "b"),
        "Config error: 'a' refers to unknown argument 'c'."
    )]
    #[case(
        Parameter::option(Scalar::<u32>::new(), "a").separator(','),
        Parameter::option(Scalar::<u32>::new(), "b"),
        "Config error: 'a' does not accumulate values, so it cannot take a multi-value separator."
    )]
    #[case(
        Parameter::option(Scalar::<u32>::new().default(1), "a").required(),
        Parameter::option(Scalar::<u32>::new(), "b"),
        "Config error: required argument 'a' must not declare a default."
    )]
    fn build_rejects(#[case] first: Parameter, #[case] second: Parameter, #[case] expected: &str) {
        // Setup
        let builder = CommandLineParser::new("program").add(first).add(second);

        // Execute
        let error = builder.build_parser(|_| Ok(())).err().unwrap();

        // Verify
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn validators_in_order() {
        // Setup
        let parser = CommandLineParser::new("program")
            .add(Parameter::option(Scalar::<u32>::new().default(1), "value"))
            .validate(|arguments| {
                if arguments.get::<u32>("value") == Some(&0) {
                    Err("zero".to_string())
                } else {
                    Ok(())
                }
            })
            .validate(|_| Err("always".to_string()))
            .build(|_| Ok(()));

        // Execute
        let zero = parser.parse_tokens(&["--value", "0"]);
        let one = parser.parse_tokens(&["--value", "1"]);

        // Verify
        assert_matches!(zero, ParseResult::Error(ParseError::ValidationFailed { message, .. }) => {
            assert_eq!(message, "zero");
        });
        assert_matches!(one, ParseResult::Error(ParseError::ValidationFailed { message, .. }) => {
            assert_eq!(message, "always");
        });
    }

    #[test]
    fn duplicate_handler() {
        // Setup
        let parser = CommandLineParser::new("program")
            .options(
                ParseOptions::default()
                    .duplicate_arguments(crate::model::DuplicateArguments::Warning),
            )
            .on_duplicate(|duplicate| {
                if duplicate.new_value.as_deref() == Some("0") {
                    DuplicateAction::KeepOld
                } else {
                    DuplicateAction::KeepNew
                }
            })
            .add(Parameter::option(Scalar::<u32>::new(), "count"))
            .build(|arguments| arguments.take::<u32>("count"));

        // Execute
        let kept = parser.parse_tokens(&["--count", "1", "--count", "0"]);
        let replaced = parser.parse_tokens(&["--count", "1", "--count", "2"]);

        // Verify
        assert_matches!(kept, ParseResult::Success(parsed) => {
            assert_eq!(parsed.value, 1);
            assert_eq!(parsed.warnings.len(), 1);
        });
        assert_eq!(replaced.ok(), Some(2));
    }

    #[test]
    fn parameter_help_in_usage() {
        let parser = CommandLineParser::new("program")
            .add(Parameter::option(Scalar::<u32>::new(), "count").help("How many."))
            .build(|_| Ok(()));
        let count = &parser.usage().arguments[1];
        assert_eq!(count.description.as_deref(), Some("How many."));
        assert_contains!(format!("{:?}", parser.descriptors()[1]), "count");
    }
}
