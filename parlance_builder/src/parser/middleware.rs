use std::env;

use crate::api::ParseOptions;
use crate::matcher::{ArgumentDescriptor, DuplicateHandler, Machine, Outcome, Schema};
use crate::parser::assemble::{assemble, ClassValidator, ParsedArguments};
use crate::parser::base::*;
use crate::parser::interface::{ConsoleInterface, UserInterface};
use crate::parser::printer::{ErrorContext, Printer, Usage};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Builds the caller's result from the assembled values.
pub(crate) type Factory<T> = dyn Fn(&mut ParsedArguments) -> Result<T, ValueError> + Send + Sync;

/// Something that can parse a token sequence from an offset: a [`Parser`] or a [`CommandParser`](crate::CommandParser).
///
/// Subcommand registries hold their children as `Dispatch` objects, so nesting is uniform.
pub trait Dispatch<T>: Send + Sync {
    /// Parse `tokens[start..]`.
    fn dispatch(&self, tokens: &[&str], start: usize) -> ParseResult<T>;

    /// The usage of this parser.
    fn usage(&self) -> &Usage;
}

/// The configured command line parser.
/// Built via [`CommandLineParser::build`](crate::CommandLineParser::build).
///
/// A parser holds only the immutable descriptor set.
/// Every parse allocates its own state, so one parser may serve many threads at once.
pub struct Parser<T> {
    schema: Schema,
    options: ParseOptions,
    validators: Vec<Box<ClassValidator>>,
    on_duplicate: Option<Box<DuplicateHandler>>,
    factory: Box<Factory<T>>,
    usage: Usage,
}

impl<T> Parser<T> {
    pub(crate) fn new(
        schema: Schema,
        options: ParseOptions,
        validators: Vec<Box<ClassValidator>>,
        on_duplicate: Option<Box<DuplicateHandler>>,
        factory: Box<Factory<T>>,
        usage: Usage,
    ) -> Self {
        Self {
            schema,
            options,
            validators,
            on_duplicate,
            factory,
            usage,
        }
    }

    /// The normalized descriptors, including the automatic help argument.
    pub fn descriptors(&self) -> &[ArgumentDescriptor] {
        self.schema.descriptors()
    }

    /// The usage data for a presentation layer.
    pub fn usage(&self) -> &Usage {
        &self.usage
    }

    /// Run the parser against the input tokens.
    ///
    /// Parsing happens in two phases:
    /// 1. Scanning aligns each token with an argument and converts its value as soon as it is encountered.
    /// 2. Assembling applies defaults, checks requiredness, counts and dependencies, then hands the values to the result factory.
    ///
    /// Failures, help requests and cancellations are reported in the [`ParseResult`]; nothing is printed.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{CommandLineParser, Parameter, ParseStatus, Scalar, Switch};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::option(Switch::new(), "verbose").short('v'))
    ///     .add(Parameter::argument(Scalar::<String>::new(), "file").required())
    ///     .build_parser(|arguments| {
    ///         Ok((arguments.take::<bool>("verbose")?, arguments.take::<String>("file")?))
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     parser.parse_tokens(&["-v", "notes.txt"]).ok(),
    ///     Some((true, "notes.txt".to_string()))
    /// );
    /// assert_eq!(parser.parse_tokens(&["--help"]).status(), ParseStatus::HelpRequested);
    /// ```
    pub fn parse_tokens(&self, tokens: &[&str]) -> ParseResult<T> {
        self.parse_tokens_from(tokens, 0)
    }

    /// Run the parser against `tokens[start..]`; earlier tokens are ignored (ex: a command name).
    pub fn parse_tokens_from(&self, tokens: &[&str], start: usize) -> ParseResult<T> {
        let machine = Machine::new(&self.schema, &self.options, self.on_duplicate.as_deref());

        match machine.run(tokens, start) {
            Outcome::Failed(error) => ParseResult::Error(error),
            Outcome::Help { argument } => ParseResult::HelpRequested {
                argument,
                usage: self.usage.clone(),
            },
            Outcome::Canceled {
                argument,
                remaining,
            } => ParseResult::Canceled {
                argument,
                remaining,
            },
            Outcome::Completed { state, remaining } => {
                let (mut arguments, warnings) =
                    match assemble(&self.schema, &self.options, state, &self.validators) {
                        Ok(assembled) => assembled,
                        Err(error) => return ParseResult::Error(error),
                    };

                match (self.factory)(&mut arguments) {
                    Ok(value) => ParseResult::Success(Parsed {
                        value,
                        remaining,
                        warnings,
                    }),
                    Err(error) => {
                        #[cfg(feature = "tracing_debug")]
                        {
                            debug!("Result factory failed: {error:?}.");
                        }

                        ParseResult::Error(ParseError::CreateFailed {
                            message: error.to_string(),
                        })
                    }
                }
            }
        }
    }

    /// Run the parser against the Cli [`env::args`].
    ///
    /// If the help switch (`-h`, `-?` or `--help`) is encountered, the parser displays the help message and exits with code `0`.
    /// If the parse fails, the parser displays the error and exits with code `1`.
    /// If an argument cancels the parse, the parser exits with code `0`.
    pub fn parse(&self) -> T {
        let command_input: Vec<String> = env::args().skip(1).collect();
        let tokens: Vec<&str> = command_input.iter().map(AsRef::as_ref).collect();

        match present(
            self.parse_tokens(&tokens),
            &tokens,
            &ConsoleInterface::default(),
            &Printer::terminal(),
        ) {
            Ok(value) => value,
            Err(exit_code) => std::process::exit(exit_code),
        }
    }
}

impl<T> Dispatch<T> for Parser<T> {
    fn dispatch(&self, tokens: &[&str], start: usize) -> ParseResult<T> {
        self.parse_tokens_from(tokens, start)
    }

    fn usage(&self) -> &Usage {
        &self.usage
    }
}

/// Show a parse outcome to the user, resolving it to the value or an exit code.
pub(crate) fn present<T>(
    result: ParseResult<T>,
    tokens: &[&str],
    user_interface: &(impl UserInterface + ?Sized),
    printer: &Printer,
) -> Result<T, i32> {
    match result {
        ParseResult::Success(parsed) => Ok(parsed.value),
        ParseResult::HelpRequested { usage, .. } => {
            printer.print_help(&usage, user_interface);
            Err(0)
        }
        ParseResult::Error(error) => {
            let index = error.token_index();
            user_interface.print_error(error);

            if let Some(index) = index {
                user_interface.print_error_context(ErrorContext::new(index, tokens));
            }

            Err(1)
        }
        ParseResult::Canceled { .. } => Err(0),
    }
}
