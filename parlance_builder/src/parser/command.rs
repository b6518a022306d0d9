use std::env;

use crate::api::ParseOptions;
use crate::constant::{HELP_ALIAS, HELP_NAME, HELP_SHORT};
use crate::matcher::{Resolution, Resolver};
use crate::model::Mode;
use crate::parser::base::{ConfigError, ParseError, ParseResult};
use crate::parser::interface::ConsoleInterface;
use crate::parser::middleware::{present, Dispatch};
use crate::parser::printer::{CommandUsage, Printer, Usage};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A named subcommand, dispatching to its own parser.
///
/// ### Example
/// ```
/// # use parlance_builder as parlance;
/// use parlance::{Command, CommandLineParser};
///
/// let list = CommandLineParser::new("program list")
///     .build_parser(|_| Ok("list"))
///     .unwrap();
/// let command = Command::new("list", list).alias("ls").help("List everything.");
/// ```
pub struct Command<T> {
    name: String,
    aliases: Vec<String>,
    help: Option<String>,
    target: Box<dyn Dispatch<T>>,
}

impl<T> Command<T> {
    /// Create a command dispatching to `target`.
    pub fn new(name: impl Into<String>, target: impl Dispatch<T> + 'static) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::default(),
            help: None,
            target: Box::new(target),
        }
    }

    /// Add another name for this command.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Document this command.
    /// If repeated, only the final help message will apply.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.help.replace(description.into());
        self
    }
}

/// The subcommand registry: maps the first token to the parser of a command.
///
/// ### Example
/// ```
/// # use parlance_builder as parlance;
/// use parlance::{Command, CommandLineParser, CommandManager, Parameter, Scalar};
///
/// #[derive(Debug, PartialEq)]
/// enum Action {
///     Add(u32),
///     Clear,
/// }
///
/// let add = CommandLineParser::new("program add")
///     .add(Parameter::argument(Scalar::<u32>::new(), "amount").required())
///     .build_parser(|arguments| Ok(Action::Add(arguments.take("amount")?)))
///     .unwrap();
/// let clear = CommandLineParser::new("program clear")
///     .build_parser(|_| Ok(Action::Clear))
///     .unwrap();
/// let parser = CommandManager::new("program")
///     .add(Command::new("add", add))
///     .add(Command::new("clear", clear))
///     .build_parser()
///     .unwrap();
///
/// assert_eq!(parser.parse_tokens(&["add", "3"]).ok(), Some(Action::Add(3)));
/// assert_eq!(parser.parse_tokens(&["cl"]).ok(), Some(Action::Clear));
/// ```
pub struct CommandManager<T> {
    program: String,
    about: Option<String>,
    options: ParseOptions,
    commands: Vec<Command<T>>,
}

impl<T> CommandManager<T> {
    /// Create an empty command registry.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            options: ParseOptions::default(),
            commands: Vec::default(),
        }
    }

    /// Document the about message for this command registry.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Configure how command names are matched (case sensitivity, prefix matching, help).
    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a command.
    pub fn add(mut self, command: Command<T>) -> Self {
        self.commands.push(command);
        self
    }

    /// Build the command parser as a Result.
    /// This checks the command names (ex: a name registered twice).
    pub fn build_parser(self) -> Result<CommandParser<T>, ConfigError> {
        let CommandManager {
            program,
            about,
            options,
            commands,
        } = self;
        let case_sensitive = options.is_case_sensitive();
        let mut resolver = Resolver::new(
            commands.iter().map(|c| c.name.clone()).collect(),
            case_sensitive,
            options.prefix_matching(),
        );
        let mut seen: Vec<String> = Vec::default();

        for (index, command) in commands.iter().enumerate() {
            for name in std::iter::once(&command.name).chain(command.aliases.iter()) {
                if name.is_empty() || name.chars().any(char::is_whitespace) {
                    return Err(ConfigError(format!("invalid command name '{name}'.")));
                }

                let folded = if case_sensitive {
                    name.clone()
                } else {
                    name.to_lowercase()
                };

                if seen.contains(&folded) {
                    return Err(ConfigError(format!("duplicate command name '{name}'.")));
                }

                seen.push(folded);
                resolver.add_name(name, index);
            }
        }

        let usage = Usage::commands(
            &program,
            about.as_deref(),
            &options,
            commands
                .iter()
                .map(|command| CommandUsage {
                    name: command.name.clone(),
                    aliases: command.aliases.clone(),
                    description: command.help.clone(),
                })
                .collect(),
        );

        Ok(CommandParser {
            options,
            resolver,
            targets: commands.into_iter().map(|command| command.target).collect(),
            usage,
        })
    }

    /// Build the command parser.
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> CommandParser<T> {
        match self.build_parser() {
            Ok(parser) => parser,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

/// The configured subcommand parser.
/// Built via [`CommandManager::build`].
pub struct CommandParser<T> {
    options: ParseOptions,
    resolver: Resolver,
    targets: Vec<Box<dyn Dispatch<T>>>,
    usage: Usage,
}

impl<T> CommandParser<T> {
    /// The usage data (the command listing) for a presentation layer.
    pub fn usage(&self) -> &Usage {
        &self.usage
    }

    /// Run the command parser against the input tokens.
    ///
    /// The first token names the command; the rest are parsed by that command's parser.
    pub fn parse_tokens(&self, tokens: &[&str]) -> ParseResult<T> {
        self.parse_tokens_from(tokens, 0)
    }

    /// Run the command parser against `tokens[start..]`.
    pub fn parse_tokens_from(&self, tokens: &[&str], start: usize) -> ParseResult<T> {
        let Some(token) = tokens.get(start) else {
            return ParseResult::Error(ParseError::MissingCommand);
        };

        if self.is_help(token) {
            return ParseResult::HelpRequested {
                argument: HELP_NAME.to_string(),
                usage: self.usage.clone(),
            };
        }

        match self.resolver.resolve(token) {
            Resolution::Found(index) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Command '{token}' dispatches to target {index}.");
                }

                self.targets[index].dispatch(tokens, start + 1)
            }
            Resolution::Ambiguous(candidates) => ParseResult::Error(ParseError::AmbiguousName {
                name: token.to_string(),
                candidates,
                index: start,
            }),
            Resolution::NotFound => ParseResult::Error(ParseError::UnknownCommand {
                name: token.to_string(),
                index: start,
            }),
        }
    }

    /// Run the command parser against the Cli [`env::args`].
    ///
    /// Help, errors and cancellation are shown and exit as with [`Parser::parse`](crate::Parser::parse).
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

    fn is_help(&self, token: &str) -> bool {
        if !self.options.has_auto_help() {
            return false;
        }

        let long = match self.options.syntax() {
            Mode::LongShort => token.strip_prefix(self.options.long_name_prefix()),
            Mode::Legacy => None,
        };
        let name = long.or_else(|| {
            self.options
                .name_prefixes()
                .iter()
                .find_map(|prefix| token.strip_prefix(prefix.as_str()))
        });

        match name {
            Some(name) => {
                name.eq_ignore_ascii_case(HELP_NAME)
                    || name == HELP_SHORT.to_string()
                    || name == HELP_ALIAS.to_string()
            }
            None => false,
        }
    }
}

impl<T> Dispatch<T> for CommandParser<T> {
    fn dispatch(&self, tokens: &[&str], start: usize) -> ParseResult<T> {
        self.parse_tokens_from(tokens, start)
    }

    fn usage(&self) -> &Usage {
        &self.usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommandLineParser, Parameter, Scalar, Switch};
    use crate::parser::base::{ParseStatus, Parsed};
    use crate::parser::interface::util::InMemoryInterface;
    use crate::test::assert_contains;
    use rstest::rstest;

    #[derive(Debug, PartialEq)]
    enum Action {
        Add(u32),
        Fetch(bool),
        Remote(String),
    }

    fn manager() -> CommandManager<Action> {
        let add = CommandLineParser::new("program add")
            .add(Parameter::argument(Scalar::<u32>::new(), "amount").required())
            .build_parser(|arguments| Ok(Action::Add(arguments.take("amount")?)))
            .unwrap();
        let fetch = CommandLineParser::new("program fetch")
            .add(Parameter::option(Switch::new(), "all"))
            .build_parser(|arguments| Ok(Action::Fetch(arguments.take("all")?)))
            .unwrap();
        let remote_add = CommandLineParser::new("program remote add")
            .add(Parameter::argument(Scalar::<String>::new(), "url").required())
            .build_parser(|arguments| Ok(Action::Remote(arguments.take("url")?)))
            .unwrap();
        let remote = CommandManager::new("program remote")
            .add(Command::new("add", remote_add))
            .build_parser()
            .unwrap();

        CommandManager::new("program")
            .about("Track things.")
            .add(Command::new("add", add).help("Add an amount."))
            .add(Command::new("fetch", fetch).alias("get"))
            .add(Command::new("remote", remote))
    }

    #[rstest]
    #[case(vec!["add", "3"], Action::Add(3))]
    #[case(vec!["ADD", "3"], Action::Add(3))]
    #[case(vec!["fetch"], Action::Fetch(false))]
    #[case(vec!["get", "--all"], Action::Fetch(true))]
    #[case(vec!["fe", "--all"], Action::Fetch(true))]
    #[case(vec!["remote", "add", "origin"], Action::Remote("origin".to_string()))]
    #[case(vec!["rem", "a", "origin"], Action::Remote("origin".to_string()))]
    fn dispatch(#[case] tokens: Vec<&str>, #[case] expected: Action) {
        // Setup
        let parser = manager().build_parser().unwrap();

        // Execute
        let result = parser.parse_tokens(&tokens);

        // Verify
        assert_matches!(result, ParseResult::Success(Parsed { value, .. }) => {
            assert_eq!(value, expected);
        });
    }

    #[test]
    fn missing_command() {
        let parser = manager().build_parser().unwrap();
        assert_matches!(
            parser.parse_tokens(&[]),
            ParseResult::Error(ParseError::MissingCommand)
        );
        assert_matches!(
            parser.parse_tokens(&["remote"]),
            ParseResult::Error(ParseError::MissingCommand)
        );
    }

    #[test]
    fn unknown_command() {
        let parser = manager().build_parser().unwrap();
        assert_matches!(parser.parse_tokens(&["push"]), ParseResult::Error(ParseError::UnknownCommand { name, index: 0 }) => {
            assert_eq!(name, "push");
        });
        assert_matches!(parser.parse_tokens(&["remote", "drop"]), ParseResult::Error(ParseError::UnknownCommand { name, index: 1 }) => {
            assert_eq!(name, "drop");
        });
    }

    #[test]
    fn ambiguous_command() {
        // Setup
        let parser = CommandManager::new("program")
            .add(Command::new(
                "fetch",
                CommandLineParser::new("a").build_parser(|_| Ok(1)).unwrap(),
            ))
            .add(Command::new(
                "feed",
                CommandLineParser::new("b").build_parser(|_| Ok(2)).unwrap(),
            ))
            .build_parser()
            .unwrap();

        // Execute
        let result = parser.parse_tokens(&["fe"]);

        // Verify
        assert_matches!(result, ParseResult::Error(ParseError::AmbiguousName { candidates, .. }) => {
            assert_eq!(candidates, vec!["fetch".to_string(), "feed".to_string()]);
        });
        assert_eq!(parser.parse_tokens(&["fee"]).ok(), Some(2));
    }

    #[rstest]
    #[case(vec!["--help"])]
    #[case(vec!["-h"])]
    #[case(vec!["-?"])]
    #[case(vec!["--HELP", "add"])]
    fn help(#[case] tokens: Vec<&str>) {
        let parser = manager().build_parser().unwrap();
        assert_matches!(parser.parse_tokens(&tokens), ParseResult::HelpRequested { argument, usage } => {
            assert_eq!(argument, "help");
            assert_eq!(usage.program, "program");
            assert_eq!(usage.commands.len(), 3);
        });
    }

    #[test]
    fn help_for_command() {
        let parser = manager().build_parser().unwrap();
        assert_matches!(parser.parse_tokens(&["add", "--help"]), ParseResult::HelpRequested { usage, .. } => {
            assert_eq!(usage.program, "program add");
        });
    }

    #[test]
    fn help_disabled() {
        let parser = manager()
            .options(ParseOptions::default().auto_help(false))
            .build_parser()
            .unwrap();
        assert_eq!(parser.parse_tokens(&["--help"]).status(), ParseStatus::Error);
    }

    #[test]
    fn help_legacy() {
        let parser = manager()
            .options(ParseOptions::default().mode(Mode::Legacy))
            .build_parser()
            .unwrap();
        assert_eq!(parser.parse_tokens(&["-help"]).status(), ParseStatus::HelpRequested);
        assert_eq!(parser.parse_tokens(&["-?"]).status(), ParseStatus::HelpRequested);
    }

    #[rstest]
    #[case("add", "Add", "duplicate command name 'Add'.")]
    #[case("add", "two words", "invalid command name 'two words'.")]
    #[case("add", "", "invalid command name ''.")]
    fn build_rejects(#[case] first: &str, #[case] second: &str, #[case] expected: &str) {
        // Setup
        let manager = CommandManager::new("program")
            .add(Command::new(
                first,
                CommandLineParser::new("a").build_parser(|_| Ok(1)).unwrap(),
            ))
            .add(Command::new(
                second,
                CommandLineParser::new("b").build_parser(|_| Ok(2)).unwrap(),
            ));

        // Execute
        let error = manager.build_parser().err().unwrap();

        // Verify
        assert_eq!(error, ConfigError(expected.to_string()));
    }

    #[test]
    fn case_sensitive_names() {
        let manager = CommandManager::new("program")
            .options(ParseOptions::default().case_sensitive(true))
            .add(Command::new(
                "add",
                CommandLineParser::new("a").build_parser(|_| Ok(1)).unwrap(),
            ))
            .add(Command::new(
                "Add",
                CommandLineParser::new("b").build_parser(|_| Ok(2)).unwrap(),
            ));
        let parser = manager.build_parser().unwrap();
        assert_eq!(parser.parse_tokens(&["Add"]).ok(), Some(2));
    }

    #[test]
    fn present_unknown() {
        // Setup
        let parser = manager().build_parser().unwrap();
        let interface = InMemoryInterface::default();
        let tokens = ["add", "1", "x"];

        // Execute
        let exit_code = present(
            parser.parse_tokens(&tokens),
            &tokens,
            &interface,
            &Printer::new(None),
        );

        // Verify
        assert_eq!(exit_code, Err(1));
        let (_, error, error_context) = interface.consume();
        let error = error.unwrap();
        assert_contains!(error, "unexpected positional argument 'x'");
        assert_eq!(error_context.unwrap().to_string(), "add 1 x\n      ^");
    }
}
