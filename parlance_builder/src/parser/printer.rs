use terminal_size::{terminal_size, Width};

use crate::api::ParseOptions;
use crate::matcher::{ArgumentDescriptor, Schema};
use crate::model::{ArgumentKind, Mode, Nargs};
use crate::parser::interface::{
    ColumnRenderer, LeftWidth, MiddleWidth, PaddingWidth, TotalWidth, UserInterface,
    MINIMUM_MIDDLE_WIDTH,
};

/// The presentation data of one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentUsage {
    /// The primary name.
    pub name: String,
    /// The single character name.
    pub short_name: Option<char>,
    /// Additional names.
    pub aliases: Vec<String>,
    /// Additional single character names.
    pub short_aliases: Vec<char>,
    /// The positional ordinal.
    pub position: Option<usize>,
    /// Whether the argument is reachable by name.
    pub named: bool,
    /// Whether the argument must be supplied.
    pub required: bool,
    /// The accumulation semantics.
    pub kind: ArgumentKind,
    /// Whether presence alone sets the value.
    pub switch: bool,
    /// The cardinality constraint of a multi-value argument.
    pub nargs: Option<Nargs>,
    /// The placeholder for the value.
    pub value_description: String,
    /// The names accepted by a choices converter.
    pub choices: Vec<String>,
    /// The help text.
    pub description: Option<String>,
    /// The declared default, as text.
    pub default: Option<String>,
}

/// The presentation data of one subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandUsage {
    /// The primary name.
    pub name: String,
    /// Additional names.
    pub aliases: Vec<String>,
    /// The help text.
    pub description: Option<String>,
}

/// Everything a presentation layer needs to render help for one parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    /// The program (or command path) name.
    pub program: String,
    /// The program description.
    pub about: Option<String>,
    /// The prefix written before primary names and aliases.
    pub long_prefix: String,
    /// The prefix written before single character names.
    pub short_prefix: String,
    /// The arguments, in declaration order.
    pub arguments: Vec<ArgumentUsage>,
    /// The subcommands, in registration order.
    pub commands: Vec<CommandUsage>,
}

impl Usage {
    pub(crate) fn describe(
        program: &str,
        about: Option<&str>,
        schema: &Schema,
        options: &ParseOptions,
    ) -> Self {
        let (long_prefix, short_prefix) = prefixes(options);

        Self {
            program: program.to_string(),
            about: about.map(str::to_string),
            long_prefix,
            short_prefix,
            arguments: schema
                .descriptors()
                .iter()
                .map(|descriptor| argument_usage(descriptor, options))
                .collect(),
            commands: Vec::default(),
        }
    }

    pub(crate) fn commands(
        program: &str,
        about: Option<&str>,
        options: &ParseOptions,
        commands: Vec<CommandUsage>,
    ) -> Self {
        let (long_prefix, short_prefix) = prefixes(options);

        Self {
            program: program.to_string(),
            about: about.map(str::to_string),
            long_prefix,
            short_prefix,
            arguments: Vec::default(),
            commands,
        }
    }
}

fn prefixes(options: &ParseOptions) -> (String, String) {
    let short_prefix = options
        .name_prefixes()
        .first()
        .cloned()
        .unwrap_or_else(|| "-".to_string());
    let long_prefix = match options.syntax() {
        Mode::LongShort => options.long_name_prefix().to_string(),
        Mode::Legacy => short_prefix.clone(),
    };
    (long_prefix, short_prefix)
}

fn argument_usage(descriptor: &ArgumentDescriptor, options: &ParseOptions) -> ArgumentUsage {
    let value_description = match descriptor.value_description() {
        Some(meta) => meta.to_string(),
        None if descriptor.kind() == ArgumentKind::Dictionary => format!(
            "KEY{}VALUE",
            descriptor
                .key_value_separator()
                .unwrap_or(options.default_key_value_separator())
        ),
        None => descriptor.name().to_ascii_uppercase().replace('-', "_"),
    };

    ArgumentUsage {
        name: descriptor.name().to_string(),
        short_name: descriptor.short_name(),
        aliases: descriptor.aliases().to_vec(),
        short_aliases: descriptor.short_aliases().to_vec(),
        position: descriptor.position(),
        named: descriptor.is_named(),
        required: descriptor.is_required(),
        kind: descriptor.kind(),
        switch: descriptor.is_switch(),
        nargs: descriptor.nargs(),
        value_description,
        choices: descriptor.choices(),
        description: descriptor.description().map(str::to_string),
        default: descriptor.default_text(),
    }
}

pub(crate) struct Printer {
    terminal_width: Option<usize>,
}

const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;
const COMMAND_SUMMARY: &str = "COMMAND ...";

impl Printer {
    pub(crate) fn terminal() -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(terminal_width)
    }

    pub(crate) fn new(terminal_width: Option<usize>) -> Self {
        Self { terminal_width }
    }

    pub(crate) fn print_help(&self, usage: &Usage, user_interface: &(impl UserInterface + ?Sized)) {
        let mut positionals: Vec<&ArgumentUsage> = usage
            .arguments
            .iter()
            .filter(|argument| argument.position.is_some())
            .collect();
        positionals.sort_by_key(|argument| argument.position);
        let options: Vec<&ArgumentUsage> = usage
            .arguments
            .iter()
            .filter(|argument| argument.position.is_none())
            .collect();

        let mut summary = Vec::default();
        let mut positional_rows = Vec::default();
        let mut option_rows = Vec::default();
        let mut command_rows = Vec::default();

        for argument in &options {
            let grammar = grammar(argument);
            let flag = match argument.short_name {
                Some(short) => format!("{}{short}", usage.short_prefix),
                None => format!("{}{}", usage.long_prefix, argument.name),
            };
            let spaced = if grammar.is_empty() {
                grammar.clone()
            } else {
                format!(" {grammar}")
            };

            if argument.required {
                summary.push(format!("{flag}{spaced}"));
            } else {
                summary.push(format!("[{flag}{spaced}]"));
            }

            option_rows.push((format!("{}{spaced}", flags(usage, argument)), details(argument)));
        }

        for argument in &positionals {
            let grammar = grammar(argument);

            if argument.required {
                summary.push(grammar.clone());
            } else {
                summary.push(format!("[{grammar}]"));
            }

            positional_rows.push((grammar, details(argument)));
        }

        if !usage.commands.is_empty() {
            summary.push(COMMAND_SUMMARY.to_string());
        }

        for command in &usage.commands {
            let names: Vec<&str> = std::iter::once(command.name.as_str())
                .chain(command.aliases.iter().map(String::as_str))
                .collect();
            command_rows.push((
                names.join(", "),
                command.description.clone().unwrap_or_default(),
            ));
        }

        let rows = positional_rows
            .iter()
            .chain(option_rows.iter())
            .chain(command_rows.iter());
        let left_column_width = rows
            .clone()
            .map(|(left, _)| left.chars().count() + MAIN_INDENT)
            .max()
            .unwrap_or(MAIN_INDENT);
        let middle_column_width = rows
            .map(|(_, middle)| middle.chars().count())
            .max()
            .unwrap_or(0);
        let padding = PaddingWidth::new(PADDING_WIDTH).expect("internal error - padding is non-zero");
        let left = LeftWidth::new(left_column_width).expect("internal error - left includes the indent");
        let column_renderer = match self.terminal_width {
            Some(total) => ColumnRenderer::guided(
                padding,
                left,
                MiddleWidth::new(std::cmp::max(middle_column_width, MINIMUM_MIDDLE_WIDTH))
                    .expect("internal error - middle is at least the minimum"),
                TotalWidth(total),
            ),
            None => ColumnRenderer::new(
                padding,
                left,
                MiddleWidth::new(MINIMUM_MIDDLE_WIDTH)
                    .expect("internal error - the minimum middle is valid"),
            ),
        };

        if summary.is_empty() {
            user_interface.print(format!("usage: {}", usage.program));
        } else {
            user_interface.print(format!("usage: {} {}", usage.program, summary.join(" ")));
        }

        if let Some(about) = &usage.about {
            user_interface.print("".to_string());
            user_interface.print(about.clone());
        }

        for (title, rows) in [
            ("positional arguments:", &positional_rows),
            ("options:", &option_rows),
            ("commands:", &command_rows),
        ] {
            if rows.is_empty() {
                continue;
            }

            user_interface.print("".to_string());
            user_interface.print(title.to_string());

            for (left, middle) in rows {
                for line in column_renderer.render(MAIN_INDENT, left, middle) {
                    user_interface.print(line);
                }
            }
        }
    }
}

fn grammar(argument: &ArgumentUsage) -> String {
    let meta = &argument.value_description;

    if argument.switch {
        return "".to_string();
    }

    match argument.nargs {
        Some(Nargs::Precisely(n)) => (0..n)
            .map(|_| meta.clone())
            .collect::<Vec<String>>()
            .join(" "),
        Some(Nargs::Any) => format!("[{meta} ...]"),
        Some(Nargs::AtLeastOne) => format!("{meta} [...]"),
        None => meta.clone(),
    }
}

fn flags(usage: &Usage, argument: &ArgumentUsage) -> String {
    let shorts = argument
        .short_name
        .iter()
        .chain(argument.short_aliases.iter())
        .map(|short| format!("{}{short}", usage.short_prefix));
    let longs = std::iter::once(&argument.name)
        .chain(argument.aliases.iter())
        .map(|name| format!("{}{name}", usage.long_prefix));
    shorts.chain(longs).collect::<Vec<String>>().join(", ")
}

fn details(argument: &ArgumentUsage) -> String {
    let mut parts = Vec::default();

    if !argument.choices.is_empty() {
        parts.push(format!("{{{}}}", argument.choices.join(", ")));
    }

    if let Some(description) = &argument.description {
        parts.push(description.clone());
    }

    if let Some(default) = &argument.default {
        parts.push(format!("(default: {default})"));
    }

    parts.join(" ")
}

/// The tokens of a failed parse with a caret under the offending one.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ErrorContext {
    index: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(index: usize, tokens: &[&str]) -> Self {
        Self {
            index,
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let offset: usize = self
            .tokens
            .iter()
            .take(self.index)
            .map(|token| token.chars().count() + 1)
            .sum();

        write!(f, "{}\n{:offset$}^", self.tokens.join(" "), "")
    }
}
