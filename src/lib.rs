//! `parlance` is a declarative command line argument parser for Rust.
//!
//! A program describes its arguments once, as a set of typed parameters, and `parlance` turns any token sequence into either a strongly typed result or a precise error.
//! The same description drives the help output, so usage text never drifts from what the parser accepts.
//! `parlance` prioritizes the following concerns:
//! * *Type safe argument parsing*:
//! The user should not call any `&str -> T` conversion functions directly.
//! * *Domain sensitive argument parsing*:
//! Value, collection and cross-argument validators reject domain invalid inputs before the program sees them.
//! * *Named and positional arguments*:
//! Options are supplied by name (`--count 3`, `-c 3`, `--count=3`).
//! Arguments are bound positionally, and may also be supplied by name.
//! * *Configurable syntax*:
//! Long/short (`--name`, `-n`) or legacy (`-name`, `/name`) syntax, with case (in)sensitive names and unambiguous prefix matching.
//! * *Sub-command paradigm*:
//! A [`CommandManager`] dispatches to one parser per command, and commands nest.
//! * *Reusable parsers*:
//! A built parser is immutable; it may parse any number of token sequences, concurrently.
//!
//! # Usage
//! This page includes a few demos on using `parlance`.
//!
//! ```no_run
#![doc = include_str!("../demos/demo_summer.rs")]
//! ```
//!
//! ```console
//! $ summer -h
//! usage: summer [-h] ITEM [...]
//!
//! positional arguments:
//!  ITEM [...]       The items to sum.
//!
//! options:
//!  -h, -?, --help   Show this help message and exit.
//!
//! $ summer 1 2 3
//! Sum: 6
//!
//! $ summer
//! Parse error: missing required argument 'item'.
//!
//! $ summer 1 blah
//! Parse error: invalid value for 'item': cannot convert 'blah' to u32: invalid digit found in string.
//! 1 blah
//!   ^
//! ```
//!
//! # Builder Api
//! Configure `parlance` by starting with a [`CommandLineParser`] and `add`ing parameters.
//! There are two classes of parameters: [`Parameter::option`] and [`Parameter::argument`].
//! Finally, `build` the parser with a *factory* that turns the [`ParsedArguments`] into the program's own type.
//!
//! Each parameter takes a *field* which serves to specify the following aspects on the Cli:
//! * The underlying type `T` of the parameter (ex: `u32`).
//! * Whether `T` is wrapped in a container type (ex: `Vec<T>`, `Option<T>` or a map).
//! * The cardinality of the parameter (ex: 0, 1, N, at least 1, etc).
//!
//! By default, values convert via [`std::str::FromStr`].
//! A [`ValueConverter`] replaces this with a culture aware, enumerated or custom conversion.
//!
//! ### Fields
//! * [`Scalar`]: a single-value parameter.
//! This is the most common field to use in your Cli.
//! * [`Switch`]: a no-value option (ex: `--verbose`).
//! * [`Optional`]: a single-value parameter of type `Option<T>`.
//! * [`Collection`]: a multi-value parameter, for any collection that implements [Collectable](./prelude/trait.Collectable.html).
//! * [`Dictionary`]: a multi-value parameter of `KEY=VALUE` entries, for any map that implements [KeyedCollectable](./prelude/trait.KeyedCollectable.html).
//! * [`Method`]: an option that invokes a callback each time it is matched, rather than storing a value.
//!
//! ### Parse options
//! [`ParseOptions`] control the syntax ([`Mode`]), name matching, and the policies for repeated ([`DuplicateArguments`]) and unknown ([`UnknownArguments`]) arguments.
//!
//! ### Sub-commands
//! Build one parser per command and register each with a [`Command`] on a [`CommandManager`].
//! Every command parser must produce the same result type, typically an enum.
//!
//! ```no_run
#![doc = include_str!("../demos/demo_commands.rs")]
//! ```
//!
//! # Outcomes
//! [`Parser::parse`] handles help, errors and cancellation itself, exiting the process where appropriate.
//! [`Parser::parse_tokens`] instead returns a [`ParseResult`], one of: success, error, help requested, or canceled.
pub use parlance_builder::*;
