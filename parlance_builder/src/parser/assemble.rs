use indexmap::{IndexMap, IndexSet};

use crate::api::{AnyValue, ParseOptions};
use crate::matcher::{ParseState, Schema};
use crate::model::ArgumentKind;
use crate::parser::base::{DuplicateArgument, ParseError, ValueError};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A cross-argument check over the assembled values; `Err` carries the failure message.
pub(crate) type ClassValidator = dyn Fn(&ParsedArguments) -> Result<(), String> + Send + Sync;

/// The assembled values of one successful parse, keyed by primary name.
///
/// Every argument that was supplied, or that has a default, is present.
/// Result factories move values out with [`ParsedArguments::take`].
///
/// ### Example
/// ```
/// # use parlance_builder as parlance;
/// use parlance::{CommandLineParser, Parameter, Scalar};
///
/// let parser = CommandLineParser::new("program")
///     .add(Parameter::option(Scalar::<u32>::new().default(1), "count"))
///     .build_parser(|arguments| arguments.take::<u32>("count"))
///     .unwrap();
///
/// assert_eq!(parser.parse_tokens(&["--count", "3"]).ok(), Some(3));
/// assert_eq!(parser.parse_tokens(&[]).ok(), Some(1));
/// ```
#[derive(Debug)]
pub struct ParsedArguments {
    values: IndexMap<String, AnyValue>,
    supplied: IndexSet<String>,
}

impl ParsedArguments {
    /// A reference to the value of an argument, if present and of type `V`.
    pub fn get<V: 'static>(&self, name: &str) -> Option<&V> {
        self.values.get(name).and_then(|value| value.downcast_ref::<V>())
    }

    /// Move the value of an argument out.
    ///
    /// A value of the wrong type is left in place.
    pub fn take<V: 'static>(&mut self, name: &str) -> Result<V, ValueError> {
        let value = self
            .values
            .shift_remove(name)
            .ok_or_else(|| ValueError::Missing(name.to_string()))?;

        match value.downcast::<V>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                self.values.insert(name.to_string(), value);
                Err(ValueError::WrongType {
                    name: name.to_string(),
                    expected: std::any::type_name::<V>(),
                })
            }
        }
    }

    /// A copy of the value of an argument.
    pub fn value<V: Clone + 'static>(&self, name: &str) -> Result<V, ValueError> {
        match self.values.get(name) {
            None => Err(ValueError::Missing(name.to_string())),
            Some(value) => value.downcast_ref::<V>().cloned().ok_or_else(|| {
                ValueError::WrongType {
                    name: name.to_string(),
                    expected: std::any::type_name::<V>(),
                }
            }),
        }
    }

    /// Whether the argument appeared on the command line (as opposed to defaulting).
    pub fn is_supplied(&self, name: &str) -> bool {
        self.supplied.contains(name)
    }

    /// Whether the argument has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The names of the arguments with values, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// An empty value bag, for unit testing result factories.
    #[cfg(any(test, feature = "unit_test"))]
    pub fn test_dummy() -> Self {
        Self {
            values: IndexMap::default(),
            supplied: IndexSet::default(),
        }
    }

    /// Add a supplied value, for unit testing result factories.
    #[cfg(any(test, feature = "unit_test"))]
    pub fn insert<V: 'static>(mut self, name: impl Into<String>, value: V) -> Self {
        let name = name.into();
        self.supplied.insert(name.clone());
        self.values.insert(name, Box::new(value));
        self
    }
}

/// Turn the state of a completed scan into the value bag.
///
/// Checks run in order: required arguments, defaults and counts per argument (declaration order),
/// then `requires`/`prohibits`, then the class validators.
pub(crate) fn assemble(
    schema: &Schema,
    options: &ParseOptions,
    state: ParseState,
    validators: &[Box<ClassValidator>],
) -> Result<(ParsedArguments, Vec<DuplicateArgument>), ParseError> {
    let ParseState {
        values,
        counts,
        occurrences,
        warnings,
        ..
    } = state;
    let mut arguments = ParsedArguments {
        values: IndexMap::default(),
        supplied: IndexSet::default(),
    };

    for (index, (descriptor, value)) in schema.descriptors().iter().zip(values).enumerate() {
        let supplied = occurrences[index] > 0;

        if !supplied && descriptor.required {
            return Err(ParseError::MissingRequiredArgument {
                name: descriptor.name.clone(),
            });
        }

        if supplied {
            if let Some(nargs) = descriptor.nargs() {
                if !nargs.admits(counts[index]) {
                    return Err(ParseError::ValidationFailed {
                        name: Some(descriptor.name.clone()),
                        message: format!(
                            "takes {nargs} value(s), but {} were supplied.",
                            counts[index]
                        ),
                        index: None,
                    });
                }
            }

            arguments.supplied.insert(descriptor.name.clone());
        }

        if descriptor.kind() == ArgumentKind::Method {
            continue;
        }

        let value = match value {
            Some(value) => value,
            None => match descriptor.capture.initial() {
                Some(value) => value,
                None => continue,
            },
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Assembled {descriptor:?} (supplied: {supplied}).");
        }

        arguments.values.insert(descriptor.name.clone(), value);
    }

    for (index, descriptor) in schema.descriptors().iter().enumerate() {
        if occurrences[index] == 0 {
            continue;
        }

        for target in &descriptor.requires {
            if !is_supplied(schema, options, &occurrences, target) {
                return Err(ParseError::DependencyFailed {
                    name: descriptor.name.clone(),
                    message: format!("'{}' requires '{target}'.", descriptor.name),
                });
            }
        }

        for target in &descriptor.prohibits {
            if is_supplied(schema, options, &occurrences, target) {
                return Err(ParseError::DependencyFailed {
                    name: descriptor.name.clone(),
                    message: format!("'{}' cannot be used with '{target}'.", descriptor.name),
                });
            }
        }
    }

    for validator in validators {
        validator(&arguments).map_err(|message| ParseError::ValidationFailed {
            name: None,
            message,
            index: None,
        })?;
    }

    Ok((arguments, warnings))
}

fn is_supplied(schema: &Schema, options: &ParseOptions, occurrences: &[usize], name: &str) -> bool {
    let index = schema
        .find(name, options.is_case_sensitive())
        .expect("internal error - references are checked when the schema is built");
    occurrences[index] > 0
}
