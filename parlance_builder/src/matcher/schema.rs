use std::collections::HashMap;
use thiserror::Error;

use crate::api::{AnyValue, Capturable, ParseOptions};
use crate::constant::{HELP_ALIAS, HELP_MESSAGE, HELP_NAME, HELP_SHORT};
use crate::matcher::model::ArgumentDescriptor;
use crate::matcher::resolve::Resolver;
use crate::model::{ArgumentKind, CancelMode, Mode};
use crate::parser::ConfigError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SchemaError {
    #[error("argument names must not be empty.")]
    EmptyName,

    #[error("'{0}' must not contain white space or a name/value separator.")]
    InvalidName(String),

    #[error("required argument '{0}' must not declare a default.")]
    RequiredWithDefault(String),

    #[error("'{0}' does not accumulate values, so it cannot take a multi-value separator.")]
    SeparatorOnSingleValue(String),

    #[error("'{0}' is not a dictionary, so it cannot take key/value settings.")]
    KeyValueOnNonDictionary(String),

    #[error("the key/value separator of '{0}' must not be empty.")]
    EmptyKeyValueSeparator(String),

    #[error("positional argument '{0}' cannot be a help trigger.")]
    PositionalHelpTrigger(String),

    #[error("the name '{0}' is declared more than once.")]
    DuplicateName(String),

    #[error("the short name '{0}' is declared more than once.")]
    DuplicateShort(char),

    #[error("position {0} is declared more than once.")]
    DuplicatePosition(usize),

    #[error("required positional argument '{name}' cannot follow optional positional argument '{optional}'.")]
    RequiredAfterOptional { name: String, optional: String },

    #[error("positional argument '{0}' takes many values, so it must be the last positional argument.")]
    AccumulatingNotLast(String),

    #[error("'{name}' refers to unknown argument '{target}'.")]
    UnknownReference { name: String, target: String },
}

impl From<SchemaError> for ConfigError {
    fn from(error: SchemaError) -> Self {
        ConfigError(error.to_string())
    }
}

/// The validated, immutable descriptor set of one parser.
#[derive(Debug)]
pub(crate) struct Schema {
    descriptors: Vec<ArgumentDescriptor>,
    positionals: Vec<usize>,
    resolver: Resolver,
}

impl Schema {
    pub(crate) fn new(
        mut descriptors: Vec<ArgumentDescriptor>,
        options: &ParseOptions,
    ) -> Result<Self, SchemaError> {
        if options.has_auto_help() {
            if let Some(help) = auto_help(&descriptors, options) {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Adding automatic help argument {help:?}.");
                }

                descriptors.insert(0, help);
            }
        }

        for descriptor in &descriptors {
            check_descriptor(descriptor, options)?;
        }

        check_names(&descriptors, options)?;
        let positionals = check_positionals(&descriptors)?;
        check_references(&descriptors, options)?;
        let resolver = Resolver::descriptors(&descriptors, options);

        Ok(Self {
            descriptors,
            positionals,
            resolver,
        })
    }

    pub(crate) fn descriptors(&self) -> &[ArgumentDescriptor] {
        &self.descriptors
    }

    pub(crate) fn descriptor(&self, index: usize) -> &ArgumentDescriptor {
        &self.descriptors[index]
    }

    /// Descriptor indices of the positional arguments, in position order.
    pub(crate) fn positionals(&self) -> &[usize] {
        &self.positionals
    }

    pub(crate) fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The index of the descriptor with this primary name (or alias).
    pub(crate) fn find(&self, name: &str, case_sensitive: bool) -> Option<usize> {
        self.descriptors.iter().position(|d| {
            d.all_names()
                .any(|n| same_name(n, name, case_sensitive))
        })
    }
}

fn same_name(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

fn fold(name: &str, options: &ParseOptions) -> String {
    if options.is_case_sensitive() {
        name.to_string()
    } else {
        name.to_lowercase()
    }
}

fn check_descriptor(
    descriptor: &ArgumentDescriptor,
    options: &ParseOptions,
) -> Result<(), SchemaError> {
    for name in descriptor.all_names() {
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }

        if name
            .chars()
            .any(|c| c.is_whitespace() || options.separators().contains(&c))
        {
            return Err(SchemaError::InvalidName(name.clone()));
        }
    }

    for short in descriptor.all_shorts() {
        if short.is_whitespace() || options.separators().contains(short) {
            return Err(SchemaError::InvalidName(short.to_string()));
        }
    }

    if descriptor.required && descriptor.default_text().is_some() {
        return Err(SchemaError::RequiredWithDefault(descriptor.name.clone()));
    }

    if descriptor.multi_value_separator.is_some() && !descriptor.is_accumulating() {
        return Err(SchemaError::SeparatorOnSingleValue(descriptor.name.clone()));
    }

    if descriptor.kind() != ArgumentKind::Dictionary
        && (descriptor.key_value_separator.is_some() || descriptor.allow_duplicate_keys)
    {
        return Err(SchemaError::KeyValueOnNonDictionary(descriptor.name.clone()));
    }

    if matches!(&descriptor.key_value_separator, Some(separator) if separator.is_empty()) {
        return Err(SchemaError::EmptyKeyValueSeparator(descriptor.name.clone()));
    }

    if descriptor.help_trigger && descriptor.position.is_some() {
        return Err(SchemaError::PositionalHelpTrigger(descriptor.name.clone()));
    }

    Ok(())
}

fn check_names(
    descriptors: &[ArgumentDescriptor],
    options: &ParseOptions,
) -> Result<(), SchemaError> {
    let mut names: HashMap<String, usize> = HashMap::default();
    let mut shorts: HashMap<String, usize> = HashMap::default();

    for (index, descriptor) in descriptors.iter().enumerate() {
        for name in descriptor.all_names() {
            if names.insert(fold(name, options), index).is_some() {
                return Err(SchemaError::DuplicateName(name.clone()));
            }
        }
    }

    for (index, descriptor) in descriptors.iter().enumerate() {
        for short in descriptor.all_shorts() {
            let key = fold(&short.to_string(), options);

            if shorts.insert(key.clone(), index).is_some() {
                return Err(SchemaError::DuplicateShort(*short));
            }

            // Legacy short names live amongst the ordinary names.
            if options.syntax() == Mode::Legacy && names.contains_key(&key) {
                return Err(SchemaError::DuplicateName(key));
            }
        }
    }

    Ok(())
}

fn check_positionals(descriptors: &[ArgumentDescriptor]) -> Result<Vec<usize>, SchemaError> {
    let mut positionals: Vec<(usize, usize)> = descriptors
        .iter()
        .enumerate()
        .filter_map(|(index, d)| d.position.map(|position| (position, index)))
        .collect();
    positionals.sort_unstable();

    for pair in positionals.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(SchemaError::DuplicatePosition(pair[0].0));
        }
    }

    let mut optional: Option<&ArgumentDescriptor> = None;

    for (i, (_, index)) in positionals.iter().enumerate() {
        let descriptor = &descriptors[*index];

        if descriptor.required {
            if let Some(optional) = optional {
                return Err(SchemaError::RequiredAfterOptional {
                    name: descriptor.name.clone(),
                    optional: optional.name.clone(),
                });
            }
        } else if optional.is_none() {
            optional.replace(descriptor);
        }

        if descriptor.is_accumulating() && i + 1 < positionals.len() {
            return Err(SchemaError::AccumulatingNotLast(descriptor.name.clone()));
        }
    }

    Ok(positionals.into_iter().map(|(_, index)| index).collect())
}

fn check_references(
    descriptors: &[ArgumentDescriptor],
    options: &ParseOptions,
) -> Result<(), SchemaError> {
    for descriptor in descriptors {
        for target in descriptor.requires.iter().chain(descriptor.prohibits.iter()) {
            let found = descriptors.iter().any(|d| {
                d.all_names()
                    .any(|n| same_name(n, target, options.is_case_sensitive()))
            });

            if !found {
                return Err(SchemaError::UnknownReference {
                    name: descriptor.name.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    Ok(())
}

struct HelpSwitch;

impl Capturable for HelpSwitch {
    fn kind(&self) -> ArgumentKind {
        ArgumentKind::SingleValue
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn is_switch(&self) -> bool {
        true
    }

    fn initial(&self) -> Option<AnyValue> {
        None
    }
}

fn auto_help(
    descriptors: &[ArgumentDescriptor],
    options: &ParseOptions,
) -> Option<ArgumentDescriptor> {
    let case_sensitive = options.is_case_sensitive();
    let name_taken = |name: &str| {
        descriptors
            .iter()
            .any(|d| d.all_names().any(|n| same_name(n, name, case_sensitive)))
    };

    if name_taken(HELP_NAME) {
        return None;
    }

    let short_taken = |short: char| {
        descriptors.iter().any(|d| {
            d.all_shorts()
                .any(|s| same_name(&s.to_string(), &short.to_string(), case_sensitive))
        }) || (options.syntax() == Mode::Legacy && name_taken(&short.to_string()))
    };
    let short_name = Some(HELP_SHORT).filter(|s| !short_taken(*s));
    let short_aliases = if short_taken(HELP_ALIAS) {
        Vec::default()
    } else {
        vec![HELP_ALIAS]
    };

    Some(ArgumentDescriptor {
        name: HELP_NAME.to_string(),
        short_name,
        aliases: Vec::default(),
        short_aliases,
        position: None,
        named: true,
        required: false,
        multi_value_separator: None,
        key_value_separator: None,
        allow_duplicate_keys: false,
        cancel: CancelMode::None,
        help_trigger: true,
        requires: Vec::default(),
        prohibits: Vec::default(),
        description: Some(HELP_MESSAGE.to_string()),
        value_description: None,
        capture: Box::new(HelpSwitch),
    })
}
