use crate::api::{AnyValue, InvalidCapture, ParseOptions};
use crate::matcher::model::ArgumentDescriptor;
use crate::matcher::resolve::Resolution;
use crate::matcher::schema::Schema;
use crate::matcher::token::{is_number, NameStyle, Token, TokenKind, Tokenizer};
use crate::model::{
    ArgumentKind, CancelMode, DuplicateAction, DuplicateArguments, HelpPrecedence,
    UnknownArguments,
};
use crate::parser::{DuplicateArgument, ParseError};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Decides which value survives a repeated single value argument.
pub(crate) type DuplicateHandler = dyn Fn(&DuplicateArgument) -> DuplicateAction + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ready,
    Consuming,
    Completed,
    Canceled,
    Failed,
}

impl Phase {
    fn enter(self, next: Phase) -> Phase {
        debug_assert!(matches!(
            (self, next),
            (Phase::Ready, Phase::Consuming)
                | (
                    Phase::Consuming,
                    Phase::Completed | Phase::Canceled | Phase::Failed
                )
        ));

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Parse state {self:?} -> {next:?}.");
        }

        next
    }
}

/// Everything one parse accumulates, indexed like the schema's descriptors.
#[derive(Debug)]
pub(crate) struct ParseState {
    pub(crate) values: Vec<Option<AnyValue>>,
    /// Values (or entries) accumulated per descriptor.
    pub(crate) counts: Vec<usize>,
    /// Times each descriptor was named or bound.
    pub(crate) occurrences: Vec<usize>,
    raw: Vec<Option<String>>,
    pub(crate) warnings: Vec<DuplicateArgument>,
    cursor: usize,
}

impl ParseState {
    fn new(size: usize) -> Self {
        Self {
            values: (0..size).map(|_| None).collect(),
            counts: vec![0; size],
            occurrences: vec![0; size],
            raw: vec![None; size],
            warnings: Vec::default(),
            cursor: 0,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Completed {
        state: ParseState,
        remaining: Vec<String>,
    },
    Failed(ParseError),
    Help {
        argument: String,
    },
    Canceled {
        argument: String,
        remaining: Vec<String>,
    },
}

enum Flow {
    Continue,
    Help(String),
    Abort(String),
    Stop,
}

/// Drives tokens through the schema for one parse.
///
/// The machine only borrows the schema; all mutable state lives in the [`ParseState`] of the call.
pub(crate) struct Machine<'s> {
    schema: &'s Schema,
    options: &'s ParseOptions,
    on_duplicate: Option<&'s DuplicateHandler>,
}

impl<'s> Machine<'s> {
    pub(crate) fn new(
        schema: &'s Schema,
        options: &'s ParseOptions,
        on_duplicate: Option<&'s DuplicateHandler>,
    ) -> Self {
        Self {
            schema,
            options,
            on_duplicate,
        }
    }

    pub(crate) fn run<'t>(&self, tokens: &'t [&'t str], start: usize) -> Outcome {
        let mut state = ParseState::new(self.schema.descriptors().len());
        let mut tokenizer = Tokenizer::new(tokens, start, self.options);
        let mut deferred: Option<ParseError> = None;
        let phase = Phase::Ready.enter(Phase::Consuming);

        while let Some(next) = tokenizer.next() {
            if deferred.is_some() {
                // After a failure only a help trigger can change the outcome.
                if let Ok(token) = next {
                    if let Some(argument) = self.help_trigger(&token) {
                        phase.enter(Phase::Canceled);
                        return Outcome::Help { argument };
                    }
                }

                continue;
            }

            let flow = match next {
                Ok(token) => self.step(&mut state, token, &mut tokenizer),
                Err(error) => Err(error),
            };

            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Help(argument)) => {
                    phase.enter(Phase::Canceled);
                    return Outcome::Help { argument };
                }
                Ok(Flow::Abort(argument)) => {
                    phase.enter(Phase::Canceled);
                    return Outcome::Canceled {
                        argument,
                        remaining: remaining(tokens, tokenizer.position()),
                    };
                }
                Ok(Flow::Stop) => {
                    phase.enter(Phase::Completed);
                    return Outcome::Completed {
                        state,
                        remaining: remaining(tokens, tokenizer.position()),
                    };
                }
                Err(error) => match self.options.precedence() {
                    HelpPrecedence::FirstError => {
                        phase.enter(Phase::Failed);
                        return Outcome::Failed(error);
                    }
                    HelpPrecedence::Always => {
                        #[cfg(feature = "tracing_debug")]
                        {
                            debug!("Deferring '{error}' while scanning for help.");
                        }

                        deferred.replace(error);
                    }
                },
            }
        }

        match deferred {
            Some(error) => {
                phase.enter(Phase::Failed);
                Outcome::Failed(error)
            }
            None => {
                phase.enter(Phase::Completed);
                Outcome::Completed {
                    state,
                    remaining: Vec::default(),
                }
            }
        }
    }

    fn step<'t>(
        &self,
        state: &mut ParseState,
        token: Token<'t>,
        tokenizer: &mut Tokenizer<'t, '_>,
    ) -> Result<Flow, ParseError> {
        let resolver = self.schema.resolver();

        match token.kind.clone() {
            TokenKind::Terminator => Ok(Flow::Continue),
            TokenKind::Positional => self.bind(state, token.raw, token.index),
            TokenKind::Named {
                style: NameStyle::Short,
                name,
                value,
            } => {
                let first = name
                    .chars()
                    .next()
                    .expect("internal error - names are never empty");

                match resolver.resolve_short(first) {
                    Some(index) if name.len() == first.len_utf8() => {
                        self.accept(state, index, value, &token, tokenizer)
                    }
                    Some(_) => self.combined(state, name, value, &token, tokenizer),
                    None => self.unresolved(state, name, &token),
                }
            }
            TokenKind::Named { name, value, .. } => match resolver.resolve(name) {
                Resolution::Found(index) => self.accept(state, index, value, &token, tokenizer),
                Resolution::Ambiguous(candidates) => Err(ParseError::AmbiguousName {
                    name: name.to_string(),
                    candidates,
                    index: token.index,
                }),
                Resolution::NotFound => self.unresolved(state, name, &token),
            },
        }
    }

    // `-abc` is `-a -b -c`; only the last may take a value.
    fn combined<'t>(
        &self,
        state: &mut ParseState,
        names: &'t str,
        value: Option<&'t str>,
        token: &Token<'t>,
        tokenizer: &mut Tokenizer<'t, '_>,
    ) -> Result<Flow, ParseError> {
        let resolver = self.schema.resolver();
        let shorts: Vec<char> = names.chars().collect();
        let (last, heads) = shorts
            .split_last()
            .expect("internal error - names are never empty");
        let unknown = |short: &char| ParseError::UnknownArgument {
            name: short.to_string(),
            index: token.index,
        };

        for short in heads {
            let index = resolver.resolve_short(*short).ok_or_else(|| unknown(short))?;
            let descriptor = self.schema.descriptor(index);

            if !descriptor.is_switch() {
                return Err(ParseError::CombinedShortNonSwitch {
                    name: descriptor.name.clone(),
                    token: token.raw.to_string(),
                    index: token.index,
                });
            }

            match self.accept(state, index, None, token, tokenizer)? {
                Flow::Continue => {}
                flow => return Ok(flow),
            }
        }

        let index = resolver.resolve_short(*last).ok_or_else(|| unknown(last))?;
        self.accept(state, index, value, token, tokenizer)
    }

    fn unresolved(
        &self,
        state: &mut ParseState,
        name: &str,
        token: &Token,
    ) -> Result<Flow, ParseError> {
        if is_number(token.raw, self.options.culture_ref()) {
            return self.bind(state, token.raw, token.index);
        }

        match self.options.unknowns() {
            UnknownArguments::Ignore => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Ignoring unknown argument '{name}'.");
                }

                Ok(Flow::Continue)
            }
            UnknownArguments::Error => Err(ParseError::UnknownArgument {
                name: name.to_string(),
                index: token.index,
            }),
        }
    }

    fn accept<'t>(
        &self,
        state: &mut ParseState,
        index: usize,
        inline: Option<&'t str>,
        token: &Token<'t>,
        tokenizer: &mut Tokenizer<'t, '_>,
    ) -> Result<Flow, ParseError> {
        let descriptor = self.schema.descriptor(index);

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Matched '{}' to {descriptor:?}.", token.raw);
        }

        if descriptor.help_trigger {
            return Ok(Flow::Help(descriptor.name.clone()));
        }

        let value = match inline {
            Some(text) => Some((text, token.index)),
            None if descriptor.is_switch() => None,
            None if self.options.white_space_values() => self.lookahead(tokenizer),
            None => None,
        };

        if value.is_none() && !descriptor.is_switch() {
            return Err(ParseError::MissingValue {
                name: descriptor.name.clone(),
                index: token.index,
            });
        }

        let Some((text, at)) = value else {
            return self.store(state, index, None, token.index, token.index);
        };
        let mut progress = self.store(state, index, Some(text), at, token.index)?;

        // An accumulating option keeps taking values up to the next name or the terminator.
        if inline.is_none() && descriptor.is_accumulating() {
            while let Flow::Continue = progress {
                let Some((text, at)) = self.lookahead(tokenizer) else {
                    break;
                };
                progress = self.store(state, index, Some(text), at, token.index)?;
            }
        }

        Ok(progress)
    }

    // The next token is a value if it is positional, or a number no argument claims.
    fn lookahead<'t>(&self, tokenizer: &mut Tokenizer<'t, '_>) -> Option<(&'t str, usize)> {
        let mut ahead = tokenizer.clone();
        let value = match ahead.next()? {
            Ok(Token {
                kind: TokenKind::Positional,
                raw,
                index,
            }) => (raw, index),
            Ok(Token {
                kind: TokenKind::Named { style, name, .. },
                raw,
                index,
            }) if is_number(raw, self.options.culture_ref()) && !self.resolves(style, name) => {
                (raw, index)
            }
            _ => return None,
        };
        *tokenizer = ahead;
        Some(value)
    }

    fn resolves(&self, style: NameStyle, name: &str) -> bool {
        let resolver = self.schema.resolver();

        match style {
            NameStyle::Short => name
                .chars()
                .next()
                .and_then(|c| resolver.resolve_short(c))
                .is_some(),
            NameStyle::Long | NameStyle::Legacy => resolver.resolve(name) != Resolution::NotFound,
        }
    }

    fn bind(&self, state: &mut ParseState, raw: &str, at: usize) -> Result<Flow, ParseError> {
        let positionals = self.schema.positionals();

        while let Some(index) = positionals.get(state.cursor) {
            let descriptor = self.schema.descriptor(*index);

            // The last positional keeps accepting when it accumulates.
            if descriptor.is_accumulating() {
                return self.store(state, *index, Some(raw), at, at);
            }

            state.cursor += 1;

            // Already supplied by name.
            if state.occurrences[*index] == 0 {
                return self.store(state, *index, Some(raw), at, at);
            }
        }

        Err(ParseError::TooManyPositionalArguments {
            token: raw.to_string(),
            index: at,
        })
    }

    fn store(
        &self,
        state: &mut ParseState,
        index: usize,
        value: Option<&str>,
        at: usize,
        named_at: usize,
    ) -> Result<Flow, ParseError> {
        let descriptor = self.schema.descriptor(index);
        let culture = self.options.culture_ref();
        state.occurrences[index] += 1;

        match descriptor.kind() {
            ArgumentKind::Method => {
                let mode = match descriptor.capture.invoke(value, culture) {
                    Ok(CancelMode::None) => descriptor.cancel,
                    Ok(mode) => mode,
                    Err(error) => return self.rejected(descriptor, error, at),
                };

                return Ok(flow(descriptor, mode));
            }
            ArgumentKind::SingleValue => {
                let duplicate = state.occurrences[index] > 1;

                if duplicate && self.options.duplicates() == DuplicateArguments::Error {
                    return Err(ParseError::DuplicateArgument {
                        name: descriptor.name.clone(),
                        index: named_at,
                    });
                }

                let captured = match value {
                    None => descriptor.capture.present(),
                    Some("") if descriptor.allows_null() => descriptor.capture.null(),
                    Some(text) => match descriptor.capture.capture(text, culture) {
                        Ok(captured) => captured,
                        Err(error) => return self.rejected(descriptor, error, at),
                    },
                };

                if duplicate && self.options.duplicates() == DuplicateArguments::Warning {
                    let warning = DuplicateArgument {
                        name: descriptor.name.clone(),
                        old_value: state.raw[index].clone(),
                        new_value: value.map(str::to_string),
                    };
                    let action = self
                        .on_duplicate
                        .map(|handler| handler(&warning))
                        .unwrap_or(DuplicateAction::KeepNew);

                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Duplicate {warning:?} resolved as {action:?}.");
                    }

                    state.warnings.push(warning);

                    if action == DuplicateAction::KeepOld {
                        return Ok(flow(descriptor, descriptor.cancel));
                    }
                }

                state.values[index].replace(captured);
                state.raw[index] = value.map(str::to_string);
                state.counts[index] = 1;
            }
            ArgumentKind::MultiValue => {
                let text = value.expect("internal error - accumulating fields always take a value");
                let container = state.values[index].get_or_insert_with(|| descriptor.capture.empty());

                for piece in self.pieces(descriptor, text) {
                    if let Err(error) = descriptor.capture.add(container, piece, culture) {
                        return self.rejected(descriptor, error, at);
                    }

                    state.counts[index] += 1;
                }
            }
            ArgumentKind::Dictionary => {
                let text = value.expect("internal error - accumulating fields always take a value");
                let separator = descriptor
                    .key_value_separator
                    .as_deref()
                    .unwrap_or(self.options.default_key_value_separator());
                let container = state.values[index].get_or_insert_with(|| descriptor.capture.empty());

                for piece in self.pieces(descriptor, text) {
                    let inserted = match piece.split_once(separator) {
                        Some((key, value)) => descriptor.capture.insert(
                            container,
                            key,
                            value,
                            culture,
                            descriptor.allow_duplicate_keys,
                        ),
                        None => Err(InvalidCapture::MalformedEntry {
                            token: piece.to_string(),
                            separator: separator.to_string(),
                        }),
                    };

                    if let Err(error) = inserted {
                        return self.rejected(descriptor, error, at);
                    }

                    state.counts[index] += 1;
                }
            }
        }

        Ok(flow(descriptor, descriptor.cancel))
    }

    fn pieces<'v>(&self, descriptor: &ArgumentDescriptor, text: &'v str) -> Vec<&'v str> {
        match descriptor
            .multi_value_separator
            .or(self.options.default_multi_value_separator())
        {
            Some(separator) => text.split(separator).collect(),
            None => vec![text],
        }
    }

    fn rejected(
        &self,
        descriptor: &ArgumentDescriptor,
        error: InvalidCapture,
        at: usize,
    ) -> Result<Flow, ParseError> {
        let name = descriptor.name.clone();

        match error {
            InvalidCapture::Canceled { .. } => Ok(Flow::Abort(name)),
            InvalidCapture::FailedValidation { .. } => Err(ParseError::ValidationFailed {
                name: Some(name),
                message: error.to_string(),
                index: Some(at),
            }),
            InvalidCapture::DuplicateKey { token } => Err(ParseError::DuplicateKey {
                name,
                key: token,
                index: at,
            }),
            InvalidCapture::InvalidConversion { ref token, .. }
            | InvalidCapture::MalformedEntry { ref token, .. } => Err(ParseError::InvalidValue {
                name,
                token: token.clone(),
                message: error.to_string(),
                index: at,
            }),
        }
    }

    fn help_trigger(&self, token: &Token) -> Option<String> {
        let TokenKind::Named { style, name, .. } = &token.kind else {
            return None;
        };
        let resolver = self.schema.resolver();
        let found: Vec<usize> = match style {
            NameStyle::Short => name
                .chars()
                .filter_map(|c| resolver.resolve_short(c))
                .collect(),
            NameStyle::Long | NameStyle::Legacy => match resolver.resolve(name) {
                Resolution::Found(index) => vec![index],
                _ => Vec::default(),
            },
        };

        found
            .into_iter()
            .map(|index| self.schema.descriptor(index))
            .find(|descriptor| descriptor.help_trigger)
            .map(|descriptor| descriptor.name.clone())
    }
}

fn flow(descriptor: &ArgumentDescriptor, mode: CancelMode) -> Flow {
    match mode {
        CancelMode::None => Flow::Continue,
        CancelMode::Abort => Flow::Abort(descriptor.name.clone()),
        CancelMode::Success => Flow::Stop,
    }
}

fn remaining(tokens: &[&str], position: usize) -> Vec<String> {
    tokens
        .get(position..)
        .unwrap_or_default()
        .iter()
        .map(|token| token.to_string())
        .collect()
}
