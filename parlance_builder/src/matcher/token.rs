use crate::api::ParseOptions;
use crate::constant::TERMINATOR;
use crate::model::{Culture, Mode};
use crate::parser::ParseError;

/// How a named token introduced its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameStyle {
    /// `--name`
    Long,
    /// `-n`, or a run of combined short names `-abc`.
    Short,
    /// Any of the legacy prefixes, for any name.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind<'t> {
    Named {
        style: NameStyle,
        name: &'t str,
        value: Option<&'t str>,
    },
    Positional,
    Terminator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'t> {
    pub(crate) kind: TokenKind<'t>,
    pub(crate) raw: &'t str,
    pub(crate) index: usize,
}

/// Lazily classifies raw argument strings.
///
/// Whether a following token is the value of a named token is left to the state machine,
/// since only it knows whether the argument is a switch.
/// Cloning gives a cheap lookahead.
#[derive(Clone)]
pub(crate) struct Tokenizer<'t, 'o> {
    tokens: &'t [&'t str],
    index: usize,
    terminated: bool,
    options: &'o ParseOptions,
}

impl<'t, 'o> Tokenizer<'t, 'o> {
    pub(crate) fn new(tokens: &'t [&'t str], start: usize, options: &'o ParseOptions) -> Self {
        Self {
            tokens,
            index: start,
            terminated: false,
            options,
        }
    }

    /// The index of the next token to be produced.
    pub(crate) fn position(&self) -> usize {
        self.index
    }

    fn classify(&mut self, raw: &'t str, index: usize) -> Result<Token<'t>, ParseError> {
        if self.terminated {
            return Ok(Token {
                kind: TokenKind::Positional,
                raw,
                index,
            });
        }

        if raw == TERMINATOR {
            self.terminated = true;
            return Ok(Token {
                kind: TokenKind::Terminator,
                raw,
                index,
            });
        }

        let named = match self.options.syntax() {
            Mode::LongShort => {
                let long = self.options.long_name_prefix();

                if !long.is_empty() && raw.len() > long.len() && raw.starts_with(long) {
                    Some((NameStyle::Long, &raw[long.len()..]))
                } else {
                    self.strip_prefix(raw).map(|rest| (NameStyle::Short, rest))
                }
            }
            Mode::Legacy => self.strip_prefix(raw).map(|rest| (NameStyle::Legacy, rest)),
        };

        match named {
            Some((style, rest)) => {
                let (name, value) = self.split(rest);

                if name.is_empty() {
                    return Err(ParseError::Tokenization {
                        token: raw.to_string(),
                        message: "the argument name is empty".to_string(),
                        index,
                    });
                }

                Ok(Token {
                    kind: TokenKind::Named { style, name, value },
                    raw,
                    index,
                })
            }
            None => Ok(Token {
                kind: TokenKind::Positional,
                raw,
                index,
            }),
        }
    }

    // The prefixes are kept longest first, so the first match is the most specific.
    fn strip_prefix(&self, raw: &'t str) -> Option<&'t str> {
        self.options
            .name_prefixes()
            .iter()
            .filter(|prefix| !prefix.is_empty() && raw.len() > prefix.len())
            .find_map(|prefix| raw.strip_prefix(prefix.as_str()))
    }

    fn split(&self, rest: &'t str) -> (&'t str, Option<&'t str>) {
        match rest.find(|c: char| self.options.separators().contains(&c)) {
            Some(at) => {
                let separator_length = rest[at..]
                    .chars()
                    .next()
                    .map(|c| c.len_utf8())
                    .unwrap_or(1);
                (&rest[..at], Some(&rest[at + separator_length..]))
            }
            None => (rest, None),
        }
    }
}

impl<'t, 'o> Iterator for Tokenizer<'t, 'o> {
    type Item = Result<Token<'t>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = *self.tokens.get(self.index)?;
        let index = self.index;
        self.index += 1;
        Some(self.classify(raw, index))
    }
}

/// Whether the text reads as a (signed) number in the given culture, ex: `-5` or `-1,5`.
pub(crate) fn is_number(text: &str, culture: &Culture) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);

    match unsigned.chars().next() {
        Some(c) if c.is_ascii_digit() || c == culture.decimal_separator() => {
            culture.normalize_number(text).parse::<f64>().is_ok()
        }
        _ => false,
    }
}
