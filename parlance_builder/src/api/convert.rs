use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::model::Culture;

/// A converter's reason for rejecting a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The token is not a valid value; reported as an `InvalidValue` parse error.
    #[error("{0}")]
    Invalid(String),

    /// Stop the whole parse; reported as a `Canceled` parse result rather than an error.
    #[error("canceled")]
    Canceled,
}

type CustomConverter<T> = Arc<dyn Fn(&str, &Culture) -> Result<T, ConversionError> + Send + Sync>;

/// Turns raw token text into a value of type `T`.
///
/// The built-in variants cover `FromStr` types, culture sensitive numbers, and enum-like choices.
/// [`ValueConverter::Custom`] is the extension point for everything else.
pub enum ValueConverter<T> {
    /// Parse with [`FromStr`].
    Parse(fn(&str) -> Result<T, String>),
    /// Normalize the culture's number separators, then parse with [`FromStr`].
    Localized(fn(&str) -> Result<T, String>),
    /// Look the token up by name (ASCII case-insensitive).
    Choices {
        /// The accepted names and their values.
        choices: Vec<(String, T)>,
        /// Produces an owned copy of a matched value.
        clone: fn(&T) -> T,
    },
    /// A caller supplied conversion.
    Custom(CustomConverter<T>),
}

impl<T> std::fmt::Debug for ValueConverter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueConverter::Parse(_) => write!(f, "Parse"),
            ValueConverter::Localized(_) => write!(f, "Localized"),
            ValueConverter::Choices { choices, .. } => f
                .debug_tuple("Choices")
                .field(&choices.iter().map(|(n, _)| n).collect::<Vec<&String>>())
                .finish(),
            ValueConverter::Custom(_) => write!(f, "Custom"),
        }
    }
}

fn parse_from_str<T>(token: &str) -> Result<T, String>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    T::from_str(token).map_err(|e| e.to_string())
}

impl<T> ValueConverter<T> {
    /// Convert via `FromStr`, ignoring the culture.
    pub fn parse() -> Self
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        ValueConverter::Parse(parse_from_str::<T>)
    }

    /// Convert via `FromStr` after rewriting the culture's decimal and group separators.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{Culture, ValueConverter};
    ///
    /// let converter: ValueConverter<f64> = ValueConverter::localized();
    /// let german = Culture::new("de-DE", ',', Some('.'));
    /// assert_eq!(converter.convert("1.234,5", &german).unwrap(), 1234.5);
    /// ```
    pub fn localized() -> Self
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        ValueConverter::Localized(parse_from_str::<T>)
    }

    /// Convert by name lookup, for enum-like types.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{Culture, ValueConverter};
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// enum Speed { Slow, Fast }
    ///
    /// let converter = ValueConverter::choices([("slow", Speed::Slow), ("fast", Speed::Fast)]);
    /// assert_eq!(converter.convert("FAST", &Culture::invariant()).unwrap(), Speed::Fast);
    /// assert!(converter.convert("warp", &Culture::invariant()).is_err());
    /// ```
    pub fn choices<S: Into<String>>(choices: impl IntoIterator<Item = (S, T)>) -> Self
    where
        T: Clone,
    {
        ValueConverter::Choices {
            choices: choices.into_iter().map(|(n, v)| (n.into(), v)).collect(),
            clone: T::clone,
        }
    }

    /// Convert with a caller supplied function.
    pub fn custom(
        converter: impl Fn(&str, &Culture) -> Result<T, ConversionError> + Send + Sync + 'static,
    ) -> Self {
        ValueConverter::Custom(Arc::new(converter))
    }

    /// Convert `token` under the conventions of `culture`.
    pub fn convert(&self, token: &str, culture: &Culture) -> Result<T, ConversionError> {
        match self {
            ValueConverter::Parse(parse) => parse(token).map_err(ConversionError::Invalid),
            ValueConverter::Localized(parse) => {
                parse(&culture.normalize_number(token)).map_err(ConversionError::Invalid)
            }
            ValueConverter::Choices { choices, clone } => choices
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(token))
                .map(|(_, value)| clone(value))
                .ok_or_else(|| {
                    ConversionError::Invalid(format!(
                        "expected one of {{{}}}",
                        choices
                            .iter()
                            .map(|(name, _)| name.as_str())
                            .collect::<Vec<&str>>()
                            .join(", ")
                    ))
                }),
            ValueConverter::Custom(converter) => converter(token, culture),
        }
    }

    /// The names accepted by a choices converter (empty otherwise).
    pub fn names(&self) -> Vec<String> {
        match self {
            ValueConverter::Choices { choices, .. } => {
                choices.iter().map(|(name, _)| name.clone()).collect()
            }
            _ => Vec::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq)]
    enum Colour {
        Red,
        Green,
    }

    #[rstest]
    #[case("1", Ok(1))]
    #[case("-7", Ok(-7))]
    #[case("x", Err(ConversionError::Invalid("invalid digit found in string".to_string())))]
    #[case("", Err(ConversionError::Invalid("cannot parse integer from empty string".to_string())))]
    fn parse(#[case] token: &str, #[case] expected: Result<i32, ConversionError>) {
        let converter: ValueConverter<i32> = ValueConverter::parse();
        assert_eq!(converter.convert(token, &Culture::invariant()), expected);
    }

    #[test]
    fn parse_ignores_culture() {
        let converter: ValueConverter<f64> = ValueConverter::parse();
        let german = Culture::new("de-DE", ',', Some('.'));
        assert!(converter.convert("1,5", &german).is_err());
        assert_eq!(converter.convert("1.5", &german).unwrap(), 1.5);
    }

    #[rstest]
    #[case(Culture::invariant(), "2.5", 2.5)]
    #[case(Culture::new("de-DE", ',', Some('.')), "2,5", 2.5)]
    #[case(Culture::new("de-DE", ',', Some('.')), "1.000,25", 1000.25)]
    #[case(Culture::new("en-US", '.', Some(',')), "1,000.25", 1000.25)]
    fn localized(#[case] culture: Culture, #[case] token: &str, #[case] expected: f64) {
        let converter: ValueConverter<f64> = ValueConverter::localized();
        assert_eq!(converter.convert(token, &culture).unwrap(), expected);
    }

    #[rstest]
    #[case("red", Some(Colour::Red))]
    #[case("Red", Some(Colour::Red))]
    #[case("GREEN", Some(Colour::Green))]
    #[case("blue", None)]
    fn choices(#[case] token: &str, #[case] expected: Option<Colour>) {
        let converter = ValueConverter::choices([("red", Colour::Red), ("green", Colour::Green)]);
        match expected {
            Some(colour) => assert_eq!(converter.convert(token, &Culture::invariant()).unwrap(), colour),
            None => assert_eq!(
                converter.convert(token, &Culture::invariant()).unwrap_err(),
                ConversionError::Invalid("expected one of {red, green}".to_string())
            ),
        }
        assert_eq!(converter.names(), vec!["red".to_string(), "green".to_string()]);
    }

    #[test]
    fn custom_receives_culture() {
        let converter = ValueConverter::custom(|token: &str, culture: &Culture| {
            if token == "stop" {
                Err(ConversionError::Canceled)
            } else {
                Ok(format!("{}:{token}", culture.name()))
            }
        });
        let culture = Culture::new("nl-NL", ',', None);
        assert_eq!(converter.convert("x", &culture).unwrap(), "nl-NL:x");
        assert_eq!(converter.convert("stop", &culture).unwrap_err(), ConversionError::Canceled);
        assert!(converter.names().is_empty());
    }
}
