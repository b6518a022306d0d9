use std::fmt::Display;
use std::sync::Arc;

type Check<T> = Arc<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// A predicate over each converted value of an argument.
///
/// Validators run right after conversion, in the order they were attached.
/// The first failure is reported as a `ValidationFailed` parse error.
///
/// ### Example
/// ```
/// # use parlance_builder as parlance;
/// use parlance::Validator;
///
/// let validator: Validator<u16> = Validator::range(1, 1024);
/// assert!(validator.check(&80).is_ok());
/// assert_eq!(validator.check(&0).unwrap_err(), "must be between 1 and 1024");
/// ```
pub struct Validator<T> {
    check: Check<T>,
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            check: self.check.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator{..}").finish()
    }
}

impl<T> Validator<T> {
    /// Validate with a caller supplied predicate; `Err` carries the failure message.
    pub fn custom(check: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    /// Require the value to lie within `min..=max`.
    pub fn range(min: T, max: T) -> Self
    where
        T: PartialOrd + Display + Send + Sync + 'static,
    {
        Self::custom(move |value: &T| {
            if *value < min || *value > max {
                Err(format!("must be between {min} and {max}"))
            } else {
                Ok(())
            }
        })
    }

    /// Require the value to be a non-empty string.
    pub fn not_empty() -> Self
    where
        T: AsRef<str>,
    {
        Self::custom(|value: &T| {
            if value.as_ref().is_empty() {
                Err("must not be empty".to_string())
            } else {
                Ok(())
            }
        })
    }

    /// Require the value's length (in characters) to lie within `min..=max`.
    pub fn length(min: usize, max: usize) -> Self
    where
        T: AsRef<str>,
    {
        Self::custom(move |value: &T| {
            let length = value.as_ref().chars().count();

            if length < min || length > max {
                Err(format!("must be between {min} and {max} characters long"))
            } else {
                Ok(())
            }
        })
    }

    /// Run this validator against a value.
    pub fn check(&self, value: &T) -> Result<(), String> {
        (self.check)(value)
    }
}
