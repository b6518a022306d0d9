use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::capture::*;
use crate::api::convert::{ConversionError, ValueConverter};
use crate::api::validate::Validator;
use crate::model::{ArgumentKind, CancelMode, Culture, Nargs};
use crate::prelude::{Collectable, KeyedCollectable};

struct Typed<T> {
    converter: ValueConverter<T>,
    validators: Vec<Validator<T>>,
}

impl<T> Typed<T> {
    fn new(converter: ValueConverter<T>) -> Self {
        Self {
            converter,
            validators: Vec::default(),
        }
    }

    fn convert(&self, token: &str, culture: &Culture) -> Result<T, InvalidCapture> {
        let value = self
            .converter
            .convert(token, culture)
            .map_err(|error| match error {
                ConversionError::Invalid(message) => InvalidCapture::InvalidConversion {
                    token: token.to_string(),
                    type_name: std::any::type_name::<T>(),
                    message,
                },
                ConversionError::Canceled => InvalidCapture::Canceled {
                    token: token.to_string(),
                },
            })?;

        for validator in &self.validators {
            validator
                .check(&value)
                .map_err(|message| InvalidCapture::FailedValidation {
                    token: token.to_string(),
                    message,
                })?;
        }

        Ok(value)
    }
}

// A default value, copied out fresh for every parse.
struct Preset<V> {
    value: V,
    clone: fn(&V) -> V,
    text: String,
}

impl<V: Clone> Preset<V> {
    fn new(value: V, text: String) -> Self {
        Self {
            value,
            clone: V::clone,
            text,
        }
    }
}

impl<V> Preset<V> {
    fn get(&self) -> V {
        (self.clone)(&self.value)
    }
}

/// A parameter that takes a single value.
pub struct Scalar<T> {
    typed: Typed<T>,
    default: Option<Preset<T>>,
}

impl<T> CliOption for Scalar<T> {}
impl<T> CliArgument for Scalar<T> {}

impl<T> Scalar<T> {
    /// Create a scalar parameter, converting via [`FromStr`].
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{Parameter, Scalar};
    ///
    /// Parameter::option(Scalar::<u32>::new(), "count");
    /// ```
    pub fn new() -> Self
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        Self::with(ValueConverter::parse())
    }

    /// Create a scalar parameter with an explicit converter.
    pub fn with(converter: ValueConverter<T>) -> Self {
        Self {
            typed: Typed::new(converter),
            default: None,
        }
    }

    /// The value assembled when the argument is not supplied.
    pub fn default(mut self, value: T) -> Self
    where
        T: Clone + Display,
    {
        let text = value.to_string();
        self.default.replace(Preset::new(value, text));
        self
    }

    /// Replace the converter.
    pub fn converter(mut self, converter: ValueConverter<T>) -> Self {
        self.typed.converter = converter;
        self
    }

    /// Attach a validator, run after conversion.
    pub fn validate(mut self, validator: Validator<T>) -> Self {
        self.typed.validators.push(validator);
        self
    }
}

impl<T> Capturable for Scalar<T>
where
    T: Send + Sync + 'static,
{
    fn kind(&self) -> ArgumentKind {
        ArgumentKind::SingleValue
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn choices(&self) -> Vec<String> {
        self.typed.converter.names()
    }

    fn default_text(&self) -> Option<String> {
        self.default.as_ref().map(|preset| preset.text.clone())
    }

    fn capture(&self, token: &str, culture: &Culture) -> Result<AnyValue, InvalidCapture> {
        Ok(Box::new(self.typed.convert(token, culture)?))
    }

    fn initial(&self) -> Option<AnyValue> {
        self.default
            .as_ref()
            .map(|preset| Box::new(preset.get()) as AnyValue)
    }
}

/// An option parameter that takes no values; presence sets it to `true`.
/// An explicit value (ex: `--flag=false`) is also accepted.
pub struct Switch {
    default: bool,
    explicit: bool,
}

impl CliOption for Switch {}

impl Switch {
    /// Create a switch parameter, `false` unless supplied.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{Parameter, Switch};
    ///
    /// Parameter::option(Switch::new(), "verbose").short('v');
    /// ```
    pub fn new() -> Self {
        Self {
            default: false,
            explicit: false,
        }
    }

    /// The value assembled when the switch is not supplied.
    pub fn default(mut self, value: bool) -> Self {
        self.default = value;
        self.explicit = true;
        self
    }
}

impl Capturable for Switch {
    fn kind(&self) -> ArgumentKind {
        ArgumentKind::SingleValue
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<bool>()
    }

    fn is_switch(&self) -> bool {
        true
    }

    fn default_text(&self) -> Option<String> {
        self.explicit.then(|| self.default.to_string())
    }

    fn capture(&self, token: &str, _culture: &Culture) -> Result<AnyValue, InvalidCapture> {
        let value = bool::from_str(token.to_ascii_lowercase().as_str()).map_err(|error| {
            InvalidCapture::InvalidConversion {
                token: token.to_string(),
                type_name: std::any::type_name::<bool>(),
                message: error.to_string(),
            }
        })?;
        Ok(Box::new(value))
    }

    fn present(&self) -> AnyValue {
        Box::new(true)
    }

    fn initial(&self) -> Option<AnyValue> {
        Some(Box::new(self.default))
    }
}

/// A parameter that maps down to [`Option`], taking a single value.
/// An explicitly empty value (ex: `--name=`) yields `None`.
pub struct Optional<T> {
    typed: Typed<T>,
    default: Option<Preset<T>>,
}

impl<T> CliOption for Optional<T> {}
impl<T> CliArgument for Optional<T> {}

impl<T> Optional<T> {
    /// Create an optional parameter, converting via [`FromStr`].
    pub fn new() -> Self
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        Self::with(ValueConverter::parse())
    }

    /// Create an optional parameter with an explicit converter.
    pub fn with(converter: ValueConverter<T>) -> Self {
        Self {
            typed: Typed::new(converter),
            default: None,
        }
    }

    /// The value (wrapped in `Some`) assembled when the argument is not supplied.
    pub fn default(mut self, value: T) -> Self
    where
        T: Clone + Display,
    {
        let text = value.to_string();
        self.default.replace(Preset::new(value, text));
        self
    }

    /// Replace the converter.
    pub fn converter(mut self, converter: ValueConverter<T>) -> Self {
        self.typed.converter = converter;
        self
    }

    /// Attach a validator, run after conversion.
    pub fn validate(mut self, validator: Validator<T>) -> Self {
        self.typed.validators.push(validator);
        self
    }
}

impl<T> Capturable for Optional<T>
where
    T: Send + Sync + 'static,
{
    fn kind(&self) -> ArgumentKind {
        ArgumentKind::SingleValue
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn allows_null(&self) -> bool {
        true
    }

    fn choices(&self) -> Vec<String> {
        self.typed.converter.names()
    }

    fn default_text(&self) -> Option<String> {
        self.default.as_ref().map(|preset| preset.text.clone())
    }

    fn capture(&self, token: &str, culture: &Culture) -> Result<AnyValue, InvalidCapture> {
        Ok(Box::new(Some(self.typed.convert(token, culture)?)))
    }

    fn null(&self) -> AnyValue {
        Box::new(None::<T>)
    }

    fn initial(&self) -> Option<AnyValue> {
        let value: Option<T> = self.default.as_ref().map(|preset| preset.get());
        Some(Box::new(value))
    }
}

/// A parameter that takes multiple values (specifiable [`Nargs`]), in the order supplied.
pub struct Collection<C, T> {
    typed: Typed<T>,
    nargs: Nargs,
    default: Option<Preset<Vec<T>>>,
    _phantom: PhantomData<fn() -> C>,
}

impl<C, T> CliOption for Collection<C, T> {}
impl<C, T> CliArgument for Collection<C, T> {}

impl<C, T> Collection<C, T> {
    /// Create a collection parameter, converting each value via [`FromStr`].
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{Collection, Nargs, Parameter};
    ///
    /// Parameter::option(Collection::<Vec<String>, String>::new(Nargs::Any), "tag");
    /// ```
    pub fn new(nargs: Nargs) -> Self
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        Self::with(nargs, ValueConverter::parse())
    }

    /// Create a collection parameter with an explicit converter.
    pub fn with(nargs: Nargs, converter: ValueConverter<T>) -> Self {
        Self {
            typed: Typed::new(converter),
            nargs,
            default: None,
            _phantom: PhantomData,
        }
    }

    /// The values assembled when the argument is not supplied.
    pub fn default(mut self, values: impl IntoIterator<Item = T>) -> Self
    where
        T: Clone + Display,
    {
        let values: Vec<T> = values.into_iter().collect();
        let text = format!(
            "[{}]",
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        );
        self.default.replace(Preset::new(values, text));
        self
    }

    /// Replace the converter.
    pub fn converter(mut self, converter: ValueConverter<T>) -> Self {
        self.typed.converter = converter;
        self
    }

    /// Attach a validator, run on each value after conversion.
    pub fn validate(mut self, validator: Validator<T>) -> Self {
        self.typed.validators.push(validator);
        self
    }
}

impl<C, T> Capturable for Collection<C, T>
where
    C: Collectable<T> + Default + 'static,
    T: Send + Sync + 'static,
{
    fn kind(&self) -> ArgumentKind {
        ArgumentKind::MultiValue
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn nargs(&self) -> Option<Nargs> {
        Some(self.nargs)
    }

    fn choices(&self) -> Vec<String> {
        self.typed.converter.names()
    }

    fn default_text(&self) -> Option<String> {
        self.default.as_ref().map(|preset| preset.text.clone())
    }

    fn empty(&self) -> AnyValue {
        Box::new(C::default())
    }

    fn add(
        &self,
        container: &mut AnyValue,
        token: &str,
        culture: &Culture,
    ) -> Result<(), InvalidCapture> {
        let value = self.typed.convert(token, culture)?;
        downcast_mut::<C>(container).add(value);
        Ok(())
    }

    fn initial(&self) -> Option<AnyValue> {
        let mut collection = C::default();

        if let Some(preset) = &self.default {
            for value in preset.get() {
                collection.add(value);
            }
        }

        Some(Box::new(collection))
    }
}

/// A parameter that takes key/value entries (ex: `--define name=value`), collected into a map.
pub struct Dictionary<K, V, M = IndexMap<K, V>> {
    keys: Typed<K>,
    values: Typed<V>,
    default: Option<Preset<Vec<(K, V)>>>,
    _phantom: PhantomData<fn() -> M>,
}

impl<K, V, M> CliOption for Dictionary<K, V, M> {}
impl<K, V, M> CliArgument for Dictionary<K, V, M> {}

impl<K, V> Dictionary<K, V, IndexMap<K, V>> {
    /// Create a dictionary parameter collecting into an [`IndexMap`], converting via [`FromStr`].
    /// Entries iterate in first-insertion order.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{Dictionary, Parameter};
    ///
    /// Parameter::option(Dictionary::<String, u32>::new(), "define").short('D');
    /// ```
    pub fn new() -> Self
    where
        K: FromStr,
        <K as FromStr>::Err: Display,
        V: FromStr,
        <V as FromStr>::Err: Display,
    {
        Self::with(ValueConverter::parse(), ValueConverter::parse())
    }
}

impl<K, V, M> Dictionary<K, V, M> {
    /// Create a dictionary parameter with explicit key and value converters, collecting into any map `M`.
    pub fn with(keys: ValueConverter<K>, values: ValueConverter<V>) -> Self {
        Self {
            keys: Typed::new(keys),
            values: Typed::new(values),
            default: None,
            _phantom: PhantomData,
        }
    }

    /// The entries assembled when the argument is not supplied.
    pub fn default(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Clone + Display,
        V: Clone + Display,
    {
        let entries: Vec<(K, V)> = entries.into_iter().collect();
        let text = entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<String>>()
            .join(", ");
        self.default.replace(Preset::new(entries, text));
        self
    }

    /// Replace the key converter.
    pub fn key_converter(mut self, converter: ValueConverter<K>) -> Self {
        self.keys.converter = converter;
        self
    }

    /// Replace the value converter.
    pub fn converter(mut self, converter: ValueConverter<V>) -> Self {
        self.values.converter = converter;
        self
    }

    /// Attach a key validator, run after conversion.
    pub fn validate_key(mut self, validator: Validator<K>) -> Self {
        self.keys.validators.push(validator);
        self
    }

    /// Attach a value validator, run after conversion.
    pub fn validate(mut self, validator: Validator<V>) -> Self {
        self.values.validators.push(validator);
        self
    }
}

impl<K, V, M> Capturable for Dictionary<K, V, M>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
    M: KeyedCollectable<K, V> + Default + 'static,
{
    fn kind(&self) -> ArgumentKind {
        ArgumentKind::Dictionary
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<M>()
    }

    fn choices(&self) -> Vec<String> {
        self.values.converter.names()
    }

    fn default_text(&self) -> Option<String> {
        self.default.as_ref().map(|preset| preset.text.clone())
    }

    fn empty(&self) -> AnyValue {
        Box::new(M::default())
    }

    fn insert(
        &self,
        container: &mut AnyValue,
        key: &str,
        value: &str,
        culture: &Culture,
        overwrite: bool,
    ) -> Result<(), InvalidCapture> {
        let key_value = self.keys.convert(key, culture)?;
        let map = downcast_mut::<M>(container);

        if !overwrite && map.contains(&key_value) {
            return Err(InvalidCapture::DuplicateKey {
                token: key.to_string(),
            });
        }

        let value = self.values.convert(value, culture)?;
        map.put(key_value, value);
        Ok(())
    }

    fn initial(&self) -> Option<AnyValue> {
        let mut map = M::default();

        if let Some(preset) = &self.default {
            for (key, value) in preset.get() {
                map.put(key, value);
            }
        }

        Some(Box::new(map))
    }
}

type ValueCallback<T> = Arc<dyn Fn(T) -> CancelMode + Send + Sync>;
type FlagCallback = Arc<dyn Fn() -> CancelMode + Send + Sync>;

enum Call<T> {
    Value(Typed<T>, ValueCallback<T>),
    Flag(FlagCallback),
}

/// An option parameter whose callback runs as soon as it is encountered, mid-parse.
/// The callback decides whether parsing continues via its [`CancelMode`].
pub struct Method<T> {
    call: Call<T>,
}

impl<T> CliOption for Method<T> {}

impl<T> Method<T> {
    /// Create a method taking one value, converted via [`FromStr`].
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{CancelMode, Method, Parameter};
    ///
    /// Parameter::option(
    ///     Method::new(|level: u8| {
    ///         println!("log level {level}");
    ///         CancelMode::None
    ///     }),
    ///     "log-level",
    /// );
    /// ```
    pub fn new(callback: impl Fn(T) -> CancelMode + Send + Sync + 'static) -> Self
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        Self::with(ValueConverter::parse(), callback)
    }

    /// Create a method taking one value with an explicit converter.
    pub fn with(
        converter: ValueConverter<T>,
        callback: impl Fn(T) -> CancelMode + Send + Sync + 'static,
    ) -> Self {
        Self {
            call: Call::Value(Typed::new(converter), Arc::new(callback)),
        }
    }

    /// Replace the converter (no effect on a flag method).
    pub fn converter(mut self, converter: ValueConverter<T>) -> Self {
        if let Call::Value(typed, _) = &mut self.call {
            typed.converter = converter;
        }
        self
    }

    /// Attach a validator, run after conversion (no effect on a flag method).
    pub fn validate(mut self, validator: Validator<T>) -> Self {
        if let Call::Value(typed, _) = &mut self.call {
            typed.validators.push(validator);
        }
        self
    }
}

impl Method<()> {
    /// Create a method taking no values.
    ///
    /// ### Example
    /// ```
    /// # use parlance_builder as parlance;
    /// use parlance::{CancelMode, Method, Parameter};
    ///
    /// Parameter::option(
    ///     Method::flag(|| {
    ///         println!("program 1.0");
    ///         CancelMode::Abort
    ///     }),
    ///     "version",
    /// );
    /// ```
    pub fn flag(callback: impl Fn() -> CancelMode + Send + Sync + 'static) -> Self {
        Self {
            call: Call::Flag(Arc::new(callback)),
        }
    }
}

impl<T> Capturable for Method<T>
where
    T: Send + Sync + 'static,
{
    fn kind(&self) -> ArgumentKind {
        ArgumentKind::Method
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn is_switch(&self) -> bool {
        matches!(self.call, Call::Flag(_))
    }

    fn choices(&self) -> Vec<String> {
        match &self.call {
            Call::Value(typed, _) => typed.converter.names(),
            Call::Flag(_) => Vec::default(),
        }
    }

    fn initial(&self) -> Option<AnyValue> {
        None
    }

    fn invoke(&self, token: Option<&str>, culture: &Culture) -> Result<CancelMode, InvalidCapture> {
        match &self.call {
            Call::Value(typed, callback) => {
                let token =
                    token.expect("internal error - a value method must be invoked with a value");
                Ok(callback(typed.convert(token, culture)?))
            }
            Call::Flag(callback) => Ok(callback()),
        }
    }
}

impl<T> Collectable<T> for Vec<T> {
    fn add(&mut self, item: T) {
        self.push(item);
    }
}

impl<T: Eq + Hash> Collectable<T> for HashSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }
}

impl<T: Ord> Collectable<T> for BTreeSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }
}

impl<K: Eq + Hash, V> KeyedCollectable<K, V> for IndexMap<K, V> {
    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn put(&mut self, key: K, value: V) {
        // Replacing a value keeps the key's original position.
        self.insert(key, value);
    }
}

impl<K: Eq + Hash, V> KeyedCollectable<K, V> for HashMap<K, V> {
    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<K: Ord, V> KeyedCollectable<K, V> for BTreeMap<K, V> {
    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}
