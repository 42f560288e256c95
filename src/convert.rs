use crate::ConvertError;
use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Converts resolved property text into a typed value.
pub trait PropertyConverter: Send + Sync {
    /// Converted type.
    type Target;

    /// Convert `value`.
    fn convert(&self, value: &str) -> Result<Self::Target, ConvertError>;

    /// Converter identity used in error messages.
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

/// A [`PropertyConverter`] which can be created without arguments, used for
/// per-accessor converter overrides.
///
/// Construction may fail, which fails the binding of the accessor.
pub trait ConverterFactory: PropertyConverter + Sized + 'static {
    /// Create the converter.
    fn create() -> Result<Self, ConvertError>;
}

pub(crate) type DynConverter<T> = Arc<dyn PropertyConverter<Target = T>>;

/// This trait defines how to parse a value from property text.
pub trait FromProperty: Sized {
    /// Parse value from property text.
    fn from_property(value: &str) -> Result<Self, ConvertError>;
}

macro_rules! impl_property_parse {
    ($($x:ty),+) => {$(
            impl FromProperty for $x {
                fn from_property(value: &str) -> Result<Self, ConvertError> {
                    value.parse::<$x>().map_err(ConvertError::from_source)
                }
            }
            )+}
}

impl_property_parse!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl FromProperty for String {
    fn from_property(value: &str) -> Result<Self, ConvertError> {
        Ok(value.to_owned())
    }
}

impl FromProperty for bool {
    fn from_property(value: &str) -> Result<Self, ConvertError> {
        match &value.to_lowercase()[..] {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(ConvertError::new(format!("invalid bool value {:?}", value))),
        }
    }
}

impl FromProperty for char {
    fn from_property(value: &str) -> Result<Self, ConvertError> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConvertError::new(format!(
                "expect exactly one character, got {:?}",
                value
            ))),
        }
    }
}

impl FromProperty for Url {
    fn from_property(value: &str) -> Result<Self, ConvertError> {
        Url::parse(value).map_err(ConvertError::from_source)
    }
}

impl FromProperty for PathBuf {
    fn from_property(value: &str) -> Result<Self, ConvertError> {
        Ok(PathBuf::from(value))
    }
}

/// [`PropertyConverter`] for any [`FromProperty`] type.
pub struct ParseConverter<T>(PhantomData<fn() -> T>);

impl<T> ParseConverter<T> {
    /// Create converter.
    pub fn new() -> Self {
        ParseConverter(PhantomData)
    }
}

impl<T> Default for ParseConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ParseConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParseConverter<{}>", type_name::<T>())
    }
}

impl<T: FromProperty> PropertyConverter for ParseConverter<T> {
    type Target = T;

    fn convert(&self, value: &str) -> Result<T, ConvertError> {
        T::from_property(value)
    }

    fn name(&self) -> &str {
        type_name::<T>()
    }
}

impl<T: FromProperty + 'static> ConverterFactory for ParseConverter<T> {
    fn create() -> Result<Self, ConvertError> {
        Ok(Self::new())
    }
}

/// [`PropertyConverter`] backed by a named closure.
///
/// ```
/// use propconf::*;
/// let list = FnConverter::new("comma-list", |v: &str| {
///     v.split(',')
///         .map(|s| s.trim().parse::<i32>().map_err(ConvertError::from_source))
///         .collect::<Result<Vec<_>, _>>()
/// });
/// assert_eq!(vec![1, 2, 3], list.convert("1, 2, 3").unwrap());
/// assert_eq!("comma-list", list.name());
/// ```
pub struct FnConverter<F, T> {
    name: Cow<'static, str>,
    f: F,
    _target: PhantomData<fn() -> T>,
}

impl<F, T> FnConverter<F, T>
where
    F: Fn(&str) -> Result<T, ConvertError> + Send + Sync,
{
    /// Create converter named `name`.
    pub fn new<N: Into<Cow<'static, str>>>(name: N, f: F) -> Self {
        FnConverter {
            name: name.into(),
            f,
            _target: PhantomData,
        }
    }
}

impl<F, T> fmt::Debug for FnConverter<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FnConverter({})", self.name)
    }
}

impl<F, T> PropertyConverter for FnConverter<F, T>
where
    F: Fn(&str) -> Result<T, ConvertError> + Send + Sync,
{
    type Target = T;

    fn convert(&self, value: &str) -> Result<T, ConvertError> {
        (self.f)(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct Registered {
    type_name: &'static str,
    converter: Arc<dyn Any + Send + Sync>,
}

/// Default [`PropertyConverter`]s keyed by target type.
#[derive(Clone)]
pub struct ConverterRegistry {
    map: HashMap<TypeId, Arc<Registered>>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.map.values().map(|r| r.type_name).collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("types", &names)
            .finish()
    }
}

macro_rules! register_parse {
    ($registry:expr, $($x:ty),+) => {$(
            $registry.register(ParseConverter::<$x>::new());
            )+}
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        register_parse!(
            registry, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
            bool, char, String, Url, PathBuf
        );
        registry
    }
}

impl ConverterRegistry {
    /// Create registry without any converter.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Register `converter` for its target type, replacing a previous one.
    pub fn register<C>(&mut self, converter: C)
    where
        C: PropertyConverter + 'static,
        C::Target: 'static,
    {
        let converter: DynConverter<C::Target> = Arc::new(converter);
        self.map.insert(
            TypeId::of::<C::Target>(),
            Arc::new(Registered {
                type_name: type_name::<C::Target>(),
                converter: Arc::new(converter),
            }),
        );
    }

    /// Get converter of `T`.
    pub fn get<T: 'static>(&self) -> Option<Arc<dyn PropertyConverter<Target = T>>> {
        self.map
            .get(&TypeId::of::<T>())?
            .converter
            .downcast_ref::<DynConverter<T>>()
            .cloned()
    }

    /// Check whether `T` has a converter.
    pub fn contains<T: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

type Supplier<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Values used for absent properties of types which can not represent absence.
///
/// | type | substitute |
/// |------|------------|
/// | `bool` | `false` |
/// | `i8`, `i16`, `i32`, `i64`, `i128`, `isize` | `-1` |
/// | `u8`, `u16`, `u32`, `u64`, `u128`, `usize` | `MAX` |
/// | `f32`, `f64` | `-1.0` |
/// | `char` | `'\0'` |
#[derive(Clone)]
pub struct SubstituteRegistry {
    map: HashMap<TypeId, (&'static str, Arc<dyn Any + Send + Sync>)>,
}

impl fmt::Debug for SubstituteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.map.values().map(|(n, _)| *n).collect();
        names.sort_unstable();
        f.debug_struct("SubstituteRegistry")
            .field("types", &names)
            .finish()
    }
}

macro_rules! register_substitute {
    ($registry:expr, $v:expr, $($x:ty),+) => {$(
            $registry.register::<$x, _>(|| $v);
            )+}
}

impl Default for SubstituteRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(|| false);
        registry.register(|| '\0');
        register_substitute!(registry, -1, i8, i16, i32, i64, i128, isize);
        register_substitute!(registry, -1.0, f32, f64);
        registry.register(|| u8::MAX);
        registry.register(|| u16::MAX);
        registry.register(|| u32::MAX);
        registry.register(|| u64::MAX);
        registry.register(|| u128::MAX);
        registry.register(|| usize::MAX);
        registry
    }
}

impl SubstituteRegistry {
    /// Create registry without any substitute.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Register substitute supplier of `T`.
    pub fn register<T: 'static, F: Fn() -> T + Send + Sync + 'static>(&mut self, supplier: F) {
        let supplier: Supplier<T> = Arc::new(supplier);
        self.map
            .insert(TypeId::of::<T>(), (type_name::<T>(), Arc::new(supplier)));
    }

    /// Get substitute of `T`.
    pub fn get<T: 'static>(&self) -> Option<T> {
        let (_, supplier) = self.map.get(&TypeId::of::<T>())?;
        supplier.downcast_ref::<Supplier<T>>().map(|f| f())
    }
}
