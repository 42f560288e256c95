use crate::convert::DynConverter;
use crate::utils::PropconfStringUtil;
use crate::*;
#[cfg(feature = "enable_log")]
use log::{debug, warn};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Accessors answered by [`Configuration`] itself instead of a key lookup.
pub const META_ACCESSORS: &[&str] = &["getKeys"];

type ErasedConverter = Arc<dyn Any + Send + Sync>;
type NamedConverter = (String, ErasedConverter);
type ConverterSlot = (String, Box<dyn FnOnce() -> Result<NamedConverter, ConvertError>>);

/// Derive the property key of an accessor.
///
/// * `getUsername` => `username`
/// * `isEnabled` => `enabled`
/// * `get_user_name` => `userName`
/// * `token` => `token`
/// * `island` => `land`
pub fn derive_key(accessor: &str) -> String {
    accessor.to_accessor_key()
}

fn erase<C: PropertyConverter + 'static>(converter: C) -> NamedConverter
where
    C::Target: 'static,
{
    let name = converter.name().to_owned();
    let converter: DynConverter<C::Target> = Arc::new(converter);
    (name, Arc::new(converter))
}

fn default_converter<T: 'static>(registry: &ConverterRegistry) -> Option<ErasedConverter> {
    let converter: ErasedConverter = Arc::new(registry.get::<T>()?);
    Some(converter)
}

/// Typed declaration of a data accessor, for building an [`AccessorContract`].
///
/// ```
/// use propconf::*;
/// let decl: AccessorDecl = Accessor::<u16>::value("getPort").key("server.port").into();
/// assert_eq!("getPort", decl.name());
/// ```
pub struct Accessor<T> {
    name: String,
    key: Option<String>,
    optional: bool,
    converter: Option<ConverterSlot>,
    _target: PhantomData<fn() -> T>,
}

impl<T: 'static> Accessor<T> {
    /// Accessor returning `T`, absent values yield the substitute of `T`.
    pub fn value<N: Into<String>>(name: N) -> Self {
        Self::create(name.into(), false)
    }

    /// Accessor returning `Option<T>`.
    pub fn optional<N: Into<String>>(name: N) -> Self {
        Self::create(name.into(), true)
    }

    fn create(name: String, optional: bool) -> Self {
        Accessor {
            name,
            key: None,
            optional,
            converter: None,
            _target: PhantomData,
        }
    }

    /// Use `key` instead of the key derived from the accessor name.
    pub fn key<K: Into<String>>(mut self, key: K) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Use converter `C`, created when the contract is bound.
    pub fn converter<C: ConverterFactory<Target = T>>(mut self) -> Self {
        self.converter = Some((
            type_name::<C>().to_owned(),
            Box::new(|| C::create().map(erase)),
        ));
        self
    }

    /// Use `converter` instance.
    pub fn converter_instance<C: PropertyConverter<Target = T> + 'static>(
        mut self,
        converter: C,
    ) -> Self {
        let name = converter.name().to_owned();
        self.converter = Some((name, Box::new(move || Ok(erase(converter)))));
        self
    }
}

impl<T> std::fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("type", &type_name::<T>())
            .field("optional", &self.optional)
            .field("converter", &self.converter.as_ref().map(|(n, _)| n))
            .finish()
    }
}

enum DeclKind {
    Meta,
    Data {
        key: Option<String>,
        target: TypeId,
        type_name: &'static str,
        optional: bool,
        converter: Option<ConverterSlot>,
        default_converter: fn(&ConverterRegistry) -> Option<ErasedConverter>,
    },
}

/// Declaration of one accessor of an [`AccessorContract`].
pub struct AccessorDecl {
    name: String,
    kind: DeclKind,
}

impl std::fmt::Debug for AccessorDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("AccessorDecl");
        s.field("name", &self.name);
        if let DeclKind::Data {
            key,
            type_name,
            optional,
            converter,
            ..
        } = &self.kind
        {
            s.field("key", key)
                .field("type", type_name)
                .field("optional", optional)
                .field("converter", &converter.as_ref().map(|(n, _)| n));
        }
        s.finish()
    }
}

impl AccessorDecl {
    /// Declare meta accessor `name`, answered by [`Configuration`].
    pub fn meta<N: Into<String>>(name: N) -> Self {
        AccessorDecl {
            name: name.into(),
            kind: DeclKind::Meta,
        }
    }

    /// Accessor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether it is a meta accessor.
    pub fn is_meta(&self) -> bool {
        matches!(self.kind, DeclKind::Meta)
    }
}

impl<T: 'static> From<Accessor<T>> for AccessorDecl {
    fn from(a: Accessor<T>) -> Self {
        AccessorDecl {
            name: a.name,
            kind: DeclKind::Data {
                key: a.key,
                target: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                optional: a.optional,
                converter: a.converter,
                default_converter: default_converter::<T>,
            },
        }
    }
}

/// A named set of accessor declarations.
///
/// ```
/// use propconf::*;
/// let bound = AccessorContract::new("Server")
///     .with(Accessor::<String>::value("getHost"))
///     .with(Accessor::<u16>::value("getPort"))
///     .with(AccessorDecl::meta("getKeys"))
///     .bind(
///         Configuration::builder()
///             .with_property_source(MapPropertySource::new("m").set("host", "localhost"))
///             .build_configuration(),
///     )
///     .unwrap();
/// assert_eq!("localhost", bound.invoke::<String>("getHost").unwrap());
/// assert_eq!(u16::MAX, bound.invoke::<u16>("getPort").unwrap());
/// assert_eq!(Some("port"), bound.key_of("getPort"));
/// ```
#[derive(Debug)]
pub struct AccessorContract {
    name: String,
    accessors: Vec<AccessorDecl>,
}

impl AccessorContract {
    /// Create an empty contract.
    pub fn new<N: Into<String>>(name: N) -> Self {
        AccessorContract {
            name: name.into(),
            accessors: vec![],
        }
    }

    /// Add an accessor declaration.
    pub fn with<D: Into<AccessorDecl>>(mut self, decl: D) -> Self {
        self.accessors.push(decl.into());
        self
    }

    /// Contract name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared accessors.
    pub fn accessors(&self) -> &[AccessorDecl] {
        &self.accessors
    }

    /// Bind contract to `configuration`.
    ///
    /// Keys are derived and converters selected once here. Fails if an accessor has no
    /// converter, if a converter can not be created, if an accessor is declared twice,
    /// or if a meta accessor is not part of the [`Configuration`] surface.
    pub fn bind(self, configuration: Configuration) -> Result<BoundConfiguration, ConfigError> {
        let mut bindings = HashMap::new();
        let mut metas = vec![];
        for decl in self.accessors {
            if bindings.contains_key(&decl.name) || metas.contains(&decl.name) {
                return Err(ConfigError::DuplicateAccessor(decl.name));
            }
            match decl.kind {
                DeclKind::Meta => {
                    let name = decl.name.as_str().to_lower_camel();
                    if !META_ACCESSORS.contains(&&name[..]) {
                        return Err(ConfigError::UnknownMetaAccessor(decl.name));
                    }
                    metas.push(decl.name);
                }
                DeclKind::Data {
                    key,
                    target,
                    type_name,
                    optional,
                    converter,
                    default_converter,
                } => {
                    let key = match key {
                        Some(k) => k,
                        None => derive_key(&decl.name),
                    };
                    let (converter_name, converter) = match converter {
                        Some((name, create)) => match create() {
                            Ok(named) => named,
                            Err(source) => {
                                #[cfg(feature = "enable_log")]
                                warn!("Converter {} of {} can not be created.", name, decl.name);
                                return Err(ConfigError::ConverterConstruction {
                                    accessor: decl.name,
                                    converter: name,
                                    source,
                                });
                            }
                        },
                        None => match default_converter(configuration.converters()) {
                            Some(c) => (type_name.to_owned(), c),
                            None => {
                                return Err(ConfigError::NoConverter {
                                    accessor: decl.name,
                                    type_name,
                                })
                            }
                        },
                    };
                    #[cfg(feature = "enable_log")]
                    debug!(
                        "Bind {}.{} to key {} as {} with {}.",
                        self.name, decl.name, key, type_name, converter_name
                    );
                    bindings.insert(
                        decl.name.clone(),
                        Binding {
                            key,
                            target,
                            type_name,
                            optional,
                            converter_name,
                            converter,
                        },
                    );
                }
            }
        }
        Ok(BoundConfiguration {
            name: self.name,
            configuration,
            bindings,
            metas,
        })
    }
}

struct Binding {
    key: String,
    target: TypeId,
    type_name: &'static str,
    optional: bool,
    converter_name: String,
    converter: ErasedConverter,
}

/// An [`AccessorContract`] bound to a [`Configuration`].
pub struct BoundConfiguration {
    name: String,
    configuration: Configuration,
    bindings: HashMap<String, Binding>,
    metas: Vec<String>,
}

impl std::fmt::Debug for BoundConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.bindings.keys().collect();
        names.sort();
        f.debug_struct("BoundConfiguration")
            .field("name", &self.name)
            .field("accessors", &names)
            .field("metas", &self.metas)
            .finish()
    }
}

impl BoundConfiguration {
    /// Contract name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration core.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Key bound to `accessor`.
    pub fn key_of(&self, accessor: &str) -> Option<&str> {
        self.bindings.get(accessor).map(|b| b.key.as_str())
    }

    /// Name of the converter bound to `accessor`.
    pub fn converter_of(&self, accessor: &str) -> Option<&str> {
        self.bindings.get(accessor).map(|b| b.converter_name.as_str())
    }

    fn binding<T: 'static>(
        &self,
        accessor: &str,
        optional: bool,
    ) -> Result<(&Binding, &DynConverter<T>), ConfigError> {
        let binding = self
            .bindings
            .get(accessor)
            .ok_or_else(|| ConfigError::UnknownAccessor(accessor.to_owned()))?;
        let describe = |name: &str, optional: bool| {
            if optional {
                format!("Option<{}>", name)
            } else {
                name.to_owned()
            }
        };
        let mismatch = || ConfigError::TypeMismatch {
            accessor: accessor.to_owned(),
            declared: describe(binding.type_name, binding.optional),
            requested: describe(type_name::<T>(), optional),
        };
        if binding.target != TypeId::of::<T>() || binding.optional != optional {
            return Err(mismatch());
        }
        let converter = binding
            .converter
            .downcast_ref::<DynConverter<T>>()
            .ok_or_else(mismatch)?;
        Ok((binding, converter))
    }

    /// Invoke accessor returning `T`.
    pub fn invoke<T: 'static>(&self, accessor: &str) -> Result<T, ConfigError> {
        let (binding, converter) = self.binding::<T>(accessor, false)?;
        self.configuration
            .get_value_with(&binding.key, converter.as_ref())
    }

    /// Invoke accessor returning `Option<T>`.
    pub fn invoke_optional<T: 'static>(&self, accessor: &str) -> Result<Option<T>, ConfigError> {
        let (binding, converter) = self.binding::<T>(accessor, true)?;
        self.configuration
            .get_optional_value_with(&binding.key, converter.as_ref())
    }
}

/// A set of accessors which can be implemented by a [`BoundConfiguration`].
///
/// Usually implemented by the [`configuration`](crate::configuration) attribute.
pub trait Contract: Sized {
    /// Accessor declarations.
    fn contract() -> AccessorContract;

    /// Wrap the bound configuration.
    fn from_bound(bound: BoundConfiguration) -> Self;

    /// The bound configuration.
    fn bound(&self) -> &BoundConfiguration;
}
