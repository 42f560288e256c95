use crate::*;
#[cfg(feature = "enable_log")]
use log::{debug, trace, warn};
use std::borrow::Cow;
use std::collections::HashSet;

/// Scan sources in order, the first present and non-empty value wins.
fn first_value(sources: &[Box<dyn PropertySource>], key: &str) -> Option<String> {
    sources.iter().find_map(|source| match source.get_property_value(key) {
        Some(v) if !v.is_empty() => {
            #[cfg(feature = "enable_log")]
            trace!("Property {} found in source {}.", key, source.name());
            Some(v.into_owned())
        }
        _ => None,
    })
}

struct ChainLookup<'a>(&'a [Box<dyn PropertySource>]);

impl Lookup for ChainLookup<'_> {
    fn lookup(&self, key: &str) -> Option<String> {
        first_value(self.0, key)
    }
}

/// Configuration core, resolves keys against an ordered chain of [`PropertySource`]s.
///
/// 1. Sources are scanned in registration order, the first present and non-empty value wins.
/// 2. Placeholders in the value are resolved against the same chain.
/// 3. The resolved text is converted to the requested type.
///
/// If no source has a value, `Option` getters return [`None`], types with a
/// substitute (see [`SubstituteRegistry`]) return the substitute and all other types
/// fail with [`ConfigError::Missing`].
///
/// ```
/// use propconf::*;
/// let conf = Configuration::builder()
///     .with_property_source(MapPropertySource::new("first").set("port", ""))
///     .with_property_source(
///         MapPropertySource::new("second")
///             .set("port", "8080")
///             .set("url", "http://localhost:${port}"),
///     )
///     .build_configuration();
/// assert_eq!(8080, conf.get_value::<u16>("port").unwrap());
/// assert_eq!("http://localhost:8080", conf.get_value::<String>("url").unwrap());
/// assert_eq!(-1, conf.get_value::<i32>("missing").unwrap());
/// assert_eq!(None, conf.get_optional_value::<String>("missing").unwrap());
/// ```
#[allow(missing_debug_implementations)]
pub struct Configuration {
    sources: Vec<Box<dyn PropertySource>>,
    converters: ConverterRegistry,
    substitutes: SubstituteRegistry,
    resolver: Box<dyn VariableResolver>,
}

impl Configuration {
    /// Create a builder for configure the configuration.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Union of keys of all sources.
    pub fn get_keys(&self) -> HashSet<String> {
        self.sources.iter().flat_map(|s| s.get_keys()).collect()
    }

    /// Names of the sources in priority order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Default converters.
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Raw value of `key`, without placeholder resolution.
    pub fn get_raw_value(&self, key: &str) -> Option<String> {
        first_value(&self.sources, key)
    }

    /// Value of `key` with all placeholders resolved.
    pub fn get_resolved_value(&self, key: &str) -> Option<String> {
        let raw = self.get_raw_value(key)?;
        Some(self.resolve_placeholders(&raw))
    }

    /// Resolve placeholders of `template` against the source chain.
    pub fn resolve_placeholders(&self, template: &str) -> String {
        self.resolver
            .resolve_str(template, Some(&ChainLookup(&self.sources)))
    }

    /// Get value of `key` converted by the default converter of `T`.
    pub fn get_value<T: 'static>(&self, key: &str) -> Result<T, ConfigError> {
        let converter = self.default_converter::<T>(key)?;
        self.get_value_with(key, converter.as_ref())
    }

    /// Get optional value of `key` converted by the default converter of `T`.
    pub fn get_optional_value<T: 'static>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let converter = self.default_converter::<T>(key)?;
        self.get_optional_value_with(key, converter.as_ref())
    }

    /// Get value of `key` converted by `converter`.
    pub fn get_value_with<C>(&self, key: &str, converter: &C) -> Result<C::Target, ConfigError>
    where
        C: PropertyConverter + ?Sized,
        C::Target: 'static,
    {
        match self.get_optional_value_with(key, converter)? {
            Some(v) => Ok(v),
            None => self.substitute(key),
        }
    }

    /// Get optional value of `key` converted by `converter`.
    pub fn get_optional_value_with<C>(
        &self,
        key: &str,
        converter: &C,
    ) -> Result<Option<C::Target>, ConfigError>
    where
        C: PropertyConverter + ?Sized,
    {
        let value = match self.get_resolved_value(key) {
            Some(v) => v,
            None => return Ok(None),
        };
        match converter.convert(&value) {
            Ok(v) => Ok(Some(v)),
            Err(source) => {
                #[cfg(feature = "enable_log")]
                warn!(
                    "Converter {} failed on property {}: {}",
                    converter.name(),
                    key,
                    source
                );
                Err(ConfigError::Conversion {
                    key: key.to_owned(),
                    value,
                    converter: converter.name().to_owned(),
                    source,
                })
            }
        }
    }

    pub(crate) fn substitute<T: 'static>(&self, key: &str) -> Result<T, ConfigError> {
        self.substitutes
            .get::<T>()
            .ok_or_else(|| ConfigError::Missing {
                key: key.to_owned(),
                type_name: std::any::type_name::<T>(),
            })
    }

    fn default_converter<T: 'static>(
        &self,
        key: &str,
    ) -> Result<std::sync::Arc<dyn PropertyConverter<Target = T>>, ConfigError> {
        self.converters
            .get::<T>()
            .ok_or_else(|| ConfigError::NoConverter {
                accessor: key.to_owned(),
                type_name: std::any::type_name::<T>(),
            })
    }
}

/// A builder which can configure how to build a [`Configuration`].
#[allow(missing_debug_implementations)]
pub struct ConfigurationBuilder {
    sources: Vec<Box<dyn PropertySource>>,
    converters: ConverterRegistry,
    substitutes: SubstituteRegistry,
    resolver: Box<dyn VariableResolver>,
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationBuilder {
    /// Create builder with built-in converters and substitutes, and the
    /// [`StandardVariableResolver`].
    pub fn new() -> Self {
        Self {
            sources: vec![],
            converters: ConverterRegistry::default(),
            substitutes: SubstituteRegistry::default(),
            resolver: Box::new(StandardVariableResolver),
        }
    }

    /// Register source, sources registered earlier have higher priority.
    pub fn with_property_source<P: PropertySource + 'static>(self, source: P) -> Self {
        self.with_boxed_source(Box::new(source))
    }

    /// Register a batch of sources in order.
    pub fn with_property_sources<I: IntoIterator<Item = Box<dyn PropertySource>>>(
        mut self,
        sources: I,
    ) -> Self {
        for source in sources {
            self = self.with_boxed_source(source);
        }
        self
    }

    fn with_boxed_source(mut self, source: Box<dyn PropertySource>) -> Self {
        #[cfg(feature = "enable_log")]
        debug!(
            "Load property source {} at priority {}.",
            source.name(),
            self.sources.len()
        );
        self.sources.push(source);
        self
    }

    /// Register default converter for its target type.
    pub fn with_converter<C>(mut self, converter: C) -> Self
    where
        C: PropertyConverter + 'static,
        C::Target: 'static,
    {
        self.converters.register(converter);
        self
    }

    /// Register a named closure as default converter of `T`.
    pub fn with_converter_fn<T, F, N>(self, name: N, f: F) -> Self
    where
        T: 'static,
        F: Fn(&str) -> Result<T, ConvertError> + Send + Sync + 'static,
        N: Into<Cow<'static, str>>,
    {
        self.with_converter(FnConverter::new(name, f))
    }

    /// Register substitute of `T` for absent values.
    pub fn with_substitute<T: 'static, F: Fn() -> T + Send + Sync + 'static>(
        mut self,
        supplier: F,
    ) -> Self {
        self.substitutes.register(supplier);
        self
    }

    /// Replace the placeholder resolver.
    pub fn with_resolver<R: VariableResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Build the configuration core.
    pub fn build_configuration(self) -> Configuration {
        Configuration {
            sources: self.sources,
            converters: self.converters,
            substitutes: self.substitutes,
            resolver: self.resolver,
        }
    }

    /// Build the configuration and bind `contract` to it.
    pub fn bind(self, contract: AccessorContract) -> Result<BoundConfiguration, ConfigError> {
        contract.bind(self.build_configuration())
    }

    /// Build an implementation of contract `C`.
    pub fn build<C: Contract>(self) -> Result<C, ConfigError> {
        Ok(C::from_bound(self.bind(C::contract())?))
    }
}
