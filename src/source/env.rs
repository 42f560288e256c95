//! Provide system environment [`PropertySource`].
use crate::utils::PropconfStringUtil;
use crate::*;
use std::borrow::Cow;
use std::collections::HashSet;

type KeyFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;
type KeyNormalizer = Box<dyn Fn(&str) -> String + Send + Sync>;

/// [`PropertySource`] read properties from system environment.
///
/// Every lookup reads the live process environment. Keys are normalized from
/// `SNAKE_UPPERCASE` to `lowerCamelCase` by default.
///
/// * `NAME_URL` => `nameUrl`
/// * `PATH` => `path`
/// * `DATABASE__USER_NAME` => `databaseUserName`
///
/// The filter is evaluated on the raw variable name before normalization.
#[allow(missing_debug_implementations)]
pub struct EnvPropertySource {
    filter: KeyFilter,
    normalizer: KeyNormalizer,
}

impl Default for EnvPropertySource {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvPropertySource {
    /// Create source including every variable.
    pub fn new() -> Self {
        Self::with_filter(|_| true)
    }

    /// Create source including variables accepted by `filter`.
    pub fn with_filter<F: Fn(&str) -> bool + Send + Sync + 'static>(filter: F) -> Self {
        Self::with_normalizer(filter, |k| k.to_camel_key())
    }

    /// Create source including only variables starting with `prefix`.
    pub fn with_prefix<P: Into<String>>(prefix: P) -> Self {
        let prefix = prefix.into();
        Self::with_filter(move |k| k.starts_with(&prefix))
    }

    /// Create source with custom filter and key normalizer.
    pub fn with_normalizer<F, N>(filter: F, normalizer: N) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
        N: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            filter: Box::new(filter),
            normalizer: Box::new(normalizer),
        }
    }

    fn vars(&self) -> impl Iterator<Item = (String, String)> + '_ {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .filter(move |(k, _)| (self.filter)(k.as_str()))
    }
}

impl PropertySource for EnvPropertySource {
    fn name(&self) -> &str {
        "SystemEnvironment"
    }

    fn get_property_value(&self, key: &str) -> Option<Cow<'_, str>> {
        self.vars()
            .find(|(k, _)| (self.normalizer)(k.as_str()) == key)
            .map(|(_, v)| Cow::Owned(v))
    }

    fn get_keys(&self) -> HashSet<String> {
        self.vars().map(|(k, _)| (self.normalizer)(k.as_str())).collect()
    }
}
