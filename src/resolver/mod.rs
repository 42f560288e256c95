//! Placeholder resolution.
//!
//! A template such as `"jdbc:${db.host}:${db.port}"` is expanded by replacing every
//! `${key}` with the value a [`Lookup`] provides for `key`. Placeholders without a
//! value are kept verbatim.
use std::collections::HashMap;

pub(crate) mod pattern;
pub(crate) mod standard;

pub(crate) const START: &str = "${";
pub(crate) const END: char = '}';

/// Provides the value for a placeholder key.
pub trait Lookup {
    /// Get value of `key`, [`None`] if the key has no value.
    fn lookup(&self, key: &str) -> Option<String>;
}

impl<F: Fn(&str) -> Option<String>> Lookup for F {
    fn lookup(&self, key: &str) -> Option<String> {
        (self)(key)
    }
}

/// [`Lookup`] backed by a borrowed hashmap.
#[derive(Debug, Clone, Copy)]
pub struct MapLookup<'a>(pub &'a HashMap<String, String>);

impl Lookup for MapLookup<'_> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Expands `${key}` placeholders of a template.
pub trait VariableResolver: Send + Sync {
    /// Resolve all placeholders of `template`.
    ///
    /// Without a lookup every placeholder is kept as is.
    fn resolve_str(&self, template: &str, lookup: Option<&dyn Lookup>) -> String;

    /// Resolve an optional template, [`None`] stays [`None`].
    fn resolve(&self, template: Option<&str>, lookup: Option<&dyn Lookup>) -> Option<String> {
        template.map(|t| self.resolve_str(t, lookup))
    }
}

pub(crate) fn unresolved(key: &str) -> String {
    format!("{}{}{}", START, key, END)
}
