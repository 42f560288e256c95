//! Provide hashmap [`PropertySource`].
use crate::*;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// An in-memory source, which is a string to string hashmap.
#[derive(Debug, Clone)]
pub struct MapPropertySource {
    name: String,
    map: HashMap<String, String>,
}

impl MapPropertySource {
    /// Create an empty in-memory source with a name.
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            map: HashMap::new(),
        }
    }

    /// Set property to the source.
    pub fn set<K: Into<String>, V: Into<String>>(mut self, key: K, val: V) -> Self {
        self.map.insert(key.into(), val.into());
        self
    }

    /// Set a batch of properties to the source.
    pub fn set_all<I: IntoIterator<Item = (String, String)>>(mut self, map: I) -> Self {
        self.map.extend(map);
        self
    }
}

impl From<HashMap<String, String>> for MapPropertySource {
    fn from(map: HashMap<String, String>) -> Self {
        Self {
            name: "map".to_owned(),
            map,
        }
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property_value(&self, key: &str) -> Option<Cow<'_, str>> {
        self.map.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }

    fn get_keys(&self) -> HashSet<String> {
        self.map.keys().cloned().collect()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
