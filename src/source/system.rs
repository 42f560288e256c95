//! Provide process-wide system properties and their [`PropertySource`].
use crate::*;
use regex::Regex;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

lazy_static::lazy_static! {
    static ref SYSTEM_PROPERTIES: RwLock<HashMap<String, String>> = RwLock::new(seed());
}

fn seed() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("os.name".to_owned(), std::env::consts::OS.to_owned());
    map.insert("os.arch".to_owned(), std::env::consts::ARCH.to_owned());
    map.insert("os.family".to_owned(), std::env::consts::FAMILY.to_owned());
    map.insert(
        "file.separator".to_owned(),
        std::path::MAIN_SEPARATOR.to_string(),
    );
    map.insert(
        "path.separator".to_owned(),
        if cfg!(windows) { ";" } else { ":" }.to_owned(),
    );
    map.insert(
        "line.separator".to_owned(),
        if cfg!(windows) { "\r\n" } else { "\n" }.to_owned(),
    );
    if let Ok(dir) = std::env::current_dir() {
        map.insert("user.dir".to_owned(), dir.display().to_string());
    }
    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        if let Ok(home) = home.into_string() {
            map.insert("user.home".to_owned(), home);
        }
    }
    map
}

fn read() -> RwLockReadGuard<'static, HashMap<String, String>> {
    SYSTEM_PROPERTIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, HashMap<String, String>> {
    SYSTEM_PROPERTIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Set a system property, returns the previous value.
pub fn set_system_property<K: Into<String>, V: Into<String>>(key: K, val: V) -> Option<String> {
    write().insert(key.into(), val.into())
}

/// Get a system property.
pub fn get_system_property(key: &str) -> Option<String> {
    read().get(key).cloned()
}

/// Remove a system property, returns the removed value.
pub fn remove_system_property(key: &str) -> Option<String> {
    write().remove(key)
}

/// Keys of all system properties.
pub fn system_property_keys() -> HashSet<String> {
    read().keys().cloned().collect()
}

/// [`PropertySource`] read the system properties, optionally filtered by key.
///
/// Values are read live, so properties set after the source was created are visible.
#[allow(missing_debug_implementations)]
pub struct SystemPropertiesSource {
    filter: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl Default for SystemPropertiesSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPropertiesSource {
    /// Create source including every system property.
    pub fn new() -> Self {
        Self::with_filter(|_| true)
    }

    /// Create source including keys starting with `prefix`.
    pub fn with_prefix<P: Into<String>>(prefix: P) -> Self {
        let prefix = prefix.into();
        Self::with_filter(move |k| k.starts_with(&prefix))
    }

    /// Create source including keys matching `regex`.
    pub fn matching(regex: Regex) -> Self {
        Self::with_filter(move |k| regex.is_match(k))
    }

    /// Create source including keys accepted by `filter`.
    pub fn with_filter<F: Fn(&str) -> bool + Send + Sync + 'static>(filter: F) -> Self {
        Self {
            filter: Box::new(filter),
        }
    }
}

impl PropertySource for SystemPropertiesSource {
    fn name(&self) -> &str {
        "SystemProperties"
    }

    fn get_property_value(&self, key: &str) -> Option<Cow<'_, str>> {
        if !(self.filter)(key) {
            return None;
        }
        get_system_property(key).map(Cow::Owned)
    }

    fn get_keys(&self) -> HashSet<String> {
        read()
            .keys()
            .filter(|k| (self.filter)(k.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use regex::Regex;

    #[test]
    fn seed_test() {
        assert_eq!(
            Some(std::env::consts::OS.to_owned()),
            get_system_property("os.name")
        );
        assert!(system_property_keys().contains("file.separator"));
    }

    #[test]
    fn prefix_test() {
        set_system_property("propconf.sys.a", "a");
        set_system_property("other.sys.b", "b");
        let source = SystemPropertiesSource::with_prefix("propconf.sys.");
        assert_eq!(Some("a"), source.get_property_value("propconf.sys.a").as_deref());
        assert_eq!(None, source.get_property_value("other.sys.b"));
        let keys = source.get_keys();
        assert!(keys.contains("propconf.sys.a"));
        assert!(!keys.contains("other.sys.b"));
    }

    #[test]
    fn live_test() {
        let source = SystemPropertiesSource::new();
        assert_eq!(None, source.get_property_value("propconf.live"));
        set_system_property("propconf.live", "1");
        assert_eq!(Some("1"), source.get_property_value("propconf.live").as_deref());
        assert_eq!(Some("1".to_owned()), remove_system_property("propconf.live"));
        assert_eq!(None, source.get_property_value("propconf.live"));
    }

    #[test]
    fn regex_test() -> Result<(), regex::Error> {
        set_system_property("propconf.rx.port", "80");
        set_system_property("propconf.rx.host", "localhost");
        let source = SystemPropertiesSource::matching(Regex::new(r"^propconf\.rx\.p")?);
        assert_eq!(Some("80"), source.get_property_value("propconf.rx.port").as_deref());
        assert_eq!(None, source.get_property_value("propconf.rx.host"));
        Ok(())
    }
}
