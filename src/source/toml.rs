//! Provide toml [`PropertySource`].
use crate::*;
use ::toml::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// [`PropertySource`] read properties from toml content.
///
/// Tables are flattened into dotted keys, array elements are addressed as
/// `key[0]`. An array of scalars is also available under its own key, with
/// elements joined by `", "`.
///
/// ```
/// use propconf::*;
/// let source = TomlPropertySource::new("inline", "[db]\nport = 5432\nhosts = [\"a\", \"b\"]").unwrap();
/// assert_eq!(Some("5432"), source.get_property_value("db.port").as_deref());
/// assert_eq!(Some("b"), source.get_property_value("db.hosts[1]").as_deref());
/// assert_eq!(Some("a, b"), source.get_property_value("db.hosts").as_deref());
/// ```
#[derive(Debug, Clone)]
pub struct TomlPropertySource {
    name: String,
    map: BTreeMap<String, String>,
}

impl TomlPropertySource {
    /// Parse toml content.
    pub fn new<N: Into<String>>(name: N, content: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        let value = match ::toml::from_str::<Value>(content) {
            Ok(v) => v,
            Err(source) => return Err(ConfigError::Toml { name, source }),
        };
        let mut map = BTreeMap::new();
        flatten("", &value, &mut map);
        Ok(Self { name, map })
    }

    /// Read and parse toml file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(path.display().to_string(), &content)
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(v) => Some(v.to_owned()),
        Value::Integer(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Boolean(v) => Some(v.to_string()),
        Value::Datetime(v) => Some(v.to_string()),
        _ => None,
    }
}

fn flatten(prefix: &str, value: &Value, map: &mut BTreeMap<String, String>) {
    match value {
        Value::Table(t) => {
            for (k, v) in t {
                let key = if prefix.is_empty() {
                    k.to_owned()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(&key, v, map);
            }
        }
        Value::Array(vs) => {
            let scalars: Option<Vec<String>> = vs.iter().map(scalar).collect();
            if let Some(scalars) = scalars {
                if !scalars.is_empty() {
                    map.insert(prefix.to_owned(), scalars.join(", "));
                }
            }
            for (i, v) in vs.iter().enumerate() {
                flatten(&format!("{}[{}]", prefix, i), v, map);
            }
        }
        v => {
            if let Some(s) = scalar(v) {
                map.insert(prefix.to_owned(), s);
            }
        }
    }
}

impl PropertySource for TomlPropertySource {
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

/// Inline toml file as [`PropertySource`].
#[cfg_attr(docsrs, doc(cfg(feature = "enable_toml")))]
#[macro_export]
macro_rules! inline_toml {
    ($x:expr) => {
        $crate::TomlPropertySource::new(concat!("inline_toml:", $x), include_str!($x))
    };
}

#[cfg(test)]
mod tests {
    use crate::*;

    const CONTENT: &str = r#"
name = "propconf"
enabled = true
ratio = 0.5

[server]
port = 8080
tags = ["a", "b", "c"]

[[server.routes]]
path = "/"

[[server.routes]]
path = "/api"
"#;

    #[test]
    fn flatten_test() -> Result<(), ConfigError> {
        let source = TomlPropertySource::new("test", CONTENT)?;
        assert_eq!(Some("propconf"), source.get_property_value("name").as_deref());
        assert_eq!(Some("true"), source.get_property_value("enabled").as_deref());
        assert_eq!(Some("0.5"), source.get_property_value("ratio").as_deref());
        assert_eq!(Some("8080"), source.get_property_value("server.port").as_deref());
        assert_eq!(Some("a, b, c"), source.get_property_value("server.tags").as_deref());
        assert_eq!(Some("c"), source.get_property_value("server.tags[2]").as_deref());
        assert_eq!(
            Some("/api"),
            source.get_property_value("server.routes[1].path").as_deref()
        );
        assert_eq!(None, source.get_property_value("server.routes"));
        assert_eq!(None, source.get_property_value("server"));
        for key in source.get_keys() {
            assert!(source.get_property_value(&key).is_some());
        }
        Ok(())
    }

    #[test]
    fn inline_toml_test() -> Result<(), ConfigError> {
        let source = inline_toml!("testdata/inline.toml")?;
        assert_eq!("inline_toml:testdata/inline.toml", source.name());
        assert_eq!(Some("inline"), source.get_property_value("title").as_deref());
        assert_eq!(Some("5432"), source.get_property_value("db.port").as_deref());
        assert_eq!(Some("r1, r2"), source.get_property_value("db.replicas").as_deref());
        let conf = Configuration::builder()
            .with_property_source(source)
            .build_configuration();
        assert_eq!(5432, conf.get_value::<u16>("db.port")?);
        Ok(())
    }

    #[test]
    fn parse_fail_test() {
        match TomlPropertySource::new("broken", "a = ") {
            Err(ConfigError::Toml { name, .. }) => assert_eq!("broken", name),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_file_test() {
        assert!(matches!(
            TomlPropertySource::from_file("/nonexistent/propconf.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
