//! A layered configuration resolver with typed accessor contracts.
//!
//! 1. [About](#about)
//! 2. [Sources](#sources)
//! 3. [Placeholder](#placeholder)
//! 4. [Conversion](#conversion)
//! 5. [Accessor Contract](#accessor-contract)
//! 6. [Cargo Features](#cargo-features)
//! 7. [Quick Example](#quick-example)
//!
//! ## About
//! `propconf` reads properties from an ordered chain of [`PropertySource`]s, resolves
//! `${key}` placeholders in the values, converts the text into typed values and exposes
//! them through a declared set of accessors instead of raw key lookups.
//!
//! ## Sources
//! * [`MapPropertySource`], an in-memory map.
//! * [`EnvPropertySource`], the live process environment, `SOME_KEY` is read as `someKey`.
//! * [`SystemPropertiesSource`], the live process-wide system properties, see
//!   [`set_system_property`].
//! * [`TomlPropertySource`], flattened toml content.
//!
//! Sources registered earlier have higher priority. A source with an empty value does not
//! hide the value of a later source.
//!
//! ## Placeholder
//! * `${key}` is replaced by the value of `key`, the value is resolved again.
//! * `${key-${suffix}}` resolves `suffix` first.
//! * `${missing}` is kept as is if `missing` has no value.
//!
//! ## Conversion
//! Values are converted by a [`PropertyConverter`]. Built-in converters exist for integers,
//! floats, `bool`, `char`, `String`, [`url::Url`] and [`std::path::PathBuf`]. Accessors may
//! declare their own converter. Absent values of `bool`, numbers and `char` yield a fixed
//! substitute, see [`SubstituteRegistry`].
//!
//! ## Accessor Contract
//! An accessor named `getUsername`, or `get_username`, reads key `username`. `isEnabled`
//! reads `enabled`. Other names are used as key directly. `get_keys` returns all known keys.
//!
//! ## Cargo Features
//! 1. `enable_derive`, the [`configuration`] attribute.
//! 2. `enable_toml`, the toml source.
//! 3. `enable_log`, log records.
//!
//! All of them are enabled by default.
//!
//! ## Quick Example
//!
//! ```
//! use propconf::*;
//! use std::collections::HashSet;
//!
//! #[configuration]
//! pub trait DatabaseConfig {
//!     fn get_url(&self) -> Result<String, ConfigError>;
//!     #[config(key = "db.user")]
//!     fn get_username(&self) -> Result<Option<String>, ConfigError>;
//!     fn get_pool_size(&self) -> Result<u32, ConfigError>;
//!     fn is_readonly(&self) -> Result<bool, ConfigError>;
//!     fn get_keys(&self) -> HashSet<String>;
//! }
//!
//! let conf = ConfigurationBuilder::new()
//!     .with_property_source(
//!         MapPropertySource::new("app")
//!             .set("host", "localhost")
//!             .set("url", "postgres://${host}:5432")
//!             .set("poolSize", "8"),
//!     )
//!     .build::<DatabaseConfigImpl>()
//!     .unwrap();
//!
//! assert_eq!("postgres://localhost:5432", conf.get_url().unwrap());
//! assert_eq!(None, conf.get_username().unwrap());
//! assert_eq!(8, conf.get_pool_size().unwrap());
//! assert_eq!(false, conf.is_readonly().unwrap());
//! assert_eq!(3, conf.get_keys().len());
//! ```
//!
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    anonymous_parameters,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_qualifications,
    variant_size_differences
)]

extern crate self as propconf;

use std::borrow::Cow;
use std::collections::HashSet;

/// Turn a trait of accessors into a [`Contract`] implementation named `<Trait>Impl`.
///
/// Accessors take `&self` and return `Result<T, E>` or `Result<Option<T>, E>`, where
/// `E: From<ConfigError>`. Method attribute `#[config(key = "...", converter = "Type")]`
/// overrides the derived key and the converter, the converter type must implement
/// [`ConverterFactory`]. `fn get_keys(&self) -> HashSet<String>` returns
/// [`Configuration::get_keys`].
#[cfg(feature = "enable_derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "enable_derive")))]
pub use propconf_derive::configuration;

mod err;
mod utils;

pub use crate::err::{ConfigError, ConvertError};
pub use crate::utils::PropconfStringUtil;

mod resolver;
pub use crate::resolver::{
    pattern::RegexVariableResolver, standard::StandardVariableResolver, Lookup, MapLookup,
    VariableResolver,
};

mod convert;
pub use crate::convert::{
    ConverterFactory, ConverterRegistry, FnConverter, FromProperty, ParseConverter,
    PropertyConverter, SubstituteRegistry,
};

mod configuration;
pub use crate::configuration::{Configuration, ConfigurationBuilder};

mod contract;
pub use crate::contract::{
    derive_key, Accessor, AccessorContract, AccessorDecl, BoundConfiguration, Contract,
    META_ACCESSORS,
};

mod source;
pub use crate::source::env::EnvPropertySource;
pub use crate::source::map::MapPropertySource;
pub use crate::source::system::{
    get_system_property, remove_system_property, set_system_property, system_property_keys,
    SystemPropertiesSource,
};
#[cfg(feature = "enable_toml")]
#[cfg_attr(docsrs, doc(cfg(feature = "enable_toml")))]
pub use crate::source::toml::TomlPropertySource;

/// A read-only key value backend, such as an in-memory map, the system environment
/// or a file.
///
/// Every key returned by [`PropertySource::get_keys`] must have a value, a source
/// may resolve more keys than it enumerates.
pub trait PropertySource: Send + Sync {
    /// [`PropertySource`] name.
    fn name(&self) -> &str;

    /// Get property value by key.
    fn get_property_value(&self, key: &str) -> Option<Cow<'_, str>>;

    /// All keys of this source.
    fn get_keys(&self) -> HashSet<String>;

    /// Check whether property exists.
    fn contains_key(&self, key: &str) -> bool {
        self.get_property_value(key).is_some()
    }

    /// Check whether the [`PropertySource`] is empty.
    fn is_empty(&self) -> bool {
        self.get_keys().is_empty()
    }
}

#[cfg(all(test, feature = "enable_derive"))]
mod tests {
    use crate::*;
    use std::collections::HashSet;

    #[derive(Debug)]
    struct NumberList;

    impl PropertyConverter for NumberList {
        type Target = Vec<i32>;

        fn convert(&self, value: &str) -> Result<Vec<i32>, ConvertError> {
            value
                .split(',')
                .map(|s| s.trim().parse::<i32>().map_err(ConvertError::from_source))
                .collect()
        }
    }

    impl ConverterFactory for NumberList {
        fn create() -> Result<Self, ConvertError> {
            Ok(NumberList)
        }
    }

    struct Rejecting;

    impl PropertyConverter for Rejecting {
        type Target = String;

        fn convert(&self, value: &str) -> Result<String, ConvertError> {
            Err(ConvertError::new(format!("{} is rejected", value)))
        }

        fn name(&self) -> &str {
            "rejecting"
        }
    }

    impl ConverterFactory for Rejecting {
        fn create() -> Result<Self, ConvertError> {
            Ok(Rejecting)
        }
    }

    struct Unconstructible;

    impl PropertyConverter for Unconstructible {
        type Target = String;

        fn convert(&self, value: &str) -> Result<String, ConvertError> {
            Ok(value.to_owned())
        }
    }

    impl ConverterFactory for Unconstructible {
        fn create() -> Result<Self, ConvertError> {
            Err(ConvertError::new("missing argument"))
        }
    }

    #[derive(Debug)]
    enum AppError {
        Config(ConfigError),
    }

    impl From<ConfigError> for AppError {
        fn from(e: ConfigError) -> Self {
            AppError::Config(e)
        }
    }

    #[configuration]
    trait TestConfig {
        fn get_string_value(&self) -> Result<String, ConfigError>;
        #[config(key = "renamed")]
        fn get_renamed_key(&self) -> Result<String, ConfigError>;
        #[config(converter = "NumberList")]
        fn get_numbers(&self) -> Result<Vec<i32>, ConfigError>;
        fn get_int_value(&self) -> Result<i32, ConfigError>;
        fn is_flag(&self) -> Result<bool, ConfigError>;
        fn get_ratio(&self) -> Result<f32, AppError>;
        fn get_missing_string(&self) -> Result<Option<String>, ConfigError>;
        #[config(key = "port")]
        fn port(&self) -> Result<Option<u16>, AppError>;
        #[config(key = "stringValue", converter = "Rejecting")]
        fn get_rejected(&self) -> Result<String, ConfigError>;
        fn get_keys(&self) -> HashSet<String>;
    }

    #[allow(dead_code)]
    #[configuration]
    trait FaultyConfig {
        #[config(converter = "Unconstructible")]
        fn get_string_value(&self) -> Result<String, ConfigError>;
    }

    fn builder() -> ConfigurationBuilder {
        let _ = env_logger::builder().is_test(true).try_init();
        ConfigurationBuilder::new().with_property_source(
            MapPropertySource::new("test")
                .set("stringValue", "testuser")
                .set("renamed", "foobar")
                .set("numbers", "1, 2, 3")
                .set("port", "${server.port}")
                .set("server.port", "8080"),
        )
    }

    #[test]
    fn contract_test() -> Result<(), AppError> {
        let conf = builder().build::<TestConfigImpl>()?;
        assert_eq!("testuser", conf.get_string_value()?);
        assert_eq!("foobar", conf.get_renamed_key()?);
        assert_eq!(vec![1, 2, 3], conf.get_numbers()?);
        assert_eq!(-1, conf.get_int_value()?);
        assert_eq!(false, conf.is_flag()?);
        assert_eq!(-1.0, conf.get_ratio()?);
        assert_eq!(None, conf.get_missing_string()?);
        assert_eq!(Some(8080), conf.port()?);
        assert!(!conf.get_keys().is_empty());
        assert!(conf.get_keys().contains("server.port"));
        Ok(())
    }

    #[test]
    fn contract_binding_test() -> Result<(), ConfigError> {
        let contract = TestConfigImpl::contract();
        assert_eq!("TestConfig", contract.name());
        assert_eq!(10, contract.accessors().len());
        assert_eq!(1, contract.accessors().iter().filter(|a| a.is_meta()).count());

        let conf = builder().build::<TestConfigImpl>()?;
        let bound = conf.bound();
        assert_eq!(Some("stringValue"), bound.key_of("get_string_value"));
        assert_eq!(Some("flag"), bound.key_of("is_flag"));
        assert_eq!(Some("renamed"), bound.key_of("get_renamed_key"));
        assert_eq!(Some("rejecting"), bound.converter_of("get_rejected"));
        assert!(bound
            .converter_of("get_numbers")
            .map_or(false, |c| c.ends_with("NumberList")));
        Ok(())
    }

    #[test]
    fn rejecting_converter_test() {
        let conf = builder().build::<TestConfigImpl>().unwrap();
        match conf.get_rejected() {
            Err(ConfigError::Conversion {
                key,
                value,
                converter,
                ..
            }) => {
                assert_eq!("stringValue", key);
                assert_eq!("testuser", value);
                assert_eq!("rejecting", converter);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn custom_error_test() {
        let conf = ConfigurationBuilder::new()
            .with_property_source(MapPropertySource::new("bad").set("port", "80x"))
            .build::<TestConfigImpl>()
            .unwrap();
        match conf.port() {
            Err(AppError::Config(ConfigError::Conversion { key, value, .. })) => {
                assert_eq!("port", key);
                assert_eq!("80x", value);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unconstructible_converter_test() {
        match builder().build::<FaultyConfigImpl>() {
            Err(ConfigError::ConverterConstruction { accessor, .. }) => {
                assert_eq!("get_string_value", accessor)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn live_update_test() -> Result<(), ConfigError> {
        let conf = ConfigurationBuilder::new()
            .with_property_source(SystemPropertiesSource::with_prefix("propconf.test."))
            .with_property_source(MapPropertySource::new("default").set("stringValue", "fallback"))
            .build::<LiveConfigImpl>()?;
        assert_eq!("fallback", conf.get_string_value()?);
        set_system_property("propconf.test.name", "live");
        assert_eq!("fallback", conf.get_string_value()?);
        assert_eq!(Some("live".to_owned()), conf.get_name()?);
        remove_system_property("propconf.test.name");
        assert_eq!(None, conf.get_name()?);
        Ok(())
    }

    #[configuration]
    trait LiveConfig {
        fn get_string_value(&self) -> Result<String, ConfigError>;
        #[config(key = "propconf.test.name")]
        fn get_name(&self) -> Result<Option<String>, ConfigError>;
    }
}
