use std::error::Error;
#[cfg(feature = "enable_toml")]
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single [`PropertyConverter`](crate::PropertyConverter) on a raw value.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConvertError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ConvertError {
    /// Create an error from a plain message.
    pub fn new<M: Into<String>>(message: M) -> Self {
        ConvertError {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap the error of an underlying parser.
    pub fn from_source<E: Error + Send + Sync + 'static>(err: E) -> Self {
        ConvertError {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A present value could not be converted.
    #[error("failed to convert value {value:?} of key '{key}' with {converter}: {source}")]
    Conversion {
        /// Property key.
        key: String,
        /// Raw value after placeholder resolution.
        value: String,
        /// Name of the converter.
        converter: String,
        /// Converter failure.
        #[source]
        source: ConvertError,
    },

    /// An explicitly declared converter could not be created.
    #[error("failed to instantiate converter {converter} of accessor '{accessor}': {source}")]
    ConverterConstruction {
        /// Accessor name.
        accessor: String,
        /// Name of the converter.
        converter: String,
        /// Construction failure.
        #[source]
        source: ConvertError,
    },

    /// Neither an override nor a registry entry converts to the declared type.
    #[error("no converter for type {type_name} of accessor '{accessor}'")]
    NoConverter {
        /// Accessor name, or the key for direct lookups.
        accessor: String,
        /// Declared type.
        type_name: &'static str,
    },

    /// No value resolved and the type can not represent absence.
    #[error("no value for key '{key}', and {type_name} has no substitute value")]
    Missing {
        /// Property key.
        key: String,
        /// Requested type.
        type_name: &'static str,
    },

    /// Accessor is not part of the bound contract.
    #[error("accessor '{0}' is not bound")]
    UnknownAccessor(String),

    /// Accessor declared twice in one contract.
    #[error("accessor '{0}' is declared more than once")]
    DuplicateAccessor(String),

    /// Meta accessor does not match the public surface of the configuration.
    #[error("meta accessor '{0}' does not exist on the configuration")]
    UnknownMetaAccessor(String),

    /// Accessor invoked with another type than it was declared with.
    #[error("accessor '{accessor}' is declared as {declared}, but requested as {requested}")]
    TypeMismatch {
        /// Accessor name.
        accessor: String,
        /// Declared type.
        declared: String,
        /// Requested type.
        requested: String,
    },

    /// Toml source could not be parsed.
    #[cfg(feature = "enable_toml")]
    #[cfg_attr(docsrs, doc(cfg(feature = "enable_toml")))]
    #[error("failed to parse toml source {name}: {source}")]
    Toml {
        /// Source name.
        name: String,
        /// Parser failure.
        #[source]
        source: toml::de::Error,
    },

    /// Toml file could not be read.
    #[cfg(feature = "enable_toml")]
    #[cfg_attr(docsrs, doc(cfg(feature = "enable_toml")))]
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Read failure.
        #[source]
        source: std::io::Error,
    },
}
