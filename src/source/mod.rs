pub(crate) mod env;
pub(crate) mod map;
pub(crate) mod system;
// Enable register toml in [`Configuration`](crate::Configuration).
#[cfg(feature = "enable_toml")]
#[cfg_attr(docsrs, doc(cfg(feature = "enable_toml")))]
pub(crate) mod toml;
