//! flatconf-core: flat, path-addressed application configuration
//!
//! A YAML document with a single top-level key is flattened into a map from
//! dotted paths to strings, `${VAR|default}` placeholders are replaced from
//! the environment, and values are read back by path, either qualified with
//! the root key or relative to it.
//!
//! # Example
//!
//! ```rust
//! use flatconf_core::Configuration;
//!
//! let yaml = r#"
//! app:
//!   name: svc
//!   ports: [80, 443]
//! "#;
//!
//! let config = Configuration::from_yaml(yaml).unwrap();
//! assert_eq!(config.value("app.name").unwrap(), "svc");
//! assert_eq!(config.value("name").unwrap(), "svc");
//! assert_eq!(config.values("ports").unwrap(), vec!["80", "443"]);
//! assert_eq!(config.get_int("app.ports.#1").unwrap(), 443);
//! ```
//!
//! Applications usually load once into the process-wide store:
//!
//! ```rust,no_run
//! use flatconf_core::LoadOptions;
//!
//! flatconf_core::load(LoadOptions::new().with_file_path("config/application.yaml"))?;
//! let port = flatconf_core::get_int_must_resolve("server.port");
//! # Ok::<(), flatconf_core::Error>(())
//! ```

pub mod accessors;
pub mod datemath;
pub mod error;
pub mod flatten;
pub mod interpolation;
pub mod path;
pub mod value;

mod config;
mod global;

pub use accessors::must_resolve;
pub use config::{ConfigCell, Configuration, LoadOptions, DEFAULT_FILE_PATH};
pub use error::{Error, ErrorKind, Result};
pub use flatten::ConfigMap;
pub use global::*;
pub use path::Path;
pub use value::Value;
