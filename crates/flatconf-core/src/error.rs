//! Error types for flatconf
//!
//! Errors are structured: a kind, the configuration path involved (if any),
//! the underlying cause and an actionable help message. `Error` is `Clone` so a
//! single load failure can be handed to every caller of `load`.

use std::fmt;

/// Result type alias for flatconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for flatconf operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Configuration path the error refers to (e.g., "app.server.port")
    pub path: Option<String>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Configuration accessed before a successful load
    #[error("Configuration not initialized")]
    NotInitialized,
    /// No value stored at the requested path
    #[error("Path not found")]
    PathNotFound,
    /// Indexed values requested for a path that is not a sequence
    #[error("Value does not represent a collection")]
    NotACollection,
    /// Top-level keys disagree on their first segment
    #[error("Multiple root paths defined")]
    MultipleRootsDefined,
    /// The document produced no keys, so no root could be inferred
    #[error("Root path is undefined")]
    RootUndefined,
    /// File extension has no reader
    #[error("Unsupported file type")]
    UnsupportedFileType,
    /// The configuration file could not be read
    #[error("Could not read configuration file")]
    FileRead,
    /// The document could not be deserialized
    #[error("Parse error")]
    Parse,
    /// A mapping key that is not a string
    #[error("Mapping key is not a string")]
    NonStringMapKey,
    /// An empty or whitespace-only mapping key
    #[error("Mapping key is blank")]
    BlankMapKey,
    /// A leaf value the flattener cannot encode
    #[error("Unsupported value type")]
    UnsupportedLeafType,
    /// A stored string could not be converted to the requested type
    #[error("Type conversion failed")]
    TypeConversion,
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            help: None,
            cause: None,
        }
    }

    /// Create a not initialized error
    pub fn not_initialized() -> Self {
        Self::new(ErrorKind::NotInitialized)
            .with_help("Call load() and check its result before reading configuration values")
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<String>) -> Self {
        let path_str = path.into();
        Self {
            help: Some(format!(
                "Check that '{}' exists in the configuration",
                path_str
            )),
            path: Some(path_str),
            ..Self::new(ErrorKind::PathNotFound)
        }
    }

    /// Create a not a collection error
    pub fn not_a_collection(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotACollection)
            .with_path(path)
            .with_help("Only sequence values can be read with values()")
    }

    /// Create a multiple roots error from the distinct first segments found
    pub fn multiple_roots(roots: &[String]) -> Self {
        Self {
            cause: Some(format!("Found: {}", roots.join(", "))),
            help: Some("Nest every key under a single top-level key".into()),
            ..Self::new(ErrorKind::MultipleRootsDefined)
        }
    }

    /// Create a root undefined error
    pub fn root_undefined() -> Self {
        Self::new(ErrorKind::RootUndefined)
            .with_help("The configuration document must contain a single top-level key")
    }

    /// Create an unsupported file type error
    pub fn unsupported_file_type(file: impl Into<String>, extension: impl Into<String>) -> Self {
        let ext = extension.into();
        Self {
            cause: Some(format!(
                "Found '{}' for file {}",
                if ext.is_empty() { "<none>" } else { ext.as_str() },
                file.into()
            )),
            help: Some("Use a .yaml or .yml configuration file".into()),
            ..Self::new(ErrorKind::UnsupportedFileType)
        }
    }

    /// Create an error for a file type that is recognized but has no reader yet
    pub fn format_not_implemented(file: impl Into<String>, format: &str) -> Self {
        Self {
            cause: Some(format!(
                "{} configuration files are not implemented yet: {}",
                format,
                file.into()
            )),
            help: Some("Convert the file to YAML (.yaml or .yml)".into()),
            ..Self::new(ErrorKind::UnsupportedFileType)
        }
    }

    /// Create a file read error
    pub fn file_read(file: impl Into<String>, message: impl Into<String>) -> Self {
        let file_str = file.into();
        Self {
            cause: Some(format!("{}: {}", file_str, message.into())),
            help: Some(format!("Check that '{}' exists and is readable", file_str)),
            ..Self::new(ErrorKind::FileRead)
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Parse)
        }
    }

    /// Create a non-string mapping key error
    pub fn non_string_key(parent: impl Into<String>, key: impl Into<String>) -> Self {
        let parent = parent.into();
        Self {
            path: if parent.is_empty() { None } else { Some(parent) },
            cause: Some(format!("Key: {}", key.into())),
            help: Some("Quote numeric or boolean keys so they are read as strings".into()),
            ..Self::new(ErrorKind::NonStringMapKey)
        }
    }

    /// Create a blank mapping key error
    pub fn blank_key(parent: impl Into<String>, key: &str) -> Self {
        let parent = parent.into();
        Self {
            path: if parent.is_empty() { None } else { Some(parent) },
            cause: Some(format!("Key: {:?}", key)),
            help: Some("Give every key a name; blank keys cannot be addressed by path".into()),
            ..Self::new(ErrorKind::BlankMapKey)
        }
    }

    /// Create an unsupported leaf type error
    ///
    /// `partial` is a rendering of the map flattened so far, for diagnosis.
    pub fn unsupported_leaf(
        path: impl Into<String>,
        type_name: &str,
        partial: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path.into()),
            cause: Some(format!(
                "Unknown value type [{}]\nusing data: {}",
                type_name,
                partial.into()
            )),
            help: Some("Give the key a boolean, number, string, mapping or sequence value".into()),
            ..Self::new(ErrorKind::UnsupportedLeafType)
        }
    }

    /// Create a type conversion error
    pub fn type_conversion(
        path: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path.into()),
            help: Some(format!(
                "Ensure the value can be converted to {}",
                expected.into()
            )),
            cause: Some(format!("Got: \"{}\"", got.into())),
            ..Self::new(ErrorKind::TypeConversion)
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a cause to the error
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
