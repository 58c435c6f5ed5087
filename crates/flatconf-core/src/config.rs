//! The configuration store
//!
//! [`Configuration`] owns the flattened, interpolated configuration of one
//! file together with its root path. Lookups accept paths either relative to
//! the root (`server.port`) or qualified with it (`app.server.port`).
//!
//! [`ConfigCell`] wraps a configuration with one-shot initialization: the
//! first `load` runs, concurrent callers wait for it, and every caller sees
//! the same result, including the same error.

use std::path::{Path as FsPath, PathBuf};
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::flatten::{self, ConfigMap};
use crate::interpolation;
use crate::path::Path;
use crate::value::Value;

/// File loaded when no path is given
pub const DEFAULT_FILE_PATH: &str = "application.yaml";

/// Options for loading a configuration
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Configuration file; defaults to `application.yaml` in the working directory
    pub file_path: Option<PathBuf>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file. Surrounding whitespace is ignored.
    pub fn with_file_path(mut self, path: impl AsRef<FsPath>) -> Self {
        self.file_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// The file that will be read, after defaulting
    pub fn resolved_file_path(&self) -> PathBuf {
        match &self.file_path {
            Some(p) => match p.to_str().map(str::trim) {
                Some("") => PathBuf::from(DEFAULT_FILE_PATH),
                Some(trimmed) => PathBuf::from(trimmed),
                None => p.clone(),
            },
            None => PathBuf::from(DEFAULT_FILE_PATH),
        }
    }
}

/// Supported document formats, selected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    fn from_path(path: &FsPath) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            "json" => Ok(FileFormat::Json),
            _ => Err(Error::unsupported_file_type(
                path.display().to_string(),
                if ext.is_empty() {
                    String::new()
                } else {
                    format!(".{}", ext)
                },
            )),
        }
    }
}

/// Read and deserialize a configuration file into its top-level mapping
fn read_document(path: &FsPath) -> Result<IndexMap<String, Value>> {
    match FileFormat::from_path(path)? {
        FileFormat::Json => Err(Error::format_not_implemented(
            path.display().to_string(),
            "JSON",
        )),
        FileFormat::Yaml => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::file_read(path.display().to_string(), e.to_string()))?;
            log::trace!("Read {} bytes from {}", content.len(), path.display());
            parse_yaml(&content)
        }
    }
}

fn parse_yaml(content: &str) -> Result<IndexMap<String, Value>> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| Error::parse(format!("Could not read YAML configuration: {}", e)))?;

    match Value::from_yaml(yaml)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(IndexMap::new()),
        other => Err(Error::parse(format!(
            "The top level of the document must be a mapping, found {}",
            other.type_name()
        ))),
    }
}

/// Infer the single first segment shared by every key
fn infer_root(map: &ConfigMap) -> Result<Path> {
    let roots = map.top_level_keys();
    match roots.as_slice() {
        [] => Err(Error::root_undefined()),
        [root] => Ok(Path::new(root)),
        _ => Err(Error::multiple_roots(&roots)),
    }
}

/// A loaded configuration
#[derive(Debug)]
pub struct Configuration {
    file_path: PathBuf,
    root: Path,
    mapping: RwLock<ConfigMap>,
}

impl Configuration {
    /// Read, flatten and interpolate the file selected by `options`
    pub fn load(options: &LoadOptions) -> Result<Self> {
        let file_path = options.resolved_file_path();
        log::debug!("Loading configuration from {}", file_path.display());

        let document = read_document(&file_path)?;
        Self::from_document(file_path, &document)
    }

    /// Build a configuration from YAML text, without a backing file
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document = parse_yaml(yaml)?;
        Self::from_document(PathBuf::new(), &document)
    }

    fn from_document(file_path: PathBuf, document: &IndexMap<String, Value>) -> Result<Self> {
        let mut mapping = flatten::flatten(document)?;

        let mut substituted = 0;
        for value in mapping.values_mut() {
            if interpolation::contains_placeholder(value) {
                substituted += 1;
            }
            *value = interpolation::interpolate(value);
        }
        log::trace!("Interpolated placeholders in {} values", substituted);

        let root = infer_root(&mapping)?;
        log::debug!(
            "Loaded configuration with root '{}' ({} entries)",
            root,
            mapping.len()
        );

        Ok(Self {
            file_path,
            root,
            mapping: RwLock::new(mapping),
        })
    }

    // Writers never leave the map half-updated, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, ConfigMap> {
        self.mapping.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConfigMap> {
        self.mapping.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The root path shared by every key
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file this configuration was read from (empty for in-memory sources)
    pub fn file_path(&self) -> &FsPath {
        &self.file_path
    }

    /// Qualify `path` with the root unless it already is
    pub fn resolve(&self, path: impl Into<Path>) -> Path {
        let path = path.into();
        if path.starts_with(&self.root) {
            path
        } else {
            self.root.join(path)
        }
    }

    /// Check whether a value is stored at `path`.
    ///
    /// If this returns true, [`value`](Self::value) will not fail, although
    /// typed getters may still fail to convert the value.
    pub fn has_path(&self, path: impl Into<Path>) -> bool {
        self.has_path_in(&self.read(), &path.into())
    }

    fn has_path_in(&self, map: &ConfigMap, path: &Path) -> bool {
        !path.is_empty() && map.contains(&self.resolve(path))
    }

    /// Check whether `path` holds a sequence
    pub fn is_collection(&self, path: impl Into<Path>) -> bool {
        self.is_collection_in(&self.read(), &path.into())
    }

    fn is_collection_in(&self, map: &ConfigMap, path: &Path) -> bool {
        self.has_path_in(map, path) && map.contains(&self.resolve(path).collection_marker())
    }

    /// Get the raw string stored at `path`
    pub fn value(&self, path: impl Into<Path>) -> Result<String> {
        let path = path.into();
        let map = self.read();
        if !self.has_path_in(&map, &path) {
            return Err(Error::path_not_found(path.as_str()));
        }
        map.get(&self.resolve(&path))
            .map(str::to_string)
            .ok_or_else(|| Error::path_not_found(path.as_str()))
    }

    /// Get the elements of the sequence stored at `path`, in index order
    pub fn values(&self, path: impl Into<Path>) -> Result<Vec<String>> {
        let path = path.into();
        let map = self.read();
        if !self.has_path_in(&map, &path) {
            return Err(Error::path_not_found(path.as_str()));
        }
        if !self.is_collection_in(&map, &path) {
            return Err(Error::not_a_collection(path.as_str()));
        }

        let resolved = self.resolve(&path);
        let mut elements: Vec<(usize, &String)> = map
            .iter()
            .filter_map(|(key, value)| key.element_index(&resolved).map(|i| (i, value)))
            .collect();
        elements.sort_by_key(|(i, _)| *i);
        Ok(elements.into_iter().map(|(_, v)| v.clone()).collect())
    }

    /// Set or replace the value at `path`.
    ///
    /// Returns false, leaving the configuration untouched, for an empty path.
    pub fn set(&self, path: impl Into<Path>, value: impl Into<String>) -> bool {
        let path = path.into();
        if path.is_empty() {
            return false;
        }
        let resolved = self.resolve(path);
        log::trace!("Setting configuration value at {}", resolved);
        self.write().insert(resolved, value);
        true
    }

    /// Paths exactly one segment below `path`, in path order.
    ///
    /// Matching is per segment: `sub("app.db")` does not list `app.dbx.*`.
    pub fn sub(&self, path: impl Into<Path>) -> Result<Vec<Path>> {
        let path = path.into();
        let map = self.read();
        if !self.has_path_in(&map, &path) {
            return Err(Error::path_not_found(path.as_str()));
        }

        let parent = self.resolve(&path);
        let depth = parent.depth() + 1;
        Ok(map
            .keys()
            .filter(|key| key.depth() == depth && key.starts_with(&parent))
            .cloned()
            .collect())
    }

    /// Number of stored entries
    pub fn size(&self) -> usize {
        self.read().len()
    }

    /// Copy of the current flat mapping
    pub fn snapshot(&self) -> ConfigMap {
        self.read().clone()
    }

    /// Pretty JSON dump of the file path, root and full mapping, for diagnostics
    pub fn to_debug_string(&self) -> String {
        let map = self.read();
        let dump = serde_json::json!({
            "file_path": self.file_path.display().to_string(),
            "root": &self.root,
            "mapping": &*map,
        });
        serde_json::to_string_pretty(&dump).unwrap_or_else(|e| e.to_string())
    }
}

/// One-shot holder for a [`Configuration`].
///
/// The first call to [`load`](Self::load) (or [`load_with`](Self::load_with))
/// runs the loader; concurrent callers block until it finishes and later
/// callers get the stored outcome without loading again. A failed load is
/// permanent for the cell.
#[derive(Debug, Default)]
pub struct ConfigCell {
    state: OnceLock<Result<Configuration>>,
}

impl ConfigCell {
    pub const fn new() -> Self {
        Self {
            state: OnceLock::new(),
        }
    }

    /// Load the configuration file described by `options`, once
    pub fn load(&self, options: &LoadOptions) -> Result<()> {
        self.load_with(|| Configuration::load(options))
    }

    /// Initialize the cell with `init`, once
    pub fn load_with<F>(&self, init: F) -> Result<()>
    where
        F: FnOnce() -> Result<Configuration>,
    {
        match self.state.get_or_init(init) {
            Ok(_) => Ok(()),
            Err(e) => Err(e.clone()),
        }
    }

    /// True once a load has completed successfully
    pub fn is_loaded(&self) -> bool {
        matches!(self.state.get(), Some(Ok(_)))
    }

    /// The loaded configuration.
    ///
    /// Fails with `NotInitialized` before a load, and after a failed one.
    pub fn get(&self) -> Result<&Configuration> {
        match self.state.get() {
            Some(Ok(config)) => Ok(config),
            Some(Err(e)) => {
                Err(Error::not_initialized().with_cause(format!("Load failed: {}", e.kind)))
            }
            None => Err(Error::not_initialized()),
        }
    }
}
