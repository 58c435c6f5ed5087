//! Dotted configuration paths
//!
//! A [`Path`] addresses one entry of the flattened configuration, e.g.
//! `app.server.port`. Segments keep their original case but every comparison
//! (equality, hashing, ordering) ignores case, so `App.Server` and
//! `app.server` name the same entry.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Separator between path segments
pub const SEPARATOR: char = '.';

/// Segment marking the length entry of a sequence (`servers.#`)
pub const COLLECTION_MARKER: &str = "#";

/// An immutable, dotted configuration address
#[derive(Clone, Default)]
pub struct Path(String);

impl Path {
    /// Create a path from its dotted form. Surrounding whitespace is removed.
    pub fn new(path: impl AsRef<str>) -> Self {
        Path(path.as_ref().trim().to_string())
    }

    /// The empty ("no path") value
    pub fn empty() -> Self {
        Path(String::new())
    }

    /// Last segment, e.g. `port` for `app.server.port`
    pub fn base(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or_default()
    }

    /// First segment, e.g. `app` for `app.server.port`
    pub fn first(&self) -> &str {
        self.0.split(SEPARATOR).next().unwrap_or_default()
    }

    /// Number of segments; zero for the empty path
    pub fn depth(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.segments().count()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive comparison of the whole serialized path
    pub fn equals(&self, other: &Path) -> bool {
        self == other
    }

    /// Concatenate two paths. Joining with an empty path returns the other operand.
    pub fn join(&self, other: impl Into<Path>) -> Path {
        let other = other.into();
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self.clone();
        }
        Path(format!("{}{}{}", self.0, SEPARATOR, other.0))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// True when `prefix` is this path or one of its ancestors.
    ///
    /// Matching is per segment: `app.db` does not start with `app.d`.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        if prefix.is_empty() {
            return true;
        }
        match self.match_prefix(&prefix.0) {
            Some(end) => {
                let tail = &self.0[end..];
                tail.is_empty() || tail.starts_with(SEPARATOR)
            }
            None => false,
        }
    }

    /// Path of the length entry for a sequence stored at this path (`p.#`)
    pub fn collection_marker(&self) -> Path {
        self.join(COLLECTION_MARKER)
    }

    /// Path of element `index` of a sequence stored at this path (`p.#3`)
    pub fn element(&self, index: usize) -> Path {
        Path(format!("{}{}", self.collection_marker().0, index))
    }

    /// If this path is `parent.#<digits>`, return the index
    pub fn element_index(&self, parent: &Path) -> Option<usize> {
        let end = self.match_prefix(&parent.collection_marker().0)?;
        let digits = &self.0[end..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Byte offset in this path just past a case-insensitive match of `prefix`.
    ///
    /// Lowercasing can change a character's UTF-8 width, so the match walks
    /// folded characters rather than byte slices.
    fn match_prefix(&self, prefix: &str) -> Option<usize> {
        let mut wanted = prefix.chars().flat_map(char::to_lowercase).peekable();
        if wanted.peek().is_none() {
            return Some(0);
        }
        for (i, c) in self.0.char_indices() {
            for lower in c.to_lowercase() {
                if wanted.next() != Some(lower) {
                    return None;
                }
            }
            if wanted.peek().is_none() {
                return Some(i + c.len_utf8());
            }
        }
        None
    }

    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars().flat_map(char::to_lowercase)
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.folded().eq(other.folded())
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.folded() {
            c.hash(state);
        }
    }
}

impl Ord for Path {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({:?})", self.0)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::new(s)
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path::new(s)
    }
}

impl From<&Path> for Path {
    fn from(p: &Path) -> Self {
        p.clone()
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Path::new(s))
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
