use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The reserved character separating path segments in textual form.
pub const SEPARATOR: char = '/';

/// Address of a node in the hierarchy.
///
/// A `Path` is an immutable, ordered list of non-empty segments. The root is
/// the unique path with zero segments and renders as the empty string.
/// Equality is structural.
///
/// Ordering is lexicographic by segment, so every descendant of a path sorts
/// directly after it and before any sibling that follows it. Ordered maps
/// keyed by `Path` therefore hold each subtree as one contiguous range.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path from its delimited textual form.
    ///
    /// Empty segments are ignored, so `""`, `"/"` and `"//"` all denote the
    /// root and `"/a//b/"` equals `"a/b"`.
    pub fn parse(text: &str) -> Self {
        Self {
            segments: text
                .split(SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build a path from individual segments, validating each one.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments
            .into_iter()
            .map(|s| {
                let s = s.into();
                validate_segment(&s)?;
                Ok(s)
            })
            .collect::<Result<Vec<_>, TypeError>>()?;
        Ok(Self { segments })
    }

    /// Returns `true` for the zero-segment root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, or `None` for the root.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The path without its last segment, or `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// Append a single segment.
    ///
    /// The segment must be non-empty and must not contain [`SEPARATOR`].
    pub fn child(&self, segment: &str) -> Result<Path, TypeError> {
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Append all segments of `other`.
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Returns `true` if `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns `true` if `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        other.depth() > self.depth() && other.starts_with(self)
    }

    /// This path expressed relative to `ancestor`.
    ///
    /// Returns `None` if `ancestor` is not a prefix of this path. A path
    /// relative to itself is the root.
    pub fn relative_to(&self, ancestor: &Path) -> Option<Path> {
        let rest = self.segments.strip_prefix(ancestor.segments.as_slice())?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }
}

fn validate_segment(segment: &str) -> Result<(), TypeError> {
    if segment.is_empty() {
        return Err(TypeError::InvalidSegment {
            segment: segment.to_string(),
            reason: "segment must not be empty".into(),
        });
    }
    if segment.contains(SEPARATOR) {
        return Err(TypeError::InvalidSegment {
            segment: segment.to_string(),
            reason: format!("segment must not contain '{SEPARATOR}'"),
        });
    }
    Ok(())
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({:?})", self.to_string())
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}
