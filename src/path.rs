// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Path addressing for the hierarchical store.
//!
//! A [`Path`] is an immutable, validated sequence of non-empty segments.
//! Its depth carries meaning: one segment addresses a class (collection),
//! two an instance, three or more a nested child such as a relation node.
//! That role is captured once at construction as a [`PathKind`] instead of
//! being re-derived from length checks at every call site.
//!
//! # Example
//!
//! ```
//! use sync_objects::{Path, PathKind};
//!
//! let path = Path::parse("User/abc123").unwrap();
//! assert_eq!(path.kind(), PathKind::Instance);
//! assert_eq!(path.join(), "User/abc123");
//! assert_eq!(path.key(), "abc123");
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;

/// Semantic role of a path, derived from its depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// One segment: a collection of instances (e.g. `User`).
    Class,
    /// Two segments: one entity within a class (e.g. `User/abc123`).
    Instance,
    /// Three or more segments: a child node under an instance, such as a
    /// relation membership map.
    Nested,
}

impl PathKind {
    fn of_depth(depth: usize) -> Self {
        match depth {
            1 => Self::Class,
            2 => Self::Instance,
            _ => Self::Nested,
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Instance => write!(f, "instance"),
            Self::Nested => write!(f, "nested"),
        }
    }
}

/// Origin prefix of a fully-qualified reference URL
/// (`https://<subdomain>.<provider>.com/`).
fn origin_prefix() -> &'static Regex {
    static ORIGIN_PREFIX: OnceLock<Regex> = OnceLock::new();
    ORIGIN_PREFIX.get_or_init(|| {
        Regex::new(r"^https://[0-9a-z.\-]+\.com/").expect("origin prefix pattern is valid")
    })
}

/// An immutable location in the tree: ordered, non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
    kind: PathKind,
}

impl Path {
    /// Parse a slash-joined path string.
    ///
    /// Fails with [`Error::InvalidPath`] on empty input or empty segments
    /// (leading, trailing or doubled slashes).
    pub fn parse(input: &str) -> Result<Self, Error> {
        if input.is_empty() {
            return Err(Error::InvalidPath("path is empty".to_string()));
        }
        Self::from_segments(input.split('/'))
    }

    /// Build a path from an already-split sequence of segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(Error::InvalidPath("path has no segments".to_string()));
        }
        if let Some(pos) = segments.iter().position(String::is_empty) {
            return Err(Error::InvalidPath(format!(
                "path segment {pos} is empty in '{}'",
                segments.join("/")
            )));
        }
        let kind = PathKind::of_depth(segments.len());
        Ok(Self { segments, kind })
    }

    /// Recover the logical path from a reference's fully-qualified URL by
    /// stripping the store-origin prefix, then splitting on `/`.
    ///
    /// A string without the expected prefix is split as-is; whether such
    /// inputs occur is unspecified by the store contract, so no fallback
    /// is guessed here.
    pub fn from_reference_url(url: &str) -> Result<Self, Error> {
        let stripped = origin_prefix().replace(url, "");
        Self::parse(&stripped)
    }

    /// Semantic role computed at construction.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// Number of segments.
    #[must_use]
    #[inline]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment: the node's own key.
    #[must_use]
    pub fn key(&self) -> &str {
        // Segments are validated non-empty at construction.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Slash-joined string form, the inverse of [`Path::parse`].
    #[must_use]
    pub fn join(&self) -> String {
        self.segments.join("/")
    }

    /// A copy extended by one validated segment.
    pub fn child(&self, segment: &str) -> Result<Self, Error> {
        if segment.is_empty() {
            return Err(Error::InvalidPath(format!(
                "empty child segment under '{}'",
                self.join()
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        let kind = PathKind::of_depth(segments.len());
        Ok(Self { segments, kind })
    }

    /// A copy extended by every segment of `other`.
    #[must_use]
    pub fn extend(&self, other: &Path) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        let kind = PathKind::of_depth(segments.len());
        Self { segments, kind }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

impl TryFrom<&str> for Path {
    type Error = Error;

    fn try_from(input: &str) -> Result<Self, Self::Error> {
        Self::parse(input)
    }
}
