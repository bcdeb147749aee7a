//! Explicit paths into a [`Value`] tree.
//!
//! A [`Path`] is a list of map keys and array indices. It stands in for
//! chained member access: `token.card.secure3DData.acsUrl` becomes
//! `Path::parse("card.secure3DData.acsUrl")`, and a write such as
//! `v.ra.inb[0].w = "Gold"` becomes `v.set_at(&Path::parse("ra.inb[0].w"), "Gold")`.
//!
//! Paths are also what the decoder reports when a body cannot be decoded.

use std::fmt;

use crate::value::{Segment, Value, DEFAULT};

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl Segment for PathSegment {
    fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match self {
            PathSegment::Key(key) => key.lookup(value),
            PathSegment::Index(index) => index.lookup(value),
        }
    }

    fn store(&self, value: &mut Value, new: Value) {
        match self {
            PathSegment::Key(key) => key.store(value, new),
            PathSegment::Index(index) => index.store(value, new),
        }
    }
}

/// A sequence of keys and indices, rooted at `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path, addressing the root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Append a map key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an array index.
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    /// Parse dotted notation with bracketed indices: `a.b[0].c`.
    ///
    /// A leading `$` is accepted and ignored. Empty keys are skipped, and a
    /// bracket whose contents are not a number is read as a key, so parsing
    /// never fails.
    ///
    /// ```
    /// use simplify_core::Path;
    ///
    /// let path = Path::parse("ra.inb[0].w");
    /// assert_eq!(path, Path::root().key("ra").key("inb").index(0).key("w"));
    /// assert_eq!(path.to_string(), "$.ra.inb[0].w");
    /// ```
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('$').unwrap_or(text);
        let mut path = Path::root();
        for part in text.split('.') {
            let (key, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if !key.is_empty() {
                path = path.key(key);
            }
            while let Some(inner) = rest.strip_prefix('[') {
                let Some(end) = inner.find(']') else {
                    path = path.key(inner);
                    break;
                };
                let token = &inner[..end];
                path = match token.parse::<usize>() {
                    Ok(index) => path.index(index),
                    Err(_) => path.key(token),
                };
                rest = &inner[end + 1..];
            }
        }
        path
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Path::parse(text)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Value {
    /// Walk `path`; any miss along the way yields [`DEFAULT`].
    pub fn at(&self, path: &Path) -> &Value {
        path.segments
            .iter()
            .try_fold(self, |node, segment| segment.lookup(node))
            .unwrap_or(&DEFAULT)
    }

    /// Write `value` at `path`, creating maps and arrays along the way.
    ///
    /// Each level follows the [`Value::set`] rules, so an out-of-range index
    /// appends rather than pads.
    ///
    /// ```
    /// use simplify_core::{Path, Value};
    ///
    /// let mut v = Value::new();
    /// v.set_at(&Path::parse("ra.inb[5].w"), "Gold");
    /// assert_eq!(v.at(&Path::parse("ra.inb[0].w")), &Value::from("Gold"));
    /// ```
    pub fn set_at(&mut self, path: &Path, value: impl Into<Value>) {
        set_segments(self, &path.segments, value.into());
    }
}

fn set_segments(node: &mut Value, segments: &[PathSegment], value: Value) {
    match segments.split_first() {
        None => *node = value,
        Some((head, rest)) => {
            let mut child = node.get(head).clone();
            set_segments(&mut child, rest, value);
            head.store(node, child);
        }
    }
}
