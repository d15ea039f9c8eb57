//! Route pattern parsing.
//!
//! # Syntax
//! - `/`-delimited segments, empty pieces ignored
//! - `:name` captures exactly one path segment
//! - `*name` captures every remaining segment, joined with `/`
//!
//! # Design Decisions
//! - `parse_pattern` is lenient: it stops after the first `*` piece
//! - `Pattern::parse` is strict and runs at registration time
//! - Request paths are split with `split_path`, which never truncates

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::routing::error::RouteError;
use crate::routing::params::Params;

/// One `/`-delimited unit of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal text, matched exactly.
    Static(String),
    /// `:name`, matches one segment.
    Param(String),
    /// `*name`, matches the remainder of the path. The name may be empty.
    CatchAll(String),
}

impl Segment {
    /// Classify a non-empty raw piece.
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(':') {
            Segment::Param(name.to_string())
        } else if let Some(name) = raw.strip_prefix('*') {
            Segment::CatchAll(name.to_string())
        } else {
            Segment::Static(raw.to_string())
        }
    }

    /// True for parameter and catch-all segments.
    pub fn is_wild(&self) -> bool {
        !matches!(self, Segment::Static(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static(text) => f.write_str(text),
            Segment::Param(name) => write!(f, ":{}", name),
            Segment::CatchAll(name) => write!(f, "*{}", name),
        }
    }
}

/// Split a pattern into its non-empty pieces, stopping after the first `*` piece.
///
/// Anything after a catch-all is silently dropped. Registration uses
/// [`Pattern::parse`] instead, which rejects such patterns.
pub fn parse_pattern(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for piece in raw.split('/').filter(|p| !p.is_empty()) {
        parts.push(piece);
        if piece.starts_with('*') {
            break;
        }
    }
    parts
}

/// Split a request path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|p| !p.is_empty()).collect()
}

/// A validated route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse and validate a route pattern.
    ///
    /// Fails when a catch-all is not the last segment, when a parameter has no
    /// name, or when a name is bound twice.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let pieces = split_path(raw);
        let mut segments = Vec::with_capacity(pieces.len());
        let mut names = HashSet::new();

        for (index, piece) in pieces.iter().enumerate() {
            let segment = Segment::parse(piece);
            match &segment {
                Segment::Param(name) if name.is_empty() => {
                    return Err(RouteError::invalid(raw, "parameter segment without a name"));
                }
                Segment::CatchAll(_) if index + 1 != pieces.len() => {
                    return Err(RouteError::invalid(raw, "wildcard must be the last segment"));
                }
                _ => {}
            }
            if let Segment::Param(name) | Segment::CatchAll(name) = &segment {
                if !name.is_empty() && !names.insert(name.clone()) {
                    return Err(RouteError::invalid(
                        raw,
                        format!("parameter {:?} is bound twice", name),
                    ));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern exactly as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names this pattern binds, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::CatchAll(name) if !name.is_empty() => {
                Some(name.as_str())
            }
            _ => None,
        })
    }

    /// Bind this pattern's parameters against the matched request segments.
    ///
    /// `path` must be the segments the pattern was matched against.
    pub fn extract(&self, path: &[&str]) -> Params {
        let mut params = Params::new();
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Param(name) => {
                    if let Some(value) = path.get(index) {
                        params.insert(name.clone(), (*value).to_string());
                    }
                }
                Segment::CatchAll(name) => {
                    if !name.is_empty() {
                        let rest = path.get(index..).unwrap_or_default();
                        params.insert(name.clone(), rest.join("/"));
                    }
                    break;
                }
                Segment::Static(_) => {}
            }
        }
        params
    }
}

impl FromStr for Pattern {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
