//! Route pattern parsing and matching.
//!
//! # Responsibilities
//! - Parse restify-style patterns (`/users/:id`, `/files/*`)
//! - Match request paths and capture parameters
//! - Rank patterns so the most specific match wins
//!
//! # Design Decisions
//! - Matching is case-sensitive and segment based
//! - A trailing slash is not significant on either side
//! - `*` is only valid as the last segment and captures the remainder
//! - Captured values are kept as they appear in the URI; decoding happens
//!   when the handler input is built

use std::fmt;

/// Captured path parameters, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Key under which a splat segment's capture is stored.
pub const SPLAT_KEY: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    Splat,
}

impl Segment {
    fn rank(&self) -> u8 {
        match self {
            Segment::Static(_) => 2,
            Segment::Param(_) => 1,
            Segment::Splat => 0,
        }
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. The error message names what is wrong with it.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        if !pattern.starts_with('/') {
            return Err(format!("route pattern {:?} must start with '/'", pattern));
        }

        let parts = split_path(pattern);
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = if part.is_empty() {
                return Err(format!("route pattern {:?} contains an empty segment", pattern));
            } else if *part == SPLAT_KEY {
                if i + 1 != parts.len() {
                    return Err(format!("route pattern {:?}: '*' must be the last segment", pattern));
                }
                Segment::Splat
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(format!("route pattern {:?} has an unnamed parameter", pattern));
                }
                if segments.iter().any(|s| matches!(s, Segment::Param(n) if n == name)) {
                    return Err(format!("route pattern {:?} repeats parameter {:?}", pattern, name));
                }
                Segment::Param(name.to_string())
            } else {
                Segment::Static(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning captured parameters.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts = split_path(path);
        let mut params = Vec::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Splat => {
                    params.push((SPLAT_KEY.to_string(), parts[i.min(parts.len())..].join("/")));
                    return Some(PathParams(params));
                }
                Segment::Static(expected) => {
                    if parts.get(i) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => match parts.get(i) {
                    Some(value) if !value.is_empty() => {
                        params.push((name.clone(), (*value).to_string()));
                    }
                    _ => return None,
                },
            }
        }

        (parts.len() == self.segments.len()).then_some(PathParams(params))
    }

    /// Specificity key: compared lexicographically, higher wins.
    pub fn specificity(&self) -> Vec<u8> {
        self.segments.iter().map(Segment::rank).collect()
    }

    /// Whether two patterns are the same route modulo parameter names.
    pub fn same_shape(&self, other: &PathPattern) -> bool {
        self.segments.len() == other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| match (a, b) {
                (Segment::Static(x), Segment::Static(y)) => x == y,
                (Segment::Param(_), Segment::Param(_)) | (Segment::Splat, Segment::Splat) => true,
                _ => false,
            })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split a path into segments, ignoring the leading and one trailing slash.
fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}
