//! HTTP verbs a route can be registered for.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;

/// Verbs supported by route registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

/// Where a verb's handler input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Path parameters merged with query parameters (query wins).
    PathAndQuery,
    /// The decoded request body.
    Body,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    /// Input extraction table.
    pub fn input_source(self) -> InputSource {
        match self {
            Verb::Get => InputSource::PathAndQuery,
            Verb::Post | Verb::Put | Verb::Delete => InputSource::Body,
        }
    }

    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Verb::Get),
            Method::POST => Some(Verb::Post),
            Method::PUT => Some(Verb::Put),
            Method::DELETE => Some(Verb::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the exact upper-case method names used in route declarations.
impl FromStr for Verb {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "DELETE" => Ok(Verb::Delete),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!("GET".parse::<Verb>(), Ok(Verb::Get));
        assert_eq!("DELETE".parse::<Verb>(), Ok(Verb::Delete));
        assert!("get".parse::<Verb>().is_err());
        assert!("PATCH".parse::<Verb>().is_err());
    }

    #[test]
    fn test_input_sources() {
        assert_eq!(Verb::Get.input_source(), InputSource::PathAndQuery);
        for verb in [Verb::Post, Verb::Put, Verb::Delete] {
            assert_eq!(verb.input_source(), InputSource::Body);
        }
    }

    #[test]
    fn test_from_method() {
        assert_eq!(Verb::from_method(&Method::PUT), Some(Verb::Put));
        assert_eq!(Verb::from_method(&Method::PATCH), None);
    }
}
