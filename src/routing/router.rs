//! Route table and lookup.
//!
//! # Responsibilities
//! - Store one handler per (verb, pattern)
//! - Replace handlers on duplicate registration
//! - Look up the handler for a request and report an explicit miss
//!
//! # Design Decisions
//! - Mutated only through `&mut self` before the server starts
//! - Most specific pattern wins; ties resolve to registration order
//! - A path match without a handler for the verb is reported separately
//! - `HEAD` shares the GET handler

use axum::http::Method;

use crate::handler::RouteHandler;
use crate::routing::matcher::{PathParams, PathPattern};
use crate::routing::method::Verb;

#[derive(Debug)]
struct RouteEntry {
    verb: Verb,
    pattern: PathPattern,
    handler: RouteHandler,
}

/// Result of a route lookup.
#[derive(Debug)]
pub enum Lookup {
    Found {
        verb: Verb,
        pattern: String,
        handler: RouteHandler,
        params: PathParams,
    },
    MethodNotAllowed {
        allowed: Vec<Verb>,
    },
    NotFound,
}

/// All registered routes, in registration order.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Returns `true` if it replaced an earlier one.
    pub fn insert(&mut self, verb: Verb, pattern: PathPattern, handler: RouteHandler) -> bool {
        let existing = self
            .entries
            .iter_mut()
            .find(|e| e.verb == verb && e.pattern.same_shape(&pattern));

        match existing {
            Some(entry) => {
                entry.pattern = pattern;
                entry.handler = handler;
                true
            }
            None => {
                self.entries.push(RouteEntry { verb, pattern, handler });
                false
            }
        }
    }

    /// Number of registered (verb, pattern) pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the handler for a request. `HEAD` is answered by the GET route.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let verb = if *method == Method::HEAD {
            Some(Verb::Get)
        } else {
            Verb::from_method(method)
        };
        let mut best: Option<(Vec<u8>, &RouteEntry, PathParams)> = None;
        let mut allowed: Vec<Verb> = Vec::new();

        for entry in &self.entries {
            let Some(params) = entry.pattern.matches(path) else {
                continue;
            };
            allowed.push(entry.verb);
            if Some(entry.verb) != verb {
                continue;
            }

            let rank = entry.pattern.specificity();
            if best.as_ref().map_or(true, |(best_rank, _, _)| rank > *best_rank) {
                best = Some((rank, entry, params));
            }
        }

        if let Some((_, entry, params)) = best {
            return Lookup::Found {
                verb: entry.verb,
                pattern: entry.pattern.to_string(),
                handler: entry.handler.clone(),
                params,
            };
        }

        if allowed.is_empty() {
            return Lookup::NotFound;
        }
        allowed.sort();
        allowed.dedup();
        Lookup::MethodNotAllowed { allowed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Responder;
    use serde_json::{json, Value};

    fn tagged(tag: &'static str) -> RouteHandler {
        RouteHandler::new(move |_, respond: Responder| respond.ok(tag))
    }

    fn pattern(p: &str) -> PathPattern {
        PathPattern::parse(p).unwrap()
    }

    async fn found_tag(table: &RouteTable, method: Method, path: &str) -> Value {
        match table.lookup(&method, path) {
            Lookup::Found { handler, .. } => handler.invoke(Value::Null).await.unwrap(),
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let mut table = RouteTable::new();
        assert!(!table.insert(Verb::Get, pattern("/ping"), tagged("first")));
        assert!(table.insert(Verb::Get, pattern("/ping"), tagged("second")));
        assert_eq!(table.len(), 1);
        assert_eq!(found_tag(&table, Method::GET, "/ping").await, json!("second"));
    }

    #[tokio::test]
    async fn test_static_beats_param_regardless_of_order() {
        let mut table = RouteTable::new();
        table.insert(Verb::Get, pattern("/users/:id"), tagged("param"));
        table.insert(Verb::Get, pattern("/users/me"), tagged("static"));
        assert_eq!(found_tag(&table, Method::GET, "/users/me").await, json!("static"));
        assert_eq!(found_tag(&table, Method::GET, "/users/7").await, json!("param"));
    }

    #[test]
    fn test_params_are_captured() {
        let mut table = RouteTable::new();
        table.insert(Verb::Delete, pattern("/items/:id"), tagged("del"));
        match table.lookup(&Method::DELETE, "/items/9") {
            Lookup::Found { verb, pattern, params, .. } => {
                assert_eq!(verb, Verb::Delete);
                assert_eq!(pattern, "/items/:id");
                assert_eq!(params.get("id"), Some("9"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_method_not_allowed() {
        let mut table = RouteTable::new();
        table.insert(Verb::Get, pattern("/things"), tagged("get"));
        table.insert(Verb::Put, pattern("/things"), tagged("put"));
        match table.lookup(&Method::POST, "/things") {
            Lookup::MethodNotAllowed { allowed } => assert_eq!(allowed, vec![Verb::Get, Verb::Put]),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            table.lookup(&Method::PATCH, "/things"),
            Lookup::MethodNotAllowed { .. }
        ));
    }

    #[test]
    fn test_head_uses_get_route() {
        let mut table = RouteTable::new();
        table.insert(Verb::Get, pattern("/p"), tagged("get"));
        table.insert(Verb::Post, pattern("/q"), tagged("post"));
        assert!(matches!(
            table.lookup(&Method::HEAD, "/p"),
            Lookup::Found { verb: Verb::Get, .. }
        ));
        match table.lookup(&Method::HEAD, "/q") {
            Lookup::MethodNotAllowed { allowed } => assert_eq!(allowed, vec![Verb::Post]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_not_found() {
        let mut table = RouteTable::new();
        table.insert(Verb::Get, pattern("/things"), tagged("get"));
        assert!(matches!(table.lookup(&Method::GET, "/other"), Lookup::NotFound));
        assert!(RouteTable::new().is_empty());
    }
}
