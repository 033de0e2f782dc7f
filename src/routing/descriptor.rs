//! Declarative route lists.
//!
//! `RouteDescriptor` is the in-process form used for bulk registration;
//! `RouteSpec` is its file form, whose handler is a name looked up in a
//! [`HandlerRegistry`].

use std::collections::HashMap;

use serde::Deserialize;

use crate::handler::RouteHandler;

/// One entry of a bulk route list.
///
/// Entries whose method is not one of `GET`, `POST`, `PUT`, `DELETE`, or
/// that carry no handler, are skipped during registration.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub method: String,
    pub url: String,
    pub handler: Option<RouteHandler>,
}

impl RouteDescriptor {
    pub fn new(method: impl Into<String>, url: impl Into<String>, handler: RouteHandler) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            handler: Some(handler),
        }
    }
}

/// A route declared in the configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RouteSpec {
    /// HTTP method (`GET`, `POST`, `PUT`, `DELETE`).
    pub method: String,

    /// Route pattern, e.g. `/users/:id`.
    pub url: String,

    /// Name of a handler in the registry.
    pub handler: String,
}

/// Named handlers that declared routes can refer to.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, RouteHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: RouteHandler) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RouteHandler> {
        self.handlers.get(name)
    }

    /// Turn declared routes into descriptors. Unknown handler names yield
    /// descriptors without a handler, which registration skips.
    pub fn resolve(&self, specs: &[RouteSpec]) -> Vec<RouteDescriptor> {
        specs
            .iter()
            .map(|spec| {
                let handler = self.handlers.get(&spec.handler).cloned();
                if handler.is_none() {
                    tracing::warn!(
                        handler = %spec.handler,
                        url = %spec.url,
                        "Declared route refers to an unknown handler"
                    );
                }
                RouteDescriptor {
                    method: spec.method.clone(),
                    url: spec.url.clone(),
                    handler,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Responder;

    fn spec(method: &str, url: &str, handler: &str) -> RouteSpec {
        RouteSpec {
            method: method.into(),
            url: url.into(),
            handler: handler.into(),
        }
    }

    #[test]
    fn test_resolve_keeps_order_and_marks_unknown() {
        let mut registry = HandlerRegistry::new();
        registry.register("ping", RouteHandler::new(|_, respond: Responder| respond.ok("pong")));

        let resolved = registry.resolve(&[
            spec("GET", "/ping", "ping"),
            spec("POST", "/missing", "nope"),
        ]);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].url, "/ping");
        assert!(resolved[0].handler.is_some());
        assert_eq!(resolved[1].method, "POST");
        assert!(resolved[1].handler.is_none());
    }
}
